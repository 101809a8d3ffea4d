//! clientverse Parser - query string parser for the clientverse query builder
//!
//! This crate turns a query string into the structured state the query
//! builder controller works with (object type, selected fields, WHERE body,
//! ORDER BY, LIMIT). It is stateless: every call takes the text and returns
//! a fresh [`ParsedQuery`].

pub mod error;
pub mod lexer;
pub mod query_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use lexer::{lex, split_top_level, Keyword, KeywordToken};
pub use query_parser::{ChildClause, ParsedQuery, QueryParser};

//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Object type in the query disagrees with the locked object type
    #[error("The query string is incompatible with the locked object type: expected '{expected}', found '{found}'")]
    SchemaConflict { expected: String, found: String },

    /// A clause requires a keyword that is missing
    #[error("Missing required keyword: {0}")]
    MissingKeyword(String),

    /// Parentheses do not balance
    #[error("Unbalanced parentheses at offset {offset}")]
    UnbalancedParentheses { offset: usize },

    /// A quoted literal is never closed
    #[error("Unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A parenthesized entry in the field list is not a valid subquery
    #[error("Invalid subquery: {0}")]
    InvalidSubquery(String),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

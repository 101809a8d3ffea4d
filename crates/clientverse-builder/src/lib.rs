//! clientverse Builder - recomposes structured query state into a query string
//!
//! The builder is the inverse of `clientverse-parser`:
//! - [`ChildWhereMap`] aggregates child-relationship conditions per relationship
//! - [`QueryBuilder`] renders selected fields, child subqueries, WHERE,
//!   ORDER BY and LIMIT into one query string

pub mod aggregator;
pub mod error;
pub mod query_builder;

pub use aggregator::{partition_fields, render_subquery, ChildWhereMap, FieldPartition};
pub use error::{BuildError, Result};
pub use query_builder::{Direction, OrderBy, QueryBuilder, QueryParts};

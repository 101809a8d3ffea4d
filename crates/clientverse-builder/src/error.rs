//! Builder error types

use thiserror::Error;

/// Builder error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Order direction other than ASC/DESC
    #[error("Invalid order direction: '{0}' (expected ASC or DESC)")]
    InvalidDirection(String),

    /// ORDER BY requested without a field
    #[error("ORDER BY requires a field")]
    EmptyOrderByField,

    /// A condition could not be rendered
    #[error("Invalid condition: {0}")]
    InvalidCondition(#[from] clientverse_core::CoreError),
}

/// Result type for builder operations
pub type Result<T> = std::result::Result<T, BuildError>;

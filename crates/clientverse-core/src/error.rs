//! Error types for clientverse core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid field path: {0}")]
    InvalidFieldPath(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Incomplete condition: {0}")]
    IncompleteCondition(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

//! SDK error types

use crate::services::ServiceError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] clientverse_parser::ParseError),

    /// Builder error
    #[error("Builder error: {0}")]
    BuildError(#[from] clientverse_builder::BuildError),

    /// Condition or field path error
    #[error("Core error: {0}")]
    CoreError(#[from] clientverse_core::CoreError),

    /// A remote service call failed
    #[error("Remote failure: {0}")]
    RemoteFailure(String),

    /// An operation was attempted before its inputs exist
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Caller lacks the access level for an operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Required user input is missing
    #[error("Missing information: {0}")]
    MissingInformation(String),

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ServiceError> for SdkError {
    fn from(err: ServiceError) -> Self {
        SdkError::RemoteFailure(err.to_string())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

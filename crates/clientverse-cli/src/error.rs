//! CLI error types

use clientverse_sdk::SdkError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Query could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Query could not be built from the given parts
    #[error("Build error: {0}")]
    Build(String),

    /// Bad command line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File could not be read or decoded
    #[error("Input error: {0}")]
    Input(String),

    /// Any other controller failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Process exit code for the error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Parse(_) | CliError::Build(_) => 1,
            CliError::InvalidArgument(_) => 2,
            CliError::Input(_) => 3,
            CliError::Internal(_) => 70,
        }
    }
}

impl From<SdkError> for CliError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::ParseError(e) => CliError::Parse(e.to_string()),
            SdkError::BuildError(e) => CliError::Build(e.to_string()),
            SdkError::ConfigError(e) => CliError::Input(e.to_string()),
            other => CliError::Internal(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

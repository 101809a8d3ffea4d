//! clientverse command line tool library
//!
//! Command implementations, exposed for testing and reuse.

pub mod commands;
pub mod error;

pub use commands::{BuildArgs, SchemaFile};
pub use error::{CliError, Result};

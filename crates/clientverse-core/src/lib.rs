//! clientverse Core - shared types for the clientverse query builder
//!
//! This crate provides the building blocks used by the parser, the builder
//! and the controllers:
//! - Dotted relationship field paths
//! - The insertion-ordered selected field set
//! - Filter conditions and the operator catalog
//! - Object schema descriptors
//! - Error types

pub mod condition;
pub mod error;
pub mod field_path;
pub mod selected_fields;
pub mod types;

// Re-export commonly used types
pub use condition::{filter_operators, quote, ChildTarget, Condition, ConditionTarget, Operator, OperatorOption};
pub use error::CoreError;
pub use field_path::FieldPath;
pub use selected_fields::{SelectedFields, Toggle};
pub use types::{ChildRelationship, FieldDescriptor, FieldOption, ObjectInfo, ObjectOption};

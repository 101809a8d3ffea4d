//! Schema descriptors
//!
//! Read-only metadata returned by the schema service: object fields,
//! selectable object types and child relationships.

pub mod schema;

pub use schema::{ChildRelationship, FieldDescriptor, FieldOption, ObjectInfo, ObjectOption};

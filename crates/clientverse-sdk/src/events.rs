//! Events exchanged between controllers and their host

use clientverse_core::Operator;
use serde::{Deserialize, Serialize};

/// Notifications raised by the query builder session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "camelCase")]
pub enum SessionEvent {
    /// The query string was rebuilt or reparsed
    QueryChanged(String),
    /// A field that was already selected was picked again
    FieldHighlighted(String),
    /// User-facing message about a finished or failed operation
    Notice(Notice),
}

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message for the user, e.g. `"Query executed successfully"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NoticeLevel::Success)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NoticeLevel::Warning)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NoticeLevel::Error)
    }
}

/// Child condition as reported by a condition line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildWhereInfo {
    pub relationship_name: String,
    pub child_object: String,
    pub field_name: String,
    pub value: String,
}

/// Condition editor output delivered to the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WhereInfo {
    /// Recomputed WHERE bodies of the parent conditions
    #[serde(rename_all = "camelCase")]
    Parent {
        parent_where: Option<String>,
        full_where: Option<String>,
    },
    /// A single completed child condition
    Child(ChildWhereInfo),
}

/// Payload of a completed condition line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConditionPayload {
    #[serde(rename_all = "camelCase")]
    Parent {
        field_name: String,
        data_type: Option<String>,
        object_type: Option<String>,
        operation: Operator,
        value: String,
        id: String,
    },
    Child(ChildWhereInfo),
}

/// Events raised by a condition line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ConditionLineEvent {
    Changed(ConditionPayload),
    Removed { id: String },
}

/// Events raised by the field selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "camelCase")]
pub enum FieldSelectorEvent {
    /// Full dotted path of the chosen field
    FieldSelected(String),
    RemoveAll,
    AddAll,
}

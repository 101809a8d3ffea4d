//! Condition types and WHERE fragment rendering

use super::operator::Operator;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Data types whose values are rendered as quoted string literals
const QUOTED_TYPES: &[&str] = &[
    "string",
    "picklist",
    "multipicklist",
    "email",
    "phone",
    "url",
    "textarea",
    "id",
    "reference",
    "combobox",
];

/// Target of a child-relationship condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildTarget {
    /// Relationship name, e.g. `Contacts`
    pub relationship_name: String,
    /// Object type of the child records, e.g. `Contact`
    pub child_object_type: String,
    /// Field on the child object
    pub child_field_name: String,
}

/// Where a condition applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "targetKind", rename_all = "lowercase")]
pub enum ConditionTarget {
    /// Field on the primary object
    Parent,
    /// Field on a child relationship
    Child(ChildTarget),
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Field path on the primary object (empty for child conditions)
    pub field: String,
    pub operator: Operator,
    pub value: Option<String>,
    /// Data type of the field, drives literal quoting
    pub data_type: Option<String>,
    pub target: ConditionTarget,
}

impl Condition {
    /// Create a parent condition
    pub fn parent(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        data_type: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
            data_type,
            target: ConditionTarget::Parent,
        }
    }

    /// Create a child condition
    pub fn child(target: ChildTarget, value: impl Into<String>) -> Self {
        Self {
            field: String::new(),
            operator: Operator::Child,
            value: Some(value.into()),
            data_type: None,
            target: ConditionTarget::Child(target),
        }
    }

    /// Returns true if this condition targets a child relationship
    pub fn is_child(&self) -> bool {
        matches!(self.target, ConditionTarget::Child(_))
    }

    /// Child target, if any
    pub fn child_target(&self) -> Option<&ChildTarget> {
        match &self.target {
            ConditionTarget::Child(t) => Some(t),
            ConditionTarget::Parent => None,
        }
    }

    fn has_value(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// A condition is complete once every part its variant needs is present
    pub fn is_complete(&self) -> bool {
        match &self.target {
            ConditionTarget::Parent => !self.field.is_empty() && self.has_value(),
            ConditionTarget::Child(t) => {
                !t.relationship_name.is_empty() && !t.child_field_name.is_empty() && self.has_value()
            }
        }
    }

    /// Render the condition as a WHERE fragment
    pub fn render(&self) -> Result<String> {
        if !self.is_complete() {
            return Err(CoreError::IncompleteCondition(self.describe()));
        }
        let value = self.value.as_deref().unwrap_or_default();

        match &self.target {
            ConditionTarget::Child(t) => Ok(format!("{} = {}", t.child_field_name, quote(value))),
            ConditionTarget::Parent => {
                if self.operator == Operator::Child {
                    return Err(CoreError::InvalidOperator(
                        "Child operator on a parent condition".to_string(),
                    ));
                }
                Ok(format!("{} {} {}", self.field, self.operator.soql(), self.render_value(value)))
            }
        }
    }

    fn render_value(&self, value: &str) -> String {
        match self.operator {
            Operator::Contains => quote(&format!("%{}%", value)),
            Operator::StartsWith => quote(&format!("{}%", value)),
            Operator::EndsWith => quote(&format!("%{}", value)),
            Operator::In | Operator::NotIn => {
                let items: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| self.literal(v))
                    .collect();
                format!("({})", items.join(", "))
            }
            _ => self.literal(value),
        }
    }

    /// `null` in any case is the null literal; a value wrapped in single
    /// quotes is always text, so `'null'` compares against the word itself
    fn literal(&self, value: &str) -> String {
        if value.eq_ignore_ascii_case("null") {
            return "null".to_string();
        }
        if let Some(text) = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
        {
            return quote(text);
        }
        let quoted = match self.data_type.as_deref() {
            Some(dt) => QUOTED_TYPES.contains(&dt.to_lowercase().as_str()),
            None => true,
        };
        if quoted {
            quote(value)
        } else {
            value.to_string()
        }
    }

    fn describe(&self) -> String {
        match &self.target {
            ConditionTarget::Parent => format!("parent condition on '{}'", self.field),
            ConditionTarget::Child(t) => format!(
                "child condition on '{}.{}'",
                t.relationship_name, t.child_field_name
            ),
        }
    }
}

/// Quote a string literal, escaping backslashes and single quotes
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

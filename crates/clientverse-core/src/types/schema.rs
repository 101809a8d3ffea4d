//! Object schema descriptors
//!
//! Mirrors the shape returned by the object metadata service:
//! `{ apiName, fields: { <apiName>: { label, apiName, dataType, ... } } }`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A field of an object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// API name, e.g. `AccountId`
    pub api_name: String,

    /// Display label
    pub label: String,

    /// Data type, e.g. `String`, `Reference`, `Date`
    pub data_type: String,

    /// Relationship name for reference fields, e.g. `Account`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_name: Option<String>,

    /// Object type the reference points to, e.g. `Account`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,
}

impl FieldDescriptor {
    /// Create a plain (non-reference) field
    pub fn new(api_name: impl Into<String>, label: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            label: label.into(),
            data_type: data_type.into(),
            relationship_name: None,
            reference_to: None,
        }
    }

    /// Mark the field as a reference traversable through `relationship_name`
    pub fn with_reference(mut self, relationship_name: impl Into<String>, reference_to: impl Into<String>) -> Self {
        self.relationship_name = Some(relationship_name.into());
        self.reference_to = Some(reference_to.into());
        self
    }
}

/// Schema of one object type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub api_name: String,
    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl ObjectInfo {
    pub fn new(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field keyed by its API name
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.api_name.clone(), field);
        self
    }

    pub fn field(&self, api_name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(api_name)
    }

    /// Selectable options sorted by label
    ///
    /// Every field yields a leaf option. Reference fields with a relationship
    /// name additionally yield a relationship-root option which can be
    /// browsed into but is not itself selectable.
    pub fn field_options(&self) -> Vec<FieldOption> {
        let mut options = Vec::with_capacity(self.fields.len());

        for field in self.fields.values() {
            options.push(FieldOption {
                label: field.label.clone(),
                value: field.api_name.clone(),
                data_type: field.data_type.clone(),
                is_sobject: false,
                object_type: None,
            });

            if let (Some(rel), Some(target)) = (&field.relationship_name, &field.reference_to) {
                options.push(FieldOption {
                    label: format!("{} >", rel),
                    value: rel.clone(),
                    data_type: target.clone(),
                    is_sobject: true,
                    object_type: Some(target.clone()),
                });
            }
        }

        sort_by_label(&mut options);
        options
    }
}

/// An option offered by field pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub label: String,
    pub value: String,
    pub data_type: String,
    /// Relationship root rather than a leaf field
    #[serde(default)]
    pub is_sobject: bool,
    /// Object type reached through the relationship root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

impl FieldOption {
    pub fn leaf(label: impl Into<String>, value: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            data_type: data_type.into(),
            is_sobject: false,
            object_type: None,
        }
    }
}

/// Sort options by label (stable, byte order)
pub fn sort_by_label(options: &mut [FieldOption]) {
    options.sort_by(|a, b| a.label.cmp(&b.label));
}

/// A queryable object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectOption {
    pub label: String,
    pub value: String,
}

impl ObjectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A child relationship of a parent object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRelationship {
    /// Relationship name used in subqueries, e.g. `Contacts`
    #[serde(default)]
    pub relationship_name: String,
    /// Child object type, e.g. `Contact`
    pub child_object: String,
    /// Fields of the child object
    #[serde(default)]
    pub fields: Vec<FieldOption>,
}

impl ChildRelationship {
    /// Display label, e.g. `Contacts (Contact)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.relationship_name, self.child_object)
    }
}

//! A single editable condition
//!
//! A line is either a parent condition (`field operator value` on the
//! selected object) or, when its operation is [`Operator::Child`], a child
//! condition on one of the object's child relationships. A line reports
//! itself to its owner only once it is complete.

use crate::config::FieldTypeSettings;
use crate::error::Result;
use crate::events::{ChildWhereInfo, ConditionLineEvent, ConditionPayload};
use crate::services::SchemaService;
use clientverse_core::{
    filter_operators, ChildRelationship, ChildTarget, Condition, FieldOption, Operator, OperatorOption,
};
use serde::Serialize;

/// Condition line state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionLine {
    id: String,
    index: usize,
    field_name: Option<String>,
    field_type: Option<String>,
    object_type: Option<String>,
    operation: Option<Operator>,
    value: Option<String>,
    child_relationships: Vec<ChildRelationship>,
    selected_child_relationship: Option<String>,
    child_fields: Vec<FieldOption>,
    selected_child_field: Option<String>,
    disabled: bool,
    prevent_errors: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ConditionLine {
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
            ..Self::default()
        }
    }

    /// Suppress missing-value highlighting until the user edits the line
    pub fn with_prevent_errors(mut self, prevent_errors: bool) -> Self {
        self.prevent_errors = prevent_errors;
        self
    }

    /// Object whose child relationships the line offers
    pub fn with_object_type(mut self, object_type: Option<String>) -> Self {
        self.object_type = object_type;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    pub fn field_type(&self) -> Option<&str> {
        self.field_type.as_deref()
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    pub fn operation(&self) -> Option<Operator> {
        self.operation
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn child_relationships(&self) -> &[ChildRelationship] {
        &self.child_relationships
    }

    pub fn child_fields(&self) -> &[FieldOption] {
        &self.child_fields
    }

    pub fn selected_child_relationship(&self) -> Option<&str> {
        self.selected_child_relationship.as_deref()
    }

    pub fn selected_child_field(&self) -> Option<&str> {
        self.selected_child_field.as_deref()
    }

    /// Returns true if the line targets a child relationship
    pub fn is_child(&self) -> bool {
        self.operation == Some(Operator::Child)
    }

    /// 1-based position shown to the user and used by custom logic
    pub fn condition_index(&self) -> usize {
        self.index + 1
    }

    /// Operation and value inputs are locked until a field is chosen
    pub fn is_disabled(&self) -> bool {
        self.disabled || self.field_name.is_none()
    }

    /// The last remaining line cannot be removed
    pub fn prevent_removal(condition_count: usize) -> bool {
        condition_count <= 1
    }

    /// A field is chosen but the value is still missing
    pub fn needs_value(&self) -> bool {
        !self.prevent_errors && self.field_type.is_some() && self.value.is_none()
    }

    /// Operators applicable to the chosen field's data type
    pub fn available_operations<'a>(&self, catalog: &'a [OperatorOption]) -> Vec<&'a OperatorOption> {
        filter_operators(catalog, self.field_type.as_deref())
    }

    /// Input widget type for the chosen field's data type
    pub fn input_type<'a>(&self, settings: &'a FieldTypeSettings) -> Option<&'a str> {
        settings.input_type(self.field_type.as_deref()?)
    }

    /// Offer child relationships; unnamed relationships cannot be queried
    pub fn set_child_relationships(&mut self, relationships: Vec<ChildRelationship>) {
        self.child_relationships = relationships
            .into_iter()
            .filter(|r| !r.relationship_name.is_empty())
            .collect();
    }

    /// Fetch child relationships of the line's object type
    pub async fn refresh_child_relationships(&mut self, service: &dyn SchemaService) -> Result<()> {
        let Some(object_type) = self.object_type.clone() else {
            return Ok(());
        };
        match service.get_child_relationships(&object_type).await {
            Ok(relationships) => {
                self.set_child_relationships(relationships);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load child relationships of {}: {}", object_type, e);
                Err(e.into())
            }
        }
    }

    /// A field was chosen in the field picker
    ///
    /// `display_type` is the data type of the chosen option; for a
    /// relationship root it is also the object type reached.
    pub fn handle_field_changed(
        &mut self,
        new_value: Option<String>,
        display_type: Option<String>,
        is_sobject: bool,
    ) -> Option<ConditionLineEvent> {
        self.field_name = non_empty(new_value);
        if let Some(display_type) = non_empty(display_type) {
            if is_sobject {
                self.object_type = Some(display_type.clone());
            }
            self.field_type = Some(display_type);
        }
        if self.field_name.is_none() {
            self.value = None;
            self.field_type = None;
        }
        self.notify()
    }

    pub fn handle_operation_changed(&mut self, operation: Option<Operator>) -> Option<ConditionLineEvent> {
        self.operation = operation;
        self.notify()
    }

    pub fn handle_value_changed(&mut self, value: Option<String>) -> Option<ConditionLineEvent> {
        self.value = non_empty(value);
        self.prevent_errors = false;
        self.notify()
    }

    /// Select a child relationship; its fields become choosable
    pub fn handle_child_relationship_changed(&mut self, relationship_name: Option<String>) {
        let selected = relationship_name.and_then(|name| {
            self.child_relationships
                .iter()
                .find(|r| r.relationship_name == name)
        });

        self.selected_child_relationship = selected.map(|r| r.relationship_name.clone());
        self.child_fields = selected.map(|r| r.fields.clone()).unwrap_or_default();
        self.selected_child_field = None;
    }

    pub fn handle_child_field_changed(&mut self, field: Option<String>) -> Option<ConditionLineEvent> {
        self.selected_child_field = non_empty(field);
        self.notify()
    }

    pub fn handle_remove(&self) -> ConditionLineEvent {
        ConditionLineEvent::Removed { id: self.id.clone() }
    }

    fn notify(&self) -> Option<ConditionLineEvent> {
        let payload = if self.is_child() {
            ConditionPayload::Child(self.child_where_info()?)
        } else {
            ConditionPayload::Parent {
                field_name: self.field_name.clone()?,
                data_type: self.field_type.clone(),
                object_type: self.object_type.clone(),
                operation: self.operation?,
                value: self.value.clone()?,
                id: self.id.clone(),
            }
        };
        Some(ConditionLineEvent::Changed(payload))
    }

    fn selected_relationship(&self) -> Option<&ChildRelationship> {
        let name = self.selected_child_relationship.as_deref()?;
        self.child_relationships.iter().find(|r| r.relationship_name == name)
    }

    /// Child payload, once relationship, child field and value are set
    pub fn child_where_info(&self) -> Option<ChildWhereInfo> {
        let relationship = self.selected_relationship()?;
        Some(ChildWhereInfo {
            relationship_name: relationship.relationship_name.clone(),
            child_object: relationship.child_object.clone(),
            field_name: self.selected_child_field.clone()?,
            value: self.value.clone()?,
        })
    }

    /// Condition for a complete line
    pub fn to_condition(&self) -> Option<Condition> {
        if self.is_child() {
            let info = self.child_where_info()?;
            let target = ChildTarget {
                relationship_name: info.relationship_name,
                child_object_type: info.child_object,
                child_field_name: info.field_name,
            };
            return Some(Condition::child(target, info.value));
        }

        Some(Condition::parent(
            self.field_name.clone()?,
            self.operation?,
            self.value.clone()?,
            self.field_type.clone(),
        ))
    }
}

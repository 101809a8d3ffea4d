//! Query builder session
//!
//! The controller behind a query builder screen. It owns the structured
//! query state, keeps the query string in sync with it, and resets the
//! condition editor through a [`ConditionEditor`] handle.
//!
//! Every command either re-derives the query string with
//! [`QueryBuilder::build`] or reparses it with [`QueryParser::parse`]; hosts
//! observe changes through [`QueryBuilderSession::drain_events`].

mod remote;

pub use remote::{Column, Frequency, QueryPreview, SchemaTicket};

use crate::condition_list::{ConditionEditor, ConditionList};
use crate::config::BuilderConfig;
use crate::error::{Result, SdkError};
use crate::events::{FieldSelectorEvent, Notice, SessionEvent, WhereInfo};
use clientverse_builder::{ChildWhereMap, Direction, OrderBy, QueryBuilder, QueryParts};
use clientverse_core::{Condition, ChildTarget, FieldOption, ObjectOption, SelectedFields, Toggle};
use clientverse_parser::{ParseError, QueryParser};
use serde::Serialize;

/// Edit of a scalar query setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueChange {
    OrderByField(Option<String>),
    /// `ASC` or `DESC`
    OrderByDirection(Option<String>),
    /// Raw LIMIT text
    Limit(Option<String>),
}

/// A field option together with its selection state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptorView {
    #[serde(flatten)]
    pub option: FieldOption,
    pub selected: bool,
}

/// Query builder controller
pub struct QueryBuilderSession<E: ConditionEditor = ConditionList> {
    config: BuilderConfig,
    editor: E,
    lock_object_type: bool,

    object_type: Option<String>,
    query_string: String,
    selected_fields: SelectedFields,
    where_clause: Option<String>,
    parent_where: Option<String>,
    full_where: Option<String>,
    child_where: ChildWhereMap,
    order_by_field: Option<String>,
    order_by_direction: Option<Direction>,
    limit: Option<String>,
    query_ready: bool,

    field_options: Vec<FieldOption>,
    object_types: Vec<ObjectOption>,
    schema_generation: u64,

    preview: Option<QueryPreview>,
    errors: Vec<String>,
    last_notice: Option<Notice>,
    events: Vec<SessionEvent>,
}

impl QueryBuilderSession<ConditionList> {
    /// Session with the built-in condition editor
    pub fn with_config(config: BuilderConfig) -> Self {
        Self::new(config, ConditionList::new())
    }
}

impl<E: ConditionEditor> QueryBuilderSession<E> {
    pub fn new(config: BuilderConfig, editor: E) -> Self {
        Self {
            config,
            editor,
            lock_object_type: false,
            object_type: None,
            query_string: String::new(),
            selected_fields: SelectedFields::new(),
            where_clause: None,
            parent_where: None,
            full_where: None,
            child_where: ChildWhereMap::new(),
            order_by_field: None,
            order_by_direction: None,
            limit: None,
            query_ready: false,
            field_options: Vec::new(),
            object_types: Vec::new(),
            schema_generation: 0,
            preview: None,
            errors: Vec::new(),
            last_notice: None,
            events: Vec::new(),
        }
    }

    /// Prevent the user from changing the object type once it is set
    pub fn lock_object_type(mut self, locked: bool) -> Self {
        self.lock_object_type = locked;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn selected_fields(&self) -> &SelectedFields {
        &self.selected_fields
    }

    /// WHERE body of the last parsed query
    pub fn where_clause(&self) -> Option<&str> {
        self.where_clause.as_deref()
    }

    pub fn parent_where(&self) -> Option<&str> {
        self.parent_where.as_deref()
    }

    pub fn full_where(&self) -> Option<&str> {
        self.full_where.as_deref()
    }

    pub fn child_where(&self) -> &ChildWhereMap {
        &self.child_where
    }

    pub fn order_by_field(&self) -> Option<&str> {
        self.order_by_field.as_deref()
    }

    pub fn order_by_direction(&self) -> Option<Direction> {
        self.order_by_direction
    }

    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    /// A complete query has been built at least once
    pub fn query_ready(&self) -> bool {
        self.query_ready
    }

    pub fn field_options(&self) -> &[FieldOption] {
        &self.field_options
    }

    pub fn object_types(&self) -> &[ObjectOption] {
        &self.object_types
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SessionEvent) {
        tracing::debug!("Session event: {:?}", event);
        self.events.push(event);
    }

    fn emit_query_changed(&mut self) {
        let query = self.query_string.clone();
        self.emit(SessionEvent::QueryChanged(query));
    }

    fn notify(&mut self, notice: Notice) {
        self.last_notice = Some(notice.clone());
        self.emit(SessionEvent::Notice(notice));
    }

    /// Set the object type from the host
    ///
    /// Once set, a locked object type cannot change; a different value is
    /// recorded as an error instead.
    pub fn set_object_type(&mut self, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        if self.object_type.is_none() || !self.lock_object_type {
            self.assign_object_type(value);
        } else if self.object_type != value {
            tracing::warn!(
                "Ignored object type {:?}: locked to {:?}",
                value,
                self.object_type
            );
            self.errors.push(self.config.labels.incompatible_object.clone());
        }
    }

    fn assign_object_type(&mut self, value: Option<String>) {
        if self.object_type != value {
            tracing::info!("Object type changed from {:?} to {:?}", self.object_type, value);
            self.object_type = value;
            self.editor.set_object_type(self.object_type.clone());
            self.child_where.clear();
            self.field_options.clear();
            self.schema_generation += 1;
        }
    }

    /// Set the query string from the host; same as [`Self::parse_query`]
    pub fn set_query_string(&mut self, value: Option<&str>) -> Result<()> {
        self.parse_query(value)
    }

    /// Replace the structured state with the parts of `value`
    ///
    /// Empty input clears everything and leaves one blank condition. On
    /// error the previous state is kept and the error is recorded.
    pub fn parse_query(&mut self, value: Option<&str>) -> Result<()> {
        let raw = value.unwrap_or_default();
        let locked = if self.lock_object_type {
            self.object_type.as_deref()
        } else {
            None
        };

        let parsed = match QueryParser::parse(Some(raw), locked) {
            Ok(parsed) => parsed,
            Err(e) => {
                let message = match &e {
                    ParseError::SchemaConflict { .. } => self.config.labels.incompatible_object.clone(),
                    other => other.to_string(),
                };
                tracing::warn!("Rejected query string: {}", e);
                self.errors.push(message);
                return Err(e.into());
            }
        };

        if raw.is_empty() {
            self.reset_state();
            self.editor.add_empty_condition(true);
            self.emit_query_changed();
            return Ok(());
        }

        self.query_string = raw.to_string();
        if parsed.object_type.is_some() {
            self.assign_object_type(parsed.object_type);
        }
        self.selected_fields = SelectedFields::from_parsed(parsed.selected_fields);
        self.child_where = ChildWhereMap::from(parsed.child_where);
        self.full_where = parsed.where_clause.clone();
        self.parent_where = None;
        self.where_clause = parsed.where_clause;
        self.order_by_field = parsed.order_by_field;
        self.order_by_direction = parsed
            .order_by_direction
            .as_deref()
            .and_then(|d| d.parse().ok());
        self.limit = parsed.limit;

        if parsed.reset_conditions {
            self.editor.clear_conditions();
            self.editor.add_empty_condition(true);
        }

        self.emit_query_changed();
        Ok(())
    }

    /// Structured state as builder input
    pub fn parts(&self) -> QueryParts {
        let order_by = self
            .order_by_field
            .as_deref()
            .filter(|f| !f.is_empty())
            .and_then(|field| {
                OrderBy::new(field, Some(self.order_by_direction.unwrap_or(self.config.default_direction))).ok()
            });

        QueryParts {
            object_type: self.object_type.clone(),
            selected_fields: self.selected_fields.clone(),
            parent_where: self.parent_where.clone(),
            full_where: self.full_where.clone(),
            child_where: self.child_where.clone(),
            order_by,
            limit: self.limit.clone(),
        }
    }

    /// Rebuild the query string
    ///
    /// Without an object type or a selected field nothing is built and the
    /// query string is left as is.
    pub fn build_query(&mut self) -> Option<String> {
        let query = QueryBuilder::build(&self.parts())?;
        self.query_string = query.clone();
        self.query_ready = true;
        self.emit_query_changed();
        Some(query)
    }

    fn reset_state(&mut self) {
        self.selected_fields.clear();
        self.where_clause = None;
        self.parent_where = None;
        self.full_where = None;
        self.child_where.clear();
        self.query_string.clear();
        self.limit = None;
        self.order_by_field = None;
        self.order_by_direction = None;
        self.editor.clear_conditions();
    }

    /// Clear selection, filters, ordering and limit
    pub fn clear_selected_values(&mut self) {
        self.reset_state();
        self.emit_query_changed();
    }

    /// The user picked a different object type
    pub fn handle_object_type_change(&mut self, value: Option<String>) -> Result<()> {
        let value = value.filter(|v| !v.is_empty());
        if self.lock_object_type && self.object_type.is_some() && self.object_type != value {
            self.errors.push(self.config.labels.incompatible_object.clone());
            return Err(SdkError::Validation(self.config.labels.incompatible_object.clone()));
        }
        self.assign_object_type(value);
        self.clear_selected_values();
        self.editor.add_empty_condition(true);
        Ok(())
    }

    /// The condition editor reported a change
    pub fn handle_condition_changed(&mut self, info: WhereInfo) -> Result<Option<String>> {
        match info {
            WhereInfo::Child(child) => {
                let condition = Condition::child(
                    ChildTarget {
                        relationship_name: child.relationship_name,
                        child_object_type: child.child_object,
                        child_field_name: child.field_name,
                    },
                    child.value,
                );
                self.child_where.push_condition(&condition)?;
            }
            WhereInfo::Parent {
                parent_where,
                full_where,
            } => {
                self.parent_where = parent_where;
                self.full_where = full_where;
            }
        }
        Ok(self.build_query())
    }

    /// A field was chosen in the field selector
    ///
    /// Relationship roots are not selectable. Picking a field that is
    /// already selected highlights it instead of removing it.
    pub fn handle_field_selected(&mut self, field: &str) -> Option<String> {
        let is_root = self
            .field_options
            .iter()
            .any(|o| o.value == field && o.is_sobject);
        if is_root && !field.contains('.') {
            tracing::debug!("Ignored relationship root {}", field);
            return None;
        }

        if self.selected_fields.toggle(field, true) == Toggle::Persisted {
            self.emit(SessionEvent::FieldHighlighted(field.to_string()));
        }
        self.build_query()
    }

    /// Deselect every field
    pub fn handle_remove_all(&mut self) {
        self.selected_fields.clear();
        self.child_where.clear();
        self.query_string.clear();
        self.emit_query_changed();
    }

    /// Select every leaf field of the object
    pub fn handle_add_all(&mut self) -> Option<String> {
        self.selected_fields = self
            .field_options
            .iter()
            .filter(|o| !o.is_sobject)
            .map(|o| o.value.as_str())
            .collect();
        self.build_query()
    }

    /// Remove a field from the selection
    pub fn handle_field_remove(&mut self, field: &str) -> Option<String> {
        self.selected_fields.toggle(field, false);
        if self.selected_fields.is_empty() {
            self.child_where.clear();
            self.query_string.clear();
            self.emit_query_changed();
            return None;
        }
        self.build_query()
    }

    /// Route a field selector event
    pub fn handle_field_selector_event(&mut self, event: FieldSelectorEvent) -> Option<String> {
        match event {
            FieldSelectorEvent::FieldSelected(field) => self.handle_field_selected(&field),
            FieldSelectorEvent::RemoveAll => {
                self.handle_remove_all();
                None
            }
            FieldSelectorEvent::AddAll => self.handle_add_all(),
        }
    }

    /// Change ORDER BY or LIMIT
    pub fn handle_value_changed(&mut self, change: ValueChange) -> Result<Option<String>> {
        match change {
            ValueChange::OrderByField(field) => {
                self.order_by_field = field.filter(|f| !f.is_empty());
            }
            ValueChange::OrderByDirection(direction) => {
                self.order_by_direction = direction
                    .filter(|d| !d.is_empty())
                    .map(|d| d.parse::<Direction>())
                    .transpose()?;
            }
            ValueChange::Limit(limit) => {
                self.limit = limit.filter(|l| !l.is_empty());
            }
        }
        Ok(self.build_query())
    }

    /// Field options with their selection flag
    pub fn field_descriptors(&self) -> Vec<FieldDescriptorView> {
        self.field_options
            .iter()
            .map(|option| FieldDescriptorView {
                option: option.clone(),
                selected: self.selected_fields.contains(&option.value),
            })
            .collect()
    }

    /// Field options preceded by an empty `--NONE--` entry
    pub fn field_options_with_none(&self) -> Vec<FieldOption> {
        let mut options = Vec::with_capacity(self.field_options.len() + 1);
        options.push(FieldOption::leaf("--NONE--", "", ""));
        options.extend(self.field_options.iter().cloned());
        options
    }

    fn missing_prerequisite(&self) -> bool {
        self.object_type.is_none() && self.query_string.is_empty() && self.lock_object_type
    }

    /// Accumulated errors, one per line, plus the missing-object message
    pub fn error_message(&self) -> String {
        let mut message = self.errors.join("\n");
        if self.missing_prerequisite() {
            message.push_str(&self.config.labels.lock_object_but_no_soql_no_object);
        }
        message
    }

    /// Fail when the session can never produce a query
    pub fn ensure_ready(&self) -> Result<()> {
        if self.missing_prerequisite() {
            return Err(SdkError::MissingPrerequisite(
                self.config.labels.lock_object_but_no_soql_no_object.clone(),
            ));
        }
        Ok(())
    }

    /// Ordering and limit inputs are disabled until a field is selected
    pub fn is_rhs_disabled(&self) -> bool {
        self.selected_fields.is_empty()
    }

    pub fn condition_builder_disabled(&self) -> bool {
        self.object_type.is_none()
    }
}

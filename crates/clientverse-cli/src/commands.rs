//! Command implementations
//!
//! Each command drives the same controllers a query builder screen uses and
//! returns its output as a value; printing is left to `main`.

use crate::error::{CliError, Result};
use clientverse_sdk::{
    BuilderConfig, ChildRelationship, ChildWhereInfo, FieldOption, FieldSelector, InMemorySchema,
    ObjectInfo, ParsedQuery, QueryBuilderSession, QueryParser, ValueChange, WhereInfo,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Inputs of the `build` command
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub object_type: String,
    pub fields: Vec<String>,
    pub parent_where: Option<String>,
    pub full_where: Option<String>,
    /// `Relationship.Field=value` entries
    pub child_where: Vec<String>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
    pub limit: Option<String>,
}

/// Split a query into its parts
pub fn parse(query: &str, locked_object_type: Option<&str>) -> Result<ParsedQuery> {
    QueryParser::parse(Some(query), locked_object_type).map_err(|e| CliError::Parse(e.to_string()))
}

/// Parse `Relationship.Field=value`
pub fn parse_child_where(raw: &str) -> Result<ChildWhereInfo> {
    let invalid = || CliError::InvalidArgument(format!("expected Relationship.Field=value, got '{}'", raw));

    let (path, value) = raw.split_once('=').ok_or_else(invalid)?;
    let (relationship, field) = path.trim().split_once('.').ok_or_else(invalid)?;
    if relationship.is_empty() || field.is_empty() {
        return Err(invalid());
    }

    Ok(ChildWhereInfo {
        relationship_name: relationship.to_string(),
        child_object: relationship.to_string(),
        field_name: field.to_string(),
        value: value.trim().to_string(),
    })
}

/// Build a query from its parts
pub fn build(config: BuilderConfig, args: &BuildArgs) -> Result<String> {
    let mut session = QueryBuilderSession::with_config(config);
    session.set_object_type(Some(args.object_type.clone()));

    for field in &args.fields {
        session.handle_field_selected(field);
    }

    if args.parent_where.is_some() || args.full_where.is_some() {
        session.handle_condition_changed(WhereInfo::Parent {
            parent_where: args.parent_where.clone(),
            full_where: args.full_where.clone(),
        })?;
    }

    for raw in &args.child_where {
        session.handle_condition_changed(WhereInfo::Child(parse_child_where(raw)?))?;
    }

    if args.order_by.is_some() {
        session.handle_value_changed(ValueChange::OrderByField(args.order_by.clone()))?;
    }
    if args.direction.is_some() {
        session.handle_value_changed(ValueChange::OrderByDirection(args.direction.clone()))?;
    }
    if args.limit.is_some() {
        session.handle_value_changed(ValueChange::Limit(args.limit.clone()))?;
    }

    for event in session.drain_events() {
        tracing::debug!("{:?}", event);
    }

    session
        .build_query()
        .ok_or_else(|| CliError::Build("no object type or fields selected".to_string()))
}

/// Parse a query and build it again from the parsed parts
pub fn roundtrip(config: BuilderConfig, query: &str) -> Result<String> {
    let mut session = QueryBuilderSession::with_config(config);
    session.parse_query(Some(query))?;
    session
        .build_query()
        .ok_or_else(|| CliError::Build(format!("'{}' has no object type or fields", query)))
}

/// Schema file: object descriptors plus child relationships per parent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFile {
    pub objects: Vec<ObjectInfo>,
    #[serde(default)]
    pub child_relationships: BTreeMap<String, Vec<ChildRelationship>>,
}

impl SchemaFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_schema(self) -> InMemorySchema {
        let mut schema = InMemorySchema::new();
        for info in self.objects {
            let label = info.api_name.clone();
            schema = schema.with_object(label, info);
        }
        for (parent, relationships) in self.child_relationships {
            schema = schema.with_child_relationships(parent, relationships);
        }
        schema
    }
}

/// Field options of an object, following a relationship path such as
/// `["Account", "Owner"]`
pub async fn fields(schema: &InMemorySchema, object_type: &str, path: &[String]) -> Result<Vec<FieldOption>> {
    let mut selector = FieldSelector::new();
    selector.set_object_type(Some(object_type.to_string()));
    selector.refresh_options(schema).await?;

    for segment in path {
        let target = selector
            .options()
            .iter()
            .find(|o| o.is_sobject && o.value == *segment)
            .and_then(|o| o.object_type.clone())
            .ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "'{}' is not a relationship of {}",
                    segment,
                    selector.browsed_object_type().unwrap_or(object_type)
                ))
            })?;
        selector.open_object(segment, target);
        selector.refresh_options(schema).await?;
    }

    if let Some(path) = selector.formatted_path() {
        tracing::info!("Listing fields of {}", path);
    }
    Ok(selector.options().to_vec())
}

//! Query builder
//!
//! Recomposes structured query state into a single query string.
//! The output is always a pure function of [`QueryParts`].

use crate::aggregator::{partition_fields, render_subquery, ChildWhereMap};
use crate::error::{BuildError, Result};
use clientverse_core::SelectedFields;
use clientverse_parser::ParsedQuery;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            other => Err(BuildError::InvalidDirection(other.to_string())),
        }
    }
}

/// ORDER BY clause; the direction always renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderBy {
    /// Create an ORDER BY, rejecting an empty field
    pub fn new(field: impl Into<String>, direction: Option<Direction>) -> Result<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(BuildError::EmptyOrderByField);
        }
        Ok(Self {
            field,
            direction: direction.unwrap_or_default(),
        })
    }

    /// Create from raw field and direction text
    ///
    /// A missing direction defaults to `ASC`; an unknown one is an error.
    pub fn parse(field: &str, direction: Option<&str>) -> Result<Self> {
        let direction = direction
            .filter(|d| !d.is_empty())
            .map(Direction::from_str)
            .transpose()?;
        Self::new(field, direction)
    }
}

/// Everything the query string is derived from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParts {
    pub object_type: Option<String>,
    pub selected_fields: SelectedFields,
    /// WHERE body built from parent conditions joined with AND
    pub parent_where: Option<String>,
    /// WHERE body built from custom condition logic; dominates `parent_where`
    pub full_where: Option<String>,
    pub child_where: ChildWhereMap,
    pub order_by: Option<OrderBy>,
    /// Raw LIMIT text
    pub limit: Option<String>,
}

impl QueryParts {
    /// Seed parts from parser output
    ///
    /// The parsed WHERE body becomes `full_where`. An ORDER BY without a
    /// recognised direction defaults to `ASC`.
    pub fn from_parsed(parsed: ParsedQuery) -> Self {
        let order_by = parsed
            .order_by_field
            .as_deref()
            .and_then(|field| OrderBy::parse(field, parsed.order_by_direction.as_deref()).ok());

        Self {
            object_type: parsed.object_type,
            selected_fields: SelectedFields::from_parsed(parsed.selected_fields),
            parent_where: None,
            full_where: parsed.where_clause,
            child_where: ChildWhereMap::from(parsed.child_where),
            order_by,
            limit: parsed.limit,
        }
    }

    /// WHERE body that will be rendered, applying the dominance rule
    pub fn effective_where(&self) -> Option<&str> {
        let full = self.full_where.as_deref().filter(|w| !w.is_empty());
        let parent = self.parent_where.as_deref().filter(|w| !w.is_empty());
        full.or(parent)
    }
}

/// Query builder
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build the query string
    ///
    /// Returns `None` when no object type is set or no field is selected;
    /// a partial query is never produced.
    pub fn build(parts: &QueryParts) -> Option<String> {
        let object_type = parts.object_type.as_deref().filter(|o| !o.is_empty())?;
        if parts.selected_fields.is_empty() {
            return None;
        }

        let partition = partition_fields(&parts.selected_fields);

        let mut select_parts = partition.parent;
        for (relationship, fields) in &partition.children {
            select_parts.push(render_subquery(
                relationship,
                fields,
                parts.child_where.get(relationship),
            ));
        }

        let mut query = format!("SELECT {} FROM {}", select_parts.join(", "), object_type);

        if let Some(clause) = parts.effective_where() {
            query.push_str(" WHERE ");
            query.push_str(clause);
        }

        if let Some(order_by) = parts.order_by.as_ref().filter(|o| !o.field.is_empty()) {
            query.push_str(&format!(" ORDER BY {} {}", order_by.field, order_by.direction));
        }

        if let Some(limit) = parts.limit.as_deref().filter(|l| !l.is_empty()) {
            query.push_str(" LIMIT ");
            query.push_str(limit);
        }

        tracing::debug!("Built query: {}", query);
        Some(query)
    }
}

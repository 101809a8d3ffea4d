//! Query parser
//!
//! Decomposes a flat query string into its structured parts:
//!
//! ```text
//! SELECT <fields> FROM <object> [WHERE <conditions>] [ORDER BY <field> [ASC|DESC]] [LIMIT <n>]
//! ```
//!
//! Child subqueries in the field list, as produced by the builder, are
//! expanded back into `Relationship.Field` entries and their WHERE fragments.

use crate::error::{ParseError, Result};
use crate::lexer::{lex, split_top_level, Keyword, Tokens};
use serde::{Deserialize, Serialize};

/// WHERE fragments recovered from one child subquery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildClause {
    pub relationship_name: String,
    pub fragments: Vec<String>,
}

/// Structured form of a query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub object_type: Option<String>,

    /// Field list split on top-level commas and trimmed; empty entries kept
    pub selected_fields: Vec<String>,

    /// WHERE fragments of embedded child subqueries, in order of appearance
    pub child_where: Vec<ChildClause>,

    /// Raw WHERE body, `None` when the query has no WHERE clause
    pub where_clause: Option<String>,

    pub order_by_field: Option<String>,

    /// `ASC` or `DESC`; anything else is dropped
    pub order_by_direction: Option<String>,

    /// Raw LIMIT text, not validated as a number
    pub limit: Option<String>,

    /// The condition editor should be reset to a single blank condition
    pub reset_conditions: bool,
}

impl ParsedQuery {
    /// The all-clear state produced by empty input
    pub fn empty() -> Self {
        Self {
            reset_conditions: true,
            ..Self::default()
        }
    }

    /// Returns true if nothing was selected or filtered
    pub fn is_empty(&self) -> bool {
        self.object_type.is_none()
            && self.selected_fields.is_empty()
            && self.where_clause.is_none()
            && self.order_by_field.is_none()
            && self.limit.is_none()
    }
}

/// Query parser
pub struct QueryParser;

impl QueryParser {
    /// Parse a query string
    ///
    /// `locked_object_type`, when given, must match the object type named
    /// after ` FROM `; a mismatch fails with [`ParseError::SchemaConflict`]
    /// before any dependent part is produced.
    pub fn parse(raw: Option<&str>, locked_object_type: Option<&str>) -> Result<ParsedQuery> {
        let input = match raw {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(ParsedQuery::empty()),
        };

        let tokens = lex(input)?;
        let mut parsed = ParsedQuery::default();

        if let Some(from) = tokens.clause(input, Keyword::From) {
            let object_type = from.trim();
            if !object_type.is_empty() {
                if let Some(locked) = locked_object_type {
                    if locked != object_type {
                        tracing::warn!(
                            "Rejected query for '{}': object type is locked to '{}'",
                            object_type,
                            locked
                        );
                        return Err(ParseError::SchemaConflict {
                            expected: locked.to_string(),
                            found: object_type.to_string(),
                        });
                    }
                }
                parsed.object_type = Some(object_type.to_string());
            }
        }

        if let Some(select) = tokens.clause(input, Keyword::Select) {
            if !tokens.contains(Keyword::From) {
                return Err(ParseError::MissingKeyword(Keyword::From.name().to_string()));
            }
            Self::parse_field_list(select, &mut parsed)?;
        }

        match tokens.clause(input, Keyword::Where) {
            Some(body) => parsed.where_clause = Some(body.to_string()),
            None => parsed.reset_conditions = true,
        }

        if let Some(order_by) = tokens.clause(input, Keyword::OrderBy) {
            let mut parts = order_by.split_whitespace();
            parsed.order_by_field = parts.next().map(str::to_string);
            parsed.order_by_direction = parts
                .next()
                .filter(|d| *d == "ASC" || *d == "DESC")
                .map(str::to_string);
        }

        if let Some(limit) = tokens.clause(input, Keyword::Limit) {
            parsed.limit = Some(limit.trim().to_string());
        }

        tracing::debug!("Parsed query: {:?}", parsed);
        Ok(parsed)
    }

    /// Parse a query that must be non-empty and name its object type
    pub fn parse_strict(raw: &str) -> Result<ParsedQuery> {
        let parsed = Self::parse(Some(raw), None)?;
        if parsed.object_type.is_none() {
            return Err(ParseError::MissingKeyword(Keyword::From.name().to_string()));
        }
        Ok(parsed)
    }

    fn parse_field_list(select: &str, parsed: &mut ParsedQuery) -> Result<()> {
        for entry in split_top_level(select, ',') {
            let entry = entry.trim();

            if entry.starts_with('(') && entry.ends_with(')') {
                let (relationship, fields, fragments) = Self::parse_subquery(entry)?;
                for field in fields {
                    parsed.selected_fields.push(format!("{}.{}", relationship, field));
                }
                if !fragments.is_empty() {
                    match parsed
                        .child_where
                        .iter_mut()
                        .find(|c| c.relationship_name == relationship)
                    {
                        Some(existing) => existing.fragments.extend(fragments),
                        None => parsed.child_where.push(ChildClause {
                            relationship_name: relationship,
                            fragments,
                        }),
                    }
                }
            } else {
                parsed.selected_fields.push(entry.to_string());
            }
        }
        Ok(())
    }

    /// Decompose `(SELECT a, b FROM Rel WHERE x AND y)`
    fn parse_subquery(entry: &str) -> Result<(String, Vec<String>, Vec<String>)> {
        let invalid = || ParseError::InvalidSubquery(entry.to_string());

        let inner = &entry[1..entry.len() - 1];
        let tokens: Tokens = lex(inner).map_err(|_| invalid())?;

        // Child selections carry fields and filters only
        if tokens.contains(Keyword::OrderBy) || tokens.contains(Keyword::Limit) {
            tracing::warn!("Rejected subquery with ORDER BY or LIMIT: {}", entry);
            return Err(invalid());
        }

        let fields = tokens.clause(inner, Keyword::Select).ok_or_else(invalid)?;
        let relationship = tokens
            .clause(inner, Keyword::From)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(invalid)?;

        let fields: Vec<String> = split_top_level(fields, ',')
            .into_iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            return Err(invalid());
        }

        let fragments = tokens
            .clause(inner, Keyword::Where)
            .map(|w| {
                w.split(" AND ")
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok((relationship.to_string(), fields, fragments))
    }
}

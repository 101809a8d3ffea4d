//! Child-relationship aggregation
//!
//! Selected fields that traverse a relationship (`Contacts.Email`) and child
//! conditions are grouped per relationship and rendered as subqueries:
//!
//! ```text
//! (SELECT Email, Phone FROM Contacts WHERE Email = 'x@y.com')
//! ```

use crate::error::Result;
use clientverse_core::{Condition, SelectedFields};
use clientverse_parser::ChildClause;
use serde::{Deserialize, Serialize};

/// Relationship name to rendered WHERE fragments, in insertion order
///
/// Fragments are only ever appended; the map is cleared wholesale when the
/// object type changes or the selection is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildWhereMap {
    entries: Vec<ChildClause>,
}

impl ChildWhereMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rendered fragment for a relationship
    pub fn push(&mut self, relationship: &str, fragment: impl Into<String>) {
        let fragment = fragment.into();
        match self.entries.iter_mut().find(|e| e.relationship_name == relationship) {
            Some(entry) => entry.fragments.push(fragment),
            None => self.entries.push(ChildClause {
                relationship_name: relationship.to_string(),
                fragments: vec![fragment],
            }),
        }
    }

    /// Render and append a child condition
    ///
    /// Parent conditions are ignored; incomplete child conditions are
    /// rejected without touching the map.
    pub fn push_condition(&mut self, condition: &Condition) -> Result<bool> {
        let Some(target) = condition.child_target() else {
            return Ok(false);
        };
        let fragment = condition.render()?;
        self.push(&target.relationship_name, fragment);
        Ok(true)
    }

    /// Fragments recorded for a relationship
    pub fn get(&self, relationship: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.relationship_name == relationship)
            .map(|e| e.fragments.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.relationship_name.as_str(), e.fragments.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Vec<ChildClause>> for ChildWhereMap {
    fn from(clauses: Vec<ChildClause>) -> Self {
        let mut map = Self::new();
        for clause in clauses {
            for fragment in clause.fragments {
                map.push(&clause.relationship_name, fragment);
            }
        }
        map
    }
}

/// Selected fields split into parent fields and per-relationship child fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPartition {
    pub parent: Vec<String>,
    pub children: Vec<(String, Vec<String>)>,
}

/// Partition fields at the first `.`, preserving order within each group
pub fn partition_fields(fields: &SelectedFields) -> FieldPartition {
    let mut partition = FieldPartition::default();

    for field in fields.iter() {
        match field.split_once('.') {
            Some((relationship, child_field)) => {
                match partition.children.iter_mut().find(|(r, _)| r == relationship) {
                    Some((_, list)) => list.push(child_field.to_string()),
                    None => partition
                        .children
                        .push((relationship.to_string(), vec![child_field.to_string()])),
                }
            }
            None => partition.parent.push(field.to_string()),
        }
    }

    partition
}

/// Render one child subquery; WHERE is omitted when there are no fragments
pub fn render_subquery(relationship: &str, fields: &[String], fragments: Option<&[String]>) -> String {
    let filters = match fragments {
        Some(f) if !f.is_empty() => format!(" WHERE {}", f.join(" AND ")),
        _ => String::new(),
    };
    format!("(SELECT {} FROM {}{})", fields.join(", "), relationship, filters)
}

//! Insertion-ordered set of selected field paths
//!
//! Order matters: it drives the generated column order and the display
//! order of the selected-fields panel.

use serde::{Deserialize, Serialize};

/// Result of toggling a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Field was not present and has been appended
    Added,
    /// Field was present and has been removed
    Removed,
    /// Field was present and kept (caller should highlight it)
    Persisted,
    /// Nothing to toggle (empty field name)
    Ignored,
}

/// Selected fields, duplicates ignored on insert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedFields {
    fields: Vec<String>,
}

impl SelectedFields {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed field list
    ///
    /// Parser output may contain empty entries (`SELECT a,,b`). They are kept
    /// so the structured state mirrors the text; only repeats are dropped.
    pub fn from_parsed(fields: Vec<String>) -> Self {
        let mut set = Self::new();
        for field in fields {
            if !set.fields.contains(&field) {
                set.fields.push(field);
            }
        }
        set
    }

    /// Append a field; returns false if it was already present
    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.fields.contains(&field) {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Remove a field; returns false if it was absent
    pub fn remove(&mut self, field: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f != field);
        self.fields.len() != before
    }

    /// Toggle membership
    ///
    /// With `skip_if_persists` an existing field is left in place and
    /// [`Toggle::Persisted`] is returned instead of removing it.
    pub fn toggle(&mut self, field: &str, skip_if_persists: bool) -> Toggle {
        if field.is_empty() {
            return Toggle::Ignored;
        }

        if self.contains(field) {
            if skip_if_persists {
                Toggle::Persisted
            } else {
                self.remove(field);
                Toggle::Removed
            }
        } else {
            self.fields.push(field.to_string());
            Toggle::Added
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl FromIterator<String> for SelectedFields {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for SelectedFields {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

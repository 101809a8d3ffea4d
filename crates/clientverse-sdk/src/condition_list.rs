//! Condition editor
//!
//! Owns the condition lines and turns their events into [`WhereInfo`] for
//! the session. Parent lines are combined into a WHERE body; child lines are
//! forwarded one at a time.
//!
//! Custom logic refers to lines by their 1-based index:
//!
//! ```text
//! 1 AND (2 OR 3)  =>  Name = 'Acme' AND (Amount > 5 OR Industry = 'Tech')
//! ```

use crate::condition_line::ConditionLine;
use crate::events::{ConditionLineEvent, ConditionPayload, WhereInfo};

/// Handle through which the session resets the condition editor
pub trait ConditionEditor {
    /// Remove every condition line
    fn clear_conditions(&mut self);

    /// Append a blank line
    ///
    /// With `prevent_errors` the line does not flag its missing value.
    fn add_empty_condition(&mut self, prevent_errors: bool);

    /// Object type whose child relationships new lines offer
    fn set_object_type(&mut self, object_type: Option<String>);
}

/// Ordered condition lines plus optional custom logic
#[derive(Debug, Clone, Default)]
pub struct ConditionList {
    lines: Vec<ConditionLine>,
    next_id: u64,
    custom_logic: Option<String>,
    object_type: Option<String>,
}

impl ConditionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    pub fn lines(&self) -> &[ConditionLine] {
        &self.lines
    }

    pub fn line(&self, id: &str) -> Option<&ConditionLine> {
        self.lines.iter().find(|l| l.id() == id)
    }

    pub fn line_mut(&mut self, id: &str) -> Option<&mut ConditionLine> {
        self.lines.iter_mut().find(|l| l.id() == id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn custom_logic(&self) -> Option<&str> {
        self.custom_logic.as_deref()
    }

    /// Set custom logic and recompute the WHERE bodies
    pub fn set_custom_logic(&mut self, logic: Option<String>) -> WhereInfo {
        self.custom_logic = logic.filter(|l| !l.trim().is_empty());
        self.where_info()
    }

    /// Apply `edit` to one line and route the event it raises
    ///
    /// Returns `None` when the line is unknown or raised nothing.
    pub fn update_line<F>(&mut self, id: &str, edit: F) -> Option<WhereInfo>
    where
        F: FnOnce(&mut ConditionLine) -> Option<ConditionLineEvent>,
    {
        let event = edit(self.line_mut(id)?)?;
        self.apply(event)
    }

    /// Route a line event
    pub fn apply(&mut self, event: ConditionLineEvent) -> Option<WhereInfo> {
        match event {
            ConditionLineEvent::Changed(ConditionPayload::Child(info)) => Some(WhereInfo::Child(info)),
            ConditionLineEvent::Changed(ConditionPayload::Parent { .. }) => Some(self.where_info()),
            ConditionLineEvent::Removed { id } => {
                if !self.remove(&id) {
                    return None;
                }
                Some(self.where_info())
            }
        }
    }

    /// Remove a line and re-index the rest; the last line stays
    pub fn remove(&mut self, id: &str) -> bool {
        if ConditionLine::prevent_removal(self.lines.len()) {
            tracing::debug!("Kept condition {}: last remaining line", id);
            return false;
        }
        let before = self.lines.len();
        self.lines.retain(|l| l.id() != id);
        if self.lines.len() == before {
            return false;
        }
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.set_index(index);
        }
        true
    }

    /// Rendered fragments of complete parent lines, keyed by condition index
    fn parent_fragments(&self) -> Vec<(usize, String)> {
        self.lines
            .iter()
            .filter(|line| !line.is_child())
            .filter_map(|line| {
                let condition = line.to_condition()?;
                match condition.render() {
                    Ok(fragment) => Some((line.condition_index(), fragment)),
                    Err(e) => {
                        tracing::warn!("Skipped condition {}: {}", line.id(), e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Current parent WHERE bodies
    pub fn where_info(&self) -> WhereInfo {
        let fragments = self.parent_fragments();

        let parent_where = if fragments.is_empty() {
            None
        } else {
            Some(
                fragments
                    .iter()
                    .map(|(_, f)| f.as_str())
                    .collect::<Vec<_>>()
                    .join(" AND "),
            )
        };

        let full_where = self
            .custom_logic
            .as_deref()
            .and_then(|logic| substitute_logic(logic, &fragments));

        WhereInfo::Parent {
            parent_where,
            full_where,
        }
    }
}

/// Replace each condition number in `logic` with its fragment
///
/// `None` if the logic references a line that has no complete condition.
fn substitute_logic(logic: &str, fragments: &[(usize, String)]) -> Option<String> {
    let mut out = String::with_capacity(logic.len());
    let mut chars = logic.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !c.is_ascii_digit() {
            out.push(c);
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = i + d.len_utf8();
            chars.next();
        }

        let number: usize = logic[start..end].parse().ok()?;
        match fragments.iter().find(|(index, _)| *index == number) {
            Some((_, fragment)) => out.push_str(fragment),
            None => {
                tracing::warn!("Custom logic '{}' references incomplete condition {}", logic, number);
                return None;
            }
        }
    }

    Some(out)
}

impl ConditionEditor for ConditionList {
    fn clear_conditions(&mut self) {
        self.lines.clear();
        self.custom_logic = None;
    }

    fn add_empty_condition(&mut self, prevent_errors: bool) {
        self.next_id += 1;
        let line = ConditionLine::new(format!("condition-{}", self.next_id), self.lines.len())
            .with_prevent_errors(prevent_errors)
            .with_object_type(self.object_type.clone());
        self.lines.push(line);
    }

    fn set_object_type(&mut self, object_type: Option<String>) {
        self.object_type = object_type;
    }
}

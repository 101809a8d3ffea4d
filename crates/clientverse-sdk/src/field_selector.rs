//! Field picker with relationship browsing
//!
//! Opening a relationship root (`Account >`) switches the browsed object
//! and extends the path prefix; selecting a leaf yields the full dotted path
//! and returns to the root object.

use crate::error::Result;
use crate::events::FieldSelectorEvent;
use crate::services::SchemaService;
use clientverse_core::{FieldOption, FieldPath, ObjectInfo};

/// Field selector state
#[derive(Debug, Clone, Default)]
pub struct FieldSelector {
    object_type: Option<String>,
    browsed_object_type: Option<String>,
    selected_path: Option<String>,
    options: Vec<FieldOption>,
}

impl FieldSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root object; browsing restarts from it
    pub fn set_object_type(&mut self, object_type: Option<String>) {
        self.browsed_object_type = object_type.clone();
        self.object_type = object_type;
        self.selected_path = None;
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    /// Object whose fields are currently listed
    pub fn browsed_object_type(&self) -> Option<&str> {
        self.browsed_object_type.as_deref()
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    /// Replace the listed options; an object without fields keeps the old list
    pub fn set_options(&mut self, info: &ObjectInfo) {
        let options = info.field_options();
        if !options.is_empty() {
            self.options = options;
        }
    }

    /// Load options for the browsed object
    pub async fn refresh_options(&mut self, service: &dyn SchemaService) -> Result<()> {
        let Some(object_type) = self.browsed_object_type.clone() else {
            return Ok(());
        };
        match service.get_object_info(&object_type).await {
            Ok(info) => {
                // Browsing may have moved on while the request was in flight
                if self.browsed_object_type.as_deref() == Some(object_type.as_str()) {
                    self.set_options(&info);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load fields of {}: {}", object_type, e);
                Err(e.into())
            }
        }
    }

    /// Browse into a relationship root
    pub fn open_object(&mut self, option_value: &str, object_type: impl Into<String>) {
        self.selected_path = Some(FieldPath::join(self.selected_path.as_deref(), option_value));
        self.browsed_object_type = Some(object_type.into());
    }

    /// Select a leaf; yields its full path and resets browsing
    pub fn select(&mut self, value: &str) -> Option<FieldSelectorEvent> {
        if value.is_empty() {
            return None;
        }
        let full_path = FieldPath::join(self.selected_path.as_deref(), value);
        self.clear_selected();
        Some(FieldSelectorEvent::FieldSelected(full_path))
    }

    pub fn remove_all(&self) -> FieldSelectorEvent {
        FieldSelectorEvent::RemoveAll
    }

    pub fn add_all(&self) -> FieldSelectorEvent {
        FieldSelectorEvent::AddAll
    }

    /// Browsing breadcrumb, e.g. `Account > Owner`
    pub fn formatted_path(&self) -> Option<String> {
        self.selected_path.as_ref().map(|p| p.replace('.', " > "))
    }

    fn clear_selected(&mut self) {
        self.browsed_object_type = self.object_type.clone();
        self.selected_path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientverse_core::FieldDescriptor;

    #[test]
    fn test_select_nested_path_then_reset() {
        let mut selector = FieldSelector::new();
        selector.set_object_type(Some("Contact".to_string()));

        selector.open_object("Account", "Account");
        selector.open_object("Owner", "User");
        assert_eq!(selector.browsed_object_type(), Some("User"));
        assert_eq!(selector.formatted_path().as_deref(), Some("Account > Owner"));

        assert_eq!(
            selector.select("Name"),
            Some(FieldSelectorEvent::FieldSelected("Account.Owner.Name".to_string()))
        );
        assert_eq!(selector.browsed_object_type(), Some("Contact"));
        assert!(selector.formatted_path().is_none());
    }

    #[test]
    fn test_select_empty_value_is_ignored() {
        let mut selector = FieldSelector::new();
        selector.open_object("Account", "Account");
        assert!(selector.select("").is_none());
        assert_eq!(selector.formatted_path().as_deref(), Some("Account"));
    }

    #[test]
    fn test_set_options_keeps_previous_when_empty() {
        let mut selector = FieldSelector::new();
        selector.set_options(&ObjectInfo::new("Lead").with_field(FieldDescriptor::new("Company", "Company", "String")));
        selector.set_options(&ObjectInfo::new("Empty"));
        assert_eq!(selector.options().len(), 1);
    }
}

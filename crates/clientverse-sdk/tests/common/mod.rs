//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use clientverse_sdk::{
    BuilderConfig, ChildRelationship, FieldDescriptor, FieldOption, InMemorySchema, ObjectInfo,
    QueryBuilderSession, Record,
};
use serde_json::json;

/// Account schema with a reference to its owner
pub fn account_info() -> ObjectInfo {
    ObjectInfo::new("Account")
        .with_field(FieldDescriptor::new("Name", "Account Name", "String"))
        .with_field(FieldDescriptor::new("Industry", "Industry", "Picklist"))
        .with_field(FieldDescriptor::new("AnnualRevenue", "Annual Revenue", "Currency"))
        .with_field(FieldDescriptor::new("OwnerId", "Owner ID", "Reference").with_reference("Owner", "User"))
}

pub fn contact_info() -> ObjectInfo {
    ObjectInfo::new("Contact")
        .with_field(FieldDescriptor::new("FirstName", "First Name", "String"))
        .with_field(FieldDescriptor::new("LastName", "Last Name", "String"))
        .with_field(FieldDescriptor::new("Email", "Email", "Email"))
}

pub fn contacts_relationship() -> ChildRelationship {
    ChildRelationship {
        relationship_name: "Contacts".to_string(),
        child_object: "Contact".to_string(),
        fields: vec![
            FieldOption::leaf("Email", "Email", "Email"),
            FieldOption::leaf("Last Name", "LastName", "String"),
        ],
    }
}

/// Schema service knowing Account and Contact
pub fn schema() -> InMemorySchema {
    InMemorySchema::new()
        .with_object("Account", account_info())
        .with_object("Contact", contact_info())
        .with_child_relationships("Account", vec![contacts_relationship()])
}

/// Unlocked session with the default configuration
pub fn session() -> QueryBuilderSession {
    QueryBuilderSession::with_config(BuilderConfig::default())
}

/// Session locked to `object_type`
pub fn locked_session(object_type: &str) -> QueryBuilderSession {
    let mut session = QueryBuilderSession::with_config(BuilderConfig::default()).lock_object_type(true);
    session.set_object_type(Some(object_type.to_string()));
    session
}

/// Contact row as returned by the query service
pub fn contact_row(id: &str, last_name: &str) -> Record {
    let value = json!({ "Id": id, "LastName": last_name });
    match value {
        serde_json::Value::Object(map) => map,
        _ => Record::new(),
    }
}

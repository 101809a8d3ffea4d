//! Query builder session tests
//!
//! Drive the session the way a host screen does: field picks, condition
//! edits, ordering and limits, query text pasted by the user, and remote
//! schema/query calls.

mod common;

use clientverse_sdk::*;
use common::*;

fn query_events(events: &[SessionEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::QueryChanged(q) => Some(q.as_str()),
            _ => None,
        })
        .collect()
}

fn set_parent_line(session: &mut QueryBuilderSession, id: &str, field: &str, op: Operator, value: &str) -> Option<WhereInfo> {
    let editor = session.editor_mut();
    editor.update_line(id, |line| {
        line.handle_field_changed(Some(field.to_string()), Some("String".to_string()), false);
        line.handle_operation_changed(Some(op));
        line.handle_value_changed(Some(value.to_string()))
    })
}

// =============================================================================
// Field selection
// =============================================================================

#[test]
fn test_selecting_fields_builds_query() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));

    assert_eq!(session.handle_field_selected("Name").as_deref(), Some("SELECT Name FROM Account"));
    assert_eq!(
        session.handle_field_selected("Industry").as_deref(),
        Some("SELECT Name, Industry FROM Account")
    );
    assert!(session.query_ready());
    assert!(!session.is_rhs_disabled());

    let events = session.drain_events();
    assert_eq!(
        query_events(&events),
        vec!["SELECT Name FROM Account", "SELECT Name, Industry FROM Account"]
    );
}

#[test]
fn test_reselecting_field_highlights_instead_of_removing() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.handle_field_selected("Industry");
    session.drain_events();

    let query = session.handle_field_selected("Name");

    assert_eq!(query.as_deref(), Some("SELECT Name, Industry FROM Account"));
    assert_eq!(session.selected_fields().as_slice(), &["Name".to_string(), "Industry".to_string()]);
    let events = session.drain_events();
    assert_eq!(events[0], SessionEvent::FieldHighlighted("Name".to_string()));
}

#[test]
fn test_no_query_without_object_type() {
    let mut session = session();
    assert!(session.handle_field_selected("Name").is_none());
    assert!(session.query_string().is_empty());
    assert!(session.condition_builder_disabled());
}

#[test]
fn test_remove_last_field_clears_query() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.drain_events();

    assert!(session.handle_field_remove("Name").is_none());
    assert!(session.query_string().is_empty());
    assert_eq!(session.drain_events(), vec![SessionEvent::QueryChanged(String::new())]);
}

#[test]
fn test_remove_all_clears_query() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.handle_field_selected("Industry");

    session.handle_field_selector_event(FieldSelectorEvent::RemoveAll);

    assert!(session.selected_fields().is_empty());
    assert!(session.query_string().is_empty());
    assert!(session.is_rhs_disabled());
}

#[tokio::test]
async fn test_add_all_skips_relationship_roots() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    assert!(session.refresh_schema(&schema()).await);

    let query = session.handle_field_selector_event(FieldSelectorEvent::AddAll);

    assert_eq!(
        query.as_deref(),
        Some("SELECT Name, AnnualRevenue, Industry, OwnerId FROM Account")
    );
    assert!(!session.selected_fields().contains("Owner"));
}

#[tokio::test]
async fn test_relationship_root_is_not_selectable() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.refresh_schema(&schema()).await;

    assert!(session.handle_field_selected("Owner").is_none());
    assert!(session.selected_fields().is_empty());

    assert!(session.handle_field_selected("Owner.Name").is_some());
    assert!(session.selected_fields().contains("Owner.Name"));
}

#[tokio::test]
async fn test_field_descriptors_flag_selection() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.refresh_schema(&schema()).await;
    session.handle_field_selected("Industry");

    let descriptors = session.field_descriptors();
    let industry = descriptors.iter().find(|d| d.option.value == "Industry").unwrap();
    assert!(industry.selected);
    assert!(descriptors.iter().filter(|d| d.selected).count() == 1);

    let with_none = session.field_options_with_none();
    assert_eq!(with_none[0].label, "--NONE--");
    assert_eq!(with_none.len(), session.field_options().len() + 1);
}

// =============================================================================
// Conditions
// =============================================================================

#[test]
fn test_parent_conditions_flow_into_where() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.editor_mut().add_empty_condition(false);
    session.editor_mut().add_empty_condition(false);

    let info = set_parent_line(&mut session, "condition-1", "Name", Operator::Equals, "Acme").unwrap();
    session.handle_condition_changed(info).unwrap();
    let info = set_parent_line(&mut session, "condition-2", "Industry", Operator::Equals, "Tech").unwrap();
    let query = session.handle_condition_changed(info).unwrap();

    assert_eq!(
        query.as_deref(),
        Some("SELECT Name FROM Account WHERE Name = 'Acme' AND Industry = 'Tech'")
    );
    assert_eq!(session.parent_where(), Some("Name = 'Acme' AND Industry = 'Tech'"));
}

#[test]
fn test_custom_logic_takes_precedence() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.editor_mut().add_empty_condition(false);
    session.editor_mut().add_empty_condition(false);
    set_parent_line(&mut session, "condition-1", "Name", Operator::Equals, "Acme");
    set_parent_line(&mut session, "condition-2", "Industry", Operator::Equals, "Tech");

    let info = session.editor_mut().set_custom_logic(Some("1 OR 2".to_string()));
    let query = session.handle_condition_changed(info).unwrap();

    assert_eq!(
        query.as_deref(),
        Some("SELECT Name FROM Account WHERE Name = 'Acme' OR Industry = 'Tech'")
    );
}

#[test]
fn test_child_line_without_value_raises_nothing() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.editor_mut().add_empty_condition(false);

    let line = session.editor_mut().line_mut("condition-1").unwrap();
    line.set_child_relationships(vec![contacts_relationship()]);
    assert!(line.handle_operation_changed(Some(Operator::Child)).is_none());
    line.handle_child_relationship_changed(Some("Contacts".to_string()));
    assert!(line.handle_child_field_changed(Some("Email".to_string())).is_none());
    assert!(line.child_where_info().is_none());

    assert!(session.child_where().is_empty());
}

#[test]
fn test_child_condition_renders_in_subquery() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.handle_field_selected("Contacts.Email");
    session.editor_mut().add_empty_condition(false);

    let info = session
        .editor_mut()
        .update_line("condition-1", |line| {
            line.set_child_relationships(vec![contacts_relationship()]);
            line.handle_operation_changed(Some(Operator::Child));
            line.handle_child_relationship_changed(Some("Contacts".to_string()));
            line.handle_child_field_changed(Some("Email".to_string()));
            line.handle_value_changed(Some("x@y.com".to_string()))
        })
        .unwrap();
    assert!(matches!(info, WhereInfo::Child(_)));

    let query = session.handle_condition_changed(info).unwrap();
    assert_eq!(
        query.as_deref(),
        Some("SELECT Name, (SELECT Email FROM Contacts WHERE Email = 'x@y.com') FROM Account")
    );
}

fn session_with_child_condition() -> QueryBuilderSession {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");
    session.handle_field_selected("Contacts.Email");
    session.editor_mut().add_empty_condition(false);

    let info = session
        .editor_mut()
        .update_line("condition-1", |line| {
            line.set_child_relationships(vec![contacts_relationship()]);
            line.handle_operation_changed(Some(Operator::Child));
            line.handle_child_relationship_changed(Some("Contacts".to_string()));
            line.handle_child_field_changed(Some("Email".to_string()));
            line.handle_value_changed(Some("old@x.com".to_string()))
        })
        .unwrap();
    session.handle_condition_changed(info).unwrap();
    assert!(!session.child_where().is_empty());
    session
}

#[test]
fn test_remove_all_clears_child_conditions() {
    let mut session = session_with_child_condition();

    session.handle_remove_all();
    assert!(session.child_where().is_empty());

    assert_eq!(
        session.handle_field_selected("Contacts.Email").as_deref(),
        Some("SELECT (SELECT Email FROM Contacts) FROM Account")
    );
}

#[test]
fn test_removing_last_field_clears_child_conditions() {
    let mut session = session_with_child_condition();

    session.handle_field_remove("Name");
    assert!(!session.child_where().is_empty());
    assert!(session.handle_field_remove("Contacts.Email").is_none());
    assert!(session.child_where().is_empty());

    assert_eq!(
        session.handle_field_selected("Contacts.Email").as_deref(),
        Some("SELECT (SELECT Email FROM Contacts) FROM Account")
    );
}

#[test]
fn test_object_type_change_clears_child_conditions() {
    let mut session = session_with_child_condition();

    session.set_object_type(Some("Lead".to_string()));
    assert!(session.child_where().is_empty());
    assert_eq!(
        session.build_query().as_deref(),
        Some("SELECT Name, (SELECT Email FROM Contacts) FROM Lead")
    );
}

#[test]
fn test_same_object_type_keeps_child_conditions() {
    let mut session = session_with_child_condition();

    session.set_object_type(Some("Account".to_string()));
    assert!(!session.child_where().is_empty());
}

#[tokio::test]
async fn test_condition_lines_follow_session_object_type() {
    let mut session = session();
    session.handle_object_type_change(Some("Account".to_string())).unwrap();

    assert_eq!(session.editor().object_type(), Some("Account"));
    assert_eq!(session.editor().lines()[0].object_type(), Some("Account"));

    let schema = schema();
    let line = session.editor_mut().line_mut("condition-1").unwrap();
    line.refresh_child_relationships(&schema).await.unwrap();
    assert_eq!(line.child_relationships().len(), 1);
    assert_eq!(line.child_relationships()[0].relationship_name, "Contacts");

    session.handle_object_type_change(Some("Contact".to_string())).unwrap();
    let line = session.editor().lines()[0].clone();
    assert_eq!(line.object_type(), Some("Contact"));
    assert!(line.child_relationships().is_empty());
}

// =============================================================================
// Ordering and limit
// =============================================================================

#[test]
fn test_order_by_defaults_to_ascending() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");

    let query = session
        .handle_value_changed(ValueChange::OrderByField(Some("Name".to_string())))
        .unwrap();
    assert_eq!(query.as_deref(), Some("SELECT Name FROM Account ORDER BY Name ASC"));

    let query = session
        .handle_value_changed(ValueChange::OrderByDirection(Some("DESC".to_string())))
        .unwrap();
    assert_eq!(query.as_deref(), Some("SELECT Name FROM Account ORDER BY Name DESC"));

    let query = session
        .handle_value_changed(ValueChange::Limit(Some("10".to_string())))
        .unwrap();
    assert_eq!(query.as_deref(), Some("SELECT Name FROM Account ORDER BY Name DESC LIMIT 10"));
}

#[test]
fn test_invalid_direction_is_rejected() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");

    let result = session.handle_value_changed(ValueChange::OrderByDirection(Some("DOWN".to_string())));
    assert!(matches!(result, Err(SdkError::BuildError(_))));
    assert!(session.order_by_direction().is_none());
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_parse_query_populates_state() {
    let mut session = session();
    session
        .parse_query(Some(
            "SELECT Name, (SELECT Email FROM Contacts) FROM Account WHERE Name = 'Acme' ORDER BY Name DESC LIMIT 5",
        ))
        .unwrap();

    assert_eq!(session.object_type(), Some("Account"));
    assert!(session.selected_fields().contains("Name"));
    assert!(session.selected_fields().contains("Contacts.Email"));
    assert_eq!(session.where_clause(), Some("Name = 'Acme'"));
    assert_eq!(session.full_where(), Some("Name = 'Acme'"));
    assert_eq!(session.order_by_field(), Some("Name"));
    assert_eq!(session.order_by_direction(), Some(Direction::Desc));
    assert_eq!(session.limit(), Some("5"));
}

#[test]
fn test_parse_then_build_keeps_where() {
    let mut session = session();
    let query = "SELECT Name FROM Account WHERE Name = 'Acme'";
    session.parse_query(Some(query)).unwrap();
    assert_eq!(session.build_query().as_deref(), Some(query));
}

#[test]
fn test_parse_empty_resets_to_blank_condition() {
    let mut session = session();
    session.parse_query(Some("SELECT Name FROM Account")).unwrap();
    session.drain_events();

    session.parse_query(Some("")).unwrap();

    assert!(session.selected_fields().is_empty());
    assert!(session.query_string().is_empty());
    assert_eq!(session.editor().len(), 1);
    assert_eq!(session.drain_events(), vec![SessionEvent::QueryChanged(String::new())]);
}

#[test]
fn test_locked_session_rejects_other_object() {
    let mut session = locked_session("Account");
    session
        .parse_query(Some("SELECT Name FROM Account WHERE Name = 'Acme'"))
        .unwrap();

    let result = session.parse_query(Some("SELECT Id FROM Contact"));

    assert!(matches!(
        result,
        Err(SdkError::ParseError(ParseError::SchemaConflict { .. }))
    ));
    assert_eq!(session.object_type(), Some("Account"));
    assert_eq!(session.query_string(), "SELECT Name FROM Account WHERE Name = 'Acme'");
    assert!(session.selected_fields().contains("Name"));
    assert_eq!(session.where_clause(), Some("Name = 'Acme'"));
    assert_eq!(session.errors(), &[session.config().labels.incompatible_object.clone()]);
}

#[test]
fn test_locked_object_type_change_is_refused() {
    let mut session = locked_session("Account");
    let result = session.handle_object_type_change(Some("Contact".to_string()));
    assert!(matches!(result, Err(SdkError::Validation(_))));
    assert_eq!(session.object_type(), Some("Account"));
}

#[test]
fn test_object_type_change_clears_selection() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");

    session.handle_object_type_change(Some("Contact".to_string())).unwrap();

    assert_eq!(session.object_type(), Some("Contact"));
    assert!(session.selected_fields().is_empty());
    assert_eq!(session.editor().len(), 1);
}

#[test]
fn test_locked_without_object_or_query_is_not_ready() {
    let session = QueryBuilderSession::with_config(BuilderConfig::default()).lock_object_type(true);
    assert!(matches!(session.ensure_ready(), Err(SdkError::MissingPrerequisite(_))));
    assert!(session
        .error_message()
        .contains(&session.config().labels.lock_object_but_no_soql_no_object));
}

// =============================================================================
// Schema loading
// =============================================================================

#[test]
fn test_stale_schema_response_is_dropped() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    let stale = session.begin_schema_fetch().unwrap();

    session.set_object_type(Some("Contact".to_string()));
    assert!(!session.is_current(&stale));
    assert!(!session.apply_object_info(stale, Ok(account_info())));
    assert!(session.field_options().is_empty());

    let current = session.begin_schema_fetch().unwrap();
    assert_eq!(current.object_type(), "Contact");
    assert!(session.apply_object_info(current, Ok(contact_info())));
    assert_eq!(session.field_options().len(), 3);
}

#[tokio::test]
async fn test_schema_failure_keeps_query_state() {
    let mut session = session();
    session.set_object_type(Some("Account".to_string()));
    session.handle_field_selected("Name");

    assert!(!session.refresh_schema(&schema().failing("metadata unavailable")).await);

    assert_eq!(session.query_string(), "SELECT Name FROM Account");
    assert!(session.selected_fields().contains("Name"));
    assert_eq!(session.last_notice().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_load_objects() {
    let mut session = session();
    session.load_objects(&schema()).await.unwrap();
    let labels: Vec<&str> = session.object_types().iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Account", "Contact"]);

    assert!(session.load_objects(&schema().failing("down")).await.is_err());
    assert_eq!(session.object_types().len(), 2);
}

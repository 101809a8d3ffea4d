//! Unit tests for the query parser
//!
//! Covers clause extraction, field list splitting, the object type lock
//! and child subquery expansion.

use clientverse_parser::*;

// =============================================================================
// Clause Extraction Tests
// =============================================================================

#[test]
fn test_parse_select_from_only() {
    let parsed = QueryParser::parse(Some("SELECT Id, Name FROM Account"), None).unwrap();
    assert_eq!(parsed.object_type.as_deref(), Some("Account"));
    assert_eq!(parsed.selected_fields, vec!["Id", "Name"]);
    assert!(parsed.order_by_field.is_none());
    assert!(parsed.limit.is_none());
}

#[test]
fn test_parse_order_by_without_direction() {
    let parsed = QueryParser::parse(Some("SELECT Id FROM Account ORDER BY Name LIMIT 10"), None).unwrap();
    assert_eq!(parsed.order_by_field.as_deref(), Some("Name"));
    assert_eq!(parsed.order_by_direction, None);
    assert_eq!(parsed.limit.as_deref(), Some("10"));
}

#[test]
fn test_parse_where_bounded_by_limit() {
    let parsed = QueryParser::parse(
        Some("SELECT Id FROM Opportunity WHERE Amount > 100 AND StageName = 'Closed Won' LIMIT 20"),
        None,
    )
    .unwrap();
    assert_eq!(
        parsed.where_clause.as_deref(),
        Some("Amount > 100 AND StageName = 'Closed Won'")
    );
}

#[test]
fn test_parse_limit_kept_as_raw_text() {
    let parsed = QueryParser::parse(Some("SELECT Id FROM Account LIMIT abc"), None).unwrap();
    assert_eq!(parsed.limit.as_deref(), Some("abc"));
}

#[test]
fn test_parse_from_without_select() {
    let parsed = QueryParser::parse(Some("x FROM Account WHERE Name = 'a'"), None).unwrap();
    assert_eq!(parsed.object_type.as_deref(), Some("Account"));
    assert!(parsed.selected_fields.is_empty());
}

// =============================================================================
// Field List Tests
// =============================================================================

#[test]
fn test_parse_field_list_trims_every_token() {
    let parsed = QueryParser::parse(Some("SELECT   Id ,Name,  Owner.Name   FROM Account"), None).unwrap();
    assert_eq!(parsed.selected_fields, vec!["Id", "Name", "Owner.Name"]);
}

#[test]
fn test_parse_field_list_never_drops_tokens() {
    let parsed = QueryParser::parse(Some("SELECT ,Id,, FROM Account"), None).unwrap();
    assert_eq!(parsed.selected_fields, vec!["", "Id", "", ""]);
}

// =============================================================================
// Object Type Lock Tests
// =============================================================================

#[test]
fn test_parse_conflict_reports_both_types() {
    let err = QueryParser::parse(Some("SELECT Id FROM Contact WHERE Name = 'x'"), Some("Account")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Account"));
    assert!(message.contains("Contact"));
}

#[test]
fn test_parse_empty_input_ignores_lock() {
    let parsed = QueryParser::parse(None, Some("Account")).unwrap();
    assert!(parsed.reset_conditions);
    assert!(parsed.object_type.is_none());
}

// =============================================================================
// Child Subquery Tests
// =============================================================================

#[test]
fn test_parse_multiple_subqueries() {
    let parsed = QueryParser::parse(
        Some("SELECT Name, (SELECT Email FROM Contacts), (SELECT Amount FROM Opportunities WHERE Amount > 5) FROM Account WHERE Industry = 'Tech'"),
        None,
    )
    .unwrap();

    assert_eq!(
        parsed.selected_fields,
        vec!["Name", "Contacts.Email", "Opportunities.Amount"]
    );
    assert_eq!(parsed.child_where.len(), 1);
    assert_eq!(parsed.child_where[0].relationship_name, "Opportunities");
    assert_eq!(parsed.where_clause.as_deref(), Some("Industry = 'Tech'"));
}

#[test]
fn test_parse_unbalanced_query_is_rejected() {
    let err = QueryParser::parse(Some("SELECT Name, (SELECT Email FROM Contacts FROM Account"), None).unwrap_err();
    assert!(matches!(err, ParseError::UnbalancedParentheses { .. }));
}

#[test]
fn test_subquery_ordering_and_limit_are_rejected() {
    for query in [
        "SELECT Name, (SELECT Email FROM Contacts LIMIT 5) FROM Account",
        "SELECT Name, (SELECT Email FROM Contacts ORDER BY Email) FROM Account LIMIT 10",
    ] {
        let err = QueryParser::parse(Some(query), None).unwrap_err();
        assert!(matches!(err, ParseError::InvalidSubquery(_)), "accepted {}", query);
    }

    let parsed = QueryParser::parse(Some("SELECT Name, (SELECT Email FROM Contacts) FROM Account LIMIT 10"), None).unwrap();
    assert_eq!(parsed.limit.as_deref(), Some("10"));
}

#[test]
fn test_parsed_query_serializes_camel_case() {
    let parsed = QueryParser::parse(Some("SELECT Id FROM Account ORDER BY Id DESC"), None).unwrap();
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json["objectType"], "Account");
    assert_eq!(json["orderByDirection"], "DESC");
}

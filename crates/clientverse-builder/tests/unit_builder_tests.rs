//! Unit tests for the query builder
//!
//! Covers the documented build examples and the parse/build round trip.

use clientverse_builder::*;
use clientverse_parser::QueryParser;

fn parse_then_build(query: &str) -> String {
    let parsed = QueryParser::parse(Some(query), None).unwrap();
    QueryBuilder::build(&QueryParts::from_parsed(parsed)).unwrap()
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_contact_example() {
    let parts = QueryParts {
        object_type: Some("Contact".to_string()),
        selected_fields: ["FirstName", "LastName"].into_iter().collect(),
        parent_where: Some("Email != null".to_string()),
        order_by: Some(OrderBy::parse("LastName", Some("ASC")).unwrap()),
        limit: Some("50".to_string()),
        ..QueryParts::default()
    };

    assert_eq!(
        QueryBuilder::build(&parts).as_deref(),
        Some("SELECT FirstName, LastName FROM Contact WHERE Email != null ORDER BY LastName ASC LIMIT 50")
    );
}

#[test]
fn test_build_parents_before_children() {
    let mut parts = QueryParts {
        object_type: Some("Account".to_string()),
        selected_fields: ["Contacts.Email", "Name", "Opportunities.Amount", "Industry"]
            .into_iter()
            .collect(),
        ..QueryParts::default()
    };
    parts.child_where.push("Opportunities", "StageName = 'Closed Won'");

    assert_eq!(
        QueryBuilder::build(&parts).unwrap(),
        "SELECT Name, Industry, (SELECT Email FROM Contacts), \
         (SELECT Amount FROM Opportunities WHERE StageName = 'Closed Won') FROM Account"
    );
}

#[test]
fn test_build_dominance_rule() {
    let parts = QueryParts {
        object_type: Some("Account".to_string()),
        selected_fields: ["Name"].into_iter().collect(),
        full_where: Some("A=1".to_string()),
        parent_where: Some("B=2".to_string()),
        ..QueryParts::default()
    };
    assert_eq!(parts.effective_where(), Some("A=1"));
    assert_eq!(QueryBuilder::build(&parts).unwrap(), "SELECT Name FROM Account WHERE A=1");
}

#[test]
fn test_build_skips_empty_limit_and_where() {
    let parts = QueryParts {
        object_type: Some("Lead".to_string()),
        selected_fields: ["Company"].into_iter().collect(),
        parent_where: Some(String::new()),
        limit: Some(String::new()),
        ..QueryParts::default()
    };
    assert_eq!(QueryBuilder::build(&parts).unwrap(), "SELECT Company FROM Lead");
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_roundtrip_flat_queries() {
    for query in [
        "SELECT Id FROM Account",
        "SELECT Id, Name FROM Account WHERE Name LIKE 'Ac%' AND (Industry = 'Tech' OR Industry = 'Retail')",
        "SELECT FirstName, LastName FROM Contact WHERE Email != null ORDER BY LastName DESC LIMIT 50",
        "SELECT Subject FROM Case LIMIT 5",
    ] {
        assert_eq!(parse_then_build(query), query);
    }
}

#[test]
fn test_roundtrip_child_subquery() {
    let query = "SELECT Name, (SELECT Email, Phone FROM Contacts WHERE Email = 'x@y.com') FROM Account ORDER BY Name ASC LIMIT 10";
    assert_eq!(parse_then_build(query), query);
}

#[test]
fn test_roundtrip_structured_state() {
    let parts = QueryParts {
        object_type: Some("Account".to_string()),
        selected_fields: ["Name", "Contacts.Email"].into_iter().collect(),
        order_by: Some(OrderBy::parse("Name", Some("DESC")).unwrap()),
        limit: Some("25".to_string()),
        ..QueryParts::default()
    };
    let query = QueryBuilder::build(&parts).unwrap();
    let rebuilt = QueryParts::from_parsed(QueryParser::parse(Some(&query), Some("Account")).unwrap());

    assert_eq!(rebuilt.object_type, parts.object_type);
    assert_eq!(rebuilt.selected_fields, parts.selected_fields);
    assert_eq!(rebuilt.order_by, parts.order_by);
    assert_eq!(rebuilt.limit, parts.limit);
}

#[test]
fn test_from_parsed_defaults_direction() {
    let parts = QueryParts::from_parsed(
        QueryParser::parse(Some("SELECT Id FROM Account ORDER BY Name"), None).unwrap(),
    );
    assert_eq!(parts.order_by.unwrap().direction, Direction::Asc);
}

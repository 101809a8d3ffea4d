//! Comparison operators and the operator catalog

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // Comparison operators
    /// Equal (=)
    #[serde(rename = "equals")]
    Equals,
    /// Not equal (!=)
    #[serde(rename = "not_equal")]
    NotEquals,
    /// Greater than (>)
    #[serde(rename = "greater_than")]
    GreaterThan,
    /// Greater than or equal (>=)
    #[serde(rename = "greater_or_equal")]
    GreaterOrEqual,
    /// Less than (<)
    #[serde(rename = "less_than")]
    LessThan,
    /// Less than or equal (<=)
    #[serde(rename = "less_or_equal")]
    LessOrEqual,

    // String operators (rendered as LIKE)
    /// Contains
    #[serde(rename = "contains")]
    Contains,
    /// Starts with
    #[serde(rename = "starts_with")]
    StartsWith,
    /// Ends with
    #[serde(rename = "ends_with")]
    EndsWith,

    // Membership operators
    /// In (value in comma separated list)
    #[serde(rename = "in")]
    In,
    /// Not in
    #[serde(rename = "not_in")]
    NotIn,

    /// Child relationship line; the comparison is implicitly `=`
    #[serde(rename = "Child")]
    Child,
}

impl Operator {
    /// All operators in catalog order
    pub const ALL: [Operator; 12] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::In,
        Operator::NotIn,
        Operator::Child,
    ];

    /// Catalog value of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equal",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterOrEqual => "greater_or_equal",
            Operator::LessThan => "less_than",
            Operator::LessOrEqual => "less_or_equal",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Child => "Child",
        }
    }

    /// SOQL token for the operator
    pub fn soql(&self) -> &'static str {
        match self {
            Operator::Equals | Operator::Child => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => "LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// Returns true if this is an ordering/equality comparison
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::GreaterThan
                | Operator::GreaterOrEqual
                | Operator::LessThan
                | Operator::LessOrEqual
        )
    }

    /// Returns true if this operator renders as LIKE
    pub fn is_like(&self) -> bool {
        matches!(self, Operator::Contains | Operator::StartsWith | Operator::EndsWith)
    }

    /// Returns true if this is a membership operator
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CoreError::InvalidOperator(s.to_string()))
    }
}

/// An operator entry as offered to the user
///
/// `types` is a comma separated tag list of the field data types the
/// operator applies to, e.g. `"String,Picklist,Email"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorOption {
    pub label: String,
    pub value: String,
    pub types: String,
}

impl OperatorOption {
    pub fn new(label: impl Into<String>, value: Operator, types: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.as_str().to_string(),
            types: types.into(),
        }
    }

    /// Case-insensitive substring match of the data type against `types`
    pub fn applies_to(&self, data_type: &str) -> bool {
        self.types
            .to_lowercase()
            .contains(&data_type.to_lowercase())
    }

    /// Typed operator, if the catalog value is known
    pub fn operator(&self) -> Result<Operator> {
        self.value.parse()
    }
}

/// Operators available for a field of the given data type
///
/// Without a data type nothing is offered.
pub fn filter_operators<'a>(
    catalog: &'a [OperatorOption],
    data_type: Option<&str>,
) -> Vec<&'a OperatorOption> {
    match data_type {
        Some(dt) if !dt.is_empty() => catalog.iter().filter(|op| op.applies_to(dt)).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_roundtrip_str() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("bogus".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_groups() {
        assert!(Operator::Equals.is_comparison());
        assert!(!Operator::Contains.is_comparison());
        assert!(Operator::StartsWith.is_like());
        assert!(Operator::NotIn.is_membership());
        assert_eq!(Operator::Child.soql(), "=");
    }

    #[test]
    fn test_applies_to_is_case_insensitive() {
        let op = OperatorOption::new("Contains", Operator::Contains, "String,TextArea,Email");
        assert!(op.applies_to("string"));
        assert!(op.applies_to("TEXTAREA"));
        assert!(!op.applies_to("Double"));
    }

    #[test]
    fn test_filter_operators_without_type() {
        let catalog = vec![OperatorOption::new("Equals", Operator::Equals, "String")];
        assert!(filter_operators(&catalog, None).is_empty());
        assert!(filter_operators(&catalog, Some("")).is_empty());
        assert_eq!(filter_operators(&catalog, Some("String")).len(), 1);
    }
}

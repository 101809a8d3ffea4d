//! Dotted relationship field paths
//!
//! A field path such as `Account.Owner.Name` is a sequence of segments where
//! every segment but the last names a relationship and the last one names a
//! leaf field (or a relationship root when the path is still being browsed).

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// A parsed field path with at least one segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path, rejecting empty segments
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split(SEPARATOR).map(str::to_string).collect();

        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidFieldPath(path.to_string()));
        }

        Ok(Self { segments })
    }

    /// Create a single-segment path
    pub fn leaf_only(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.contains(SEPARATOR) {
            return Err(CoreError::InvalidFieldPath(name));
        }
        Self::parse(&name)
    }

    /// All segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Relationship segments (every segment but the last)
    pub fn relationships(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The final segment
    pub fn leaf(&self) -> &str {
        // parse() guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the path traverses at least one relationship
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Split at the first separator into relationship name and remainder
    ///
    /// `Contacts.Email` becomes `("Contacts", "Email")` and
    /// `Account.Owner.Name` becomes `("Account", "Owner.Name")`.
    pub fn split_first(&self) -> Option<(&str, String)> {
        if !self.is_nested() {
            return None;
        }
        Some((&self.segments[0], self.segments[1..].join(".")))
    }

    /// Append a segment, returning the extended path
    pub fn child(&self, segment: &str) -> Result<Self> {
        Self::parse(&format!("{}{}{}", self, SEPARATOR, segment))
    }

    /// Join an optional browsing prefix with a selected value
    pub fn join(prefix: Option<&str>, value: &str) -> String {
        match prefix {
            Some(p) if !p.is_empty() => format!("{}{}{}", p, SEPARATOR, value),
            _ => value.to_string(),
        }
    }

    /// Human readable breadcrumb, e.g. `Account > Owner > Name`
    pub fn breadcrumb(&self) -> String {
        self.segments.join(" > ")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let path = FieldPath::parse("Account.Owner.Name").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.relationships(), &["Account".to_string(), "Owner".to_string()]);
        assert_eq!(path.leaf(), "Name");
        assert_eq!(path.to_string(), "Account.Owner.Name");
    }

    #[test]
    fn test_single_segment() {
        let path = FieldPath::parse("Email").unwrap();
        assert!(!path.is_nested());
        assert!(path.relationships().is_empty());
        assert_eq!(path.split_first(), None);
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("Account.").is_err());
        assert!(FieldPath::parse("Account..Name").is_err());
    }

    #[test]
    fn test_split_first_keeps_remainder() {
        let path = FieldPath::parse("Account.Owner.Name").unwrap();
        let (rel, rest) = path.split_first().unwrap();
        assert_eq!(rel, "Account");
        assert_eq!(rest, "Owner.Name");
    }

    #[test]
    fn test_join_and_breadcrumb() {
        assert_eq!(FieldPath::join(None, "Name"), "Name");
        assert_eq!(FieldPath::join(Some(""), "Name"), "Name");
        assert_eq!(FieldPath::join(Some("Account.Owner"), "Name"), "Account.Owner.Name");

        let path = FieldPath::parse("Account").unwrap().child("Owner").unwrap();
        assert_eq!(path.breadcrumb(), "Account > Owner");
    }

    #[test]
    fn test_serde_as_string() {
        let path: FieldPath = serde_json::from_str(r#""Contacts.Email""#).unwrap();
        assert_eq!(path.leaf(), "Email");
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""Contacts.Email""#);
        assert!(serde_json::from_str::<FieldPath>(r#""a..b""#).is_err());
    }
}

//! Query builder configuration
//!
//! Everything the controllers need from their host: display messages, the
//! operator catalog, per-type input settings, the default sort direction and
//! the update frequencies offered when a query is scheduled.

use crate::error::Result;
use crate::session::Frequency;
use clientverse_builder::Direction;
use clientverse_core::{Operator, OperatorOption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// User-facing message texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub choose_fields: String,
    pub available_fields: String,
    pub generated_query: String,
    pub where_clauses: String,
    pub order_by: String,
    pub incompatible_object: String,
    pub lock_object_but_no_soql_no_object: String,
    pub button_remove_all: String,
    pub missing_job_information: String,
    pub no_contacts_to_save: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            choose_fields: "Return which fields:".to_string(),
            available_fields: "Add fields".to_string(),
            generated_query: "Return Records meeting the following conditions:".to_string(),
            where_clauses: "Create the where clauses to your query below".to_string(),
            order_by: "Order the number of results by:".to_string(),
            incompatible_object:
                "The soql string that was passed in was incompatible with the provided object type name".to_string(),
            lock_object_but_no_soql_no_object: "You need to either specify the object type, pass in an existing soql string, or allow the user to choose the object type".to_string(),
            button_remove_all: "Remove All".to_string(),
            missing_job_information: "Please enter job name and select a frequency.".to_string(),
            no_contacts_to_save: "No contacts available to save.".to_string(),
        }
    }
}

/// Input settings for one data type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeSetting {
    pub input_type: String,
}

impl FieldTypeSetting {
    pub fn new(input_type: impl Into<String>) -> Self {
        Self {
            input_type: input_type.into(),
        }
    }
}

/// Data type to input settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTypeSettings {
    settings: BTreeMap<String, FieldTypeSetting>,
}

impl FieldTypeSettings {
    pub fn insert(&mut self, data_type: impl Into<String>, setting: FieldTypeSetting) {
        self.settings.insert(data_type.into(), setting);
    }

    /// Input type for a data type
    ///
    /// Keys are matched case-insensitively; environment sources lowercase them.
    pub fn input_type(&self, data_type: &str) -> Option<&str> {
        self.settings
            .get(data_type)
            .or_else(|| {
                self.settings
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(data_type))
                    .map(|(_, setting)| setting)
            })
            .map(|s| s.input_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// Query builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub labels: Labels,

    /// Operators offered by condition lines
    pub operators: Vec<OperatorOption>,

    pub field_type_settings: FieldTypeSettings,

    /// Direction used when ORDER BY has a field but no direction
    pub default_direction: Direction,

    /// Frequencies offered when scheduling a saved query
    pub frequencies: Vec<Frequency>,
}

const TEXT_TYPES: &str = "String,TextArea,Email,Phone,Url,Picklist";
const NUMERIC_TYPES: &str = "Double,Integer,Currency,Percent,Date,DateTime";
const ALL_TYPES: &str =
    "String,TextArea,Email,Phone,Url,Picklist,Id,Reference,Double,Integer,Currency,Percent,Date,DateTime,Boolean";

/// Built-in operator catalog
pub fn default_operators() -> Vec<OperatorOption> {
    vec![
        OperatorOption::new("equals", Operator::Equals, ALL_TYPES),
        OperatorOption::new("not equal to", Operator::NotEquals, ALL_TYPES),
        OperatorOption::new("greater than", Operator::GreaterThan, NUMERIC_TYPES),
        OperatorOption::new("greater or equal", Operator::GreaterOrEqual, NUMERIC_TYPES),
        OperatorOption::new("less than", Operator::LessThan, NUMERIC_TYPES),
        OperatorOption::new("less or equal", Operator::LessOrEqual, NUMERIC_TYPES),
        OperatorOption::new("contains", Operator::Contains, TEXT_TYPES),
        OperatorOption::new("starts with", Operator::StartsWith, TEXT_TYPES),
        OperatorOption::new("ends with", Operator::EndsWith, TEXT_TYPES),
        OperatorOption::new("in", Operator::In, "String,Picklist,Id,Reference,Email,Phone"),
        OperatorOption::new("not in", Operator::NotIn, "String,Picklist,Id,Reference,Email,Phone"),
        OperatorOption::new("child", Operator::Child, ALL_TYPES),
    ]
}

/// Built-in input settings
pub fn default_field_type_settings() -> FieldTypeSettings {
    let mut settings = FieldTypeSettings::default();
    for (data_type, input_type) in [
        ("String", "text"),
        ("TextArea", "text"),
        ("Picklist", "text"),
        ("Id", "text"),
        ("Reference", "text"),
        ("Email", "email"),
        ("Phone", "tel"),
        ("Url", "url"),
        ("Double", "number"),
        ("Integer", "number"),
        ("Currency", "number"),
        ("Percent", "number"),
        ("Date", "date"),
        ("DateTime", "datetime"),
        ("Boolean", "checkbox"),
    ] {
        settings.insert(data_type, FieldTypeSetting::new(input_type));
    }
    settings
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            operators: default_operators(),
            field_type_settings: default_field_type_settings(),
            default_direction: Direction::Asc,
            frequencies: Frequency::ALL.to_vec(),
        }
    }
}

impl BuilderConfig {
    /// Create the built-in configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `config/clientverse.*` and `CLIENTVERSE__*`
    /// environment variables, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/clientverse").required(false))
            .add_source(config::Environment::with_prefix("CLIENTVERSE").separator("__"))
            .build();

        match config_result {
            Ok(cfg) => Ok(cfg.try_deserialize()?),
            Err(e) => {
                tracing::info!("No usable config source ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a single file; the format follows its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading builder config from {}", path.display());
        let cfg = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Replace the operator catalog
    pub fn with_operators(mut self, operators: Vec<OperatorOption>) -> Self {
        self.operators = operators;
        self
    }

    /// Set the default sort direction
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    /// Set the input type of a data type
    pub fn with_field_type(mut self, data_type: impl Into<String>, input_type: impl Into<String>) -> Self {
        self.field_type_settings
            .insert(data_type, FieldTypeSetting::new(input_type));
        self
    }
}

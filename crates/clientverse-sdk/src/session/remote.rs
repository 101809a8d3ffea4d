//! Session operations backed by remote services
//!
//! Service calls never touch the structured query state on failure; the
//! failure is logged and surfaced as the session's last notice.

use super::QueryBuilderSession;
use crate::condition_list::ConditionEditor;
use crate::error::{Result, SdkError};
use crate::events::Notice;
use crate::services::{ListService, QueryService, Record, SchemaService, ServiceError};
use clientverse_core::ObjectInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Refresh frequency of a scheduled list query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "Hourly",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Annually => "Annually",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        Frequency::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| SdkError::Validation(format!("Unknown frequency '{}'", s)))
    }
}

/// Identifies the schema request issued for one object type
///
/// A response is applied only if the session still shows the same object
/// type it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTicket {
    object_type: String,
    generation: u64,
}

impl SchemaTicket {
    pub fn object_type(&self) -> &str {
        &self.object_type
    }
}

/// Result table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub label: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Rows returned by the last query run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPreview {
    pub rows: Vec<Record>,
    /// One text column per key of the first row
    pub columns: Vec<Column>,
    pub no_data: bool,
}

impl QueryPreview {
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.keys()
                    .map(|key| Column {
                        label: key.clone(),
                        field_name: key.clone(),
                        kind: "text".to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            no_data: rows.is_empty(),
            columns,
            rows,
        }
    }

    /// `Id` of every row that has one
    pub fn record_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get("Id").and_then(|id| id.as_str()))
            .map(str::to_string)
            .collect()
    }
}

impl<E: ConditionEditor> QueryBuilderSession<E> {
    /// Start a schema request for the current object type
    pub fn begin_schema_fetch(&self) -> Option<SchemaTicket> {
        Some(SchemaTicket {
            object_type: self.object_type.clone()?,
            generation: self.schema_generation,
        })
    }

    /// Returns true if a response for `ticket` would still be current
    pub fn is_current(&self, ticket: &SchemaTicket) -> bool {
        ticket.generation == self.schema_generation
            && self.object_type.as_deref() == Some(ticket.object_type.as_str())
    }

    /// Apply a schema response; stale responses are dropped
    ///
    /// Returns true if the field options were replaced.
    pub fn apply_object_info(
        &mut self,
        ticket: SchemaTicket,
        response: std::result::Result<ObjectInfo, ServiceError>,
    ) -> bool {
        if !self.is_current(&ticket) {
            tracing::warn!(
                "Dropped stale schema response for {} (generation {}, now {})",
                ticket.object_type,
                ticket.generation,
                self.schema_generation
            );
            return false;
        }

        match response {
            Ok(info) => {
                self.field_options = info.field_options();
                tracing::debug!("Loaded {} field options for {}", self.field_options.len(), ticket.object_type);
                true
            }
            Err(e) => {
                tracing::error!("Failed to load schema of {}: {}", ticket.object_type, e);
                self.notify(Notice::error("Error", e.to_string()));
                false
            }
        }
    }

    /// Fetch and apply the schema of the current object type
    pub async fn refresh_schema(&mut self, service: &dyn SchemaService) -> bool {
        let Some(ticket) = self.begin_schema_fetch() else {
            return false;
        };
        let response = service.get_object_info(ticket.object_type()).await;
        self.apply_object_info(ticket, response)
    }

    /// Load the object types offered by the object picker
    pub async fn load_objects(&mut self, service: &dyn SchemaService) -> Result<()> {
        match service.get_objects().await {
            Ok(objects) => {
                self.object_types = objects;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load object types: {}", e);
                self.notify(Notice::error("Error", e.to_string()));
                Err(e.into())
            }
        }
    }

    pub fn preview(&self) -> Option<&QueryPreview> {
        self.preview.as_ref()
    }

    /// Run the current query and keep its rows for preview
    pub async fn run_query(&mut self, service: &dyn QueryService) -> Result<&QueryPreview> {
        if self.query_string.is_empty() {
            return Err(SdkError::MissingPrerequisite("No query to run".to_string()));
        }

        let rows = match service.run_query(&self.query_string).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Query failed: {}: {}", self.query_string, e);
                self.notify(Notice::error("Query Error", e.to_string()));
                return Err(e.into());
            }
        };

        tracing::info!("Query returned {} row(s)", rows.len());
        self.notify(Notice::success("Success", "Query executed successfully"));
        Ok(&*self.preview.insert(QueryPreview::from_rows(rows)))
    }

    /// Leave the preview and return to editing
    pub fn go_back(&mut self) {
        self.preview = None;
    }

    /// Seed the session from a saved query
    ///
    /// Ignored while a preview is shown or when `saved_query` is empty.
    /// Returns true if the query was loaded.
    pub fn load_saved_query(&mut self, saved_query: Option<&str>) -> Result<bool> {
        let Some(saved_query) = saved_query.filter(|q| !q.is_empty()) else {
            return Ok(false);
        };
        if self.preview.is_some() {
            tracing::debug!("Preview loaded, saved query ignored");
            return Ok(false);
        }
        self.parse_query(Some(saved_query))?;
        Ok(true)
    }

    /// Store the query on a list, schedule its refresh and save the
    /// previewed records as members
    pub async fn save_and_schedule(
        &mut self,
        service: &dyn ListService,
        record_id: &str,
        job_name: &str,
        frequency: Option<Frequency>,
    ) -> Result<()> {
        let Some(frequency) = frequency.filter(|_| !job_name.trim().is_empty()) else {
            let message = self.config.labels.missing_job_information.clone();
            self.notify(Notice::error("Missing Information", message.clone()));
            return Err(SdkError::MissingInformation(message));
        };

        if let Err(e) = service.delete_old_jobs(record_id).await {
            tracing::warn!("Failed to delete old jobs of {}: {}", record_id, e);
        }

        let scheduled = match service
            .update_list_query(record_id, &self.query_string, frequency, job_name)
            .await
        {
            Ok(()) => {
                service
                    .schedule_query_job(record_id, &self.query_string, frequency, job_name)
                    .await
            }
            Err(e) => Err(e),
        };

        let result = match scheduled {
            Ok(()) => {
                tracing::info!("Scheduled job '{}' ({}) for list {}", job_name, frequency, record_id);
                self.notify(Notice::success("Success", "Query saved and job scheduled successfully."));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to save query for list {}: {}", record_id, e);
                self.notify(Notice::error("Error", e.to_string()));
                Err(SdkError::from(e))
            }
        };

        match self.save_members(service, record_id).await {
            Ok(_) | Err(SdkError::MissingInformation(_)) => {}
            Err(e) => tracing::warn!("List members not saved: {}", e),
        }

        result
    }

    /// Add the previewed records to a list
    ///
    /// Returns the number of records sent.
    pub async fn save_members(&mut self, service: &dyn ListService, list_id: &str) -> Result<usize> {
        let ids = self
            .preview
            .as_ref()
            .filter(|p| !p.rows.is_empty())
            .map(QueryPreview::record_ids);

        let Some(ids) = ids else {
            let message = self.config.labels.no_contacts_to_save.clone();
            self.notify(Notice::warning("No Data", message.clone()));
            return Err(SdkError::MissingInformation(message));
        };

        match service.create_list_members(list_id, &ids).await {
            Ok(()) => {
                tracing::info!("Created {} list member(s) on {}", ids.len(), list_id);
                self.notify(Notice::success("Success", "List Members created successfully."));
                Ok(ids.len())
            }
            Err(e) => {
                tracing::error!("Failed to create list members on {}: {}", list_id, e);
                self.notify(Notice::error("Error creating List Members", e.to_string()));
                Err(e.into())
            }
        }
    }
}

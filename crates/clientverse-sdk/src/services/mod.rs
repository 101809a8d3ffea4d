//! Remote services used by the controllers
//!
//! Object metadata, query execution, saved-list maintenance, list sharing
//! and CSV imports are provided by the host. Controllers only see these traits;
//! [`memory`] has in-process implementations.

pub mod memory;

use crate::csv_import::{ImportRequest, ImportRow};
use crate::session::Frequency;
use crate::sharing::{MemberChange, ShareAccess, ShareRequest, ShareToken};
use async_trait::async_trait;
use clientverse_core::{ChildRelationship, ObjectInfo, ObjectOption};
use thiserror::Error;

/// A query result row keyed by field name
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Service error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Request failed on the remote side
    #[error("Request failed: {0}")]
    Request(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for service calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Object metadata
#[async_trait]
pub trait SchemaService: Send + Sync {
    /// Field descriptors of an object type
    async fn get_object_info(&self, object_api_name: &str) -> ServiceResult<ObjectInfo>;

    /// Queryable object types
    async fn get_objects(&self) -> ServiceResult<Vec<ObjectOption>>;

    /// Child relationships of a parent object type
    async fn get_child_relationships(&self, parent_object: &str) -> ServiceResult<Vec<ChildRelationship>>;
}

/// Query execution
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn run_query(&self, soql: &str) -> ServiceResult<Vec<Record>>;
}

/// Saved list maintenance and scheduling
#[async_trait]
pub trait ListService: Send + Sync {
    /// Remove jobs previously scheduled for the list
    async fn delete_old_jobs(&self, record_id: &str) -> ServiceResult<()>;

    /// Store the query on the list
    async fn update_list_query(
        &self,
        record_id: &str,
        query: &str,
        frequency: Frequency,
        job_name: &str,
    ) -> ServiceResult<()>;

    /// Schedule the recurring refresh job
    async fn schedule_query_job(
        &self,
        record_id: &str,
        query: &str,
        frequency: Frequency,
        job_name: &str,
    ) -> ServiceResult<()>;

    /// Add contacts to the list
    async fn create_list_members(&self, list_id: &str, contact_ids: &[String]) -> ServiceResult<()>;
}

/// Share links and shared-list edits
#[async_trait]
pub trait SharingService: Send + Sync {
    async fn generate_token(&self, request: &ShareRequest) -> ServiceResult<ShareToken>;

    /// Returns false when the share could not be revoked
    async fn revoke_token(&self, share_id: &str) -> ServiceResult<bool>;

    async fn resolve_share_access(&self, token: &str) -> ServiceResult<ShareAccess>;

    async fn submit_list_changes(
        &self,
        list_id: &str,
        share_id: &str,
        changes: &[MemberChange],
    ) -> ServiceResult<()>;
}

/// CSV parsing and member import
#[async_trait]
pub trait ImportService: Send + Sync {
    /// Parse a file and match each row against existing contacts
    async fn parse_csv(&self, csv_body: &str, list_id: &str) -> ServiceResult<Vec<ImportRow>>;

    /// Create list members from reviewed rows
    async fn import_rows(&self, request: &ImportRequest) -> ServiceResult<()>;
}

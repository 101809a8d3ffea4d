//! In-process service implementations
//!
//! Backed by plain collections. Useful for tests, demos and the CLI.

use super::{
    ImportService, ListService, QueryService, Record, SchemaService, ServiceError, ServiceResult, SharingService,
};
use crate::csv_import::{ImportRequest, ImportRow};
use crate::session::Frequency;
use crate::sharing::{MemberChange, ShareAccess, ShareRequest, ShareToken};
use async_trait::async_trait;
use clientverse_core::{ChildRelationship, ObjectInfo, ObjectOption};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Object metadata held in memory
#[derive(Debug, Default)]
pub struct InMemorySchema {
    objects: BTreeMap<String, (String, ObjectInfo)>,
    children: HashMap<String, Vec<ChildRelationship>>,
    failure: Option<String>,
}

impl InMemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object type under a display label
    pub fn with_object(mut self, label: impl Into<String>, info: ObjectInfo) -> Self {
        self.objects.insert(info.api_name.clone(), (label.into(), info));
        self
    }

    pub fn with_child_relationships(mut self, parent: impl Into<String>, relationships: Vec<ChildRelationship>) -> Self {
        self.children.insert(parent.into(), relationships);
        self
    }

    /// Make every call fail with `message`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn check(&self) -> ServiceResult<()> {
        match &self.failure {
            Some(message) => Err(ServiceError::Request(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SchemaService for InMemorySchema {
    async fn get_object_info(&self, object_api_name: &str) -> ServiceResult<ObjectInfo> {
        self.check()?;
        self.objects
            .get(object_api_name)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| ServiceError::NotFound(object_api_name.to_string()))
    }

    async fn get_objects(&self) -> ServiceResult<Vec<ObjectOption>> {
        self.check()?;
        let mut options: Vec<ObjectOption> = self
            .objects
            .iter()
            .map(|(api_name, (label, _))| ObjectOption::new(label.clone(), api_name.clone()))
            .collect();
        options.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(options)
    }

    async fn get_child_relationships(&self, parent_object: &str) -> ServiceResult<Vec<ChildRelationship>> {
        self.check()?;
        Ok(self.children.get(parent_object).cloned().unwrap_or_default())
    }
}

/// Returns fixed rows for every query and records what was run
#[derive(Debug, Default)]
pub struct InMemoryQueryService {
    rows: Vec<Record>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl InMemoryQueryService {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Service whose every query fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl QueryService for InMemoryQueryService {
    async fn run_query(&self, soql: &str) -> ServiceResult<Vec<Record>> {
        lock(&self.queries).push(soql.to_string());
        if let Some(message) = &self.failure {
            return Err(ServiceError::Request(message.clone()));
        }
        Ok(self.rows.clone())
    }
}

/// A call received by [`RecordingListService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCall {
    DeleteOldJobs {
        record_id: String,
    },
    UpdateListQuery {
        record_id: String,
        query: String,
        frequency: Frequency,
        job_name: String,
    },
    ScheduleQueryJob {
        record_id: String,
        query: String,
        frequency: Frequency,
        job_name: String,
    },
    CreateListMembers {
        list_id: String,
        contact_ids: Vec<String>,
    },
}

impl ListCall {
    pub fn name(&self) -> &'static str {
        match self {
            ListCall::DeleteOldJobs { .. } => "delete_old_jobs",
            ListCall::UpdateListQuery { .. } => "update_list_query",
            ListCall::ScheduleQueryJob { .. } => "schedule_query_job",
            ListCall::CreateListMembers { .. } => "create_list_members",
        }
    }
}

/// Records list calls; optionally fails one operation by name
#[derive(Debug, Default)]
pub struct RecordingListService {
    calls: Mutex<Vec<ListCall>>,
    fail_on: Option<String>,
}

impl RecordingListService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail calls to the named operation, e.g. `"schedule_query_job"`
    pub fn failing_on(operation: impl Into<String>) -> Self {
        Self {
            fail_on: Some(operation.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ListCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: ListCall) -> ServiceResult<()> {
        let name = call.name();
        lock(&self.calls).push(call);
        if self.fail_on.as_deref() == Some(name) {
            return Err(ServiceError::Request(format!("{} failed", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl ListService for RecordingListService {
    async fn delete_old_jobs(&self, record_id: &str) -> ServiceResult<()> {
        self.record(ListCall::DeleteOldJobs {
            record_id: record_id.to_string(),
        })
    }

    async fn update_list_query(
        &self,
        record_id: &str,
        query: &str,
        frequency: Frequency,
        job_name: &str,
    ) -> ServiceResult<()> {
        self.record(ListCall::UpdateListQuery {
            record_id: record_id.to_string(),
            query: query.to_string(),
            frequency,
            job_name: job_name.to_string(),
        })
    }

    async fn schedule_query_job(
        &self,
        record_id: &str,
        query: &str,
        frequency: Frequency,
        job_name: &str,
    ) -> ServiceResult<()> {
        self.record(ListCall::ScheduleQueryJob {
            record_id: record_id.to_string(),
            query: query.to_string(),
            frequency,
            job_name: job_name.to_string(),
        })
    }

    async fn create_list_members(&self, list_id: &str, contact_ids: &[String]) -> ServiceResult<()> {
        self.record(ListCall::CreateListMembers {
            list_id: list_id.to_string(),
            contact_ids: contact_ids.to_vec(),
        })
    }
}

#[derive(Debug, Default)]
struct SharingState {
    next_id: u64,
    tokens: HashMap<String, String>,
    shares: HashMap<String, ShareAccess>,
    submitted: Vec<(String, Vec<MemberChange>)>,
}

/// Share links held in memory
///
/// Generated links look like `<base_url>?token=tok-<n>`.
#[derive(Debug, Default)]
pub struct InMemorySharing {
    base_url: String,
    state: Mutex<SharingState>,
}

impl InMemorySharing {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            state: Mutex::new(SharingState::default()),
        }
    }

    /// Register a share reachable through `token`
    pub fn with_share(self, token: impl Into<String>, access: ShareAccess) -> Self {
        {
            let mut state = lock(&self.state);
            state.tokens.insert(token.into(), access.share_id.clone());
            state.shares.insert(access.share_id.clone(), access);
        }
        self
    }

    /// Change sets received per list id
    pub fn submitted(&self) -> Vec<(String, Vec<MemberChange>)> {
        lock(&self.state).submitted.clone()
    }
}

#[async_trait]
impl SharingService for InMemorySharing {
    async fn generate_token(&self, request: &ShareRequest) -> ServiceResult<ShareToken> {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let share_id = format!("share-{}", state.next_id);
        let token = format!("tok-{}", state.next_id);

        state.tokens.insert(token.clone(), share_id.clone());
        state.shares.insert(
            share_id.clone(),
            ShareAccess {
                list_name: String::new(),
                access: request.access.label().to_string(),
                list_id: request.list_id.clone(),
                share_id: share_id.clone(),
                members: Vec::new(),
            },
        );

        Ok(ShareToken {
            id: share_id,
            url: format!("{}?token={}", self.base_url, token),
        })
    }

    async fn revoke_token(&self, share_id: &str) -> ServiceResult<bool> {
        let mut state = lock(&self.state);
        let removed = state.shares.remove(share_id).is_some();
        state.tokens.retain(|_, id| id != share_id);
        Ok(removed)
    }

    async fn resolve_share_access(&self, token: &str) -> ServiceResult<ShareAccess> {
        let state = lock(&self.state);
        state
            .tokens
            .get(token)
            .and_then(|share_id| state.shares.get(share_id))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("share token {}", token)))
    }

    async fn submit_list_changes(
        &self,
        list_id: &str,
        share_id: &str,
        changes: &[MemberChange],
    ) -> ServiceResult<()> {
        let mut state = lock(&self.state);
        if !state.shares.contains_key(share_id) {
            return Err(ServiceError::NotFound(format!("share {}", share_id)));
        }
        state.submitted.push((list_id.to_string(), changes.to_vec()));
        Ok(())
    }
}

/// Returns fixed parsed rows and records import requests
#[derive(Debug, Default)]
pub struct InMemoryImport {
    rows: Vec<ImportRow>,
    failure: Option<String>,
    parsed: Mutex<Vec<String>>,
    imports: Mutex<Vec<ImportRequest>>,
}

impl InMemoryImport {
    pub fn new(rows: Vec<ImportRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Make every call fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Files passed to `parse_csv`, in call order
    pub fn parsed(&self) -> Vec<String> {
        lock(&self.parsed).clone()
    }

    pub fn imports(&self) -> Vec<ImportRequest> {
        lock(&self.imports).clone()
    }

    fn check(&self) -> ServiceResult<()> {
        match &self.failure {
            Some(message) => Err(ServiceError::Request(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ImportService for InMemoryImport {
    async fn parse_csv(&self, csv_body: &str, _list_id: &str) -> ServiceResult<Vec<ImportRow>> {
        lock(&self.parsed).push(csv_body.to_string());
        self.check()?;
        Ok(self.rows.clone())
    }

    async fn import_rows(&self, request: &ImportRequest) -> ServiceResult<()> {
        self.check()?;
        lock(&self.imports).push(request.clone());
        Ok(())
    }
}

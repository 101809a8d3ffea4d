//! List sharing
//!
//! Two sides of sharing a saved list:
//!
//! - [`ShareLink`] prepares a [`ShareRequest`] and turns it into a tokenized
//!   link through a [`SharingService`].
//! - [`MemberRoster`] is what the recipient edits: the list members, gated by
//!   the [`Permissions`] derived from the share's access level. Edits are
//!   local until [`MemberRoster::submit`] sends them as a change set.

use crate::error::{Result, SdkError};
use crate::services::SharingService;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Access granted by a share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessLevel {
    #[default]
    #[serde(rename = "View")]
    View,
    #[serde(rename = "Add Members")]
    AddMembers,
    #[serde(rename = "Remove Members")]
    RemoveMembers,
    #[serde(rename = "All")]
    All,
    #[serde(rename = "Approved Reviewer")]
    ApprovedReviewer,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 5] = [
        AccessLevel::View,
        AccessLevel::AddMembers,
        AccessLevel::RemoveMembers,
        AccessLevel::All,
        AccessLevel::ApprovedReviewer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccessLevel::View => "View",
            AccessLevel::AddMembers => "Add Members",
            AccessLevel::RemoveMembers => "Remove Members",
            AccessLevel::All => "All",
            AccessLevel::ApprovedReviewer => "Approved Reviewer",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AccessLevel {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        AccessLevel::ALL
            .iter()
            .copied()
            .find(|level| level.label() == s.trim())
            .ok_or_else(|| SdkError::Validation(format!("Unknown access level '{}'", s)))
    }
}

/// What the holder of a share may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_add: bool,
    pub can_remove: bool,
    pub can_edit_notes: bool,
    pub can_submit: bool,
    pub is_read_only: bool,
}

impl Permissions {
    /// Derive permissions from an access label
    ///
    /// An empty or unknown label is read-only.
    pub fn from_access(label: Option<&str>) -> Self {
        let label = label.unwrap_or_default().trim();
        match label.parse::<AccessLevel>() {
            Ok(level) => Self::for_level(level),
            Err(_) => Self::read_only(),
        }
    }

    pub fn for_level(level: AccessLevel) -> Self {
        match level {
            AccessLevel::View => Self::read_only(),
            AccessLevel::AddMembers => Self {
                can_add: true,
                can_edit_notes: true,
                can_submit: true,
                ..Self::default()
            },
            AccessLevel::RemoveMembers => Self {
                can_remove: true,
                can_edit_notes: true,
                can_submit: true,
                ..Self::default()
            },
            AccessLevel::All | AccessLevel::ApprovedReviewer => Self {
                can_add: true,
                can_remove: true,
                can_edit_notes: true,
                can_submit: true,
                is_read_only: false,
            },
        }
    }

    pub fn read_only() -> Self {
        Self {
            is_read_only: true,
            ..Self::default()
        }
    }

    pub fn may_add(&self) -> bool {
        self.can_add && !self.is_read_only
    }

    pub fn may_remove(&self) -> bool {
        self.can_remove && !self.is_read_only
    }

    pub fn may_edit_notes(&self) -> bool {
        self.can_edit_notes && !self.is_read_only
    }

    pub fn may_submit(&self) -> bool {
        self.can_submit && !self.is_read_only
    }
}

/// Who a link is shared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShareMode {
    /// A specific authenticated user
    #[default]
    Authenticated,
}

/// Whether a link can be used more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TokenType {
    #[default]
    #[serde(rename = "Single Use")]
    SingleUse,
    #[serde(rename = "Multi Use")]
    MultiUse,
}

/// Parameters of a share link
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Saved list being shared
    pub list_id: String,
    pub mode: ShareMode,
    pub user_id: Option<String>,
    pub access: AccessLevel,
    /// `YYYY-MM-DD`
    pub expiry_date: Option<String>,
    /// `HH:MM`, optionally followed by seconds
    pub expiry_time: Option<String>,
    pub token_type: TokenType,
    pub max_uses: Option<u32>,
}

impl ShareRequest {
    pub fn new(list_id: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            ..Self::default()
        }
    }

    pub fn is_multi_use(&self) -> bool {
        self.token_type == TokenType::MultiUse
    }

    /// Check the request can be sent
    pub fn validate(&self) -> Result<()> {
        if self.mode == ShareMode::Authenticated && self.user_id.as_deref().map_or(true, str::is_empty) {
            return Err(SdkError::MissingInformation(
                "Please choose a user to share with.".to_string(),
            ));
        }
        if self.is_multi_use() && self.max_uses == Some(0) {
            return Err(SdkError::Validation("Max uses must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Expiry as a UTC timestamp
    ///
    /// Date and time are read in the caller's `offset`; a missing time means
    /// midnight. `None` when no date is set.
    pub fn expires_at(&self, offset: FixedOffset) -> Result<Option<DateTime<Utc>>> {
        let Some(date) = self.expiry_date.as_deref().filter(|d| !d.is_empty()) else {
            return Ok(None);
        };
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| SdkError::Validation(format!("Invalid expiry date '{}': {}", date, e)))?;

        let time = match self.expiry_time.as_deref().filter(|t| !t.is_empty()) {
            Some(raw) => parse_hour_minute(raw)?,
            None => (0, 0),
        };
        let naive = date
            .and_hms_opt(time.0, time.1, 0)
            .ok_or_else(|| SdkError::Validation("Invalid expiry time".to_string()))?;

        let local = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| SdkError::Validation("Ambiguous expiry time".to_string()))?;
        Ok(Some(local.with_timezone(&Utc)))
    }
}

fn parse_hour_minute(raw: &str) -> Result<(u32, u32)> {
    let invalid = || SdkError::Validation(format!("Invalid expiry time '{}'", raw));
    let mut parts = raw.split(':');
    let hour: u32 = parts.next().and_then(|h| h.trim().parse().ok()).ok_or_else(invalid)?;
    let minute: u32 = parts.next().and_then(|m| m.trim().parse().ok()).ok_or_else(invalid)?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// A generated share link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareToken {
    /// Share record id, used to revoke the link
    pub id: String,
    pub url: String,
}

impl ShareToken {
    /// Shortened form for display: the first 32 and last 12 characters
    pub fn short_url(&self) -> String {
        let chars: Vec<char> = self.url.chars().collect();
        if chars.len() <= 44 {
            return self.url.clone();
        }
        let start: String = chars[..32].iter().collect();
        let end: String = chars[chars.len() - 12..].iter().collect();
        format!("{}......{}", start, end)
    }
}

/// Share link form state
#[derive(Debug, Clone, Default)]
pub struct ShareLink {
    request: ShareRequest,
    generated: Option<ShareToken>,
}

impl ShareLink {
    pub fn new(list_id: impl Into<String>) -> Self {
        Self {
            request: ShareRequest::new(list_id),
            generated: None,
        }
    }

    pub fn request(&self) -> &ShareRequest {
        &self.request
    }

    pub fn generated(&self) -> Option<&ShareToken> {
        self.generated.as_ref()
    }

    /// Inputs are frozen while a link exists
    pub fn inputs_disabled(&self) -> bool {
        self.generated.is_some()
    }

    /// Switching mode clears the chosen user and any generated link
    pub fn set_mode(&mut self, mode: ShareMode) {
        if self.request.mode != mode {
            self.request.mode = mode;
            self.request.user_id = None;
            self.clear_generated();
        }
    }

    pub fn set_user(&mut self, user_id: Option<String>) {
        self.request.user_id = user_id;
        self.clear_generated();
    }

    pub fn set_access(&mut self, access: AccessLevel) {
        self.request.access = access;
    }

    pub fn set_expiry(&mut self, date: Option<String>, time: Option<String>) {
        self.request.expiry_date = date;
        self.request.expiry_time = time;
    }

    pub fn set_token_type(&mut self, token_type: TokenType, max_uses: Option<u32>) {
        self.request.token_type = token_type;
        self.request.max_uses = max_uses;
    }

    /// Validate and request a link
    pub async fn generate(&mut self, service: &dyn SharingService) -> Result<&ShareToken> {
        self.request.validate()?;
        let token = service.generate_token(&self.request).await.map_err(|e| {
            tracing::error!("Failed to generate share link: {}", e);
            SdkError::from(e)
        })?;
        tracing::info!("Generated share link {} for list {}", token.id, self.request.list_id);
        Ok(&*self.generated.insert(token))
    }

    /// Revoke the current link; the form resets on success
    pub async fn revoke(&mut self, service: &dyn SharingService) -> Result<()> {
        let share_id = self
            .generated
            .as_ref()
            .map(|t| t.id.clone())
            .ok_or_else(|| SdkError::MissingPrerequisite("Unable to revoke link.".to_string()))?;

        if !service.revoke_token(&share_id).await? {
            return Err(SdkError::RemoteFailure("Unable to revoke link.".to_string()));
        }

        tracing::info!("Revoked share {}", share_id);
        self.request.user_id = None;
        self.clear_generated();
        Ok(())
    }

    fn clear_generated(&mut self) {
        self.generated = None;
        self.request.expiry_date = None;
        self.request.expiry_time = None;
        self.request.token_type = TokenType::default();
        self.request.access = AccessLevel::default();
    }
}

/// Membership status of a list member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemberStatus {
    #[default]
    Included,
    Excluded,
}

/// A member of a shared list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberRow {
    pub id: String,
    pub contact_id: Option<String>,
    pub display_name: String,
    pub status: MemberStatus,
    pub is_new: bool,
    pub marked_for_removal: bool,
    pub note: String,
    pub reason: String,
    pub title: String,
    pub company: String,
    pub initial_sponsor: String,
}

/// Resolved share, as returned for a token
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareAccess {
    pub list_name: String,
    pub access: String,
    pub list_id: String,
    pub share_id: String,
    pub members: Vec<MemberRow>,
}

/// One row of a submitted change set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberChange {
    pub id: String,
    pub contact_id: Option<String>,
    pub is_new: bool,
    pub marked_for_removal: bool,
    pub note: String,
    pub reason: String,
    pub status: MemberStatus,
}

impl From<&MemberRow> for MemberChange {
    fn from(row: &MemberRow) -> Self {
        Self {
            id: row.id.clone(),
            contact_id: row.contact_id.clone(),
            is_new: row.is_new,
            marked_for_removal: row.marked_for_removal,
            note: row.note.clone(),
            reason: row.reason.clone(),
            status: row.status,
        }
    }
}

/// `{ key, value }` pair shown for a contact in pickers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayField {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// A contact picked for addition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactCandidate {
    #[serde(alias = "Id", alias = "contactId")]
    pub id: Option<String>,
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(rename = "displayFields")]
    pub display_fields: Vec<DisplayField>,
}

impl ContactCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            display_fields: Vec::new(),
        }
    }

    /// Name, else the first display value, else the `Name` display field
    pub fn display_name(&self) -> String {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        non_empty(&self.name)
            .or_else(|| self.display_fields.first().and_then(|f| non_empty(&f.value)))
            .or_else(|| {
                self.display_fields
                    .iter()
                    .find(|f| f.key == "Name")
                    .and_then(|f| non_empty(&f.value))
            })
            .unwrap_or_else(|| "New Contact".to_string())
    }
}

/// Result of adding contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    pub added: usize,
    pub skipped: usize,
}

/// Members of a shared list being edited by the share holder
#[derive(Debug, Clone, Default)]
pub struct MemberRoster {
    list_name: String,
    list_id: String,
    share_id: String,
    permissions: Permissions,
    members: Vec<MemberRow>,
    original: Vec<MemberRow>,
    next_new_id: u64,
}

impl MemberRoster {
    /// Start editing a resolved share
    pub fn load(access: ShareAccess) -> Self {
        let members: Vec<MemberRow> = access
            .members
            .into_iter()
            .map(|m| MemberRow {
                is_new: false,
                marked_for_removal: false,
                ..m
            })
            .collect();

        Self {
            permissions: Permissions::from_access(Some(access.access.as_str())),
            list_name: access.list_name,
            list_id: access.list_id,
            share_id: access.share_id,
            original: members.clone(),
            members,
            next_new_id: 0,
        }
    }

    /// Resolve a share token and load its members
    pub async fn resolve(service: &dyn SharingService, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(SdkError::MissingInformation("Missing token in URL".to_string()));
        }
        let access = service.resolve_share_access(token).await.map_err(|e| {
            tracing::error!("Failed to load data: {}", e);
            SdkError::RemoteFailure(format!("Failed to load data. {}", e))
        })?;
        Ok(Self::load(access))
    }

    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn members(&self) -> &[MemberRow] {
        &self.members
    }

    /// Members whose display name contains `search`, ignoring case
    pub fn filtered(&self, search: &str) -> Vec<&MemberRow> {
        if search.is_empty() {
            return self.members.iter().collect();
        }
        let needle = search.to_lowercase();
        self.members
            .iter()
            .filter(|m| m.display_name.to_lowercase().contains(&needle))
            .collect()
    }

    fn row_mut(&mut self, row_id: &str) -> Option<&mut MemberRow> {
        self.members.iter_mut().find(|m| m.id == row_id)
    }

    /// Returns false if no row has `row_id`
    pub fn update_note(&mut self, row_id: &str, note: impl Into<String>) -> Result<bool> {
        if !self.permissions.may_edit_notes() {
            return Err(SdkError::PermissionDenied(
                "You do not have permission to edit notes".to_string(),
            ));
        }
        Ok(self.row_mut(row_id).map(|m| m.note = note.into()).is_some())
    }

    pub fn update_reason(&mut self, row_id: &str, reason: impl Into<String>) -> Result<bool> {
        if !self.permissions.may_edit_notes() {
            return Err(SdkError::PermissionDenied(
                "You do not have permission to provide reason".to_string(),
            ));
        }
        Ok(self.row_mut(row_id).map(|m| m.reason = reason.into()).is_some())
    }

    pub fn mark_for_removal(&mut self, row_id: &str) -> Result<bool> {
        if !self.permissions.may_remove() {
            return Err(SdkError::PermissionDenied(
                "You do not have permission to remove members".to_string(),
            ));
        }
        Ok(self.row_mut(row_id).map(|m| m.marked_for_removal = true).is_some())
    }

    /// Clear a removal mark and its reason
    pub fn undo(&mut self, row_id: &str) -> bool {
        self.row_mut(row_id)
            .map(|m| {
                m.marked_for_removal = false;
                m.reason.clear();
            })
            .is_some()
    }

    /// Drop a row added in this session
    pub fn delete_new(&mut self, row_id: &str) -> Result<bool> {
        if self.permissions.is_read_only {
            return Err(SdkError::PermissionDenied(
                "You do not have permission to remove members".to_string(),
            ));
        }
        let before = self.members.len();
        self.members.retain(|m| !(m.id == row_id && m.is_new));
        Ok(self.members.len() != before)
    }

    /// Prepend contacts as new members
    ///
    /// Contacts without an id, or whose id is already on the list (including
    /// earlier entries of `contacts`), are skipped.
    pub fn add_contacts(&mut self, contacts: &[ContactCandidate]) -> Result<AddOutcome> {
        if !self.permissions.may_add() {
            return Err(SdkError::PermissionDenied(
                "You do not have permission to add members".to_string(),
            ));
        }

        let mut existing: HashSet<String> = self.members.iter().filter_map(|m| m.contact_id.clone()).collect();
        let mut outcome = AddOutcome::default();
        let mut rows = Vec::new();

        for contact in contacts {
            let Some(contact_id) = contact.id.clone().filter(|id| !id.is_empty()) else {
                outcome.skipped += 1;
                continue;
            };
            if !existing.insert(contact_id.clone()) {
                outcome.skipped += 1;
                continue;
            }

            self.next_new_id += 1;
            rows.push(MemberRow {
                id: format!("new-{}", self.next_new_id),
                contact_id: Some(contact_id),
                display_name: contact.display_name(),
                is_new: true,
                ..MemberRow::default()
            });
            outcome.added += 1;
        }

        rows.append(&mut self.members);
        self.members = rows;

        tracing::debug!("Added {} member(s), skipped {}", outcome.added, outcome.skipped);
        Ok(outcome)
    }

    /// Pending change set, one entry per current row
    pub fn changes(&self) -> Vec<MemberChange> {
        self.members.iter().map(MemberChange::from).collect()
    }

    /// Send the change set; on success it becomes the new baseline
    pub async fn submit(&mut self, service: &dyn SharingService) -> Result<()> {
        if self.list_id.is_empty() {
            return Err(SdkError::MissingPrerequisite("List not loaded".to_string()));
        }
        if !self.permissions.may_submit() {
            return Err(SdkError::PermissionDenied(
                "You do not have permission to submit changes".to_string(),
            ));
        }

        let changes = self.changes();
        service
            .submit_list_changes(&self.list_id, &self.share_id, &changes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to submit changes for list {}: {}", self.list_id, e);
                SdkError::from(e)
            })?;

        tracing::info!("Submitted {} change(s) for list {}", changes.len(), self.list_id);
        self.commit();
        Ok(())
    }

    /// Make the current rows the baseline
    pub fn commit(&mut self) {
        self.original = self.members.clone();
    }

    /// Revert to the baseline
    pub fn cancel(&mut self) {
        self.members = self.original.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, contact_id: &str, name: &str) -> MemberRow {
        MemberRow {
            id: id.to_string(),
            contact_id: Some(contact_id.to_string()),
            display_name: name.to_string(),
            ..MemberRow::default()
        }
    }

    fn roster(access: &str) -> MemberRoster {
        MemberRoster::load(ShareAccess {
            list_name: "Prospects".to_string(),
            access: access.to_string(),
            list_id: "a01".to_string(),
            share_id: "s01".to_string(),
            members: vec![member("m1", "003A", "Ada Lovelace"), member("m2", "003B", "Alan Turing")],
        })
    }

    #[test]
    fn test_permission_table() {
        assert_eq!(Permissions::from_access(None), Permissions::read_only());
        assert_eq!(Permissions::from_access(Some("  ")), Permissions::read_only());
        assert_eq!(Permissions::from_access(Some("Owner")), Permissions::read_only());
        assert_eq!(Permissions::from_access(Some("View")), Permissions::read_only());

        let add = Permissions::from_access(Some("Add Members"));
        assert!(add.can_add && add.can_edit_notes && add.can_submit && !add.can_remove);

        let remove = Permissions::from_access(Some("Remove Members"));
        assert!(remove.can_remove && !remove.can_add);

        for label in ["All", " Approved Reviewer "] {
            let all = Permissions::from_access(Some(label));
            assert!(all.can_add && all.can_remove && all.can_edit_notes && all.can_submit);
            assert!(!all.is_read_only);
        }
    }

    #[test]
    fn test_expires_at_combines_date_and_time() {
        let mut request = ShareRequest::new("a01");
        assert_eq!(request.expires_at(FixedOffset::east_opt(0).unwrap()).unwrap(), None);

        request.expiry_date = Some("2025-12-31".to_string());
        request.expiry_time = Some("18:30".to_string());
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let expiry = request.expires_at(ist).unwrap().unwrap();
        assert_eq!(expiry.to_rfc3339(), "2025-12-31T13:00:00+00:00");

        request.expiry_time = None;
        let midnight = request.expires_at(FixedOffset::east_opt(0).unwrap()).unwrap().unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-12-31T00:00:00+00:00");

        request.expiry_time = Some("25:00".to_string());
        assert!(request.expires_at(ist).is_err());
    }

    #[test]
    fn test_validate_requires_user() {
        let mut request = ShareRequest::new("a01");
        assert!(matches!(request.validate(), Err(SdkError::MissingInformation(_))));

        request.user_id = Some("005A".to_string());
        assert!(request.validate().is_ok());

        request.token_type = TokenType::MultiUse;
        request.max_uses = Some(0);
        assert!(matches!(request.validate(), Err(SdkError::Validation(_))));
    }

    #[test]
    fn test_short_url() {
        let short = ShareToken {
            id: "s".to_string(),
            url: "https://x.io".to_string(),
        };
        assert_eq!(short.short_url(), "https://x.io");

        let long = ShareToken {
            id: "s".to_string(),
            url: format!("https://lists.example.com/shared?token={}", "a".repeat(40)),
        };
        let display = long.short_url();
        assert!(display.starts_with("https://lists.example.com/shared"));
        assert!(display.contains("......"));
        assert!(display.ends_with(&"a".repeat(12)));
    }

    #[test]
    fn test_add_contacts_skips_missing_and_duplicates() {
        let mut roster = roster("All");
        let contacts = vec![
            ContactCandidate::new("003C", "Grace Hopper"),
            ContactCandidate::new("003A", "Ada again"),
            ContactCandidate::default(),
            ContactCandidate::new("003C", "Grace twice"),
        ];

        let outcome = roster.add_contacts(&contacts).unwrap();
        assert_eq!(outcome, AddOutcome { added: 1, skipped: 3 });
        assert_eq!(roster.members()[0].display_name, "Grace Hopper");
        assert!(roster.members()[0].is_new);
        assert_eq!(roster.members().len(), 3);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let contact: ContactCandidate = serde_json::from_str(
            r#"{"Id": "003Z", "displayFields": [{"key": "Title", "value": ""}, {"key": "Name", "value": "Katherine"}]}"#,
        )
        .unwrap();
        assert_eq!(contact.id.as_deref(), Some("003Z"));
        assert_eq!(contact.display_name(), "Katherine");
        assert_eq!(ContactCandidate::default().display_name(), "New Contact");
    }

    #[test]
    fn test_read_only_roster_rejects_edits() {
        let mut roster = roster("View");
        assert!(matches!(roster.update_note("m1", "x"), Err(SdkError::PermissionDenied(_))));
        assert!(matches!(roster.mark_for_removal("m1"), Err(SdkError::PermissionDenied(_))));
        assert!(matches!(roster.add_contacts(&[]), Err(SdkError::PermissionDenied(_))));
        assert!(matches!(roster.delete_new("m1"), Err(SdkError::PermissionDenied(_))));
    }

    #[test]
    fn test_mark_undo_and_cancel() {
        let mut roster = roster("Remove Members");
        assert!(roster.mark_for_removal("m1").unwrap());
        assert!(roster.update_reason("m1", "left company").unwrap());
        assert!(roster.members()[0].marked_for_removal);

        assert!(roster.undo("m1"));
        assert!(!roster.members()[0].marked_for_removal);
        assert!(roster.members()[0].reason.is_empty());

        roster.update_note("m2", "call back").unwrap();
        roster.cancel();
        assert!(roster.members()[1].note.is_empty());
    }

    #[test]
    fn test_delete_new_only_removes_added_rows() {
        let mut roster = roster("Add Members");
        roster.add_contacts(&[ContactCandidate::new("003D", "Edsger")]).unwrap();
        assert!(!roster.delete_new("m1").unwrap());
        assert!(roster.delete_new("new-1").unwrap());
        assert_eq!(roster.members().len(), 2);
    }

    #[test]
    fn test_filtered_ignores_case() {
        let roster = roster("View");
        let found = roster.filtered("TURING");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "m2");
        assert_eq!(roster.filtered("").len(), 2);
    }
}

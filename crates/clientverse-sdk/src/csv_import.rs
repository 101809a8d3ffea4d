//! CSV import review
//!
//! The host parses an uploaded file through an [`ImportService`] and gets one
//! [`ImportRow`] per line, already matched against existing contacts. A
//! [`CsvImport`] walks the user through five review steps:
//!
//! ```text
//! 1 exact email matches
//! 2 fuzzy matches
//! 3 emails repeated inside the file
//! 4 contacts already on the list
//! 5 rows with no match
//! ```
//!
//! Rows repeated inside the file are shown in step 3 only, whatever match
//! the service reported. Rows can be edited, deleted, or merged by email
//! before the whole set is imported.

use crate::error::{Result, SdkError};
use crate::services::ImportService;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Label shown for rows whose email appears more than once in the file
pub const CSV_DUPLICATE_LABEL: &str = "CSV contains the duplicate email";

/// Match reported by the service for a parsed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "EMAIL MATCH")]
    EmailMatch,
    #[serde(rename = "FUZZY MATCH")]
    FuzzyMatch,
    #[default]
    #[serde(rename = "NONE")]
    None,
}

impl MatchType {
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::EmailMatch => "EMAIL MATCH",
            MatchType::FuzzyMatch => "FUZZY MATCH",
            MatchType::None => "NONE",
        }
    }
}

/// One parsed CSV line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportRow {
    /// Position assigned on load; not sent back on import
    #[serde(skip)]
    pub id: usize,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub match_type: MatchType,
    pub matched_contact_id: Option<String>,
    /// The matched contact is already a member of the list
    pub is_duplicate: bool,
}

/// Draft values for one row, as edited in the review table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowEdit {
    pub id: usize,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

/// A row as displayed in a review step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowView<'a> {
    pub id: usize,
    #[serde(flatten)]
    pub row: &'a ImportRow,
    pub match_label: &'static str,
    /// Already linked or repeated in the file
    pub highlighted: bool,
}

/// Review steps, in wizard order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportStep {
    #[default]
    ExactMatches,
    FuzzyMatches,
    CsvDuplicates,
    AlreadyLinked,
    NoMatch,
}

impl ImportStep {
    pub const ALL: [ImportStep; 5] = [
        ImportStep::ExactMatches,
        ImportStep::FuzzyMatches,
        ImportStep::CsvDuplicates,
        ImportStep::AlreadyLinked,
        ImportStep::NoMatch,
    ];

    /// 1-based step number
    pub fn number(&self) -> usize {
        match self {
            ImportStep::ExactMatches => 1,
            ImportStep::FuzzyMatches => 2,
            ImportStep::CsvDuplicates => 3,
            ImportStep::AlreadyLinked => 4,
            ImportStep::NoMatch => 5,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL.get(self.number()).copied().unwrap_or(self)
    }

    pub fn previous(self) -> Self {
        match self.number() {
            1 => self,
            n => Self::ALL[n - 2],
        }
    }

    pub fn is_first(&self) -> bool {
        *self == ImportStep::ExactMatches
    }

    pub fn is_last(&self) -> bool {
        *self == ImportStep::NoMatch
    }
}

/// Row assembled from a merge of rows sharing one email
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRow {
    pub first_name: String,
    pub last_name: String,
    /// Fixed by the selection
    pub email: String,
    pub company: String,
    pub title: String,
}

/// Edit of the merged row; the email cannot change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeEdit {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
}

impl MergeRow {
    fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Some value is still blank
    pub fn is_incomplete(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email, &self.company, &self.title]
            .iter()
            .any(|v| v.trim().is_empty())
    }

    pub fn apply(&mut self, edit: MergeEdit) {
        let MergeEdit {
            first_name,
            last_name,
            company,
            title,
        } = edit;
        if let Some(v) = first_name {
            self.first_name = v;
        }
        if let Some(v) = last_name {
            self.last_name = v;
        }
        if let Some(v) = company {
            self.company = v;
        }
        if let Some(v) = title {
            self.title = v;
        }
    }
}

/// Rows and file sent to the service on import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub rows: Vec<ImportRow>,
    pub list_id: String,
    pub default_fields: BTreeMap<String, String>,
    pub file_name: String,
    pub file_content: String,
}

/// Field values every imported member starts with
pub fn default_fields() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Status__c".to_string(), "Included".to_string()),
        ("Source_List_Name__c".to_string(), "CSV Import".to_string()),
    ])
}

/// Review state of one uploaded file
#[derive(Debug, Clone, Default)]
pub struct CsvImport {
    list_id: String,
    file_name: String,
    file_content: String,
    rows: Vec<ImportRow>,
    email_counts: HashMap<String, usize>,
    step: ImportStep,
    selected: Vec<usize>,
    merge_row: Option<MergeRow>,
}

impl CsvImport {
    /// Start reviewing rows already parsed from `file_content`
    pub fn load(
        list_id: impl Into<String>,
        file_name: impl Into<String>,
        file_content: impl Into<String>,
        rows: Vec<ImportRow>,
    ) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(id, row)| ImportRow { id, ..row })
            .collect();

        let mut import = Self {
            list_id: list_id.into(),
            file_name: file_name.into(),
            file_content: file_content.into(),
            rows,
            ..Self::default()
        };
        import.recount();
        import
    }

    /// Parse a file through the service and start reviewing it
    pub async fn upload(
        service: &dyn ImportService,
        list_id: &str,
        file_name: &str,
        file_content: &str,
    ) -> Result<Self> {
        let rows = service.parse_csv(file_content, list_id).await.map_err(|e| {
            tracing::error!("Failed to parse {}: {}", file_name, e);
            SdkError::from(e)
        })?;
        tracing::info!("Parsed {} row(s) from {}", rows.len(), file_name);
        Ok(Self::load(list_id, file_name, file_content, rows))
    }

    fn recount(&mut self) {
        self.email_counts.clear();
        for email in self.rows.iter().filter_map(|r| r.email.as_deref()) {
            *self.email_counts.entry(email.to_string()).or_insert(0) += 1;
        }
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    /// Rows in the file carrying `email`
    pub fn email_count(&self, email: &str) -> usize {
        self.email_counts.get(email).copied().unwrap_or(0)
    }

    fn is_csv_duplicate(&self, row: &ImportRow) -> bool {
        row.email.as_deref().is_some_and(|e| self.email_count(e) > 1)
    }

    fn view<'a>(&self, row: &'a ImportRow) -> ImportRowView<'a> {
        let repeated = self.is_csv_duplicate(row);
        ImportRowView {
            id: row.id,
            row,
            match_label: if repeated {
                CSV_DUPLICATE_LABEL
            } else {
                row.match_type.label()
            },
            highlighted: repeated || row.is_duplicate,
        }
    }

    fn matching(&self, match_type: MatchType) -> Vec<ImportRowView<'_>> {
        self.rows
            .iter()
            .filter(|r| r.match_type == match_type && !self.is_csv_duplicate(r))
            .map(|r| self.view(r))
            .collect()
    }

    pub fn exact_rows(&self) -> Vec<ImportRowView<'_>> {
        self.matching(MatchType::EmailMatch)
    }

    pub fn fuzzy_rows(&self) -> Vec<ImportRowView<'_>> {
        self.matching(MatchType::FuzzyMatch)
    }

    pub fn no_match_rows(&self) -> Vec<ImportRowView<'_>> {
        self.matching(MatchType::None)
    }

    /// Rows whose email repeats in the file, grouped by email
    pub fn csv_duplicate_rows(&self) -> Vec<ImportRowView<'_>> {
        let mut rows: Vec<&ImportRow> = self.rows.iter().filter(|r| self.is_csv_duplicate(r)).collect();
        rows.sort_by(|a, b| a.email.cmp(&b.email));
        rows.into_iter().map(|r| self.view(r)).collect()
    }

    pub fn already_linked_rows(&self) -> Vec<ImportRowView<'_>> {
        self.rows
            .iter()
            .filter(|r| r.is_duplicate)
            .map(|r| self.view(r))
            .collect()
    }

    pub fn rows_for_step(&self, step: ImportStep) -> Vec<ImportRowView<'_>> {
        match step {
            ImportStep::ExactMatches => self.exact_rows(),
            ImportStep::FuzzyMatches => self.fuzzy_rows(),
            ImportStep::CsvDuplicates => self.csv_duplicate_rows(),
            ImportStep::AlreadyLinked => self.already_linked_rows(),
            ImportStep::NoMatch => self.no_match_rows(),
        }
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    pub fn next_step(&mut self) -> ImportStep {
        self.step = self.step.next();
        self.step
    }

    pub fn previous_step(&mut self) -> ImportStep {
        self.step = self.step.previous();
        self.step
    }

    /// Apply draft values from the review table
    ///
    /// Returns the number of rows changed; unknown ids are skipped.
    pub fn save_draft(&mut self, edits: Vec<RowEdit>) -> usize {
        let mut applied = 0;
        for edit in edits {
            let Some(row) = self.rows.iter_mut().find(|r| r.id == edit.id) else {
                tracing::warn!("Ignored draft for unknown row {}", edit.id);
                continue;
            };
            if edit.first_name.is_some() {
                row.first_name = edit.first_name;
            }
            if edit.last_name.is_some() {
                row.last_name = edit.last_name;
            }
            if edit.email.is_some() {
                row.email = edit.email;
            }
            if edit.company.is_some() {
                row.company = edit.company;
            }
            applied += 1;
        }
        self.recount();
        applied
    }

    pub fn delete_row(&mut self, id: usize) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        self.selected.retain(|s| *s != id);
        if self.rows.len() == before {
            return false;
        }
        self.recount();
        true
    }

    pub fn select_rows(&mut self, ids: Vec<usize>) {
        self.selected = ids;
    }

    pub fn selected_rows(&self) -> Vec<&ImportRow> {
        self.selected
            .iter()
            .filter_map(|id| self.rows.iter().find(|r| r.id == *id))
            .collect()
    }

    /// Every selected row carries the email of the first one
    pub fn selection_is_consistent(&self) -> bool {
        let selected = self.selected_rows();
        match selected.first() {
            Some(first) => selected.iter().all(|r| r.email == first.email),
            None => true,
        }
    }

    /// Open the merge panel for the selected rows
    pub fn start_merge(&mut self) -> Result<&MergeRow> {
        if !self.selection_is_consistent() {
            return Err(SdkError::Validation(
                "Selected rows must share the same email".to_string(),
            ));
        }
        let email = match self.selected_rows().first() {
            Some(row) => row.email.clone().unwrap_or_default(),
            None => {
                return Err(SdkError::MissingInformation(
                    "Select the rows to merge".to_string(),
                ))
            }
        };

        self.selected.clear();
        Ok(&*self.merge_row.insert(MergeRow::for_email(email)))
    }

    pub fn merge_row(&self) -> Option<&MergeRow> {
        self.merge_row.as_ref()
    }

    pub fn show_merge_panel(&self) -> bool {
        self.merge_row.is_some() && self.selection_is_consistent()
    }

    pub fn edit_merge_row(&mut self, edit: MergeEdit) -> Result<&MergeRow> {
        let row = self
            .merge_row
            .as_mut()
            .ok_or_else(|| SdkError::MissingPrerequisite("No merge in progress".to_string()))?;
        row.apply(edit);
        Ok(&*row)
    }

    /// Replace every row carrying the merged email with the merged row
    ///
    /// The first of those rows keeps its position and match.
    pub fn apply_merge(&mut self) -> Result<()> {
        let merged = match &self.merge_row {
            Some(row) if row.is_incomplete() => {
                return Err(SdkError::Validation("Fill in every merged field".to_string()))
            }
            Some(row) => row.clone(),
            None => return Err(SdkError::MissingPrerequisite("No merge in progress".to_string())),
        };

        let email = Some(merged.email.clone());
        let Some(keep) = self.rows.iter().position(|r| r.email == email) else {
            return Err(SdkError::Validation(format!("No row carries {}", merged.email)));
        };

        let row = &mut self.rows[keep];
        row.first_name = Some(merged.first_name);
        row.last_name = Some(merged.last_name);
        row.company = Some(merged.company);
        row.title = Some(merged.title);
        let keep_id = row.id;

        self.rows.retain(|r| r.id == keep_id || r.email != email);
        self.merge_row = None;
        self.recount();
        Ok(())
    }

    pub fn cancel_merge(&mut self) {
        self.merge_row = None;
    }

    pub fn request(&self) -> ImportRequest {
        ImportRequest {
            rows: self.rows.clone(),
            list_id: self.list_id.clone(),
            default_fields: default_fields(),
            file_name: self.file_name.clone(),
            file_content: self.file_content.clone(),
        }
    }

    /// Send the reviewed rows to the list
    pub async fn import(&self, service: &dyn ImportService) -> Result<()> {
        if self.rows.is_empty() {
            return Err(SdkError::MissingInformation("No rows to import".to_string()));
        }
        service.import_rows(&self.request()).await.map_err(|e| {
            tracing::error!("Import of {} failed: {}", self.file_name, e);
            SdkError::from(e)
        })?;
        tracing::info!("Imported {} row(s) into {}", self.rows.len(), self.list_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(email: Option<&str>, match_type: MatchType) -> ImportRow {
        ImportRow {
            email: email.map(str::to_string),
            match_type,
            ..ImportRow::default()
        }
    }

    fn import() -> CsvImport {
        CsvImport::load(
            "a01",
            "contacts.csv",
            "FirstName,Email\n",
            vec![
                row(Some("ann@x.com"), MatchType::EmailMatch),
                row(Some("bo@x.com"), MatchType::FuzzyMatch),
                row(Some("bo@x.com"), MatchType::None),
                row(None, MatchType::None),
                ImportRow {
                    is_duplicate: true,
                    ..row(Some("cy@x.com"), MatchType::EmailMatch)
                },
            ],
        )
    }

    #[test]
    fn test_match_type_deserializes_labels() {
        let parsed: ImportRow = serde_json::from_str(
            r#"{"email":"a@x.com","matchType":"FUZZY MATCH","matchedContactId":"003A"}"#,
        )
        .unwrap();
        assert_eq!(parsed.match_type, MatchType::FuzzyMatch);
        assert_eq!(parsed.matched_contact_id.as_deref(), Some("003A"));
        assert!(!parsed.is_duplicate);
    }

    #[test]
    fn test_email_counts_skip_missing_emails() {
        let import = import();
        assert_eq!(import.email_count("bo@x.com"), 2);
        assert_eq!(import.email_count("ann@x.com"), 1);
        assert_eq!(import.rows()[3].id, 3);
    }

    #[test]
    fn test_csv_duplicates_leave_match_buckets() {
        let import = import();

        let exact: Vec<usize> = import.exact_rows().iter().map(|v| v.id).collect();
        assert_eq!(exact, vec![0, 4]);
        assert!(import.fuzzy_rows().is_empty());
        assert_eq!(import.no_match_rows().len(), 1);

        let repeated = import.csv_duplicate_rows();
        assert_eq!(repeated.len(), 2);
        assert!(repeated.iter().all(|v| v.match_label == CSV_DUPLICATE_LABEL && v.highlighted));
    }

    #[test]
    fn test_already_linked_rows_are_highlighted() {
        let import = import();
        let linked = import.already_linked_rows();
        assert_eq!(linked.len(), 1);
        assert!(linked[0].highlighted);
        assert_eq!(linked[0].match_label, "EMAIL MATCH");
    }

    #[test]
    fn test_steps_stop_at_both_ends() {
        let mut import = import();
        assert!(import.step().is_first());
        assert_eq!(import.previous_step(), ImportStep::ExactMatches);
        for _ in 0..6 {
            import.next_step();
        }
        assert!(import.step().is_last());
        assert_eq!(import.step().number(), 5);
        assert_eq!(import.previous_step(), ImportStep::AlreadyLinked);
    }

    #[test]
    fn test_merge_row_completeness() {
        let mut merged = MergeRow::for_email("bo@x.com");
        assert!(merged.is_incomplete());
        merged.apply(MergeEdit {
            first_name: Some("Bo".to_string()),
            last_name: Some("Jones".to_string()),
            company: Some("Acme".to_string()),
            title: Some(" ".to_string()),
        });
        assert!(merged.is_incomplete());
        merged.apply(MergeEdit {
            title: Some("CEO".to_string()),
            ..MergeEdit::default()
        });
        assert!(!merged.is_incomplete());
    }

    #[test]
    fn test_delete_row_recounts_emails() {
        let mut import = import();
        assert!(import.delete_row(1));
        assert!(!import.delete_row(1));
        assert_eq!(import.email_count("bo@x.com"), 1);
        assert!(import.csv_duplicate_rows().is_empty());
        assert_eq!(import.no_match_rows().len(), 2);
    }
}

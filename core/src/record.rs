use serde::{Deserialize, Serialize};

use crate::{AutomationStatus, ParsedDocument, Priority, TestCaseDraft};

/// Flattened test case in the shape the persistence layer stores.
///
/// The importer never assigns storage identifiers or timestamps; the caller
/// supplies `group_key` (the suite or project the cases are imported into)
/// and the store fills in the rest.
///
/// # Examples
///
/// ```
/// use qa_import_core::*;
///
/// let mut doc = ParsedDocument::default();
/// let mut draft = TestCaseDraft::new("TC001", "Login", Some("1. AUTH"), Some("1.1 Forms"));
/// draft.expected_result = "Dashboard shown".into();
/// doc.test_cases.push(draft);
///
/// let records = doc.to_records("suite-42");
/// assert_eq!(records[0].group_key, "suite-42");
/// assert_eq!(records[0].section_title.as_deref(), Some("AUTH"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    pub group_key: String,
    /// Id token from the source text, kept for traceability.
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub expected_result: String,
    pub priority: Priority,
    pub automation_status: AutomationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection_title: Option<String>,
}

impl TestCaseRecord {
    pub fn from_draft(group_key: &str, draft: &TestCaseDraft) -> Self {
        Self {
            group_key: group_key.to_string(),
            external_id: draft.id.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            expected_result: draft.expected_result.clone(),
            priority: draft.priority,
            automation_status: draft.automation_status,
            section_title: draft
                .section
                .as_deref()
                .map(|h| crate::strip_enumeration(h).to_string()),
            subsection_title: draft
                .subsection
                .as_deref()
                .map(|h| crate::strip_enumeration(h).to_string()),
        }
    }
}

impl ParsedDocument {
    /// Converts every draft, in document order, into a storable record.
    pub fn to_records(&self, group_key: &str) -> Vec<TestCaseRecord> {
        self.test_cases
            .iter()
            .map(|draft| TestCaseRecord::from_draft(group_key, draft))
            .collect()
    }
}

//! Structural validation of parsed documents.
//!
//! The parser itself never rejects input, so these checks exist for the
//! persistence hand-off: they surface drafts that would produce unusable
//! records and index entries that drifted from the flat list.
//!
//! # Examples
//!
//! ```
//! use qa_import_core::*;
//!
//! let mut doc = ParsedDocument::default();
//! doc.test_cases.push(TestCaseDraft::new("TC001", "Login", None, None));
//! assert!(validate_document(&doc).is_empty());
//!
//! // Priority listed for a case that was never parsed
//! doc.priorities.insert("TC404".to_string(), Priority::High);
//! assert!(!validate_document(&doc).is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::ParsedDocument;

/// Document validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A draft has an empty or whitespace-only id.
    #[error("test case at position {0} has an empty id")]
    EmptyTestCaseId(usize),
    /// A draft has an empty or whitespace-only title.
    #[error("test case {0} has an empty title")]
    EmptyTitle(String),
    /// Two drafts share the same id; priority lookups become ambiguous.
    #[error("duplicate test case id: {0}")]
    DuplicateTestCaseId(String),
    /// A draft whose section and subsection are indexed does not appear
    /// exactly once in that subsection.
    #[error("test case {id} appears {count} times under {subsection}")]
    IndexMismatch {
        id: String,
        subsection: String,
        count: usize,
    },
    /// The priority block references an id no draft carries.
    #[error("priority assigned to unknown test case: {0}")]
    UnknownPriorityTarget(String),
}

/// Validates a parsed document.
///
/// Unlike schema validation elsewhere, every problem is reported rather than
/// stopping at the first one.
pub fn validate_document(doc: &ParsedDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for (position, draft) in doc.test_cases.iter().enumerate() {
        let id = draft.id.trim();
        if id.is_empty() {
            errors.push(ValidationError::EmptyTestCaseId(position));
            continue;
        }
        if draft.title.trim().is_empty() {
            errors.push(ValidationError::EmptyTitle(id.to_string()));
        }
        if !seen.insert(id) && reported.insert(id) {
            errors.push(ValidationError::DuplicateTestCaseId(id.to_string()));
        }
    }

    errors.extend(validate_index(doc));

    for id in doc.priorities.keys() {
        if !seen.contains(id.as_str()) {
            errors.push(ValidationError::UnknownPriorityTarget(id.clone()));
        }
    }

    errors
}

fn validate_index(doc: &ParsedDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    // (section, subsection, id) -> occurrences in the flat list
    let mut expected: HashMap<(&str, &str, &str), usize> = HashMap::new();

    for draft in &doc.test_cases {
        let (Some(section), Some(subsection)) = (&draft.section, &draft.subsection) else {
            continue;
        };
        let indexed = doc
            .find_section(section)
            .is_some_and(|s| s.find_subsection(subsection).is_some());
        if indexed {
            *expected
                .entry((section.as_str(), subsection.as_str(), draft.id.as_str()))
                .or_default() += 1;
        }
    }

    let mut keys = expected.into_iter().collect::<Vec<_>>();
    keys.sort();
    for ((section, subsection, id), flat_count) in keys {
        let count = doc
            .find_section(section)
            .and_then(|s| s.find_subsection(subsection))
            .map_or(0, |sub| sub.test_cases.iter().filter(|tc| tc.id == id).count());
        if count != flat_count {
            errors.push(ValidationError::IndexMismatch {
                id: id.to_string(),
                subsection: subsection.to_string(),
                count,
            });
        }
    }

    errors
}

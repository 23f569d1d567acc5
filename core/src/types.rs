//! Document type definitions for imported test-case text.
//!
//! This module defines the data model produced by the importer: format
//! verdicts from classification, the nested section tree, individual test-case
//! drafts and the metadata maps that enrich them. The types are designed for
//! serialization with [`serde`] so they can be handed to a persistence layer or
//! a review UI as JSON or YAML.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Version of the document contract (semver).
pub const DOCUMENT_CONTRACT_VERSION: &str = "1.0.0";

/// Structural convention detected in imported text.
///
/// The declaration order doubles as the tie-break order when two formats
/// score the same during classification.
///
/// # Examples
///
/// ```
/// use qa_import_core::DocumentFormat;
///
/// assert_eq!(DocumentFormat::Hierarchical.to_string(), "hierarchical");
/// assert_eq!(DocumentFormat::default(), DocumentFormat::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Numbered sections and subsections with `TC###:` cases closed by an
    /// `Expected Result:` line.
    Hierarchical,
    /// Labelled fields (`Title:`, `Steps:`, `Expected:`) without nesting.
    Flat,
    /// Delimited rows (CSV, TSV, pipe tables).
    Tabular,
    /// Prose without recognizable structure.
    Freeform,
    /// Nothing to go on (empty input, the default).
    #[default]
    Unknown,
}

impl DocumentFormat {
    /// All formats in tie-break order.
    pub const ALL: [DocumentFormat; 5] = [
        DocumentFormat::Hierarchical,
        DocumentFormat::Flat,
        DocumentFormat::Tabular,
        DocumentFormat::Freeform,
        DocumentFormat::Unknown,
    ];

    /// Lowercase label used in reports and serialized output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Flat => "flat",
            Self::Tabular => "tabular",
            Self::Freeform => "freeform",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Best-matching format together with its confidence.
///
/// Confidence is a score in `[0, 1]`, not a probability: each format is scored
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FormatVerdict {
    pub format: DocumentFormat,
    pub confidence: f64,
}

impl FormatVerdict {
    pub const fn new(format: DocumentFormat, confidence: f64) -> Self {
        Self { format, confidence }
    }

    /// Returns `true` when the caller should take the hierarchical path.
    pub fn is_hierarchical(&self) -> bool {
        self.format == DocumentFormat::Hierarchical
    }
}

/// Execution priority assigned to a test case.
///
/// Priority blocks list tiers as `P0`..`P3`; the importer normalizes them to
/// these four tags. Unlisted cases get [`Priority::Medium`].
///
/// # Examples
///
/// ```
/// use qa_import_core::Priority;
///
/// assert_eq!(Priority::default(), Priority::Medium);
/// assert_eq!(Priority::from_tier_level(0), Priority::High);
/// assert_eq!(Priority::from_tier_level(7), Priority::Lowest);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Lowest,
}

impl Priority {
    /// Maps a tier level (the digit in `P0`, `P1`, ...) to a priority tag.
    pub const fn from_tier_level(level: u32) -> Self {
        match level {
            0 => Self::High,
            1 => Self::Medium,
            2 => Self::Low,
            _ => Self::Lowest,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Lowest => "lowest",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// How strongly a test case is recommended for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AutomationStatus {
    High,
    Medium,
    Low,
    /// No recommendation matched the case (the default).
    #[default]
    #[serde(rename = "Not Prioritized")]
    NotPrioritized,
}

impl AutomationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::NotPrioritized => "Not Prioritized",
        }
    }
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Test-case id → priority, in the order entries were first recorded.
pub type PriorityMap = IndexMap<String, Priority>;

/// Recommendation text → strength, in document order.
pub type AutomationRecommendationMap = IndexMap<String, AutomationStatus>;

/// A single parsed test case.
///
/// Drafts are created when a `TC###:` line opens them and finalized when the
/// `Expected Result:` line closes them (or leniently at the next id line or
/// end of input). `priority` and `automation_status` hold their defaults until
/// the assembler merges the metadata maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TestCaseDraft {
    /// Opaque id token such as `TC001`.
    pub id: String,
    pub title: String,
    /// Owning section heading line, if any.
    pub section: Option<String>,
    /// Owning subsection heading line, if any.
    pub subsection: Option<String>,
    /// Free text accumulated between the id line and the expected result.
    pub description: String,
    pub expected_result: String,
    pub priority: Priority,
    pub automation_status: AutomationStatus,
}

impl TestCaseDraft {
    /// Opens a draft with empty description and expected result.
    ///
    /// # Examples
    ///
    /// ```
    /// use qa_import_core::{AutomationStatus, Priority, TestCaseDraft};
    ///
    /// let draft = TestCaseDraft::new("TC001", "Login", Some("1. AUTH"), None);
    /// assert_eq!(draft.id, "TC001");
    /// assert_eq!(draft.priority, Priority::Medium);
    /// assert_eq!(draft.automation_status, AutomationStatus::NotPrioritized);
    /// ```
    pub fn new(id: &str, title: &str, section: Option<&str>, subsection: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            section: section.map(String::from),
            subsection: subsection.map(String::from),
            ..Self::default()
        }
    }

    /// Appends a line of free text, space-joined.
    pub fn push_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text);
    }

    /// Returns `true` once an expected result has been recorded.
    pub fn has_expected_result(&self) -> bool {
        !self.expected_result.is_empty()
    }

    /// Title and description joined, used for recommendation matching.
    pub fn searchable_text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.description)
        }
    }
}

/// Second-level heading inside a [`Section`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Subsection {
    /// Exact heading line, e.g. `1.1 Login Form`.
    pub heading: String,
    /// Heading with the enumeration stripped, e.g. `Login Form`.
    pub title: String,
    pub test_cases: Vec<TestCaseDraft>,
}

impl Subsection {
    pub fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            title: strip_enumeration(heading).to_string(),
            test_cases: Vec::new(),
        }
    }
}

/// Top-level heading grouping subsections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Section {
    /// Exact heading line, e.g. `1. AUTHENTICATION`.
    pub heading: String,
    /// Heading with the enumeration stripped, e.g. `AUTHENTICATION`.
    pub title: String,
    pub subsections: Vec<Subsection>,
}

impl Section {
    /// Creates an empty section keyed by its heading line.
    ///
    /// # Examples
    ///
    /// ```
    /// use qa_import_core::Section;
    ///
    /// let section = Section::new("2. USER MANAGEMENT");
    /// assert_eq!(section.title, "USER MANAGEMENT");
    /// ```
    pub fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            title: strip_enumeration(heading).to_string(),
            subsections: Vec::new(),
        }
    }

    pub fn find_subsection(&self, heading: &str) -> Option<&Subsection> {
        self.subsections.iter().find(|sub| sub.heading == heading)
    }

    /// Returns the subsection keyed by `heading`, creating it if needed.
    pub fn subsection_entry(&mut self, heading: &str) -> &mut Subsection {
        let pos = match self.subsections.iter().position(|sub| sub.heading == heading) {
            Some(pos) => pos,
            None => {
                self.subsections.push(Subsection::new(heading));
                self.subsections.len() - 1
            }
        };
        &mut self.subsections[pos]
    }

    pub fn test_case_count(&self) -> usize {
        self.subsections.iter().map(|sub| sub.test_cases.len()).sum()
    }
}

/// Root result of a hierarchical parse.
///
/// `test_cases` lists every draft in document order; `sections` is the same
/// data arranged as a tree for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedDocument {
    pub test_cases: Vec<TestCaseDraft>,
    pub sections: Vec<Section>,
    pub priorities: PriorityMap,
    pub automation: AutomationRecommendationMap,
}

impl ParsedDocument {
    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    pub fn find_section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.heading == heading)
    }

    /// Returns the section keyed by `heading`, creating it if needed.
    pub fn section_entry(&mut self, heading: &str) -> &mut Section {
        let pos = match self.sections.iter().position(|s| s.heading == heading) {
            Some(pos) => pos,
            None => {
                self.sections.push(Section::new(heading));
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos]
    }

    pub fn find_test_case(&self, id: &str) -> Option<&TestCaseDraft> {
        self.test_cases.iter().find(|tc| tc.id == id)
    }

    /// Every draft reachable through the section tree, in tree order.
    pub fn indexed_test_cases(&self) -> impl Iterator<Item = &TestCaseDraft> {
        self.sections
            .iter()
            .flat_map(|section| section.subsections.iter())
            .flat_map(|sub| sub.test_cases.iter())
    }
}

/// Strips a leading `1.` / `1.2` / `1.2.3` enumeration from a heading.
///
/// Headings without an enumeration are returned unchanged (trimmed).
pub fn strip_enumeration(heading: &str) -> &str {
    let trimmed = heading.trim();
    let rest = trimmed.trim_start_matches(|ch: char| ch.is_ascii_digit() || ch == '.');
    if rest.len() == trimmed.len() || !rest.starts_with(char::is_whitespace) {
        return trimmed;
    }
    rest.trim_start()
}

//! Hierarchical test-case text parser.
//!
//! The parser handles pasted QA documents written in the hierarchical
//! convention:
//!
//! ```text
//! 1. AUTHENTICATION
//! 1.1 Login Form
//! TC001: Valid credentials
//! Enter a registered email and password
//! Expected Result: The dashboard is displayed
//!
//! TEST EXECUTION PRIORITY
//! P0 - Critical (Must Pass)
//! - TC001
//!
//! AUTOMATION RECOMMENDATIONS
//! High Priority for Automation
//! - Valid credentials
//! ```
//!
//! # Architecture
//!
//! Input is normalized into trimmed, non-blank lines, classified with a
//! weighted scoring pass, and then walked once by a small state machine
//! ([`state`]) that builds the section tree and test-case drafts while the
//! metadata extractor ([`metadata`]) collects priority and automation
//! entries from the same scan. The assembler ([`assemble`]) finally merges
//! the metadata onto every draft.
//!
//! The primary entry point is [`HierarchicalParser::new`] followed by
//! [`HierarchicalParser::parse`], but most consumers should use
//! [`parse_hierarchical`](crate::parse_hierarchical) instead.

pub mod assemble;
pub mod classify;
pub mod metadata;
pub mod normalize;
pub mod state;
pub mod util;

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use qa_import_core::{DocumentFormat, FormatVerdict, ParsedDocument};

use assemble::AssembleOptions;
use state::Scanner;

/// Weighted score for one document format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatScore {
    pub format: DocumentFormat,
    pub score: f64,
}

/// Diagnostics for a single parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseDiagnostics {
    pub format_scores: Vec<FormatScore>,
    pub relevant_lines: usize,
    pub recognized_lines: usize,
    /// Lines that could not be attached to anything (no open test case).
    pub unresolved_lines: Vec<String>,
    /// Test cases closed without an `Expected Result:` line.
    pub lenient_finalizations: usize,
}

impl ParseDiagnostics {
    pub fn coverage(&self) -> f64 {
        if self.relevant_lines == 0 {
            return 0.0;
        }
        self.recognized_lines as f64 / self.relevant_lines as f64
    }
}

/// A normalized line with its 0-based position in the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedLine {
    pub index: usize,
    pub text: String,
}

/// Options controlling the scan and the final assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParseOptions {
    /// Also accept `Medium`/`Low Priority for Automation` headings.
    pub extended_automation_tiers: bool,
    pub assemble: AssembleOptions,
}

/// Exact marker line opening the priority block.
pub const PRIORITY_BLOCK_MARKER: &str = "TEST EXECUTION PRIORITY";
/// Exact marker line opening the automation block.
pub const AUTOMATION_BLOCK_MARKER: &str = "AUTOMATION RECOMMENDATIONS";
pub const HIGH_AUTOMATION_HEADING: &str = "High Priority for Automation";
pub const MEDIUM_AUTOMATION_HEADING: &str = "Medium Priority for Automation";
pub const LOW_AUTOMATION_HEADING: &str = "Low Priority for Automation";

/// Regex patterns for hierarchical documents.
pub(crate) static PATTERNS: LazyLock<HierarchicalPatterns> =
    LazyLock::new(HierarchicalPatterns::new);

pub(crate) struct HierarchicalPatterns {
    // Structure
    pub(crate) section_header: Regex,
    pub(crate) subsection_header: Regex,
    pub(crate) test_case_line: Regex,
    pub(crate) test_case_ref: Regex,
    pub(crate) expected_result: Regex,

    // Metadata blocks
    pub(crate) priority_tier: Regex,

    // Flat-format signals (classification only)
    pub(crate) field_label: Regex,
    pub(crate) numbered_step: Regex,
}

impl HierarchicalPatterns {
    fn new() -> Self {
        // All regexes here are compile-time constants. An expect() failure indicates
        // a programmer error in the pattern, not a runtime condition.
        Self {
            // 1. AUTHENTICATION  (no lowercase letters after the number)
            section_header: Regex::new(r"^\d+\.\s+[A-Z][^a-z]*$").expect("static regex must compile"),
            // 1.1 Login Form
            subsection_header: Regex::new(r"^\d+\.\d+\s+[A-Z]").expect("static regex must compile"),
            // TC001: Title
            test_case_line: Regex::new(r"^(TC\d{3}):\s*(.*)$").expect("static regex must compile"),
            test_case_ref: Regex::new(r"\bTC\d{3}\b").expect("static regex must compile"),
            expected_result: Regex::new(r"^Expected Result:\s*(.*)$").expect("static regex must compile"),

            // P0 - Critical (Must Pass)
            priority_tier: Regex::new(r"^P(\d+)\s*-\s*(.*)$").expect("static regex must compile"),

            field_label: Regex::new(
                r"(?i)^(test\s*case(?:\s*(?:id|#|\d+))?|title|summary|description|test\s+steps|steps?|pre-?conditions?|expected(?:\s+results?)?|actual\s+results?|priority)\s*[:#]"
            ).expect("static regex must compile"),
            numbered_step: Regex::new(r"^\d+[.)]\s+\S").expect("static regex must compile"),
        }
    }
}

/// Parser for hierarchical test-case text.
pub struct HierarchicalParser {
    raw_text: String,
    options: ParseOptions,
    verdict: Option<FormatVerdict>,
    warnings: Vec<String>,
    diagnostics: ParseDiagnostics,
}

impl HierarchicalParser {
    /// Creates a parser with default options.
    pub fn new(raw_text: &str) -> Self {
        Self::with_options(raw_text, ParseOptions::default())
    }

    pub fn with_options(raw_text: &str, options: ParseOptions) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            options,
            verdict: None,
            warnings: Vec::new(),
            diagnostics: ParseDiagnostics::default(),
        }
    }

    /// Parses the text and returns the assembled document.
    ///
    /// Never fails: unrecognized lines are folded into the open test case or
    /// dropped, and incomplete test cases are closed leniently.
    pub fn parse(&mut self) -> ParsedDocument {
        let document = self.scan();
        assemble::assemble_document(document, &self.options.assemble)
    }

    /// Runs the combined structure and metadata scan without assembling.
    ///
    /// Drafts in the returned document still carry default priority and
    /// automation status.
    pub fn scan(&mut self) -> ParsedDocument {
        self.warnings.clear();
        self.diagnostics = ParseDiagnostics::default();

        let lines = normalize::normalize_lines(&self.raw_text);
        let line_refs = lines.iter().map(|line| line.text.as_str()).collect::<Vec<_>>();

        let format_scores = classify::classify_formats(&line_refs);
        let verdict = classify::verdict_from_scores(&format_scores);
        debug!(
            format = %verdict.format,
            confidence = verdict.confidence,
            lines = lines.len(),
            "Classified import text"
        );
        self.verdict = Some(verdict);
        self.diagnostics.format_scores = format_scores;
        self.diagnostics.relevant_lines = lines.len();

        if lines.is_empty() {
            self.warnings.push("Empty import text".to_string());
            return ParsedDocument::default();
        }

        let mut scanner = Scanner::new(self.options);
        scanner.run(&lines);
        let (document, outcome) = scanner.finish();

        self.diagnostics.recognized_lines = outcome.recognized_lines;
        self.diagnostics.unresolved_lines = outcome.unresolved_lines;
        self.diagnostics.lenient_finalizations = outcome.lenient_finalizations;
        self.warnings.extend(outcome.warnings);

        debug!(
            test_cases = document.test_cases.len(),
            sections = document.sections.len(),
            priorities = document.priorities.len(),
            recommendations = document.automation.len(),
            "Scanned hierarchical document"
        );
        document
    }

    /// Returns the classification of the most recent parse call.
    pub fn verdict(&self) -> Option<FormatVerdict> {
        self.verdict
    }

    /// Returns warnings collected during the most recent parse call.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns diagnostics for the most recent parse call.
    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }
}

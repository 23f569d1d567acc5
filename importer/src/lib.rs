//! Classification and parsing of pasted QA test-case text.
//!
//! This crate turns an arbitrary block of pasted or uploaded text into a
//! structured [`ParsedDocument`]. It first decides which structural
//! convention the text follows (hierarchical, flat, tabular, freeform) and,
//! for the hierarchical convention, parses sections, subsections, test cases
//! and the priority / automation metadata blocks in a single pass.
//!
//! # Main entry points
//!
//! - [`classify`]: score the text and return the best [`FormatVerdict`].
//! - [`parse_hierarchical`]: parse and assemble a hierarchical document.
//! - [`import_text_with_report`]: classify, parse, validate and apply the
//!   configured quality policy, returning an [`ImportReport`].
//!
//! None of these perform I/O, and none of them fail: unrecognized input
//! degrades to a low-confidence verdict or an empty document.
//!
//! # Example
//!
//! ```
//! use qa_import::{classify, parse_hierarchical};
//! use qa_import_core::{DocumentFormat, Priority};
//!
//! let text = "\
//! 1. AUTHENTICATION
//! 1.1 Login Form
//! TC001: Valid credentials
//! Expected Result: Dashboard is shown
//! TC002: Wrong password
//! Expected Result: An error is shown
//! TEST EXECUTION PRIORITY
//! P0 - Critical (Must Pass)
//! - TC001
//! ";
//!
//! let verdict = classify(text);
//! assert_eq!(verdict.format, DocumentFormat::Hierarchical);
//! assert!(verdict.confidence > 0.9);
//!
//! let doc = parse_hierarchical(text);
//! assert_eq!(doc.test_cases.len(), 2);
//! assert_eq!(doc.test_cases[0].priority, Priority::High);
//! assert_eq!(doc.test_cases[1].priority, Priority::Medium);
//! assert_eq!(doc.sections[0].title, "AUTHENTICATION");
//! ```
//!
//! [`ImportReport`]: report::ImportReport

pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod quality;
pub mod report;

use qa_import_core::{
    DOCUMENT_CONTRACT_VERSION, DocumentFormat, FormatVerdict, ParsedDocument, validate_document,
};
use tracing::info;

use config::ImportConfig;
use parser::HierarchicalParser;
use report::{FailureCode, ImportReport, QualityTier};

/// Classifies raw text and returns the best-matching format.
///
/// Pure and deterministic. Empty input yields `{ unknown, 0.0 }`.
///
/// # Examples
///
/// ```
/// use qa_import::classify;
/// use qa_import_core::DocumentFormat;
///
/// let verdict = classify("Just a note about the release.");
/// assert_ne!(verdict.format, DocumentFormat::Hierarchical);
///
/// assert_eq!(classify("").confidence, 0.0);
/// ```
pub fn classify(raw_text: &str) -> FormatVerdict {
    parser::classify::classify_text(raw_text)
}

/// Parses hierarchical text into an assembled document with default options.
///
/// Never fails. Unrecognized lines are folded into the open test case or
/// dropped; test cases missing an `Expected Result:` line are kept.
///
/// # Examples
///
/// ```
/// use qa_import::parse_hierarchical;
///
/// let doc = parse_hierarchical("1. S\n1.1 Sub\nTC001: T\nExpected Result: R");
/// let tc = &doc.test_cases[0];
/// assert_eq!((tc.id.as_str(), tc.title.as_str()), ("TC001", "T"));
/// assert_eq!(tc.expected_result, "R");
/// ```
pub fn parse_hierarchical(raw_text: &str) -> ParsedDocument {
    HierarchicalParser::new(raw_text).parse()
}

/// Import output with both the document and its diagnostics report.
#[derive(Debug, Clone)]
pub struct ImportRun {
    /// The parsed document, present only when the import was accepted.
    pub document: Option<ParsedDocument>,
    pub report: ImportReport,
}

/// Classifies, parses, validates and quality-gates `raw_text`.
///
/// # Examples
///
/// ```
/// use qa_import::{config::ImportConfig, import_text_with_report};
/// use qa_import::report::FailureCode;
///
/// let run = import_text_with_report("nothing structured here", &ImportConfig::default());
/// assert!(run.document.is_none());
/// assert_eq!(run.report.failure_code, Some(FailureCode::NotHierarchical));
/// ```
pub fn import_text_with_report(raw_text: &str, config: &ImportConfig) -> ImportRun {
    let mut parser = HierarchicalParser::with_options(raw_text, config.parse_options());
    let document = parser.parse();
    let verdict = parser.verdict().unwrap_or_default();
    let diagnostics = parser.diagnostics().clone();
    let warnings = parser.warnings().to_vec();

    let confidence = diagnostics
        .format_scores
        .iter()
        .find(|score| score.format == DocumentFormat::Hierarchical)
        .map_or(0.0, |score| score.score);

    let (success, failure_code, failure_detail) = if diagnostics.relevant_lines == 0 {
        (
            false,
            Some(FailureCode::EmptyInput),
            Some("Import text is empty".to_string()),
        )
    } else if config.parsing.require_hierarchical && !verdict.is_hierarchical() {
        (
            false,
            Some(FailureCode::NotHierarchical),
            Some(format!(
                "Text looks {} (confidence {:.2}), not hierarchical",
                verdict.format, verdict.confidence
            )),
        )
    } else if document.is_empty() {
        (
            false,
            Some(FailureCode::NoTestCases),
            Some("Could not detect structured test cases".to_string()),
        )
    } else {
        (true, None, None)
    };

    let validation_errors = validate_document(&document)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let report = ImportReport {
        contract_version: DOCUMENT_CONTRACT_VERSION.to_string(),
        source: None,
        success,
        accepted: false,
        quality_tier: QualityTier::Failed,
        quality_reasons: Vec::new(),
        failure_code,
        failure_detail,
        selected_format: verdict.format.label().to_string(),
        format_scores: report::to_format_score_reports(&diagnostics.format_scores),
        confidence,
        coverage: diagnostics.coverage(),
        relevant_lines: diagnostics.relevant_lines,
        recognized_lines: diagnostics.recognized_lines,
        unresolved_lines: diagnostics.unresolved_lines,
        lenient_finalizations: diagnostics.lenient_finalizations,
        test_case_count: document.test_cases.len(),
        section_count: document.sections.len(),
        priority_count: document.priorities.len(),
        recommendation_count: document.automation.len(),
        warnings,
        validation_errors,
    };

    let run = ImportRun {
        document: success.then_some(document),
        report,
    };
    let run = quality::apply_quality_policy(run, config.quality_policy());
    info!(
        format = %run.report.selected_format,
        accepted = run.report.accepted,
        test_cases = run.report.test_case_count,
        "Import finished"
    );
    run
}

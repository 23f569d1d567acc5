//! Structured import reporting.

use serde::{Deserialize, Serialize};

use crate::parser::FormatScore;

/// Structured failure code for imports that produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// Input was empty or whitespace only.
    EmptyInput,
    /// Classification picked a non-hierarchical format.
    NotHierarchical,
    /// No `TC###:` test cases were found.
    NoTestCases,
    /// A document was parsed but rejected by quality policy.
    QualityRejected,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty_input"),
            Self::NotHierarchical => write!(f, "not_hierarchical"),
            Self::NoTestCases => write!(f, "no_test_cases"),
            Self::QualityRejected => write!(f, "quality_rejected"),
        }
    }
}

/// Weighted score entry for one document format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatScoreReport {
    pub format: String,
    pub score: f64,
}

pub fn to_format_score_reports(scores: &[FormatScore]) -> Vec<FormatScoreReport> {
    scores
        .iter()
        .map(|score| FormatScoreReport {
            format: score.format.label().to_string(),
            score: score.score,
        })
        .collect()
}

/// Quality tier assigned to one import report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    High,
    Medium,
    Low,
    Failed,
}

/// Per-input import report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Document contract version the report describes.
    pub contract_version: String,
    /// Where the text came from (file path, `<stdin>`), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub success: bool,
    pub accepted: bool,
    pub quality_tier: QualityTier,
    pub quality_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<FailureCode>,
    /// Human-readable detail about the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<String>,
    pub selected_format: String,
    pub format_scores: Vec<FormatScoreReport>,
    /// Hierarchical confidence of the input.
    pub confidence: f64,
    pub coverage: f64,
    pub relevant_lines: usize,
    pub recognized_lines: usize,
    pub unresolved_lines: Vec<String>,
    pub lenient_finalizations: usize,
    pub test_case_count: usize,
    pub section_count: usize,
    pub priority_count: usize,
    pub recommendation_count: usize,
    pub warnings: Vec<String>,
    pub validation_errors: Vec<String>,
}

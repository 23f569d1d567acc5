//! Quality gating for parsed documents.

use crate::ImportRun;
use crate::report::{FailureCode, ImportReport, QualityTier};

/// Default minimum hierarchical confidence (0.6) for acceptance.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Default minimum line coverage (0.2) for acceptance.
pub const DEFAULT_MIN_COVERAGE: f64 = 0.2;

/// Thresholds a parsed document must meet to be handed to persistence.
///
/// # Examples
///
/// ```
/// use qa_import::quality::ImportQualityPolicy;
///
/// let policy = ImportQualityPolicy::default();
/// assert_eq!(policy.min_confidence, 0.6);
///
/// let permissive = ImportQualityPolicy::permissive();
/// assert_eq!(permissive.min_confidence, 0.0);
/// assert!(permissive.allow_low_quality);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportQualityPolicy {
    pub min_confidence: f64,
    pub min_coverage: f64,
    pub allow_low_quality: bool,
}

impl Default for ImportQualityPolicy {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_coverage: DEFAULT_MIN_COVERAGE,
            allow_low_quality: false,
        }
    }
}

impl ImportQualityPolicy {
    pub fn permissive() -> Self {
        Self {
            min_confidence: 0.0,
            min_coverage: 0.0,
            allow_low_quality: true,
        }
    }
}

/// Outcome of grading one run.
struct QualityAssessment {
    accepted: bool,
    tier: QualityTier,
    /// Threshold misses. Any entry rejects the document unless overridden.
    rejections: Vec<String>,
    /// Structural problems that cap the tier at `Low` without rejecting.
    concerns: Vec<String>,
}

/// Threshold checks against the policy.
fn threshold_misses(report: &ImportReport, policy: ImportQualityPolicy) -> Vec<String> {
    let mut misses = Vec::new();
    if report.confidence < policy.min_confidence {
        misses.push(format!(
            "confidence {:.2} below minimum {:.2}",
            report.confidence, policy.min_confidence
        ));
    }
    if report.coverage < policy.min_coverage {
        misses.push(format!(
            "coverage {:.2} below minimum {:.2}",
            report.coverage, policy.min_coverage
        ));
    }
    misses
}

/// Problems with the parsed cases themselves: validation errors, or more
/// than half of the cases closed without an expected result.
fn structural_concerns(report: &ImportReport) -> Vec<String> {
    let mut concerns = Vec::new();
    if !report.validation_errors.is_empty() {
        concerns.push(format!(
            "{} validation error(s) in the parsed document",
            report.validation_errors.len()
        ));
    }
    if report.lenient_finalizations * 2 > report.test_case_count {
        concerns.push(format!(
            "{} of {} test cases have no expected result",
            report.lenient_finalizations, report.test_case_count
        ));
    }
    concerns
}

fn assess(report: &ImportReport, policy: ImportQualityPolicy) -> QualityAssessment {
    if !report.success {
        let reason = report
            .failure_detail
            .clone()
            .unwrap_or_else(|| "Import did not produce a document".to_string());
        return QualityAssessment {
            accepted: false,
            tier: QualityTier::Failed,
            rejections: vec![reason],
            concerns: Vec::new(),
        };
    }

    let rejections = threshold_misses(report, policy);
    let concerns = structural_concerns(report);

    let tier = if !rejections.is_empty() || !concerns.is_empty() {
        QualityTier::Low
    } else if report.confidence >= 0.9
        && report.coverage >= 0.8
        && report.lenient_finalizations == 0
    {
        QualityTier::High
    } else {
        QualityTier::Medium
    };

    QualityAssessment {
        accepted: rejections.is_empty() || policy.allow_low_quality,
        tier,
        rejections,
        concerns,
    }
}

/// Grades `run` against `policy`, dropping the document when rejected.
///
/// Threshold misses reject the document unless `allow_low_quality` is set.
/// Structural concerns only lower the tier.
pub fn apply_quality_policy(mut run: ImportRun, policy: ImportQualityPolicy) -> ImportRun {
    let assessment = assess(&run.report, policy);
    let report = &mut run.report;
    report.accepted = assessment.accepted;
    report.quality_tier = assessment.tier;
    report.quality_reasons = assessment
        .rejections
        .iter()
        .chain(&assessment.concerns)
        .cloned()
        .collect();

    if assessment.accepted {
        if report.success && !assessment.rejections.is_empty() {
            report
                .quality_reasons
                .push("accepted by low-quality override".to_string());
        }
        return run;
    }

    if report.success {
        let reason = assessment.rejections.join("; ");
        report
            .warnings
            .push(format!("Quality gate rejected document: {reason}"));
        report.failure_code = Some(FailureCode::QualityRejected);
        report.failure_detail = Some(reason);
    }
    report.success = false;
    run.document = None;
    run
}

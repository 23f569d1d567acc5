//! Format classification with weighted scoring.
//!
//! Every [`DocumentFormat`] is scored independently from the structural
//! signals found in the normalized lines. Scores are clamped to `[0, 1]` and
//! do not form a distribution.

use std::collections::{BTreeMap, HashSet};

use qa_import_core::{DocumentFormat, FormatVerdict};

use super::{FormatScore, PATTERNS};

/// Columns needed before comma or semicolon separated lines count as a table.
const MIN_SOFT_DELIMITER_COUNT: usize = 2;

/// Structural signals counted over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub total_lines: usize,
    pub section_headers: usize,
    pub subsection_headers: usize,
    pub id_lines: usize,
    pub expected_lines: usize,
    /// Id lines followed by an expected-result line before the next id line.
    pub complete_pairs: usize,
    pub field_labels: usize,
    pub distinct_field_labels: usize,
    pub numbered_steps: usize,
}

impl SignalCounts {
    pub fn collect(lines: &[&str]) -> Self {
        let mut counts = Self {
            total_lines: lines.len(),
            ..Self::default()
        };
        let mut pair_open = false;
        let mut labels: HashSet<String> = HashSet::new();

        for line in lines {
            if PATTERNS.section_header.is_match(line) {
                counts.section_headers += 1;
                continue;
            }
            if PATTERNS.subsection_header.is_match(line) {
                counts.subsection_headers += 1;
                continue;
            }
            if PATTERNS.test_case_line.is_match(line) {
                counts.id_lines += 1;
                pair_open = true;
                continue;
            }
            if PATTERNS.expected_result.is_match(line) {
                counts.expected_lines += 1;
                if pair_open {
                    counts.complete_pairs += 1;
                    pair_open = false;
                }
            }
            if let Some(caps) = PATTERNS.field_label.captures(line) {
                counts.field_labels += 1;
                if let Some(label) = caps.get(1) {
                    labels.insert(label_kind(label.as_str()));
                }
            } else if PATTERNS.numbered_step.is_match(line) {
                counts.numbered_steps += 1;
            }
        }

        counts.distinct_field_labels = labels.len();
        counts
    }

    fn hierarchical_signal_lines(&self) -> usize {
        self.section_headers + self.subsection_headers + self.id_lines + self.expected_lines
    }

    fn structured_lines(&self) -> usize {
        // Expected-result lines are also field labels; count them once.
        self.section_headers
            + self.subsection_headers
            + self.id_lines
            + self.field_labels
            + self.numbered_steps
    }
}

/// Classifies raw text and returns the best-scoring format.
///
/// Empty input yields `{ unknown, 0.0 }`.
pub fn classify_text(raw: &str) -> FormatVerdict {
    let lines = super::normalize::normalize_lines(raw);
    let refs = lines.iter().map(|line| line.text.as_str()).collect::<Vec<_>>();
    verdict_from_scores(&classify_formats(&refs))
}

/// Picks the verdict from descending scores.
pub fn verdict_from_scores(scores: &[FormatScore]) -> FormatVerdict {
    match scores.first() {
        Some(top) if top.score > 0.0 => FormatVerdict::new(top.format, top.score),
        _ => FormatVerdict::new(DocumentFormat::Unknown, 0.0),
    }
}

/// Scores normalized lines against every known format.
/// Returns a descending-sorted vector; equal scores keep declaration order.
pub fn classify_formats(lines: &[&str]) -> Vec<FormatScore> {
    let counts = SignalCounts::collect(lines);

    let mut scores = DocumentFormat::ALL
        .iter()
        .map(|&format| FormatScore {
            format,
            score: match format {
                DocumentFormat::Hierarchical => score_hierarchical(&counts),
                DocumentFormat::Flat => score_flat(&counts),
                DocumentFormat::Tabular => score_tabular(lines),
                DocumentFormat::Freeform => score_freeform(&counts),
                DocumentFormat::Unknown => {
                    if counts.total_lines == 0 {
                        0.0
                    } else {
                        0.05
                    }
                }
            },
        })
        .collect::<Vec<_>>();

    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scores
}

fn score_hierarchical(counts: &SignalCounts) -> f64 {
    if counts.section_headers == 0 && counts.subsection_headers == 0 && counts.id_lines == 0 {
        return 0.0;
    }

    let mut score = 0.0;
    if counts.section_headers > 0 {
        score += 0.30;
    }
    if counts.subsection_headers > 0 {
        score += 0.25;
    }
    if counts.complete_pairs >= 1 {
        score += 0.20;
    }
    if counts.complete_pairs >= 2 {
        score += 0.17;
    }
    if counts.id_lines > 0 {
        score += 0.05 * (counts.complete_pairs as f64 / counts.id_lines as f64);
    }
    score += 0.03 * density(counts.hierarchical_signal_lines(), counts.total_lines);

    score.clamp(0.0, 1.0)
}

fn score_flat(counts: &SignalCounts) -> f64 {
    if counts.field_labels == 0 {
        return 0.0;
    }

    let mut score = 0.2;
    score += 0.1 * counts.distinct_field_labels.min(3) as f64;
    score += 0.35 * density(counts.field_labels + counts.numbered_steps, counts.total_lines);
    score.clamp(0.0, 0.85)
}

fn score_tabular(lines: &[&str]) -> f64 {
    if lines.len() < 2 {
        return 0.0;
    }

    ['|', '\t', ',', ';']
        .iter()
        .map(|&delimiter| {
            let min_count = if matches!(delimiter, ',' | ';') {
                MIN_SOFT_DELIMITER_COUNT
            } else {
                1
            };
            let per_line = lines
                .iter()
                .map(|line| line.matches(delimiter).count())
                .collect::<Vec<_>>();

            let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
            for &count in per_line.iter().filter(|&&count| count >= min_count) {
                *histogram.entry(count).or_default() += 1;
            }
            // Modal column count; ties go to the smaller count.
            let Some((_, agreeing)) = histogram
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(count, lines)| (*count, *lines))
            else {
                return 0.0;
            };
            if agreeing < 2 {
                return 0.0;
            }
            0.9 * agreeing as f64 / lines.len() as f64
        })
        .fold(0.0, f64::max)
}

fn score_freeform(counts: &SignalCounts) -> f64 {
    if counts.total_lines == 0 {
        return 0.0;
    }
    let structured = counts.structured_lines().min(counts.total_lines);
    0.4 * (1.0 - structured as f64 / counts.total_lines as f64)
}

/// Share of `hits` in `total`, doubled and capped at 1.
fn density(hits: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (hits as f64 / total as f64 * 2.0).min(1.0)
}

fn label_kind(label: &str) -> String {
    label
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(lines: &[&str]) -> FormatScore {
        classify_formats(lines)
            .into_iter()
            .next()
            .expect("scores are never empty")
    }

    #[test]
    fn test_classify_hierarchical_document_is_confident() {
        let lines = [
            "1. AUTHENTICATION",
            "1.1 Login",
            "TC001: Valid login",
            "Enter valid credentials",
            "Expected Result: Dashboard is shown",
            "TC002: Invalid password",
            "Expected Result: Error is shown",
        ];
        let best = top(&lines);
        assert_eq!(best.format, DocumentFormat::Hierarchical);
        assert!(best.score > 0.9, "score was {}", best.score);
    }

    #[test]
    fn test_classify_hierarchical_survives_one_incomplete_case() {
        let lines = [
            "1. CHECKOUT",
            "1.1 Cart",
            "TC001: Add item",
            "Expected Result: Item added",
            "TC002: Remove item",
            "TC003: Empty cart",
            "Expected Result: Cart is empty",
            "Some trailing notes about the suite",
            "More notes",
        ];
        let best = top(&lines);
        assert_eq!(best.format, DocumentFormat::Hierarchical);
        assert!(best.score > 0.9);
    }

    #[test]
    fn test_classify_prose_is_never_hierarchical() {
        let lines = [
            "We should test the login page thoroughly.",
            "Expected Result: users can sign in",
            "Also check that logout works.",
        ];
        let scores = classify_formats(&lines);
        let hierarchical = scores
            .iter()
            .find(|s| s.format == DocumentFormat::Hierarchical)
            .unwrap();
        assert_eq!(hierarchical.score, 0.0);
        assert_ne!(scores[0].format, DocumentFormat::Hierarchical);
    }

    #[test]
    fn test_classify_flat_fields() {
        let lines = [
            "Test Case: Login with valid user",
            "Preconditions: user exists",
            "Steps:",
            "1. open the login page",
            "2. submit credentials",
            "Expected: dashboard opens",
        ];
        assert_eq!(top(&lines).format, DocumentFormat::Flat);
    }

    #[test]
    fn test_classify_pipe_table_is_tabular() {
        let lines = [
            "| ID | Title | Expected |",
            "|----|-------|----------|",
            "| 1 | Login | Dashboard |",
            "| 2 | Logout | Login page |",
        ];
        let best = top(&lines);
        assert_eq!(best.format, DocumentFormat::Tabular);
        assert!((best.score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_classify_csv_is_tabular_but_prose_commas_are_not() {
        let csv = ["id,title,expected", "1,Login,Dashboard", "2,Logout,Login page"];
        assert_eq!(top(&csv).format, DocumentFormat::Tabular);

        let prose = ["Hello, world", "Goodbye, moon"];
        assert_eq!(score_tabular(&prose), 0.0);
    }

    #[test]
    fn test_classify_empty_scores_zero_everywhere() {
        let scores = classify_formats(&[]);
        assert!(scores.iter().all(|s| s.score == 0.0));
        assert_eq!(
            verdict_from_scores(&scores),
            FormatVerdict::new(DocumentFormat::Unknown, 0.0)
        );
    }

    #[test]
    fn test_classify_text_normalizes_before_scoring() {
        let verdict = classify_text("\n\n   just a single remark   \n\n");
        assert_eq!(verdict.format, DocumentFormat::Freeform);
        assert!(verdict.confidence < 0.5);
    }
}

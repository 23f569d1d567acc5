//! Output formatting for documents, records and reports.

use qa_import_core::{ParsedDocument, TestCaseRecord};

use crate::error::Result;
use crate::report::ImportReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

impl OutputFormat {
    /// File extension used when writing this format to disk.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "md",
            Self::Table => "txt",
        }
    }
}

/// Formats a parsed document in the requested output format.
pub fn format_document(doc: &ParsedDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(doc)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(doc)?),
        OutputFormat::Markdown => Ok(document_to_markdown(doc)),
        OutputFormat::Table => Ok(document_to_table(doc)),
    }
}

/// Formats persistence records. Markdown and table share one layout.
pub fn format_records(records: &[TestCaseRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(records)?),
        OutputFormat::Markdown | OutputFormat::Table => {
            let mut out = String::new();
            for record in records {
                out.push_str(&format!(
                    "{:<8} {:<8} {:<16} {}\n",
                    record.external_id, record.priority, record.automation_status, record.title
                ));
            }
            Ok(out)
        }
    }
}

/// Formats an import report in the requested output format.
pub fn format_report(report: &ImportReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

fn document_to_markdown(doc: &ParsedDocument) -> String {
    let mut out = String::new();

    out.push_str("# Imported Test Cases\n\n");
    out.push_str(&format!("**Test cases:** {}\n\n", doc.test_cases.len()));

    for section in &doc.sections {
        out.push_str(&format!(
            "## {} ({} test cases)\n\n",
            section.title,
            section.test_case_count()
        ));
        for sub in &section.subsections {
            out.push_str(&format!("### {}\n\n", sub.title));
            if sub.test_cases.is_empty() {
                out.push_str("_No test cases._\n\n");
                continue;
            }
            out.push_str("| ID | Title | Expected Result | Priority | Automation |\n");
            out.push_str("|----|-------|-----------------|----------|------------|\n");
            for tc in &sub.test_cases {
                out.push_str(&format!(
                    "| `{}` | {} | {} | {} | {} |\n",
                    tc.id,
                    escape_cell(&tc.title),
                    escape_cell(&tc.expected_result),
                    tc.priority,
                    tc.automation_status
                ));
            }
            out.push('\n');
        }
    }

    let unindexed = doc
        .test_cases
        .iter()
        .filter(|tc| {
            let indexed = match (&tc.section, &tc.subsection) {
                (Some(section), Some(subsection)) => doc
                    .find_section(section)
                    .is_some_and(|s| s.find_subsection(subsection).is_some()),
                _ => false,
            };
            !indexed
        })
        .collect::<Vec<_>>();
    if !unindexed.is_empty() {
        out.push_str("## Ungrouped\n\n");
        for tc in unindexed {
            out.push_str(&format!("- `{}` {}\n", tc.id, tc.title));
        }
        out.push('\n');
    }

    if !doc.automation.is_empty() {
        out.push_str("## Automation Recommendations\n\n");
        for (text, strength) in &doc.automation {
            out.push_str(&format!("- {text} ({strength})\n"));
        }
        out.push('\n');
    }

    out
}

fn document_to_table(doc: &ParsedDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Test cases: {}  Sections: {}\n",
        doc.test_cases.len(),
        doc.sections.len()
    ));

    if !doc.test_cases.is_empty() {
        out.push_str(&format!(
            "\n  {:<8} {:<8} {:<16} {}\n",
            "ID", "PRIORITY", "AUTOMATION", "TITLE"
        ));
        for tc in &doc.test_cases {
            out.push_str(&format!(
                "  {:<8} {:<8} {:<16} {}\n",
                tc.id, tc.priority, tc.automation_status, tc.title
            ));
        }
    }

    out
}

fn report_to_markdown(report: &ImportReport) -> String {
    let mut out = String::new();

    out.push_str("# Import Report\n\n");
    if let Some(source) = &report.source {
        out.push_str(&format!("**Source:** {source}\n\n"));
    }
    out.push_str(&format!("**Success:** {}\n\n", report.success));
    out.push_str(&format!("**Quality:** {:?}\n\n", report.quality_tier));
    out.push_str(&format!("**Format:** {}\n\n", report.selected_format));
    out.push_str(&format!(
        "**Confidence:** {:.0}%\n\n",
        report.confidence * 100.0
    ));
    out.push_str(&format!("**Coverage:** {:.0}%\n\n", report.coverage * 100.0));
    out.push_str(&format!("**Test cases:** {}\n\n", report.test_case_count));

    if let Some(ref code) = report.failure_code {
        out.push_str(&format!("**Failure:** {code}"));
        if let Some(ref detail) = report.failure_detail {
            out.push_str(&format!(" ({detail})"));
        }
        out.push_str("\n\n");
    }

    if !report.format_scores.is_empty() {
        out.push_str("## Format Scores\n\n");
        out.push_str("| Format | Score |\n");
        out.push_str("|--------|-------|\n");
        for score in &report.format_scores {
            out.push_str(&format!("| {} | {:.2} |\n", score.format, score.score));
        }
        out.push('\n');
    }

    for (heading, items) in [
        ("Warnings", &report.warnings),
        ("Validation Errors", &report.validation_errors),
        ("Unresolved Lines", &report.unresolved_lines),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("## {heading}\n\n"));
        for item in items {
            out.push_str(&format!("- {item}\n"));
        }
        out.push('\n');
    }

    out
}

fn report_to_table(report: &ImportReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Success: {}  Quality: {:?}  Format: {}  Confidence: {:.0}%  Coverage: {:.0}%\n",
        report.success,
        report.quality_tier,
        report.selected_format,
        report.confidence * 100.0,
        report.coverage * 100.0
    ));
    out.push_str(&format!(
        "Test cases: {}  Sections: {}  Priorities: {}  Recommendations: {}\n",
        report.test_case_count,
        report.section_count,
        report.priority_count,
        report.recommendation_count
    ));

    if let Some(ref code) = report.failure_code {
        out.push_str(&format!("Failure: {code}"));
        if let Some(ref detail) = report.failure_detail {
            out.push_str(&format!(" ({detail})"));
        }
        out.push('\n');
    }

    for warning in &report.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }

    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

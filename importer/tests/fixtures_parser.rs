use std::fs;
use std::path::PathBuf;

use qa_import::config::ImportConfig;
use qa_import::parser::HierarchicalParser;
use qa_import::parser::assemble::MatchStrategy;
use qa_import::report::{FailureCode, QualityTier};
use qa_import::{classify, import_text_with_report, parse_hierarchical};
use qa_import_core::{AutomationStatus, DocumentFormat, Priority, validate_document};

#[test]
fn test_checkout_fixture_is_hierarchical_with_high_confidence() {
    let text = fixture("checkout-suite.txt");
    let verdict = classify(&text);
    assert_eq!(verdict.format, DocumentFormat::Hierarchical);
    assert!(verdict.confidence > 0.9, "confidence was {}", verdict.confidence);
}

#[test]
fn test_checkout_fixture_builds_section_tree() {
    let doc = parse_hierarchical(&fixture("checkout-suite.txt"));

    assert_eq!(doc.test_cases.len(), 6);
    let ids = doc.test_cases.iter().map(|tc| tc.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["TC001", "TC002", "TC003", "TC004", "TC005", "TC006"]);

    let titles = doc.sections.iter().map(|s| s.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["AUTHENTICATION", "CHECKOUT FLOW"]);

    let auth = doc.find_section("1. AUTHENTICATION").expect("auth section");
    assert_eq!(auth.subsections.len(), 2);
    assert_eq!(auth.subsections[0].title, "Login Form");
    assert_eq!(auth.subsections[0].test_cases.len(), 2);
    assert_eq!(auth.subsections[1].title, "Password Reset");
    assert_eq!(auth.subsections[1].test_cases[0].id, "TC003");

    let payment = doc
        .find_section("2. CHECKOUT FLOW")
        .and_then(|s| s.find_subsection("2.2 Payment"))
        .expect("payment subsection");
    assert_eq!(payment.test_cases[0].id, "TC006");

    assert_eq!(doc.indexed_test_cases().count(), 6);
    assert!(validate_document(&doc).is_empty());
}

#[test]
fn test_checkout_fixture_descriptions_and_expected_results() {
    let doc = parse_hierarchical(&fixture("checkout-suite.txt"));
    let tc001 = doc.find_test_case("TC001").expect("TC001");
    assert_eq!(tc001.title, "Basic login flow");
    assert_eq!(
        tc001.description,
        "Open the login page Enter a valid username and password"
    );
    assert_eq!(tc001.expected_result, "The dashboard is shown");
    assert_eq!(tc001.section.as_deref(), Some("1. AUTHENTICATION"));
    assert_eq!(tc001.subsection.as_deref(), Some("1.1 Login Form"));

    let tc004 = doc.find_test_case("TC004").expect("TC004");
    assert!(tc004.description.is_empty());
    assert_eq!(tc004.expected_result, "The cart badge shows 1");
}

#[test]
fn test_checkout_fixture_priorities_follow_tiers() {
    let doc = parse_hierarchical(&fixture("checkout-suite.txt"));

    let keys = doc.priorities.keys().map(String::as_str).collect::<Vec<_>>();
    assert_eq!(keys, vec!["TC001", "TC006", "TC002", "TC004", "TC005", "TC003"]);

    let priority = |id: &str| doc.find_test_case(id).map(|tc| tc.priority);
    assert_eq!(priority("TC001"), Some(Priority::High));
    assert_eq!(priority("TC006"), Some(Priority::High));
    assert_eq!(priority("TC002"), Some(Priority::Medium));
    assert_eq!(priority("TC004"), Some(Priority::Medium));
    assert_eq!(priority("TC005"), Some(Priority::Low));
    assert_eq!(priority("TC003"), Some(Priority::Lowest));
}

#[test]
fn test_checkout_fixture_automation_defaults_to_high_tier_only() {
    let mut parser = HierarchicalParser::new(&fixture("checkout-suite.txt"));
    let doc = parser.parse();

    assert_eq!(doc.automation.len(), 2);
    assert_eq!(doc.automation["Basic login flow"], AutomationStatus::High);
    assert_eq!(doc.automation["saved card"], AutomationStatus::High);

    let status = |id: &str| doc.find_test_case(id).map(|tc| tc.automation_status);
    assert_eq!(status("TC001"), Some(AutomationStatus::High));
    assert_eq!(status("TC006"), Some(AutomationStatus::High));
    assert_eq!(status("TC005"), Some(AutomationStatus::NotPrioritized));

    assert_eq!(
        parser.diagnostics().unresolved_lines,
        vec![
            "Medium Priority for Automation".to_string(),
            "- Remove item".to_string()
        ]
    );
}

#[test]
fn test_checkout_fixture_extended_automation_tiers() {
    let mut config = ImportConfig::default();
    config.parsing.extended_automation_tiers = true;
    config.parsing.automation_matching = MatchStrategy::LongestMatch;

    let mut parser =
        HierarchicalParser::with_options(&fixture("checkout-suite.txt"), config.parse_options());
    let doc = parser.parse();

    assert_eq!(doc.automation.len(), 3);
    assert_eq!(doc.automation["Remove item"], AutomationStatus::Medium);
    let tc005 = doc.find_test_case("TC005").expect("TC005");
    assert_eq!(tc005.automation_status, AutomationStatus::Medium);
    assert!(parser.diagnostics().unresolved_lines.is_empty());
}

#[test]
fn test_checkout_fixture_import_is_accepted_at_high_quality() {
    let run = import_text_with_report(&fixture("checkout-suite.txt"), &ImportConfig::default());
    assert!(run.report.success);
    assert!(run.report.accepted);
    assert_eq!(run.report.quality_tier, QualityTier::High);
    assert_eq!(run.report.selected_format, "hierarchical");
    assert_eq!(run.report.test_case_count, 6);
    assert_eq!(run.report.section_count, 2);
    assert_eq!(run.report.priority_count, 6);
    assert_eq!(run.report.recommendation_count, 2);
    assert!(run.report.warnings.is_empty());
    assert!(run.report.validation_errors.is_empty());
    assert!(run.document.is_some());
}

#[test]
fn test_crlf_input_parses_like_lf_input() {
    let text = fixture("checkout-suite.txt");
    let crlf = text.replace('\n', "\r\n");
    assert_eq!(parse_hierarchical(&crlf), parse_hierarchical(&text));
}

#[test]
fn test_parsing_is_idempotent() {
    let text = fixture("checkout-suite.txt");
    let mut parser = HierarchicalParser::new(&text);
    let first = parser.parse();
    let second = parser.parse();
    assert_eq!(first, second);
    assert_eq!(first, parse_hierarchical(&text));
}

#[test]
fn test_lenient_fixture_recovers_incomplete_cases() {
    let mut parser = HierarchicalParser::new(&fixture("lenient-notes.txt"));
    let doc = parser.parse();

    assert_eq!(doc.test_cases.len(), 3);
    let tc010 = &doc.test_cases[0];
    assert_eq!(tc010.id, "TC010");
    assert_eq!(tc010.description, "Click export and choose CSV the file downloads");
    assert!(tc010.expected_result.is_empty());

    assert_eq!(doc.test_cases[1].expected_result, "A PDF opens in a new tab");
    assert_eq!(doc.test_cases[2].description, "Choose a date range with no data");
    assert!(doc.test_cases[2].expected_result.is_empty());

    let diagnostics = parser.diagnostics();
    assert_eq!(diagnostics.lenient_finalizations, 2);
    assert_eq!(
        diagnostics.unresolved_lines,
        vec!["Expected Result: stray result with no open case".to_string()]
    );
    assert_eq!(
        parser.warnings(),
        &[
            "TC010 has no expected result".to_string(),
            "TC012 has no expected result".to_string()
        ]
    );
}

#[test]
fn test_lenient_fixture_is_kept_at_low_quality() {
    let run = import_text_with_report(&fixture("lenient-notes.txt"), &ImportConfig::default());
    assert!(run.report.accepted);
    assert_eq!(run.report.quality_tier, QualityTier::Low);
    assert_eq!(run.report.lenient_finalizations, 2);
    assert_eq!(
        run.report.quality_reasons,
        vec!["2 of 3 test cases have no expected result".to_string()]
    );
    assert!(run.document.is_some());
}

#[test]
fn test_flat_fixture_is_not_hierarchical() {
    let text = fixture("flat-form.txt");
    let verdict = classify(&text);
    assert_eq!(verdict.format, DocumentFormat::Flat);

    let run = import_text_with_report(&text, &ImportConfig::default());
    assert_eq!(run.report.failure_code, Some(FailureCode::NotHierarchical));
    let hierarchical = run
        .report
        .format_scores
        .iter()
        .find(|score| score.format == "hierarchical")
        .expect("hierarchical score");
    assert_eq!(hierarchical.score, 0.0);
}

#[test]
fn test_prose_fixture_yields_no_test_cases() {
    let text = fixture("release-notes.txt");
    assert_eq!(classify(&text).format, DocumentFormat::Freeform);

    let doc = parse_hierarchical(&text);
    assert!(doc.is_empty());
    assert!(doc.priorities.is_empty());
    assert!(doc.automation.is_empty());
}

#[test]
fn test_single_block_round_trip() {
    let doc = parse_hierarchical("1. S\n1.1 Sub\nTC001: T\nExpected Result: R");
    assert_eq!(doc.test_cases.len(), 1);
    let tc = &doc.test_cases[0];
    assert_eq!(tc.id, "TC001");
    assert_eq!(tc.title, "T");
    assert!(tc.section.as_deref().is_some_and(|s| s.contains('S')));
    assert!(tc.subsection.as_deref().is_some_and(|s| s.contains("Sub")));
    assert_eq!(tc.expected_result, "R");
}

#[test]
fn test_priority_block_alone_populates_map() {
    let doc = parse_hierarchical("TEST EXECUTION PRIORITY\nP0 - Critical (Must Pass)\n- TC001");
    assert_eq!(doc.priorities.get("TC001"), Some(&Priority::High));
    assert!(doc.test_cases.is_empty());
}

#[test]
fn test_automation_block_alone_populates_map() {
    let doc = parse_hierarchical(
        "AUTOMATION RECOMMENDATIONS\nHigh Priority for Automation\n- Basic login flow\n- User authentication",
    );
    assert_eq!(doc.automation.len(), 2);
    assert_eq!(doc.automation.get("Basic login flow"), Some(&AutomationStatus::High));
    assert_eq!(doc.automation.get("User authentication"), Some(&AutomationStatus::High));
}

#[test]
fn test_empty_input_yields_empty_document_and_zero_scores() {
    let doc = parse_hierarchical("");
    assert!(doc.is_empty());
    assert!(doc.sections.is_empty());
    assert!(doc.priorities.is_empty());
    assert!(doc.automation.is_empty());

    let mut parser = HierarchicalParser::new("");
    parser.parse();
    assert!(
        parser
            .diagnostics()
            .format_scores
            .iter()
            .all(|score| score.score == 0.0)
    );
    assert_eq!(classify("").confidence, 0.0);
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}

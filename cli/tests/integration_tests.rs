use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use qa_import::config::ImportConfig;
use serde_json::Value;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_qa-import"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("importer")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .output()
        .expect("failed to run qa-import")
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(bin())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn qa-import");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for qa-import")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

#[test]
fn classify_reports_hierarchical_verdict_and_all_scores() {
    let input = fixture("checkout-suite.txt");
    let output = run(&["classify", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["format"], "hierarchical");
    assert!(json["confidence"].as_f64().unwrap() > 0.9);
    assert_eq!(json["scores"].as_array().unwrap().len(), 5);
    assert_eq!(json["scores"][0]["format"], "hierarchical");
}

#[test]
fn classify_empty_stdin_is_unknown() {
    let output = run_with_stdin(&["classify"], "");
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["format"], "unknown");
    assert_eq!(json["confidence"].as_f64(), Some(0.0));
    assert!(
        json["scores"]
            .as_array()
            .unwrap()
            .iter()
            .all(|score| score["score"].as_f64() == Some(0.0))
    );
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_outputs_document_json() {
    let input = fixture("checkout-suite.txt");
    let output = run(&["parse", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["test_cases"].as_array().unwrap().len(), 6);
    assert_eq!(json["sections"].as_array().unwrap().len(), 2);
    assert_eq!(json["priorities"]["TC001"], "high");
    assert_eq!(json["test_cases"][0]["automation_status"], "High");
}

#[test]
fn parse_reads_stdin() {
    let output = run_with_stdin(
        &["parse"],
        "1. S\n1.1 Sub\nTC001: T\nExpected Result: R\nTC002: U\nExpected Result: V\n",
    );
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["test_cases"][0]["id"], "TC001");
    assert_eq!(json["test_cases"][0]["expected_result"], "R");
}

#[test]
fn parse_records_stamp_group_key() {
    let input = fixture("checkout-suite.txt");
    let output = run(&[
        "parse",
        "--input",
        input.to_str().unwrap(),
        "--records",
        "--group",
        "suite-7",
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|record| record["group_key"] == "suite-7"));
    assert_eq!(records[0]["section_title"], "AUTHENTICATION");
}

#[test]
fn parse_with_report_includes_quality() {
    let input = fixture("checkout-suite.txt");
    let output = run(&["parse", "--input", input.to_str().unwrap(), "--with-report"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert!(json["document"].is_object());
    assert_eq!(json["report"]["quality_tier"], "high");
    assert_eq!(json["report"]["accepted"], true);
    assert!(
        json["report"]["source"]
            .as_str()
            .unwrap()
            .ends_with("checkout-suite.txt")
    );
}

#[test]
fn parse_rejects_prose() {
    let input = fixture("release-notes.txt");
    let output = run(&["parse", "--input", input.to_str().unwrap()]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "stderr was: {stderr}");
    assert!(stderr.contains("not hierarchical"), "stderr was: {stderr}");
}

#[test]
fn parse_force_reports_missing_test_cases() {
    let input = fixture("release-notes.txt");
    let output = run(&["parse", "--input", input.to_str().unwrap(), "--force"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Could not detect structured test cases"),
        "stderr was: {stderr}"
    );
}

#[test]
fn parse_rejects_out_of_range_confidence() {
    let input = fixture("checkout-suite.txt");
    let output = run(&[
        "parse",
        "--input",
        input.to_str().unwrap(),
        "--min-confidence",
        "1.5",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--min-confidence must be between 0.0 and 1.0"));
}

#[test]
fn parse_markdown_renders_tree() {
    let input = fixture("checkout-suite.txt");
    let output = run(&[
        "parse",
        "--input",
        input.to_str().unwrap(),
        "--format",
        "markdown",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## AUTHENTICATION"));
    assert!(stdout.contains("### Payment"));
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

#[test]
fn batch_writes_outputs_and_summary() {
    let out = tempfile::tempdir().expect("failed to create temp dir");
    let good = fixture("checkout-suite.txt");
    let bad = fixture("release-notes.txt");

    let output = run(&[
        "batch",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--jobs",
        "2",
    ]);
    assert!(output.status.success());

    assert!(out.path().join("checkout-suite.json").exists());
    assert!(!out.path().join("release-notes.json").exists());

    let raw = fs::read_to_string(out.path().join("summary.json")).unwrap();
    let summary: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["succeeded"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["test_cases"], 6);
    assert!(summary["generated_at"].is_string());

    let failed = summary["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["success"] == false)
        .expect("failed entry");
    assert_eq!(failed["report"]["failure_code"], "not_hierarchical");
}

#[test]
fn batch_keeps_inputs_with_shared_stems_apart() {
    let src = tempfile::tempdir().expect("failed to create temp dir");
    let out = tempfile::tempdir().expect("failed to create temp dir");
    let first = src.path().join("a").join("suite.txt");
    let second = src.path().join("b").join("suite.txt");
    fs::create_dir_all(first.parent().unwrap()).unwrap();
    fs::create_dir_all(second.parent().unwrap()).unwrap();
    fs::write(
        &first,
        "1. A\n1.1 X\nTC001: One\nExpected Result: ok\nTC002: Two\nExpected Result: ok\n",
    )
    .unwrap();
    fs::write(
        &second,
        "1. B\n1.1 Y\nTC101: Three\nExpected Result: ok\nTC102: Four\nExpected Result: ok\n",
    )
    .unwrap();

    let output = run(&[
        "batch",
        first.to_str().unwrap(),
        second.to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let mut files = fs::read_dir(out.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    files.sort();
    assert_eq!(files, vec!["suite-2.json", "suite.json", "summary.json"]);

    let read_ids = |name: &str| -> Vec<String> {
        let raw = fs::read_to_string(out.path().join(name)).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        doc["test_cases"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tc| tc["id"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(read_ids("suite.json"), vec!["TC001", "TC002"]);
    assert_eq!(read_ids("suite-2.json"), vec!["TC101", "TC102"]);

    let raw = fs::read_to_string(out.path().join("summary.json")).unwrap();
    let summary: Value = serde_json::from_str(&raw).unwrap();
    let outputs = summary["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["output_file"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(outputs, vec!["suite.json", "suite-2.json"]);
    assert_eq!(summary["test_cases"], 4);
}

// ---------------------------------------------------------------------------
// init-config
// ---------------------------------------------------------------------------

#[test]
fn init_config_writes_loadable_defaults() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("nested").join("qa-import.yaml");

    let output = run(&["init-config", "--output", path.to_str().unwrap()]);
    assert!(output.status.success());

    let config = ImportConfig::load(&path).expect("config should load");
    assert_eq!(config, ImportConfig::default());
}

#[test]
fn parse_honors_config_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        "parsing:\n  default_priority: low\n  extended_automation_tiers: true\n",
    )
    .unwrap();

    let input = fixture("checkout-suite.txt");
    let output = run(&[
        "parse",
        "--input",
        input.to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let tc005 = json["test_cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|tc| tc["id"] == "TC005")
        .expect("TC005");
    assert_eq!(tc005["automation_status"], "Medium");
}

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use qa_import::config::ImportConfig;
use qa_import::output::{OutputFormat, format_document, format_records, format_report};
use qa_import::parser::classify::{classify_formats, verdict_from_scores};
use qa_import::parser::normalize::normalize_lines;
use qa_import::report::{FormatScoreReport, ImportReport, to_format_score_reports};
use qa_import::{ImportRun, import_text_with_report};
use qa_import_core::{FormatVerdict, ParsedDocument};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Parser)]
#[command(name = "qa-import")]
#[command(about = "Classify and import pasted QA test-case text")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score text against every known format and print the verdict.
    Classify(ClassifyArgs),
    /// Parse hierarchical test-case text into a document.
    Parse(ParseArgs),
    /// Parse many files in parallel and write one output per input.
    Batch(BatchArgs),
    /// Write the default configuration file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    /// File to classify (reads stdin when omitted).
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// File to parse (reads stdin when omitted).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Output both the document and the import report.
    #[arg(long)]
    with_report: bool,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the minimum confidence (0.0-1.0).
    #[arg(long)]
    min_confidence: Option<f64>,
    /// Keep low-quality documents instead of rejecting them.
    #[arg(long)]
    allow_low_quality: bool,
    /// Parse even when the text is not classified as hierarchical.
    #[arg(long)]
    force: bool,
    /// Emit flat persistence records instead of the document.
    #[arg(long, requires = "group")]
    records: bool,
    /// Group key stamped on every record.
    #[arg(long)]
    group: Option<String>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Text files to import.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory.
    #[arg(long)]
    output: PathBuf,
    /// Number of parallel jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format for document files.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Destination path for the YAML file.
    #[arg(long)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Classify(args) => run_classify(args),
        Command::Parse(args) => run_parse(args),
        Command::Batch(args) => run_batch(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: Option<&Path>) -> Result<(String, String), String> {
    match input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
            Ok((path.display().to_string(), text))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            Ok(("<stdin>".to_string(), text))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ImportConfig, String> {
    match path {
        Some(path) => ImportConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(ImportConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// classify command
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ClassifyOutput {
    #[serde(flatten)]
    verdict: FormatVerdict,
    scores: Vec<FormatScoreReport>,
}

fn run_classify(args: ClassifyArgs) -> Result<(), String> {
    let (_, text) = read_input(args.input.as_deref())?;
    let lines = normalize_lines(&text);
    let refs = lines.iter().map(|line| line.text.as_str()).collect::<Vec<_>>();
    let scores = classify_formats(&refs);

    let output = ClassifyOutput {
        verdict: verdict_from_scores(&scores),
        scores: to_format_score_reports(&scores),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("Failed to serialize verdict: {err}"))?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// parse command
// ---------------------------------------------------------------------------

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(min_confidence) = args.min_confidence {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err("--min-confidence must be between 0.0 and 1.0".to_string());
        }
        config.quality.min_confidence = min_confidence;
    }
    if args.allow_low_quality {
        config.quality.allow_low_quality = true;
    }
    if args.force {
        config.parsing.require_hierarchical = false;
    }

    let (source, text) = read_input(args.input.as_deref())?;
    let mut run = import_text_with_report(&text, &config);
    run.report.source = Some(source);

    if args.with_report {
        return print_with_report(&run, args.format);
    }

    let Some(document) = run.document else {
        let detail = run
            .report
            .failure_detail
            .unwrap_or_else(|| "import rejected".to_string());
        return Err(format!(
            "Failed to import '{}': {detail}",
            run.report.source.unwrap_or_default()
        ));
    };

    let formatted = if args.records {
        let group = args.group.unwrap_or_default();
        format_records(&document.to_records(&group), args.format)
    } else {
        format_document(&document, args.format)
    };
    let output = formatted.map_err(|err| format!("Failed to format output: {err}"))?;
    println!("{output}");
    Ok(())
}

fn print_with_report(run: &ImportRun, format: OutputFormat) -> Result<(), String> {
    #[derive(serde::Serialize)]
    struct ParseOutput<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        document: Option<&'a ParsedDocument>,
        report: &'a ImportReport,
    }

    let output = ParseOutput {
        document: run.document.as_ref(),
        report: &run.report,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&output)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{yaml}");
        }
        _ => {
            if let Some(ref document) = run.document {
                print!(
                    "{}",
                    format_document(document, format).map_err(|e| e.to_string())?
                );
            }
            print!(
                "{}",
                format_report(&run.report, format).map_err(|e| e.to_string())?
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// batch command
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
struct BatchEntry {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    report: Option<ImportReport>,
}

#[derive(Debug, serde::Serialize)]
struct BatchSummary {
    tool_version: String,
    generated_at: chrono::DateTime<chrono::Utc>,
    total: usize,
    succeeded: usize,
    failed: usize,
    test_cases: usize,
    entries: Vec<BatchEntry>,
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let config = load_config(args.config.as_deref())?;

    fs::create_dir_all(&args.output).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            args.output.display()
        )
    })?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let format = args.format;
    let output_dir = &args.output;
    let file_names = output_file_names(&args.inputs, format);
    let entries: Vec<BatchEntry> = pool.install(|| {
        args.inputs
            .par_iter()
            .zip(file_names.par_iter())
            .map(|(input, file_name)| import_one(input, file_name, output_dir, format, &config))
            .collect()
    });

    let succeeded = entries.iter().filter(|entry| entry.success).count();
    let test_cases = entries
        .iter()
        .filter(|entry| entry.success)
        .filter_map(|entry| entry.report.as_ref())
        .map(|report| report.test_case_count)
        .sum();
    let summary = BatchSummary {
        tool_version: PACKAGE_VERSION.to_string(),
        generated_at: chrono::Utc::now(),
        total: entries.len(),
        succeeded,
        failed: entries.len() - succeeded,
        test_cases,
        entries,
    };

    let summary_path = args.output.join(SUMMARY_FILE);
    let raw = serde_json::to_string_pretty(&summary)
        .map_err(|err| format!("Failed to serialize summary: {err}"))?;
    fs::write(&summary_path, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", summary_path.display()))?;

    println!(
        "Imported {}/{} file(s) ({} test case(s)).",
        summary.succeeded, summary.total, summary.test_cases
    );
    if summary.failed > 0 {
        let failures = summary
            .entries
            .iter()
            .filter(|entry| !entry.success)
            .map(|entry| entry.input.as_str())
            .collect::<Vec<_>>();
        eprintln!(
            "{} import failure(s): {}",
            summary.failed,
            failures.join(", ")
        );
    }

    Ok(())
}

/// Assigns every input a distinct output file name. Inputs sharing a stem get
/// `-2`, `-3`, ... suffixes in input order, and the summary name is reserved.
fn output_file_names(inputs: &[PathBuf], format: OutputFormat) -> Vec<String> {
    let ext = format.extension();
    let mut taken: HashSet<String> = HashSet::from([SUMMARY_FILE.to_string()]);

    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| "document".to_string());
            let mut candidate = format!("{stem}.{ext}");
            let mut suffix = 2;
            while taken.contains(&candidate) {
                candidate = format!("{stem}-{suffix}.{ext}");
                suffix += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn import_one(
    input: &Path,
    file_name: &str,
    output_dir: &Path,
    format: OutputFormat,
    config: &ImportConfig,
) -> BatchEntry {
    let name = input.display().to_string();
    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(err) => {
            return BatchEntry {
                input: name,
                output_file: None,
                success: false,
                error: Some(format!("Failed to read: {err}")),
                report: None,
            };
        }
    };

    let mut run = import_text_with_report(&text, config);
    run.report.source = Some(name.clone());
    debug!(input = %name, accepted = run.report.accepted, "Batch item parsed");

    let Some(document) = run.document else {
        return BatchEntry {
            input: name,
            output_file: None,
            success: false,
            error: run.report.failure_detail.clone(),
            report: Some(run.report),
        };
    };

    let path = output_dir.join(file_name);
    let written = format_document(&document, format)
        .map_err(|err| err.to_string())
        .and_then(|raw| {
            fs::write(&path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))
        });

    match written {
        Ok(()) => {
            info!(input = %name, output = %file_name, "Wrote document");
            BatchEntry {
                input: name,
                output_file: Some(file_name.to_string()),
                success: true,
                error: None,
                report: Some(run.report),
            }
        }
        Err(err) => BatchEntry {
            input: name,
            output_file: None,
            success: false,
            error: Some(err),
            report: Some(run.report),
        },
    }
}

// ---------------------------------------------------------------------------
// init-config command
// ---------------------------------------------------------------------------

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    ImportConfig::default()
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("Wrote default configuration to '{}'.", args.output.display());
    Ok(())
}

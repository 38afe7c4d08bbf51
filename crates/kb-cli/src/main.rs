//! CLI binary for kb-graph: turn a Markdown vault into an RDF knowledge graph.

mod vault;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use kb_core::config::KbConfig;
use kb_core::report::RunReport;
use kb_extract::pipeline::{Pipeline, PipelineInput, PipelineOutput};
use kb_rdf::turtle::write_turtle;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

#[derive(Parser)]
#[command(name = "kb-graph", about = "Markdown knowledge base to RDF graph processor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a vault and write the RDF graph as Turtle
    Process {
        /// Vault root directory
        vault: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base URI for emitted IRIs (overrides config)
        #[arg(long)]
        base_uri: Option<String>,

        /// Run NER-derived entity extraction
        #[arg(long)]
        analyze_entities: bool,

        /// Glob patterns to include files (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude files (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Worker threads for per-document processing
        #[arg(long, default_value = "1")]
        jobs: usize,

        /// Print the run report as JSON to stderr
        #[arg(long)]
        report_json: bool,
    },

    /// Parse a vault and report counts without writing RDF
    Stats {
        /// Vault root directory
        vault: PathBuf,

        /// Glob patterns to include files (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude files (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Process {
            vault,
            output,
            base_uri,
            analyze_entities,
            include,
            exclude,
            jobs,
            report_json,
        } => cmd_process(
            &vault,
            output.as_deref(),
            base_uri,
            analyze_entities,
            &include,
            &exclude,
            jobs,
            report_json,
        ),
        Commands::Stats {
            vault,
            include,
            exclude,
        } => cmd_stats(&vault, &include, &exclude),
    };

    match outcome {
        Ok(report) if report.has_skips() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_process(
    vault: &Path,
    output: Option<&Path>,
    base_uri: Option<String>,
    analyze_entities: bool,
    include: &[String],
    exclude: &[String],
    jobs: usize,
    report_json: bool,
) -> Result<RunReport> {
    let mut config = KbConfig::load(vault)?;
    if let Some(base) = base_uri {
        config.base_uri = base;
    }
    if analyze_entities {
        config.analyze_entities = true;
    }
    config.validate()?;

    let run = run_vault(vault, &config, include, exclude, jobs)?;

    let turtle = write_turtle(&run.output.graph, &config.base_uri);
    match output {
        Some(path) => std::fs::write(path, turtle)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{turtle}"),
    }

    let report = merged_report(run);
    if report_json {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report)
}

fn cmd_stats(vault: &Path, include: &[String], exclude: &[String]) -> Result<RunReport> {
    let config = KbConfig::load(vault)?;
    let run = run_vault(vault, &config, include, exclude, 1)?;
    let report = merged_report(run);
    print_report(&report);
    Ok(report)
}

struct VaultRun {
    output: PipelineOutput,
    parse_failures: Vec<(String, String)>,
}

fn run_vault(
    vault: &Path,
    config: &KbConfig,
    include: &[String],
    exclude: &[String],
    jobs: usize,
) -> Result<VaultRun> {
    let include_set = build_glob_set(include).context("invalid --include glob")?;
    let exclude_set = build_glob_set(exclude).context("invalid --exclude glob")?;

    let files = vault::crawl(
        vault,
        &config.link_extensions,
        include_set.as_ref(),
        exclude_set.as_ref(),
    )?;
    eprintln!("Found {} documents under {}", files.len(), vault.display());

    let progress = ProgressBar::new(files.len() as u64).with_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}").expect("progress template"),
    );

    let mut inputs = Vec::with_capacity(files.len());
    let mut parse_failures = Vec::new();
    for file in &files {
        progress.set_message(file.rel_path.clone());
        progress.inc(1);
        let text = match std::fs::read_to_string(&file.abs_path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %file.rel_path, "unreadable file: {err}");
                parse_failures.push((file.rel_path.clone(), format!("unreadable: {err}")));
                continue;
            }
        };
        match kb_parser::markdown::parse_document(&file.rel_path, &text) {
            Ok(document) => {
                let (created, modified) = file_timestamps(&file.abs_path);
                inputs.push(PipelineInput {
                    document,
                    created,
                    modified,
                    ner_spans: Vec::new(),
                });
            }
            Err(err) => {
                warn!(path = %file.rel_path, "skipping malformed document: {err}");
                parse_failures.push((file.rel_path.clone(), err.to_string()));
            }
        }
    }
    progress.finish_and_clear();

    let pipeline = Pipeline::new(config.clone());
    let output = pipeline
        .run(inputs, jobs.max(1))
        .map_err(|err| anyhow::anyhow!("processing failed: {err}"))?;

    Ok(VaultRun {
        output,
        parse_failures,
    })
}

fn merged_report(run: VaultRun) -> RunReport {
    let mut report = run.output.report;
    for (path, reason) in run.parse_failures {
        report.record_skip(path, reason);
    }
    report
}

fn build_glob_set(patterns: &[String]) -> Result<Option<globset::GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(globset::Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

fn file_timestamps(path: &Path) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let Ok(metadata) = std::fs::metadata(path) else {
        return (None, None);
    };
    let created = metadata.created().ok().map(DateTime::<Utc>::from);
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
    (created, modified)
}

fn print_report(report: &RunReport) {
    eprintln!("Documents processed: {}", report.documents_processed);
    for (kind, count) in &report.entities_by_kind {
        eprintln!("  {kind}: {count}");
    }
    eprintln!("Placeholders created: {}", report.placeholders_created);
    if report.collisions_detected > 0 {
        eprintln!("Collisions detected: {}", report.collisions_detected);
    }
    if !report.documents_skipped.is_empty() {
        eprintln!("Skipped {} document(s):", report.documents_skipped.len());
        for skipped in &report.documents_skipped {
            eprintln!("  {}: {}", skipped.path, skipped.reason);
        }
    }
}

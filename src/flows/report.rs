//! Report flow - drive a scan, render progress and totals, write the bundle
//!
//! The scan is consumed one report at a time; progress (and JSONL output)
//! is emitted as each report arrives, totals once the scan is exhausted.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::backends::scan::scan;
use crate::core::filters::{load_ignore_rules, ExcludePatternSet};
use crate::core::model::{FileReport, ScanSummary};
use crate::core::render::{
    render_details, render_json, render_jsonl_line, render_summary, OutputFormat,
};
use crate::core::tokenizer::TokenCounter;
use crate::flows::bundle::{bundled_reports, write_bundle};

/// Options for the report command
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub root: PathBuf,
    pub excludes: Vec<String>,
    pub output_file: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
    pub progress: bool,
    pub respect_ignore: bool,
    pub format: OutputFormat,
    pub pretty: bool,
}

/// Everything a finished scan produced
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub summary: ScanSummary,
    pub reports: Vec<FileReport>,
}

/// Live spinner on stderr, hidden when progress is off
struct Progress {
    bar: ProgressBar,
}

impl Progress {
    fn new(enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} Processing... [{pos}] {wide_msg:.bold}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    fn advance(&self, report: &FileReport) {
        self.bar.inc(1);
        self.bar.set_message(report.path().to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Run a scan and collect its reports, calling `on_report` for each one as
/// soon as it is produced
pub fn collect_scan<F>(
    root: &Path,
    excludes: &ExcludePatternSet,
    respect_ignore: bool,
    counter: &TokenCounter,
    mut on_report: F,
) -> Result<ScanOutcome>
where
    F: FnMut(&FileReport),
{
    let ignore = load_ignore_rules(root, respect_ignore)?;
    let reports = scan(root, excludes, ignore, counter)?;

    let mut outcome = ScanOutcome::default();
    for report in reports {
        on_report(&report);
        outcome.summary.record(&report);
        outcome.reports.push(report);
    }
    Ok(outcome)
}

/// Run the report command
pub fn run_report(options: ReportOptions) -> Result<()> {
    let counter = TokenCounter::cl100k()?;
    let excludes = ExcludePatternSet::new(options.excludes.iter().cloned())?;
    info!(
        "Scanning {} ({} exclude patterns)",
        options.root.display(),
        excludes.patterns().len()
    );

    let progress = Progress::new(options.progress);
    let streaming = options.format == OutputFormat::Jsonl;
    let outcome = collect_scan(
        &options.root,
        &excludes,
        options.respect_ignore,
        &counter,
        |report| {
            progress.advance(report);
            if streaming {
                progress.bar.suspend(|| println!("{}", render_jsonl_line(report)));
            }
        },
    );
    progress.finish();
    let outcome =
        outcome.with_context(|| format!("Failed to scan {}", options.root.display()))?;

    info!(
        "Scan finished: {} files, {} tokens, {} errors",
        outcome.summary.total_files,
        outcome.summary.total_tokens,
        outcome.summary.errors()
    );

    match options.format {
        OutputFormat::Table => {
            if !options.quiet {
                println!("{}", render_summary(&outcome.summary));
            }
            if options.verbose {
                println!();
                println!("{}", render_details(&outcome.reports));
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                render_json(&outcome.summary, &outcome.reports, options.pretty)
            );
        }
        OutputFormat::Jsonl => {}
    }

    if let Some(dest) = &options.output_file {
        let notify = |line: String| {
            if options.format.is_machine() {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        };

        notify(format!(
            "\n{} {}",
            "Creating output file at:".yellow().bold(),
            dest.display().to_string().green()
        ));
        let selected = bundled_reports(&outcome.reports);
        // Totals are already printed; a failure here only affects the exit status
        let stats = write_bundle(&options.root, &selected, dest)
            .context("Error creating output file")?;
        info!(
            "Bundle written: {} files, {} unreadable",
            stats.files_written, stats.read_errors
        );
        notify(format!("{}", "✅ Output file created successfully.".green().bold()));
    }

    Ok(())
}

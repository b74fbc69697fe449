//! CLI module - Command-line interface definition and handler

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::core::render::OutputFormat;
use crate::flows::report::{run_report, ReportOptions};

/// tokscan - count LLM tokens across a directory tree.
#[derive(Parser, Debug)]
#[command(name = "tokscan")]
#[command(
    author,
    version,
    about,
    long_about = r#"tokscan walks a directory, classifies every file and reports the total
cl100k_base token count of its text files.

Entries matched by the root .gitignore and hidden entries (leading dot) are
pruned without being visited. Every other file is reported as one of:
processed, skipped_excluded, skipped_binary, error_decoding, error_general.

Examples:
    tokscan .
    tokscan src -v --exclude '*.lock' --exclude 'tests/fixtures/**'
    tokscan . -o context.txt
    tokscan . --format jsonl | jq -r 'select(.status == "processed") | .path'
"#
)]
pub struct Cli {
    /// Directory to analyze.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Show a detailed table of all files.
    #[arg(
        short,
        long,
        long_help = "Print a detailed per-file table (path, token count, status) after the\n\
summary. Also raises diagnostic logging to info level."
    )]
    pub verbose: bool,

    /// Glob pattern to exclude files (repeatable).
    #[arg(
        short,
        long,
        value_name = "GLOB",
        long_help = "Exclude files whose root-relative path matches GLOB. Can be used multiple\n\
times; a file matching any pattern is reported as skipped_excluded.\n\n\
Patterns match the trailing path components ('*.tmp' matches 'a/b/x.tmp').\n\
A leading '/' anchors the pattern at the scan root. '*' does not cross '/',\n\
'**' does."
    )]
    pub exclude: Vec<String>,

    /// Write a bundle of the directory tree and all processed file contents.
    #[arg(
        short = 'o',
        long = "create-output-file",
        value_name = "FILE",
        long_help = "After the scan, write a single UTF-8 text file containing a directory tree\n\
of processed files followed by each file's content, sorted by path."
    )]
    pub output_file: Option<PathBuf>,

    /// Output format (table/json/jsonl).
    #[arg(
        long,
        default_value = "table",
        value_parser = ["table", "json", "jsonl"],
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- table (default): summary panel, plus the detail table with --verbose\n\
- json: one JSON document with summary and files\n\
- jsonl: one JSON object per file, printed as soon as it is classified"
    )]
    pub format: String,

    /// Pretty-print JSON output with indentation.
    #[arg(long)]
    pub pretty: bool,

    /// Quiet mode (no summary panel, no progress).
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not show the live progress spinner.
    #[arg(long)]
    pub no_progress: bool,

    /// Do not apply the root .gitignore.
    #[arg(long)]
    pub no_ignore: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Debug-level diagnostics on stderr.
    #[arg(long)]
    pub debug: bool,
}

/// Install the stderr log subscriber; RUST_LOG wins over flags
fn init_logging(verbose: bool, debug: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn")
        } else if verbose {
            tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.debug);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().unwrap_or_default();

    // Get absolute root path
    let root = cli.path.canonicalize().unwrap_or(cli.path);

    run_report(ReportOptions {
        root,
        excludes: cli.exclude,
        output_file: cli.output_file,
        verbose: cli.verbose,
        quiet: cli.quiet,
        progress: !cli.quiet && !cli.no_progress && !format.is_machine(),
        respect_ignore: !cli.no_ignore,
        format,
        pretty: cli.pretty,
    })
}

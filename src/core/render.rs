//! Renderer module
//!
//! Renders scan results as a human summary panel, a per-file detail table,
//! or JSON / JSON Lines.

use colored::Colorize;
use serde::Serialize;

use crate::core::model::{FileReport, FileStatus, ScanSummary};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Summary panel (plus detail table with --verbose)
    #[default]
    Table,
    /// One JSON document with summary and files
    Json,
    /// One FileReport per line, streamed while scanning
    Jsonl,
}

impl OutputFormat {
    /// Machine formats keep stdout free of progress and notices
    pub fn is_machine(&self) -> bool {
        !matches!(self, OutputFormat::Table)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Full JSON document for `--format json`
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub summary: &'a ScanSummary,
    pub files: Vec<&'a FileReport>,
}

/// Render one report as a JSON line
pub fn render_jsonl_line(report: &FileReport) -> String {
    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
}

/// Render summary and path-sorted files as a single JSON document
pub fn render_json(summary: &ScanSummary, reports: &[FileReport], pretty: bool) -> String {
    let mut files: Vec<&FileReport> = reports.iter().collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));
    let doc = JsonReport { summary, files };

    let rendered = if pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    };
    rendered.unwrap_or_else(|_| "{}".to_string())
}

/// Format an integer with thousands separators
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the boxed "Analysis Summary" panel
pub fn render_summary(summary: &ScanSummary) -> String {
    let rows = [
        ("Total Tokens", summary.total_tokens),
        ("Files Processed", summary.processed),
        ("Files Skipped (Ignored by .gitignore)", summary.skipped_ignored),
        ("Files Skipped (Excluded by pattern)", summary.skipped_excluded),
        ("Files Skipped (Binary)", summary.skipped_binary),
        ("Files with Errors (Decoding)", summary.error_decoding),
        ("Files with Errors (General)", summary.error_general),
    ];

    let title = " Analysis Summary ";
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| format_count(*v).len())
        .max()
        .unwrap_or(1)
        .max(8);
    let inner = (label_width + value_width + 3).max(title.len() + 2);

    let mut output = String::new();
    output.push_str(&format!(
        "{}{}{}\n",
        "╭─".green(),
        title.green().bold(),
        format!("{}╮", "─".repeat(inner - title.len() - 1)).green()
    ));

    for (idx, (label, value)) in rows.iter().enumerate() {
        let padded_label = format!("{:<width$}", label, width = inner - value_width - 2);
        let padded_value = format!("{:>width$}", format_count(*value), width = value_width);
        let (label, value) = if idx == 0 {
            (padded_label.cyan().bold(), padded_value.yellow().bold())
        } else {
            (padded_label.normal(), padded_value.normal())
        };
        output.push_str(&format!("{} {}{} {}\n", "│".green(), label, value, "│".green()));
    }

    output.push_str(&format!("╰{}╯", "─".repeat(inner)).green().to_string());
    output
}

/// Render every report as a table sorted by path
pub fn render_details(reports: &[FileReport]) -> String {
    let mut sorted: Vec<&FileReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.path().cmp(b.path()));

    let tokens: Vec<String> = sorted
        .iter()
        .map(|r| r.token_count().map(format_count).unwrap_or_else(|| "N/A".to_string()))
        .collect();
    let statuses: Vec<String> = sorted.iter().map(|r| r.status().to_string()).collect();

    // Padding counts chars, so widths must too
    let path_width = sorted
        .iter()
        .map(|r| r.path().chars().count())
        .max()
        .unwrap_or(0)
        .max(9);
    let token_width = tokens.iter().map(|t| t.chars().count()).max().unwrap_or(0).max(11);
    let status_width = statuses.iter().map(|s| s.chars().count()).max().unwrap_or(0).max(6);

    let mut output = String::new();
    output.push_str(&format!("{}\n", "Detailed File Report".bold()));
    output.push_str(&format!(
        "┌─{:─<pw$}─┬─{:─<tw$}─┬─{:─<sw$}─┐\n",
        "",
        "",
        "",
        pw = path_width,
        tw = token_width,
        sw = status_width
    ));
    output.push_str(&format!(
        "│ {:<pw$} │ {:>tw$} │ {:<sw$} │\n",
        "File Path",
        "Token Count",
        "Status",
        pw = path_width,
        tw = token_width,
        sw = status_width
    ));
    output.push_str(&format!(
        "├─{:─<pw$}─┼─{:─<tw$}─┼─{:─<sw$}─┤\n",
        "",
        "",
        "",
        pw = path_width,
        tw = token_width,
        sw = status_width
    ));

    for ((report, count), status) in sorted.iter().zip(&tokens).zip(&statuses) {
        let path = format!("{:<pw$}", report.path(), pw = path_width);
        let count = format!("{:>tw$}", count, tw = token_width);
        let status_cell = format!("{:<sw$}", status, sw = status_width);
        let status_cell = match report.status() {
            FileStatus::Processed => status_cell.green(),
            s if s.is_error() => status_cell.red(),
            _ => status_cell.yellow(),
        };
        output.push_str(&format!(
            "│ {} │ {} │ {} │\n",
            path.cyan(),
            count.magenta(),
            status_cell
        ));
    }

    output.push_str(&format!(
        "└─{:─<pw$}─┴─{:─<tw$}─┴─{:─<sw$}─┘",
        "",
        "",
        "",
        pw = path_width,
        tw = token_width,
        sw = status_width
    ));
    output
}

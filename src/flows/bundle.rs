//! Bundle flow - one text document with a directory tree and file contents
//!
//! Written after the scan has finished, from the processed reports only.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

use crate::core::error::TokscanError;
use crate::core::model::FileReport;
use crate::core::paths::join_normalized;

const TREE_HEADER: &str = "Directory Tree of Processed Files:\n===================================\n";
const TREE_FOOTER: &str = "\n\n===================================\n\n";
const CONTENTS_HEADER: &str = "File Contents:\n==============\n\n";

/// What was written to the bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleStats {
    pub files_written: usize,
    pub read_errors: usize,
}

/// Processed reports with a non-zero token count, sorted by path
pub fn bundled_reports(reports: &[FileReport]) -> Vec<&FileReport> {
    let mut selected: Vec<&FileReport> = reports
        .iter()
        .filter(|r| r.is_processed() && r.token_count().unwrap_or(0) > 0)
        .collect();
    selected.sort_by(|a, b| a.path().cmp(b.path()));
    selected
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

/// Render '/'-separated paths as a `.`-rooted tree
///
/// Directories are suffixed with '/'; siblings are sorted by name.
pub fn build_tree<S: AsRef<str>>(paths: &[S]) -> String {
    let mut root = TreeNode::default();
    for path in paths {
        let mut node = &mut root;
        for part in path.as_ref().split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    let mut lines = vec![".".to_string()];
    push_children(&root, "", &mut lines);
    lines.join("\n")
}

fn push_children(node: &TreeNode, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (idx, (name, child)) in node.children.iter().enumerate() {
        let is_last = idx + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let suffix = if child.children.is_empty() { "" } else { "/" };
        lines.push(format!("{}{}{}{}", prefix, connector, name, suffix));

        if !child.children.is_empty() {
            let next = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            push_children(child, &next, lines);
        }
    }
}

/// Write the bundle for `reports` (as returned by `bundled_reports`) to `dest`
///
/// Sizes are read from disk at write time. A file that can no longer be read
/// gets an inline error line instead of a block; only failures on `dest`
/// itself are returned as errors.
pub fn write_bundle(
    root: &Path,
    reports: &[&FileReport],
    dest: &Path,
) -> Result<BundleStats, TokscanError> {
    let file = fs::File::create(dest).map_err(|e| TokscanError::bundle(dest, e))?;
    let mut out = BufWriter::new(file);
    let stats =
        write_bundle_to(root, reports, &mut out).map_err(|e| TokscanError::bundle(dest, e))?;
    out.flush().map_err(|e| TokscanError::bundle(dest, e))?;
    Ok(stats)
}

fn write_bundle_to<W: Write>(
    root: &Path,
    reports: &[&FileReport],
    out: &mut W,
) -> std::io::Result<BundleStats> {
    let paths: Vec<&str> = reports.iter().map(|r| r.path()).collect();

    out.write_all(TREE_HEADER.as_bytes())?;
    out.write_all(build_tree(&paths).as_bytes())?;
    out.write_all(TREE_FOOTER.as_bytes())?;
    out.write_all(CONTENTS_HEADER.as_bytes())?;

    let mut stats = BundleStats::default();
    for report in reports {
        let full_path = join_normalized(root, report.path());
        let read = fs::read_to_string(&full_path)
            .and_then(|content| Ok((fs::metadata(&full_path)?.len(), content)));

        match read {
            Ok((size, content)) => {
                writeln!(
                    out,
                    "--- File: {} | Size: {} bytes | Tokens: {} ---",
                    report.path(),
                    size,
                    report.token_count().unwrap_or(0)
                )?;
                out.write_all(content.as_bytes())?;
                out.write_all(b"\n\n--- End of File ---\n\n\n")?;
                stats.files_written += 1;
            }
            Err(e) => {
                warn!("Cannot read {} for bundle: {}", report.path(), e);
                writeln!(out, "--- Error reading file {}: {} ---\n", report.path(), e)?;
                stats.read_errors += 1;
            }
        }
    }

    Ok(stats)
}

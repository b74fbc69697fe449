//! Scan result model
//!
//! Every visited file that survives pruning maps to exactly one
//! `FileReport`. Directories never get a report of their own, except when
//! their listing fails (see `FileReport::error_general`).

use serde::Serialize;
use std::fmt;

/// Classification outcome for a single file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum FileStatus {
    /// Decoded as text and tokenized
    Processed,
    /// Matched a caller-supplied exclude pattern
    SkippedExcluded,
    /// Extension is in the binary set
    SkippedBinary,
    /// Content is not valid UTF-8
    ErrorDecoding,
    /// Any other per-file failure, with a short diagnostic
    ErrorGeneral(String),
}

impl FileStatus {
    /// Status key without the diagnostic suffix, used for counting
    pub fn key(&self) -> &'static str {
        match self {
            FileStatus::Processed => "processed",
            FileStatus::SkippedExcluded => "skipped_excluded",
            FileStatus::SkippedBinary => "skipped_binary",
            FileStatus::ErrorDecoding => "error_decoding",
            FileStatus::ErrorGeneral(_) => "error_general",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FileStatus::ErrorDecoding | FileStatus::ErrorGeneral(_))
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::ErrorGeneral(message) => write!(f, "error_general: {}", message),
            other => f.write_str(other.key()),
        }
    }
}

impl From<FileStatus> for String {
    fn from(status: FileStatus) -> Self {
        status.to_string()
    }
}

/// Outcome record for one file, keyed by its root-relative path
///
/// `token_count` is present if and only if the status is `Processed`; the
/// constructors are the only way to build a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileReport {
    path: String,
    status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_count: Option<usize>,
}

impl FileReport {
    pub fn processed(path: impl Into<String>, token_count: usize) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Processed,
            token_count: Some(token_count),
        }
    }

    pub fn skipped_excluded(path: impl Into<String>) -> Self {
        Self::without_tokens(path, FileStatus::SkippedExcluded)
    }

    pub fn skipped_binary(path: impl Into<String>) -> Self {
        Self::without_tokens(path, FileStatus::SkippedBinary)
    }

    pub fn error_decoding(path: impl Into<String>) -> Self {
        Self::without_tokens(path, FileStatus::ErrorDecoding)
    }

    /// General failure; also used for directories whose listing failed
    pub fn error_general(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::without_tokens(path, FileStatus::ErrorGeneral(message.into()))
    }

    fn without_tokens(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            token_count: None,
        }
    }

    /// Path relative to the scan root, '/'-separated
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> &FileStatus {
        &self.status
    }

    pub fn token_count(&self) -> Option<usize> {
        self.token_count
    }

    pub fn is_processed(&self) -> bool {
        self.status == FileStatus::Processed
    }
}

/// Running totals over a report stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total_files: usize,
    pub total_tokens: usize,
    pub processed: usize,
    /// Ignored entries are pruned without a report, so this stays 0
    pub skipped_ignored: usize,
    pub skipped_excluded: usize,
    pub skipped_binary: usize,
    pub error_decoding: usize,
    pub error_general: usize,
}

impl ScanSummary {
    /// Fold one report into the totals
    pub fn record(&mut self, report: &FileReport) {
        self.total_files += 1;
        match report.status() {
            FileStatus::Processed => {
                self.processed += 1;
                self.total_tokens += report.token_count().unwrap_or(0);
            }
            FileStatus::SkippedExcluded => self.skipped_excluded += 1,
            FileStatus::SkippedBinary => self.skipped_binary += 1,
            FileStatus::ErrorDecoding => self.error_decoding += 1,
            FileStatus::ErrorGeneral(_) => self.error_general += 1,
        }
    }

    pub fn errors(&self) -> usize {
        self.error_decoding + self.error_general
    }
}

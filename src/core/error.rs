//! Error types for scan setup and bundle output
//!
//! Per-file failures are never errors here: they are carried as
//! `FileStatus` values inside each `FileReport`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokscanError {
    /// Scan root does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Scan root is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The BPE vocabulary could not be constructed.
    #[error("Failed to load tokenizer vocabulary {name}: {message}")]
    Tokenizer { name: &'static str, message: String },

    /// An exclude glob failed to compile.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExclude {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Exclude pattern must not be empty")]
    EmptyExclude,

    /// The root ignore-file exists but could not be read.
    #[error("Cannot read ignore file {path}: {message}")]
    IgnoreFile { path: PathBuf, message: String },

    /// The bundle destination could not be created or written.
    #[error("Failed to write output file {path}: {source}")]
    BundleWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TokscanError {
    /// Wrap a bundle I/O failure with its destination path.
    pub fn bundle(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::BundleWrite {
            path: path.into(),
            source,
        }
    }
}

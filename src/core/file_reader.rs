//! Strict text reading
//!
//! Files are read whole and decoded as UTF-8 without any lossy fallback, so
//! the scanner can tell undecodable content apart from I/O failures. The file
//! handle is dropped before the caller sees the result.

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Why a file could not be turned into text
#[derive(Debug, Error)]
pub enum TextReadError {
    #[error("invalid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read a file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String, TextReadError> {
    let bytes = read_file_bytes(path)?;
    Ok(String::from_utf8(bytes)?)
}

fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let size_hint = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::with_capacity(size_hint);
    reader.read_to_end(&mut buffer)?;

    Ok(buffer)
}

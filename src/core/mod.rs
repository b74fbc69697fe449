//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Per-file report model (FileReport, FileStatus)
//! - Error types for scan setup and bundle output
//! - Path normalization utilities
//! - Ignore rules and exclude patterns
//! - Binary detection and strict text reading
//! - Token counting with the cl100k_base vocabulary
//! - Rendering of summaries, tables and JSON

pub mod binary;
pub mod error;
pub mod file_reader;
pub mod filters;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;

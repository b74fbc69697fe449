//! Flows module - Operations built on top of a scan
//!
//! Provides:
//! - report: Drive a scan with live progress and render the totals
//! - bundle: Write the directory tree and processed contents to one file

pub mod bundle;
pub mod report;

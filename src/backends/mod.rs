//! Backends module - Filesystem traversal
//!
//! Provides:
//! - scan: Lazy, pruning directory walk producing one report per file

pub mod scan;

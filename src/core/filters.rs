//! Path filters consulted by the scanner
//!
//! - `IgnoreRules`: pruning predicate compiled from the root `.gitignore`
//! - `ExcludePatternSet`: caller-supplied globs that mark files as excluded

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::error::TokscanError;

/// Name of the ignore-file looked up at the scan root
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Pruning predicate over root-relative paths
///
/// Evaluated on every entry before the scanner descends into it, so an
/// ignored directory is never visited.
pub trait IgnoreRules {
    fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool;
}

/// Ignores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIgnore;

impl IgnoreRules for NoIgnore {
    fn is_ignored(&self, _relative: &Path, _is_dir: bool) -> bool {
        false
    }
}

/// Gitignore-syntax rules compiled from a single ignore-file
#[derive(Debug, Clone)]
pub struct GitignoreRules {
    matcher: Gitignore,
}

impl GitignoreRules {
    /// Compile `<root>/.gitignore`, or `None` when it does not exist
    pub fn load(root: &Path) -> Result<Option<Self>, TokscanError> {
        let path = root.join(IGNORE_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&path) {
            if err.is_io() {
                return Err(TokscanError::IgnoreFile {
                    path,
                    message: err.to_string(),
                });
            }
            // Bad lines are dropped; the rest still apply
            warn!("Skipping invalid lines in {}: {}", path.display(), err);
        }

        let matcher = builder.build().map_err(|e| TokscanError::IgnoreFile {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(
            "Loaded {} ignore rules from {}",
            matcher.num_ignores() + matcher.num_whitelists(),
            path.display()
        );

        Ok(Some(Self { matcher }))
    }
}

impl IgnoreRules for GitignoreRules {
    fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        self.matcher.matched(relative, is_dir).is_ignore()
    }
}

/// Build the pruning predicate for a scan root
pub fn load_ignore_rules(root: &Path, enabled: bool) -> Result<Box<dyn IgnoreRules>, TokscanError> {
    if !enabled {
        return Ok(Box::new(NoIgnore));
    }
    Ok(match GitignoreRules::load(root)? {
        Some(rules) => Box::new(rules),
        None => Box::new(NoIgnore),
    })
}

/// Union of exclude globs, matched against root-relative '/' paths
///
/// A pattern is anchored at the right: `*.tmp` matches `a/b/notes.tmp`, and
/// `docs/*.md` matches `x/docs/intro.md`. A leading '/' anchors it at the
/// root instead. `*` never crosses '/', `**` does.
#[derive(Debug, Clone)]
pub struct ExcludePatternSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl ExcludePatternSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, TokscanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();

        for pattern in &patterns {
            let glob = GlobBuilder::new(&anchor_pattern(pattern)?)
                .literal_separator(true)
                .build()
                .map_err(|source| TokscanError::InvalidExclude {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|source| TokscanError::InvalidExclude {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self { patterns, set })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// True when any pattern matches
    pub fn is_excluded(&self, relative: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(relative)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for ExcludePatternSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rewrite a user pattern into a whole-path glob
fn anchor_pattern(pattern: &str) -> Result<String, TokscanError> {
    let pattern = pattern.trim();
    if pattern.is_empty() || pattern == "/" {
        return Err(TokscanError::EmptyExclude);
    }

    let mut pattern = pattern.replace('\\', "/");
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.to_string();
    }
    if pattern.is_empty() {
        return Err(TokscanError::EmptyExclude);
    }

    if let Some(rooted) = pattern.strip_prefix('/') {
        Ok(rooted.to_string())
    } else if pattern.starts_with("**/") {
        Ok(pattern)
    } else {
        Ok(format!("**/{}", pattern))
    }
}

//! Directory scanning backend
//!
//! Walks the scan root depth-first with walkdir, prunes ignored and hidden
//! entries before descending into them, and classifies every remaining file
//! into exactly one `FileReport`. Reports are produced lazily: `Scan` is an
//! iterator and does no work until the caller pulls the next item.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::binary::is_binary_path;
use crate::core::error::TokscanError;
use crate::core::file_reader::{read_text, TextReadError};
use crate::core::filters::{ExcludePatternSet, IgnoreRules};
use crate::core::model::FileReport;
use crate::core::paths::{is_hidden, make_relative};
use crate::core::tokenizer::TokenCounter;

/// Report path used when the root directory itself cannot be listed
const ROOT_REPORT_PATH: &str = ".";

/// Start a scan of `root`
///
/// Fails only when `root` is not an existing directory. Everything that goes
/// wrong afterwards is reported per file through the returned iterator.
pub fn scan<'a>(
    root: &Path,
    excludes: &'a ExcludePatternSet,
    ignore: Box<dyn IgnoreRules + 'a>,
    counter: &'a TokenCounter,
) -> Result<Scan<'a>, TokscanError> {
    if !root.exists() {
        return Err(TokscanError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(TokscanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    Ok(Scan {
        root: root.to_path_buf(),
        walker,
        excludes,
        ignore,
        counter,
    })
}

/// Lazy, single-pass sequence of file reports
///
/// Siblings are visited in file-name order, so two scans of an unchanged
/// tree yield the same reports in the same order.
pub struct Scan<'a> {
    root: PathBuf,
    walker: walkdir::IntoIter,
    excludes: &'a ExcludePatternSet,
    ignore: Box<dyn IgnoreRules + 'a>,
    counter: &'a TokenCounter,
}

impl Scan<'_> {
    /// Ignore rules first, then the hidden-name check
    fn is_pruned(&self, path: &Path, relative: &str, is_dir: bool) -> bool {
        if self.ignore.is_ignored(Path::new(relative), is_dir) {
            debug!("Pruned by ignore rules: {}", relative);
            return true;
        }
        if is_hidden(path) {
            debug!("Pruned hidden entry: {}", relative);
            return true;
        }
        false
    }

    fn visit(&mut self, entry: DirEntry) -> Option<FileReport> {
        let relative = make_relative(entry.path(), &self.root)?;
        let file_type = entry.file_type();
        let is_dir = file_type.is_dir();

        if self.is_pruned(entry.path(), &relative, is_dir) {
            if is_dir {
                self.walker.skip_current_dir();
            }
            return None;
        }

        if is_dir {
            return None;
        }
        if !file_type.is_file() {
            debug!("Not a regular file, skipping: {}", relative);
            return None;
        }

        Some(self.classify(entry.path(), relative))
    }

    /// Exclude globs, then the binary check, then decode and count
    fn classify(&self, path: &Path, relative: String) -> FileReport {
        if self.excludes.is_excluded(&relative) {
            return FileReport::skipped_excluded(relative);
        }
        if is_binary_path(path) {
            return FileReport::skipped_binary(relative);
        }

        match read_text(path) {
            Ok(content) => {
                let tokens = self.counter.count(&content);
                debug!("{}: {} tokens", relative, tokens);
                FileReport::processed(relative, tokens)
            }
            Err(TextReadError::Decode(_)) => FileReport::error_decoding(relative),
            Err(TextReadError::Io(e)) => FileReport::error_general(relative, e.to_string()),
        }
    }

    /// Turn a walk failure (unreadable directory, broken link, loop) into a
    /// report, unless the failing entry would have been pruned anyway
    fn walk_error(&self, err: walkdir::Error) -> Option<FileReport> {
        let message = match err.io_error() {
            Some(io) => io.to_string(),
            None => err.to_string(),
        };

        let Some(path) = err.path() else {
            warn!("Scan error under {}: {}", self.root.display(), message);
            return None;
        };
        let relative = make_relative(path, &self.root)?;
        if relative.is_empty() {
            warn!("Cannot list scan root {}: {}", self.root.display(), message);
            return Some(FileReport::error_general(ROOT_REPORT_PATH, message));
        }

        if self.is_pruned(path, &relative, path.is_dir()) {
            return None;
        }
        if is_dangling_link(path) {
            debug!("Dangling symlink, skipping: {}", relative);
            return None;
        }
        warn!("Cannot read {}: {}", relative, message);
        Some(FileReport::error_general(relative, message))
    }
}

/// A symlink whose target does not exist is neither a file nor a directory
fn is_dangling_link(path: &Path) -> bool {
    let is_link = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    is_link && matches!(fs::metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}

impl Iterator for Scan<'_> {
    type Item = FileReport;

    fn next(&mut self) -> Option<FileReport> {
        loop {
            let report = match self.walker.next()? {
                Ok(entry) => self.visit(entry),
                Err(err) => self.walk_error(err),
            };
            if report.is_some() {
                return report;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filters::{load_ignore_rules, NoIgnore};
    use crate::core::model::FileStatus;
    use crate::core::tokenizer::tests::shared_counter;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn run(root: &Path, patterns: &[&str]) -> Vec<FileReport> {
        let excludes = ExcludePatternSet::new(patterns.iter().copied()).unwrap();
        let ignore = load_ignore_rules(root, true).unwrap();
        scan(root, &excludes, ignore, shared_counter())
            .unwrap()
            .collect()
    }

    fn find<'r>(reports: &'r [FileReport], path: &str) -> Option<&'r FileReport> {
        reports.iter().find(|r| r.path() == path)
    }

    #[test]
    fn test_scan_empty_dir() {
        let temp = tempdir().unwrap();
        assert!(run(temp.path(), &[]).is_empty());
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope");
        let excludes = ExcludePatternSet::empty();
        let err = scan(&missing, &excludes, Box::new(NoIgnore), shared_counter())
            .err()
            .unwrap();
        assert!(matches!(err, TokscanError::NotFound { .. }));
    }

    #[test]
    fn test_scan_rejects_file_root() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.txt");
        write_file(&file, b"x");
        let excludes = ExcludePatternSet::empty();
        let err = scan(&file, &excludes, Box::new(NoIgnore), shared_counter())
            .err()
            .unwrap();
        assert!(matches!(err, TokscanError::NotADirectory { .. }));
    }

    #[test]
    fn test_scan_mixed_tree() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("a.txt"), b"hello world");
        write_file(&root.join("b.png"), b"\x89PNG\r\n\x1a\n");
        write_file(&root.join(".git/config"), b"[core]");
        write_file(&root.join(".gitignore"), b"*.log\n");
        write_file(&root.join("c.log"), b"log line");

        let reports = run(root, &[]);
        assert_eq!(reports.len(), 2);

        let a = find(&reports, "a.txt").unwrap();
        assert_eq!(a.status(), &FileStatus::Processed);
        assert_eq!(a.token_count(), Some(2));

        let b = find(&reports, "b.png").unwrap();
        assert_eq!(b.status(), &FileStatus::SkippedBinary);
        assert_eq!(b.token_count(), None);

        assert!(find(&reports, ".git/config").is_none());
        assert!(find(&reports, "c.log").is_none());
        assert!(find(&reports, ".gitignore").is_none());
    }

    #[test]
    fn test_ignored_directory_is_pruned() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join(".gitignore"), b"build/\n");
        for i in 0..50 {
            write_file(&root.join(format!("build/out/{}.txt", i)), b"generated");
        }
        write_file(&root.join("src/main.rs"), b"fn main() {}");

        let reports = run(root, &[]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path(), "src/main.rs");
        assert!(reports.iter().all(|r| !r.path().starts_with("build/")));
    }

    #[test]
    fn test_hidden_directories_are_pruned() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join(".venv/lib/site.py"), b"x = 1");
        write_file(&root.join("src/.env"), b"SECRET=1");
        write_file(&root.join("src/app.py"), b"print(1)");

        let reports = run(root, &[]);
        let paths: Vec<_> = reports.iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["src/app.py"]);
    }

    #[test]
    fn test_exclude_wins_over_binary_and_decoding() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("notes.tmp"), b"valid text");
        write_file(&root.join("image.png.tmp"), b"text");
        write_file(&root.join("bad.tmp"), &[0xFF, 0xFE, 0xFD]);
        write_file(&root.join("pic.tmp"), b"");

        let reports = run(root, &["*.tmp"]);
        assert_eq!(reports.len(), 4);
        assert!(reports
            .iter()
            .all(|r| r.status() == &FileStatus::SkippedExcluded && r.token_count().is_none()));
    }

    #[test]
    fn test_exclude_binary_extension_file() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("logo.png"), b"\x89PNG");

        let reports = run(root, &["*.png"]);
        assert_eq!(reports[0].status(), &FileStatus::SkippedExcluded);
    }

    #[test]
    fn test_invalid_utf8_is_decoding_error() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("latin1.txt"), &[0x63, 0x61, 0x66, 0xE9]);

        let reports = run(root, &[]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status(), &FileStatus::ErrorDecoding);
        assert_eq!(reports[0].token_count(), None);
    }

    #[test]
    fn test_empty_file_is_processed_with_zero_tokens() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("empty.txt"), b"");

        let reports = run(temp.path(), &[]);
        assert_eq!(reports[0].status(), &FileStatus::Processed);
        assert_eq!(reports[0].token_count(), Some(0));
    }

    #[test]
    fn test_paths_are_relative_and_slash_separated() {
        let temp = tempdir().unwrap();
        write_file(&temp.path().join("a/b/c/deep.md"), b"# deep");

        let reports = run(temp.path(), &[]);
        assert_eq!(reports[0].path(), "a/b/c/deep.md");
    }

    #[test]
    fn test_one_report_per_file_no_duplicates() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let files = ["a.txt", "b/c.rs", "b/d.png", "e/f/g.md", "e/h.bin"];
        for f in files {
            write_file(&root.join(f), b"content");
        }

        let reports = run(root, &[]);
        let paths: HashSet<_> = reports.iter().map(|r| r.path().to_string()).collect();
        assert_eq!(paths.len(), reports.len());
        let expected: HashSet<_> = files.iter().map(|f| f.to_string()).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for f in ["z.txt", "a.txt", "m/x.txt", "m/b.txt", "c.png"] {
            write_file(&root.join(f), b"some words here");
        }

        let first = run(root, &[]);
        let second = run(root, &[]);
        assert_eq!(first, second);

        let paths: Vec<_> = first.iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["a.txt", "c.png", "m/b.txt", "m/x.txt", "z.txt"]);
    }

    #[test]
    fn test_scan_is_lazy_and_can_stop_early() {
        let temp = tempdir().unwrap();
        for i in 0..20 {
            write_file(&temp.path().join(format!("f{:02}.txt", i)), b"text");
        }
        let excludes = ExcludePatternSet::empty();
        let mut reports = scan(temp.path(), &excludes, Box::new(NoIgnore), shared_counter()).unwrap();

        let first = reports.next().unwrap();
        assert_eq!(first.path(), "f00.txt");
        drop(reports);
    }

    #[test]
    fn test_total_ignores_skipped_and_errored_files() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("a.txt"), b"hello world");
        let before: usize = run(root, &[]).iter().filter_map(|r| r.token_count()).sum();

        write_file(&root.join("b.png"), b"hello world hello world");
        write_file(&root.join("c.txt"), &[0xC3, 0x28]);
        write_file(&root.join("d.tmp"), b"hello world hello world");
        let after: usize = run(root, &["*.tmp"]).iter().filter_map(|r| r.token_count()).sum();

        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("locked/secret.txt"), b"x");
        write_file(&root.join("open.txt"), b"x");
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can read anything; the check is meaningless there
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let reports = run(root, &[]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let locked_report = find(&reports, "locked").unwrap();
        assert!(matches!(locked_report.status(), FileStatus::ErrorGeneral(_)));
        assert!(find(&reports, "open.txt").unwrap().is_processed());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("a.txt"), b"hello world");
        std::os::unix::fs::symlink(root.join("missing"), root.join("dangling")).unwrap();

        let reports = run(root, &[]);
        let paths: Vec<_> = reports.iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["a.txt"]);
        assert_eq!(reports[0].token_count(), Some(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_reported_once() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join("a/file.txt"), b"hello world");
        std::os::unix::fs::symlink(root, root.join("a/back")).unwrap();

        let reports = run(root, &[]);
        assert_eq!(reports.len(), 2);
        assert!(find(&reports, "a/file.txt").unwrap().is_processed());
        let looped = find(&reports, "a/back").unwrap();
        assert!(matches!(looped.status(), FileStatus::ErrorGeneral(_)));
        assert_eq!(looped.token_count(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_root_is_reported_as_dot() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let root = temp.path().join("project");
        write_file(&root.join("a.txt"), b"x");
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read_dir(&root).is_ok() {
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let excludes = ExcludePatternSet::empty();
        let reports: Vec<_> = scan(&root, &excludes, Box::new(NoIgnore), shared_counter())
            .unwrap()
            .collect();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path(), ROOT_REPORT_PATH);
        assert!(matches!(reports[0].status(), FileStatus::ErrorGeneral(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_general_error() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let file = temp.path().join("private.txt");
        write_file(&file, b"x");
        fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).unwrap();

        if fs::read(&file).is_ok() {
            return;
        }

        let reports = run(temp.path(), &[]);
        match reports[0].status() {
            FileStatus::ErrorGeneral(message) => assert!(!message.is_empty()),
            other => panic!("unexpected status {}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_ignored_unreadable_directory_is_silent() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let root = temp.path();
        write_file(&root.join(".gitignore"), b"cache/\n");
        write_file(&root.join("cache/blob.txt"), b"x");
        let cache = root.join("cache");
        fs::set_permissions(&cache, fs::Permissions::from_mode(0o000)).unwrap();

        let reports = run(root, &[]);
        fs::set_permissions(&cache, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(reports.is_empty());
    }
}

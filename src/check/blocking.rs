//! Synchronous checks for one-shot use outside the concurrent traversal.
//!
//! These perform blocking I/O on the calling thread.

use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::FileCheckResult;
use crate::classifier::PathClassifier;
use crate::config::LintOptions;
use crate::engine::Engine;
use crate::error::SkipReason;
use crate::traversal::Summary;

pub fn check_file_blocking(
    path: &Path,
    engine: &dyn Engine,
    options: &LintOptions,
    classifier: &PathClassifier,
) -> FileCheckResult {
    debug!("Check file: {}", path.display());

    if !path.exists() {
        return FileCheckResult::skipped(path, SkipReason::NotFound);
    }

    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return FileCheckResult::skipped(path, SkipReason::NotAFile),
        Err(_) => return FileCheckResult::skipped(path, SkipReason::CannotOpen),
    }

    let classification = classifier.classify(path);
    if !classification.kind.is_supported() {
        return FileCheckResult::skipped(path, SkipReason::Unsupported);
    }

    let source = match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return FileCheckResult::skipped(path, SkipReason::ReadFile);
        }
    };

    let analysis = engine.analyze(&source, &options.with_overrides(&classification.overrides));
    FileCheckResult::analyzed(path, analysis)
}

/// Check a file or a whole tree, returning every per-node result in walk
/// order together with the root's summary.
pub fn check_tree_blocking(
    root: &Path,
    engine: &dyn Engine,
    options: &LintOptions,
    classifier: &PathClassifier,
) -> (Vec<FileCheckResult>, Summary) {
    let mut results = Vec::new();

    if !root.exists() {
        results.push(FileCheckResult::skipped(root, SkipReason::NotFound));
    } else {
        let mut visited = HashSet::new();
        let mut walker = WalkDir::new(root).follow_links(true).into_iter();

        while let Some(entry) = walker.next() {
            match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        let key = fs::canonicalize(entry.path())
                            .unwrap_or_else(|_| entry.path().to_path_buf());
                        if !visited.insert(key) {
                            debug!("Already visited {}", entry.path().display());
                            results.push(FileCheckResult::skipped(entry.path(), SkipReason::Revisited));
                            walker.skip_current_dir();
                        }
                        continue;
                    }
                    if file_type.is_file() {
                        results.push(check_file_blocking(entry.path(), engine, options, classifier));
                    } else {
                        results.push(FileCheckResult::skipped(entry.path(), SkipReason::NotAFile));
                    }
                }
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    debug!("Walk error at {}: {}", path.display(), e);
                    results.push(FileCheckResult::skipped(&path, walk_error_reason(&e, &path)));
                }
            }
        }
    }

    let summary = Summary {
        path: root.to_path_buf(),
        total: results.len(),
        success: results.iter().filter(|r| r.success).count(),
    };

    (results, summary)
}

fn walk_error_reason(error: &walkdir::Error, path: &Path) -> SkipReason {
    if error.loop_ancestor().is_some() {
        SkipReason::Revisited
    } else if !path.exists() {
        // Dangling symlink
        SkipReason::NotFound
    } else if path.is_dir() {
        SkipReason::ReadFolder
    } else {
        SkipReason::CannotOpen
    }
}

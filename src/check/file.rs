use log::{debug, error, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::FileCheckResult;
use crate::classifier::PathClassifier;
use crate::config::{LintOptions, DEFAULT_CONCURRENCY};
use crate::engine::Engine;
use crate::error::SkipReason;
use crate::fs::{FileSystem, NodeKind, TokioFs};

/// Asynchronous single-file analysis.
///
/// Every failure short-circuits into a [`SkipReason`]; the result is always
/// produced exactly once.
pub struct FileChecker<F = TokioFs> {
    fs: Arc<F>,
    engine: Arc<dyn Engine>,
    options: Arc<LintOptions>,
    classifier: PathClassifier,
    reads: Arc<Semaphore>,
}

impl<F> Clone for FileChecker<F> {
    fn clone(&self) -> Self {
        Self {
            fs: Arc::clone(&self.fs),
            engine: Arc::clone(&self.engine),
            options: Arc::clone(&self.options),
            classifier: self.classifier.clone(),
            reads: Arc::clone(&self.reads),
        }
    }
}

impl<F: FileSystem> FileChecker<F> {
    pub fn new(fs: Arc<F>, engine: Arc<dyn Engine>, options: Arc<LintOptions>) -> Self {
        Self {
            fs,
            engine,
            options,
            classifier: PathClassifier::new(),
            reads: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
        }
    }

    pub fn with_classifier(mut self, classifier: PathClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Limit the number of files read and analyzed at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.reads = Arc::new(Semaphore::new(concurrency.max(1)));
        self
    }

    pub fn filesystem(&self) -> &Arc<F> {
        &self.fs
    }

    pub fn options(&self) -> &LintOptions {
        &self.options
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub async fn check(&self, path: &Path) -> FileCheckResult {
        debug!("Check file: {}", path.display());

        if !self.fs.exists(path).await {
            return FileCheckResult::skipped(path, SkipReason::NotFound);
        }

        match self.fs.stat(path).await {
            Ok(NodeKind::File) => self.check_regular_file(path).await,
            Ok(_) => FileCheckResult::skipped(path, SkipReason::NotAFile),
            Err(e) => {
                debug!("Cannot stat {}: {}", path.display(), e);
                FileCheckResult::skipped(path, SkipReason::CannotOpen)
            }
        }
    }

    /// Analyze a path the caller has already found to be a regular file.
    pub async fn check_regular_file(&self, path: &Path) -> FileCheckResult {
        let classification = self.classifier.classify(path);
        if !classification.kind.is_supported() {
            debug!("Skipped file with unsupported extension: {}", path.display());
            return FileCheckResult::skipped(path, SkipReason::Unsupported);
        }

        // Never closed, so acquiring only fails if the checker is torn down
        let _permit = Arc::clone(&self.reads).acquire_owned().await.ok();

        let source = match self.fs.read(path).await {
            Ok(source) => source,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return FileCheckResult::skipped(path, SkipReason::ReadFile);
            }
        };

        let engine = Arc::clone(&self.engine);
        let options = Arc::clone(&self.options);
        let overrides = classification.overrides;
        let analysis = tokio::task::spawn_blocking(move || {
            engine.analyze(&source, &options.with_overrides(&overrides))
        })
        .await;

        match analysis {
            Ok(analysis) => FileCheckResult::analyzed(path, analysis),
            Err(e) => {
                error!("Engine failed on {}: {}", path.display(), e);
                FileCheckResult::skipped(path, SkipReason::EngineFailed)
            }
        }
    }
}

//! Concurrent recursive traversal of a path.
//!
//! Each unit of work (list a directory, analyze a file) runs as its own
//! tokio task and holds a [`WorkUnit`] of the root's [`CompletionGroup`].
//! Children are registered from the parent's unit before the parent
//! completes, so the group reaches zero exactly once, after the last
//! descendant has reported.

pub mod aggregate;
pub mod group;

use log::{debug, error, info};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

use crate::check::{FileCheckResult, FileChecker};
use crate::classifier::PathClassifier;
use crate::config::{LintOptions, TraversalConfig};
use crate::engine::Engine;
use crate::error::SkipReason;
use crate::fs::{FileSystem, NodeKind, TokioFs};
use crate::report::ReportSink;

pub use aggregate::{ResultAggregator, Summary};
pub use group::{CompletionGroup, GroupError, WorkUnit};

type Visit = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// State shared by every task spawned under one root.
struct TraversalRun<F, S> {
    checker: FileChecker<F>,
    aggregator: ResultAggregator<S>,
    /// Canonical paths of the directories listed so far
    visited: Mutex<HashSet<PathBuf>>,
}

impl<F: FileSystem, S> TraversalRun<F, S> {
    /// True the first time a directory is reached under any name.
    async fn enter_directory(&self, path: &Path) -> bool {
        let key = match self.checker.filesystem().canonicalize(path).await {
            Ok(key) => key,
            Err(e) => {
                debug!("Cannot resolve {}: {}", path.display(), e);
                path.to_path_buf()
            }
        };
        self.visited
            .lock()
            .map(|mut visited| visited.insert(key))
            .unwrap_or(true)
    }
}

pub struct Traversal<F = TokioFs> {
    checker: FileChecker<F>,
    config: TraversalConfig,
}

impl<F> Clone for Traversal<F> {
    fn clone(&self) -> Self {
        Self {
            checker: self.checker.clone(),
            config: self.config.clone(),
        }
    }
}

impl Traversal<TokioFs> {
    pub fn new(engine: Arc<dyn Engine>, options: LintOptions) -> Self {
        Self::with_filesystem(Arc::new(TokioFs), engine, options)
    }
}

impl<F: FileSystem> Traversal<F> {
    pub fn with_filesystem(fs: Arc<F>, engine: Arc<dyn Engine>, options: LintOptions) -> Self {
        let config = TraversalConfig::default();
        Self {
            checker: FileChecker::new(fs, engine, Arc::new(options))
                .with_concurrency(config.concurrency),
            config,
        }
    }

    pub fn with_config(mut self, config: TraversalConfig) -> Self {
        self.checker = self.checker.with_concurrency(config.concurrency);
        self.config = config;
        self
    }

    pub fn with_classifier(mut self, classifier: PathClassifier) -> Self {
        self.checker = self.checker.with_classifier(classifier);
        self
    }

    pub fn checker(&self) -> &FileChecker<F> {
        &self.checker
    }

    /// Check `root` and everything below it.
    ///
    /// `sink` receives one `file_checked` per processed node and then one
    /// `root_completed`; the same summary is returned.
    pub async fn check<S: ReportSink>(&self, root: impl Into<PathBuf>, sink: S) -> Summary {
        let root = root.into();
        info!("Checking {}", root.display());

        let (group, unit) = CompletionGroup::start();
        let run = Arc::new(TraversalRun {
            checker: self.checker.clone(),
            aggregator: ResultAggregator::new(root.clone(), sink),
            visited: Mutex::new(HashSet::new()),
        });

        tokio::spawn(visit(Arc::clone(&run), root.clone(), unit));

        match self.config.watchdog {
            Some(interval) => {
                let stalls = group.wait_with_watchdog(&root, interval).await;
                if stalls > 0 {
                    info!("{} stalled for {} interval(s)", root.display(), stalls);
                }
            }
            None => group.wait().await,
        }

        let summary = run
            .aggregator
            .finish()
            .unwrap_or_else(|| run.aggregator.snapshot());
        info!(
            "Completed {}: {} of {} passed",
            summary.path.display(),
            summary.success,
            summary.total
        );
        summary
    }

    /// Check several roots concurrently. Each root gets its own completion
    /// group and terminal summary; summaries are returned in input order.
    pub async fn check_all<S>(&self, roots: Vec<PathBuf>, sink: S) -> Vec<Summary>
    where
        S: ReportSink + Clone,
    {
        let mut tasks = JoinSet::new();
        for (index, root) in roots.into_iter().enumerate() {
            let traversal = self.clone();
            let sink = sink.clone();
            tasks.spawn(async move { (index, traversal.check(root, sink).await) });
        }

        let mut summaries = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => summaries.push(entry),
                Err(e) => error!("Traversal task failed: {}", e),
            }
        }

        summaries.sort_by_key(|(index, _)| *index);
        summaries.into_iter().map(|(_, summary)| summary).collect()
    }
}

fn visit<F: FileSystem, S: ReportSink>(
    run: Arc<TraversalRun<F, S>>,
    path: PathBuf,
    unit: WorkUnit,
) -> Visit {
    Box::pin(async move {
        if let Some(result) = process(&run, &path, &unit).await {
            run.aggregator.record(result);
        }
        unit.complete();
    })
}

/// Handle one node. Directories spawn their children and report nothing
/// unless they cannot be listed or were already listed under another name;
/// every other node yields one result.
async fn process<F: FileSystem, S: ReportSink>(
    run: &Arc<TraversalRun<F, S>>,
    path: &Path,
    unit: &WorkUnit,
) -> Option<FileCheckResult> {
    let fs = run.checker.filesystem();

    if !fs.exists(path).await {
        return Some(FileCheckResult::skipped(path, SkipReason::NotFound));
    }

    match fs.stat(path).await {
        Ok(NodeKind::Directory) => {
            if !run.enter_directory(path).await {
                debug!("Already visited {}", path.display());
                return Some(FileCheckResult::skipped(path, SkipReason::Revisited));
            }

            match fs.list(path).await {
                Ok(children) => {
                    debug!("Listed {} entries in {}", children.len(), path.display());
                    for child in children {
                        let child_unit = unit.register();
                        tokio::spawn(visit(Arc::clone(run), child, child_unit));
                    }
                    None
                }
                Err(e) => {
                    debug!("Cannot list {}: {}", path.display(), e);
                    Some(FileCheckResult::skipped(path, SkipReason::ReadFolder))
                }
            }
        }
        Ok(NodeKind::File) => Some(run.checker.check_regular_file(path).await),
        Ok(NodeKind::Other) => Some(FileCheckResult::skipped(path, SkipReason::NotAFile)),
        Err(e) => {
            debug!("Cannot stat {}: {}", path.display(), e);
            Some(FileCheckResult::skipped(path, SkipReason::CannotOpen))
        }
    }
}

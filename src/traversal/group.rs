//! Counting completion group for one traversal root.
//!
//! A group starts with a single pending unit. New units can only be
//! registered through a live [`WorkUnit`], and a unit completes exactly once
//! when it is dropped, so the count cannot reach zero while any registered
//! work is outstanding.

use log::{error, warn};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("completion group underflow: more completions than registered units")]
    Underflow,
}

#[derive(Debug)]
pub struct CompletionGroup {
    pending: AtomicUsize,
    completed: AtomicUsize,
    zero: Notify,
}

impl CompletionGroup {
    /// Create a group whose first unit stands for the root itself.
    pub fn start() -> (Arc<Self>, WorkUnit) {
        let group = Arc::new(Self {
            pending: AtomicUsize::new(1),
            completed: AtomicUsize::new(0),
            zero: Notify::new(),
        });
        let unit = WorkUnit {
            group: Arc::clone(&group),
        };
        (group, unit)
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Number of units completed so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        self.pending() == 0
    }

    fn increment(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns `Ok(true)` for the single transition to zero.
    fn decrement(&self) -> Result<bool, GroupError> {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| GroupError::Underflow)?;
        self.completed.fetch_add(1, Ordering::AcqRel);

        if previous == 1 {
            self.zero.notify_one();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Resolve once every registered unit has completed.
    pub async fn wait(&self) {
        loop {
            let notified = self.zero.notified();
            if self.is_done() {
                return;
            }
            notified.await;
        }
    }

    /// Like [`wait`](Self::wait), but log a warning whenever a whole interval
    /// passes without a single unit completing. Never gives up.
    ///
    /// Returns the number of stalled intervals.
    pub async fn wait_with_watchdog(&self, root: &Path, interval: Duration) -> usize {
        let mut last_completed = self.completed();
        let mut stalls = 0;

        loop {
            match tokio::time::timeout(interval, self.wait()).await {
                Ok(()) => return stalls,
                Err(_) => {
                    let completed = self.completed();
                    if completed == last_completed {
                        stalls += 1;
                        warn!(
                            "No progress checking {} for {:?}: {} unit(s) still pending",
                            root.display(),
                            interval,
                            self.pending()
                        );
                    }
                    last_completed = completed;
                }
            }
        }
    }
}

/// One outstanding unit of work: "list this directory" or "analyze this
/// file". Completes when dropped.
#[must_use = "dropping a WorkUnit completes it immediately"]
#[derive(Debug)]
pub struct WorkUnit {
    group: Arc<CompletionGroup>,
}

impl WorkUnit {
    /// Register a child unit. `self` is still pending while this runs, so the
    /// increment always lands before the parent can complete.
    pub fn register(&self) -> WorkUnit {
        self.group.increment();
        WorkUnit {
            group: Arc::clone(&self.group),
        }
    }

    pub fn group(&self) -> &Arc<CompletionGroup> {
        &self.group
    }

    pub fn complete(self) {
        drop(self);
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        if let Err(e) = self.group.decrement() {
            error!("{}", e);
        }
    }
}

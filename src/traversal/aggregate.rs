use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::check::FileCheckResult;
use crate::report::ReportSink;

/// Terminal result for one traversal root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Summary {
    pub path: PathBuf,
    pub total: usize,
    pub success: usize,
}

impl Summary {
    pub fn failed(&self) -> usize {
        self.total.saturating_sub(self.success)
    }

    pub fn all_passed(&self) -> bool {
        self.success == self.total
    }
}

/// Tallies per-node results for one root and emits the terminal summary.
pub struct ResultAggregator<S> {
    root: PathBuf,
    total: AtomicUsize,
    success: AtomicUsize,
    finished: AtomicBool,
    sink: S,
}

impl<S: ReportSink> ResultAggregator<S> {
    pub fn new(root: PathBuf, sink: S) -> Self {
        Self {
            root,
            total: AtomicUsize::new(0),
            success: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
            sink,
        }
    }

    /// Count a per-node result and forward it to the sink.
    pub fn record(&self, result: FileCheckResult) {
        // success first so a concurrent snapshot never sees success > total
        if result.success {
            self.success.fetch_add(1, Ordering::AcqRel);
        }
        self.total.fetch_add(1, Ordering::AcqRel);
        self.sink.file_checked(&result);
    }

    pub fn snapshot(&self) -> Summary {
        let total = self.total.load(Ordering::Acquire);
        let success = self.success.load(Ordering::Acquire).min(total);
        Summary {
            path: self.root.clone(),
            total,
            success,
        }
    }

    /// Emit the terminal summary. Only the first call reaches the sink.
    pub fn finish(&self) -> Option<Summary> {
        if self.finished.swap(true, Ordering::AcqRel) {
            return None;
        }
        let summary = self.snapshot();
        self.sink.root_completed(&summary);
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use crate::engine::Analysis;
    use crate::report::CheckEvent;
    use tokio::sync::mpsc;

    #[test]
    fn test_tally_and_single_terminal_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let aggregator = ResultAggregator::new(PathBuf::from("src"), tx);

        let passed = Analysis {
            passed: true,
            ..Default::default()
        };
        aggregator.record(FileCheckResult::analyzed("src/a.js", passed));
        aggregator.record(FileCheckResult::skipped("src/b.txt", SkipReason::Unsupported));

        let summary = aggregator.finish().unwrap();
        assert_eq!((summary.total, summary.success), (2, 1));
        assert_eq!(summary.failed(), 1);
        assert!(aggregator.finish().is_none());

        let mut files = 0;
        let mut completes = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                CheckEvent::File(_) => {
                    assert_eq!(completes, 0);
                    files += 1;
                }
                CheckEvent::Complete(s) => {
                    assert_eq!(s, summary);
                    completes += 1;
                }
            }
        }
        assert_eq!((files, completes), (2, 1));
    }
}

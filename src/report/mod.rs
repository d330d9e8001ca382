pub mod summary;
pub mod terminal;

use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::check::FileCheckResult;
use crate::traversal::Summary;

pub use summary::{EciLine, ECI_HEADER};
pub use terminal::TerminalReporter;

/// Consumer of traversal events.
///
/// `file_checked` runs once per processed node; `root_completed` runs exactly
/// once per root, after every `file_checked` of that root.
pub trait ReportSink: Send + Sync + 'static {
    fn file_checked(&self, result: &FileCheckResult);

    fn root_completed(&self, summary: &Summary);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    File(FileCheckResult),
    Complete(Summary),
}

impl ReportSink for UnboundedSender<CheckEvent> {
    fn file_checked(&self, result: &FileCheckResult) {
        if self.send(CheckEvent::File(result.clone())).is_err() {
            debug!("Event receiver dropped; discarding result for {}", result.path.display());
        }
    }

    fn root_completed(&self, summary: &Summary) {
        if self.send(CheckEvent::Complete(summary.clone())).is_err() {
            debug!("Event receiver dropped; discarding summary for {}", summary.path.display());
        }
    }
}

impl<S: ReportSink> ReportSink for Arc<S> {
    fn file_checked(&self, result: &FileCheckResult) {
        (**self).file_checked(result);
    }

    fn root_completed(&self, summary: &Summary) {
        (**self).root_completed(summary);
    }
}

/// Discards every event.
impl ReportSink for () {
    fn file_checked(&self, _result: &FileCheckResult) {}

    fn root_completed(&self, _summary: &Summary) {}
}

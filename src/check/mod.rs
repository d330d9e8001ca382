pub mod blocking;
pub mod file;

use std::path::{Path, PathBuf};

use crate::engine::Analysis;
use crate::error::SkipReason;

pub use blocking::{check_file_blocking, check_tree_blocking};
pub use file::FileChecker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The engine ran; diagnostics may be empty
    Analyzed(Analysis),
    /// The node never reached the engine
    Skipped(SkipReason),
}

/// Outcome of processing one filesystem node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheckResult {
    pub path: PathBuf,
    pub success: bool,
    pub outcome: Outcome,
}

impl FileCheckResult {
    pub fn analyzed(path: impl Into<PathBuf>, analysis: Analysis) -> Self {
        Self {
            path: path.into(),
            success: analysis.passed,
            outcome: Outcome::Analyzed(analysis),
        }
    }

    pub fn skipped(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            success: false,
            outcome: Outcome::Skipped(reason),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match &self.outcome {
            Outcome::Analyzed(analysis) => Some(analysis),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn reason(&self) -> Option<SkipReason> {
        match &self.outcome {
            Outcome::Analyzed(_) => None,
            Outcome::Skipped(reason) => Some(*reason),
        }
    }
}

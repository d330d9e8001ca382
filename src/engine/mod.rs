pub mod basic;

use crate::config::LintOptions;

pub use basic::BasicEngine;

/// A static-analysis engine.
///
/// Implementations must not keep per-call state: the same engine is shared by
/// every in-flight analysis of every traversal.
pub trait Engine: Send + Sync {
    fn analyze(&self, source: &str, options: &LintOptions) -> Analysis;

    /// Human-readable engine name and version.
    fn edition(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: usize,
    pub character: usize,
    pub reason: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedName {
    pub name: String,
    pub line: usize,
}

/// Diagnostics produced by one engine call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub passed: bool,
    pub warnings: Vec<Warning>,
    /// Advisory only; a passing analysis may still list unused names
    pub unused: Vec<UnusedName>,
    /// Lines of code in the source
    pub loc: usize,
    /// Lines scanned before the engine stopped
    pub scanned_loc: usize,
    pub json: bool,
}

impl Analysis {
    pub fn num_errors(&self) -> usize {
        self.warnings.len() + self.unused.len()
    }

    /// True when the engine gave up before the end of the source.
    pub fn incomplete(&self) -> bool {
        self.scanned_loc < self.loc
    }
}

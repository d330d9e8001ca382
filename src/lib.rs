pub mod check;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod report;
pub mod traversal;
pub mod watch;

pub use check::{FileCheckResult, FileChecker, Outcome};
pub use classifier::{FileKind, PathClassifier};
pub use config::{LintOptions, OptionsBuilder, TraversalConfig};
pub use engine::{Analysis, BasicEngine, Engine};
pub use error::{Error, SkipReason};
pub use fs::{FileSystem, NodeKind, TokioFs};
pub use report::{CheckEvent, ReportSink, TerminalReporter};
pub use traversal::{Summary, Traversal};

use colored::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{EciLine, ReportSink};
use crate::check::{FileCheckResult, Outcome};
use crate::engine::Analysis;
use crate::traversal::Summary;

/// Prints traversal events to stdout and keeps the running totals.
#[derive(Debug, Default)]
pub struct TerminalReporter {
    color: bool,
    hide_path: bool,
    show_errors: bool,
    quiet: bool,
    totals: Mutex<EciLine>,
    failures: AtomicBool,
}

impl TerminalReporter {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn hide_path(mut self, hide: bool) -> Self {
        self.hide_path = hide;
        self
    }

    /// Print the full error report for every failing file.
    pub fn show_errors(mut self, show: bool) -> Self {
        self.show_errors = show;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn totals(&self) -> EciLine {
        self.totals.lock().map(|t| *t).unwrap_or_default()
    }

    /// True once any node of any root has failed.
    pub fn had_failures(&self) -> bool {
        self.failures.load(Ordering::Acquire)
    }

    fn paint(&self, text: &str, style: fn(ColoredString) -> ColoredString) -> String {
        if self.color {
            style(text.normal()).to_string()
        } else {
            text.to_string()
        }
    }
}

impl ReportSink for TerminalReporter {
    fn file_checked(&self, result: &FileCheckResult) {
        if !result.success {
            self.failures.store(true, Ordering::Release);
        }

        match &result.outcome {
            Outcome::Analyzed(analysis) => {
                if let Ok(mut totals) = self.totals.lock() {
                    totals.add(analysis);
                }
                if self.quiet {
                    return;
                }
                if analysis.passed {
                    println!("{}{}", self.paint("Lint OK: ", |s| s.bold().green()), result.path.display());
                } else {
                    println!(
                        "{}{} ({} problem(s))",
                        self.paint("Found errors in: ", |s| s.bold().red()),
                        result.path.display(),
                        analysis.num_errors()
                    );
                    if self.show_errors {
                        print!("{}", error_report(analysis, &result.path, self.color, self.hide_path));
                    }
                }
            }
            Outcome::Skipped(reason) => {
                if !self.quiet {
                    println!(
                        "{}{}: {}",
                        self.paint("WARNING can't process ", |s| s.bold().yellow()),
                        result.path.display(),
                        reason
                    );
                }
            }
        }
    }

    fn root_completed(&self, summary: &Summary) {
        if self.quiet {
            return;
        }
        let status = format!("{}/{} passed", summary.success, summary.total);
        let status = if summary.all_passed() {
            self.paint(&status, |s| s.green())
        } else {
            self.paint(&status, |s| s.red())
        };
        println!(
            "{}{}: {}",
            self.paint("Completed checking ", |s| s.bold()),
            summary.path.display(),
            status
        );
    }
}

/// Text rendering of an analysis: warnings with position and evidence, then
/// unused names.
pub fn error_report(analysis: &Analysis, path: &Path, use_colors: bool, hide_path: bool) -> String {
    let paint = |text: String, style: fn(ColoredString) -> ColoredString| {
        if use_colors {
            style(text.normal()).to_string()
        } else {
            text
        }
    };
    let mut output = String::new();

    if !analysis.warnings.is_empty() {
        output.push_str(&paint("==Error(s)==".to_string(), |s| s.bold().yellow()));
        output.push('\n');
        for warning in &analysis.warnings {
            if !hide_path {
                output.push_str(&format!("{} ", path.display()));
            }
            output.push_str(&paint(
                format!("(line {} character {}) ", warning.line, warning.character),
                |s| s.bold().cyan(),
            ));
            output.push_str(&paint(warning.reason.clone(), |s| s.bold().red()));
            output.push('\n');
            if !warning.evidence.is_empty() {
                output.push_str(&warning.evidence);
                output.push('\n');
            }
        }
    }

    if !analysis.unused.is_empty() {
        output.push('\n');
        output.push_str(&paint("==Unused Variable(s)==".to_string(), |s| s.bold().yellow()));
        output.push('\n');
        for unused in &analysis.unused {
            output.push_str(&format!("line {}: {}\n", unused.line, unused.name));
        }
    }

    if analysis.json && !analysis.passed {
        output.push_str("JSON: bad.\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{UnusedName, Warning};
    use crate::error::SkipReason;
    use std::path::PathBuf;

    fn failing_analysis() -> Analysis {
        Analysis {
            passed: false,
            warnings: vec![Warning {
                line: 3,
                character: 7,
                reason: "Expected '===' and instead saw '=='.".to_string(),
                evidence: "if (a == b) {".to_string(),
            }],
            unused: vec![UnusedName {
                name: "tmp".to_string(),
                line: 1,
            }],
            loc: 10,
            scanned_loc: 10,
            json: false,
        }
    }

    #[test]
    fn test_plain_error_report() {
        let report = error_report(&failing_analysis(), Path::new("lib/a.js"), false, false);
        assert!(report.starts_with("==Error(s)==\n"));
        assert!(report.contains("lib/a.js (line 3 character 7) Expected '===' and instead saw '=='.\n"));
        assert!(report.contains("if (a == b) {\n"));
        assert!(report.contains("==Unused Variable(s)==\nline 1: tmp\n"));
    }

    #[test]
    fn test_hidden_path() {
        let report = error_report(&failing_analysis(), Path::new("lib/a.js"), false, true);
        assert!(!report.contains("lib/a.js"));
    }

    #[test]
    fn test_reporter_tracks_totals_and_failures() {
        let reporter = TerminalReporter::new(false).quiet(true);

        reporter.file_checked(&FileCheckResult::analyzed("a.js", failing_analysis()));
        reporter.file_checked(&FileCheckResult::skipped("b.txt", SkipReason::Unsupported));
        reporter.root_completed(&Summary {
            path: PathBuf::from("."),
            total: 2,
            success: 0,
        });

        let totals = reporter.totals();
        assert_eq!(totals.loc, 10);
        assert_eq!(totals.violations, 2);
        assert!(reporter.had_failures());
    }
}

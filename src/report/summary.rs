use chrono::{Datelike, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::Analysis;
use crate::error::{Error, Result};

pub const ECI_HEADER: &str = "Date, Total LOC, Scanned LOC, L1 Violations, L2 Violations";
pub const DEFAULT_REPORTS_DIR: &str = "lint_reports";
pub const ALL_SUMMARY_FILE: &str = "all_summary.csv";

/// Code-size and violation totals for white-box tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EciLine {
    pub loc: usize,
    pub scanned_loc: usize,
    pub violations: usize,
}

impl EciLine {
    pub fn add(&mut self, analysis: &Analysis) {
        self.loc += analysis.loc;
        self.scanned_loc += analysis.scanned_loc;
        self.violations += analysis.num_errors();
    }

    pub fn merge(&mut self, other: &EciLine) {
        self.loc += other.loc;
        self.scanned_loc += other.scanned_loc;
        self.violations += other.violations;
    }

    /// `d/m/yyyy, loc, scanned, 0, violations`; L1 violations are not tracked.
    pub fn format_on(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}/{}, {}, {}, 0, {}",
            date.day(),
            date.month(),
            date.year(),
            self.loc,
            self.scanned_loc,
            self.violations
        )
    }

    pub fn format_today(&self) -> String {
        self.format_on(Local::now().date_naive())
    }

    /// Write the line to `<dir>/<file_name>`, creating `dir` if needed.
    pub fn save(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| Error::Report {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(file_name);
        fs::write(&path, self.format_today()).map_err(|source| Error::Report {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

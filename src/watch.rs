use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use notify::{watcher, DebouncedEvent, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

use crate::check::{check_file_blocking, FileCheckResult, Outcome};
use crate::classifier::PathClassifier;
use crate::config::LintOptions;
use crate::engine::Engine;
use crate::report::terminal::error_report;

/// Re-checks a single file whenever it changes on disk.
pub struct WatchMode {
    file: PathBuf,
    engine: Arc<dyn Engine>,
    options: LintOptions,
    classifier: PathClassifier,
    color: bool,
    hide_path: bool,
}

impl WatchMode {
    pub fn new(file: PathBuf, engine: Arc<dyn Engine>, options: LintOptions) -> Self {
        Self {
            file,
            engine,
            options,
            classifier: PathClassifier::new(),
            color: true,
            hide_path: false,
        }
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn hide_path(mut self, hide: bool) -> Self {
        self.hide_path = hide;
        self
    }

    pub fn run(&self) -> Result<()> {
        if !self.file.exists() {
            anyhow::bail!("Watched file does not exist: {}", self.file.display());
        }
        if self.file.is_dir() {
            anyhow::bail!("Watch mode is not supported for directories. Please specify a single file.");
        }

        println!("{}", "Watch mode enabled".bold().blue());
        println!("Watching for changes in: {}", self.file.display());
        println!("Press Ctrl+C to stop\n");

        let (tx, rx) = channel();

        // Debounced; editors tend to emit several events per save
        let mut watcher = watcher(tx, Duration::from_secs(1))
            .context("Failed to create file watcher")?;

        // Watch the folder so editors that replace the file are still seen
        let folder = match self.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&folder, RecursiveMode::NonRecursive)
            .context("Failed to watch file")?;

        self.recheck("Checking");

        loop {
            match rx.recv() {
                Ok(event) => match event {
                    DebouncedEvent::Write(path) |
                    DebouncedEvent::Create(path) |
                    DebouncedEvent::Rename(_, path) => {
                        if self.is_watched(&path) {
                            self.recheck("Re-checking");
                        }
                    }
                    DebouncedEvent::Remove(path) => {
                        if self.is_watched(&path) {
                            println!("{} {}",
                                "!".yellow(),
                                format!("File removed: {}", path.display()).yellow()
                            );
                        }
                    }
                    DebouncedEvent::Error(e, _) => {
                        log::warn!("Watch error: {}", e);
                    }
                    _ => {}
                },
                Err(e) => {
                    eprintln!("Watch error: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    pub fn is_watched(&self, changed: &Path) -> bool {
        changed == self.file || changed.file_name() == self.file.file_name()
    }

    pub fn check_once(&self) -> FileCheckResult {
        check_file_blocking(&self.file, self.engine.as_ref(), &self.options, &self.classifier)
    }

    fn recheck(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.check_once();

        spinner.finish_and_clear();
        println!("{}", self.render(&result, &Local::now().format("%-d/%-m/%Y %-H:%M:%S").to_string()));
    }

    /// Delimited printout of one check, stamped with `stamp`.
    pub fn render(&self, result: &FileCheckResult, stamp: &str) -> String {
        let name = self.file.display().to_string();
        let failed = !result.success;
        let title = match (self.color, failed) {
            (true, true) => name.bold().red().to_string(),
            (true, false) => name.bold().green().to_string(),
            (false, _) => name,
        };
        let delimiter = format!("===={} @ {}====", title, stamp);

        let body = match &result.outcome {
            Outcome::Analyzed(analysis) if analysis.num_errors() > 0 => {
                error_report(analysis, &self.file, self.color, self.hide_path)
            }
            Outcome::Analyzed(_) => {
                let ok = "<No errors found>";
                if self.color {
                    format!("{}\n", ok.bold().green())
                } else {
                    format!("{}\n", ok)
                }
            }
            Outcome::Skipped(reason) => format!("Cannot check file: {}\n", reason),
        };

        format!("{}\n{}{}\n", delimiter, body, delimiter)
    }
}

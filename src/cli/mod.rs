use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log::info;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::check::check_tree_blocking;
use crate::classifier::PathClassifier;
use crate::config::{LintOptions, OptionsBuilder, TraversalConfig, DEFAULT_CONCURRENCY};
use crate::engine::{BasicEngine, Engine};
use crate::report::summary::ALL_SUMMARY_FILE;
use crate::report::{ReportSink, TerminalReporter, ECI_HEADER};
use crate::traversal::{Summary, Traversal};
use crate::watch::WatchMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "treelint")]
#[command(version, about = "Concurrent recursive lint driver for JavaScript, JSON and HTML", long_about = None)]
pub struct Args {
    /// Files or directories to check
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Watch a single file and re-check it whenever it changes
    #[arg(short, long, value_name = "FILE")]
    pub watch: Option<PathBuf>,

    /// Save the summary line to <REPORTS_DIR>/all_summary.csv
    #[arg(short, long)]
    pub summary: bool,

    /// Folder for saved reports
    #[arg(long, value_name = "DIR", default_value = "lint_reports")]
    pub reports_dir: PathBuf,

    /// Force coloured output (default: only when stdout is a terminal)
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Do not print file paths in error reports
    #[arg(long)]
    pub hide_path: bool,

    /// JSON or TOML file with lint options (read first)
    #[arg(short, long, value_name = "FILE", env = "TREELINT_OPTIONS")]
    pub options: Option<PathBuf>,

    /// Lint switches to turn on
    #[arg(long = "enable", value_name = "OPTION")]
    pub enable: Vec<String>,

    /// Lint switches to turn off
    #[arg(long = "disable", value_name = "OPTION")]
    pub disable: Vec<String>,

    /// Indentation width
    #[arg(long)]
    pub indent: Option<u32>,

    /// Maximum number of warnings per file
    #[arg(long)]
    pub maxerr: Option<u32>,

    /// Maximum length of a source line
    #[arg(long)]
    pub maxlen: Option<u32>,

    /// Predefined global name
    #[arg(long = "global", value_name = "NAME")]
    pub globals: Vec<String>,

    /// Check sequentially with blocking I/O instead of the concurrent traversal
    #[arg(long)]
    pub blocking: bool,

    /// Maximum number of files analyzed at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Warn after this many seconds without progress (0 disables)
    #[arg(long, default_value_t = 30)]
    pub watchdog_secs: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only the final summary)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn use_color(&self) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            std::io::stdout().is_terminal()
        }
    }

    pub fn lint_options(&self) -> LintOptions {
        OptionsBuilder::new()
            .file(self.options.clone())
            .enable(&self.enable)
            .disable(&self.disable)
            .indent(self.indent)
            .maxerr(self.maxerr)
            .maxlen(self.maxlen)
            .globals(&self.globals)
            .build()
    }

    pub fn traversal_config(&self) -> TraversalConfig {
        TraversalConfig {
            concurrency: self.concurrency.max(1),
            watchdog: (self.watchdog_secs > 0).then(|| Duration::from_secs(self.watchdog_secs)),
        }
    }
}

pub fn init_logging(args: &Args) {
    let level = if args.verbose && !args.quiet {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

pub fn run(args: Args) -> Result<ExitCode> {
    if args.paths.is_empty() && args.watch.is_none() {
        anyhow::bail!("Nothing to check. Give at least one PATH or --watch FILE.");
    }

    let color = args.use_color();
    colored::control::set_override(color);

    let options = args.lint_options();
    let engine: Arc<dyn Engine> = Arc::new(BasicEngine::new());
    if !args.quiet {
        println!("{} {}", "treelint: using".bold().green(), engine.edition());
        for (name, value) in options.overridden() {
            println!("  {} = {}", name, value);
        }
    }

    let mut exit = ExitCode::SUCCESS;

    if !args.paths.is_empty() {
        let reporter = Arc::new(
            TerminalReporter::new(color)
                .hide_path(args.hide_path)
                .show_errors(!args.quiet)
                .quiet(args.quiet),
        );

        let summaries = if args.blocking {
            check_paths_blocking(&args.paths, engine.as_ref(), &options, &reporter)
        } else {
            check_paths(&args, Arc::clone(&engine), options.clone(), Arc::clone(&reporter))?
        };

        let totals = reporter.totals();
        let line = totals.format_today();
        println!("{}", "Completed checking all paths:".bold().green());
        println!("{}", ECI_HEADER);
        println!("{}", line);

        if args.summary {
            let path = totals
                .save(&args.reports_dir, ALL_SUMMARY_FILE)
                .context("Failed to save summary")?;
            info!("Summary written to {}", path.display());
        }

        if summaries.iter().any(|s| !s.all_passed()) {
            exit = ExitCode::FAILURE;
        }
    }

    if let Some(file) = &args.watch {
        let watch = WatchMode::new(file.clone(), engine, options)
            .color(color)
            .hide_path(args.hide_path);
        watch.run()?;
    }

    Ok(exit)
}

fn check_paths(
    args: &Args,
    engine: Arc<dyn Engine>,
    options: LintOptions,
    reporter: Arc<TerminalReporter>,
) -> Result<Vec<Summary>> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let traversal = Traversal::new(engine, options).with_config(args.traversal_config());

    for path in &args.paths {
        info!("Scheduled check of {}", path.display());
    }

    Ok(runtime.block_on(traversal.check_all(args.paths.clone(), reporter)))
}

fn check_paths_blocking(
    paths: &[PathBuf],
    engine: &dyn Engine,
    options: &LintOptions,
    reporter: &TerminalReporter,
) -> Vec<Summary> {
    let classifier = PathClassifier::new();

    paths
        .iter()
        .map(|path| {
            let (results, summary) = check_tree_blocking(path, engine, options, &classifier);
            for result in &results {
                reporter.file_checked(result);
            }
            reporter.root_completed(&summary);
            summary
        })
        .collect()
}

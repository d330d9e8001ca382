use anyhow::Result;
use clap::Parser;
use log::info;
use std::process::ExitCode;

use treelint::cli;

fn main() -> Result<ExitCode> {
    let args = cli::Args::parse();
    cli::init_logging(&args);
    info!("Starting treelint v{}", env!("CARGO_PKG_VERSION"));

    cli::run(args)
}

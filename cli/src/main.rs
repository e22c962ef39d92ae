#![deny(missing_docs)]

//! # Deprecator CLI
//!
//! Marks unused C# interfaces and classes with an `[Obsolete]` attribute
//! instead of deleting them.
//!
//! Supported Commands:
//! - `mark`: Applies a YAML/JSON deprecation list to a source tree.
//! - `insert`: Marks a single declaration in a single file.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::error::CliResult;
use crate::mark::{Format, RunArgs};
use crate::report::RunReport;

mod config;
mod diff;
mod error;
mod mark;
mod report;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Idempotent deprecation marker for C# sources")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable logging entirely.
    #[clap(short, long, global = true)]
    quiet: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply every target of a deprecation list.
    Mark(mark::MarkArgs),
    /// Mark one declaration in one file.
    Insert(mark::InsertArgs),
}

fn main() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let (report, run) = match &cli.command {
        Commands::Mark(args) => (mark::execute(args)?, &args.run),
        Commands::Insert(args) => (mark::run(&args.to_plan(), args.run.dry_run), &args.run),
    };

    emit(&report, run)?;

    if report.is_failure(run.strict) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn emit(report: &RunReport, run: &RunArgs) -> CliResult<()> {
    match run.format {
        Format::Text => print!("{}", report.to_text()),
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

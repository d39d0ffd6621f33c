// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `mountmirror`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mountmirror",
    version,
    about = "Mirror a directory onto removable volumes whenever they are mounted.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to watch and mirror.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Mount points to mirror onto, in order. Unmounted ones are skipped.
    #[arg(value_name = "DESTINATION", required = true, num_args = 1..)]
    pub destinations: Vec<PathBuf>,

    /// Optional TOML config file (mount table, mirror command, watch options).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MOUNTMIRROR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Run the initial sync once and exit, no watching.
    #[arg(long)]
    pub once: bool,

    /// Print destinations, their mount status and the mirror command, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments.
///
/// Usage errors print clap's message to stderr and exit with status 1;
/// `--help` and `--version` print to stdout and exit 0.
pub fn parse() -> CliArgs {
    match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

use crate::commands;

/// Course repository tooling - clone student repos, check out submissions,
/// grant resource repo access
#[derive(Parser, Debug)]
#[command(name = "course-repos")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the course configuration file (default: ./config.json)
    #[arg(long, global = true, value_name = "PATH", env = "COURSE_REPOS_CONFIG")]
    config: Option<PathBuf>,

    /// Set log level for logs written to stderr
    #[arg(
        short = 'l',
        long,
        global = true,
        value_name = "LEVEL",
        value_enum,
        default_value = "info"
    )]
    log_level: LogLevel,
}

/// Log verbosity accepted by `--log-level`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the course roster as CSV, sorted by name
    Roster(commands::roster::RosterArgs),

    /// Clone student repos, or pull the ones already cloned
    Clone(commands::clone::CloneArgs),

    /// Check out the commit each student submitted for an assignment
    Checkout(commands::checkout::CheckoutArgs),

    /// Grant students reporter access to the resource repo
    GrantAccess(commands::access::AccessArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level.into());

        let config = self.config.as_deref();
        match self.command {
            Commands::Roster(args) => commands::roster::execute(args, config),
            Commands::Clone(args) => commands::clone::execute(args),
            Commands::Checkout(args) => commands::checkout::execute(args, config),
            Commands::GrantAccess(args) => commands::access::execute(args, config),
        }
    }
}

/// Logs go to stderr as `[LEVEL] message` so stdout stays a clean CSV stream.
fn init_logging(level: LevelFilter) {
    let client_level = level.min(LevelFilter::Warn);
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .filter_module("ureq", client_level)
        .filter_module("rustls", client_level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();
}

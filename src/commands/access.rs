//! Grant-access command implementation
//!
//! Gives every rostered student reporter access to the course's shared
//! resource repository. Students who already have higher access keep it.

use anyhow::Result;
use clap::Args;
use course_repos::access::AccessReconciler;
use course_repos::platform::GitLabClient;
use std::path::{Path, PathBuf};

use super::{load_config, read_input};

/// Arguments for the grant-access command
#[derive(Args, Debug)]
pub struct AccessArgs {
    /// CSV roster of students (default: stdin)
    #[arg(short, long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Print overall statistics to stderr when done
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the grant-access command
pub fn execute(args: AccessArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = config.platform()?;

    let platform = GitLabClient::new(settings.server_url, settings.token)?;
    let reconciler = AccessReconciler::connect(&platform, &settings)?;

    let roster = read_input(args.csv.as_deref())?;
    let counters = reconciler.reconcile_all(&roster);

    if args.verbose {
        eprintln!("Overall statistics:");
        for (name, count) in counters.entries() {
            eprintln!(" - {}: {}", name, count);
        }
    }

    Ok(())
}

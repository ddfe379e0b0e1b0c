//! Checkout command implementation
//!
//! Checks out each already-cloned student repository at the commit id the
//! student submitted on the LMS for the given assignment. Repos are expected
//! to have been cloned by the `clone` command into the same repo directory.

use anyhow::Result;
use clap::Args;
use course_repos::checkout::checkout_submissions;
use course_repos::defaults::DEFAULT_REPO_DIR;
use course_repos::lms::CanvasClient;
use course_repos::repository::{DefaultGitOperations, RepoRoot};
use std::path::{Path, PathBuf};

use super::{load_config, read_input};

/// Arguments for the checkout command
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// The assignment number to check out submissions for
    #[arg(short, long = "asgn", value_name = "N")]
    pub asgn: String,

    /// CSV roster of students (default: stdin)
    #[arg(short, long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Directory containing the cloned repos
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "COURSE_REPOS_REPODIR",
        default_value = DEFAULT_REPO_DIR
    )]
    pub repodir: PathBuf,
}

/// Execute the checkout command
pub fn execute(args: CheckoutArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let lms = config.lms()?;
    let course = CanvasClient::new(lms.url, lms.course_id, lms.token)?;

    let root = RepoRoot::new(&args.repodir);
    // Checked before reading stdin so a typo fails fast
    root.require_exists()?;

    let roster = read_input(args.csv.as_deref())?;
    checkout_submissions(&course, &DefaultGitOperations, &root, &roster, &args.asgn)?;

    Ok(())
}

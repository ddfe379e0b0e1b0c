//! Clone command implementation
//!
//! Clones every rostered student's repository into the repo directory, or
//! pulls it when a clone already exists. With `--forward`, the roster rows of
//! students whose repository was cloned or pulled are written to stdout so
//! the output can feed a `checkout` batch.

use anyhow::Result;
use clap::Args;
use course_repos::defaults::{DEFAULT_BRANCH, DEFAULT_REPO_DIR};
use course_repos::repository::{DefaultGitOperations, RepoRoot};
use course_repos::roster::RosterWriter;
use course_repos::sync::RepoSynchronizer;
use std::io;
use std::path::PathBuf;

use super::read_input;

/// Arguments for the clone command
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// CSV roster of students (default: stdin)
    #[arg(short, long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Directory to contain the cloned repos
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "COURSE_REPOS_REPODIR",
        default_value = DEFAULT_REPO_DIR
    )]
    pub repodir: PathBuf,

    /// Write the CSV rows of students whose repos were cloned or pulled to stdout
    #[arg(short, long)]
    pub forward: bool,

    /// Branch to check out before pulling an existing clone
    #[arg(long, value_name = "NAME", default_value = DEFAULT_BRANCH)]
    pub branch: String,
}

/// Execute the clone command
pub fn execute(args: CloneArgs) -> Result<()> {
    let roster = read_input(args.csv.as_deref())?;

    let git = DefaultGitOperations;
    let synchronizer =
        RepoSynchronizer::new(&git, RepoRoot::new(&args.repodir)).with_branch(args.branch);

    let mut writer = RosterWriter::new(io::stdout().lock());
    let forward = args.forward;
    synchronizer.sync_all(&roster, |record| {
        if forward {
            writer.write(record)
        } else {
            Ok(())
        }
    })?;

    Ok(())
}

use std::path::Path;
use std::process::{Command, Output};

use crate::error::Error;

/// Clone `url` into `target_dir`.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
///
/// The target is never removed first: an existing
/// directory means the student was already cloned and must be pulled instead.
pub fn clone(url: &str, target_dir: &Path) -> Result<(), Error> {
    let output = Command::new("git")
        .args(["clone", "--quiet", url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
            hint: Some("is git installed and on PATH?".to_string()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // Provide helpful error message for common auth failures
        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            Some(
                "make sure your SSH key or credentials grant access to the student repository"
                    .to_string(),
            )
        } else {
            None
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message: stderr,
            hint,
        });
    }

    Ok(())
}

/// Check out a local branch in an existing clone.
pub fn checkout_branch(repo_dir: &Path, branch: &str) -> Result<(), Error> {
    run_in(repo_dir, &["checkout", "--quiet", branch])
}

/// Pull the current branch of an existing clone.
pub fn pull(repo_dir: &Path) -> Result<(), Error> {
    run_in(repo_dir, &["pull", "--quiet"])
}

/// Check out an exact commit, leaving the clone on a detached HEAD.
pub fn checkout_commit(repo_dir: &Path, commit_id: &str) -> Result<(), Error> {
    run_in(repo_dir, &["checkout", "--quiet", commit_id])
}

fn run_in(repo_dir: &Path, args: &[&str]) -> Result<(), Error> {
    let command = args.join(" ");
    let output: Output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: repo_dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            path: repo_dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

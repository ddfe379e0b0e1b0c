//! # Local Student Repositories
//!
//! This module owns the two things every repository batch needs: the layout
//! of the local storage root and the source-control operations performed on
//! it.
//!
//! ## Design
//!
//! Source control is reached through the [`GitOperations`] trait so that the
//! synchronizer and checkout executor never depend on a concrete git binding.
//! In the application, [`DefaultGitOperations`] shells out to the system `git`
//! command (see [`crate::git`]). In tests, a recording mock stands in for it so
//! batches can be driven without a network or a git installation.
//!
//! [`RepoRoot`] maps a username to its clone directory. The presence of that
//! directory is the only state carried between runs: present means "cloned",
//! absent means "needs clone".

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clones `url` into `target_dir`, which must not exist yet.
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Checks out the local branch `name` in an existing clone.
    fn checkout_branch(&self, repo_dir: &Path, name: &str) -> Result<()>;

    /// Pulls the current branch of an existing clone.
    fn pull(&self, repo_dir: &Path) -> Result<()>;

    /// Checks out an exact commit in an existing clone.
    fn checkout_commit(&self, repo_dir: &Path, commit_id: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, target_dir)
    }

    fn checkout_branch(&self, repo_dir: &Path, name: &str) -> Result<()> {
        crate::git::checkout_branch(repo_dir, name)
    }

    fn pull(&self, repo_dir: &Path) -> Result<()> {
        crate::git::pull(repo_dir)
    }

    fn checkout_commit(&self, repo_dir: &Path, commit_id: &str) -> Result<()> {
        crate::git::checkout_commit(repo_dir, commit_id)
    }
}

/// The directory holding one clone per student, named by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    root: PathBuf,
}

impl RepoRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory itself.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Clone directory for `username`.
    pub fn repo_path(&self, username: &str) -> PathBuf {
        self.root.join(username)
    }

    /// Whether `username` already has a clone directory.
    pub fn has_repo(&self, username: &str) -> bool {
        self.repo_path(username).exists()
    }

    /// Fails with a fatal error when the root directory is missing.
    pub fn require_exists(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::RepoDirNotFound {
                path: self.root.clone(),
            })
        }
    }

    /// Creates the root directory (and parents) when missing.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
        }
        self.require_exists()
    }
}

//! # Repository Synchronization
//!
//! Brings every student's local clone up to date with their remote
//! repository. A student without a clone directory is cloned; a student with
//! one gets the default branch checked out and pulled.
//!
//! Synchronization is idempotent: running the batch again after any number
//! of failures pulls what is already cloned and retries the rest from
//! whatever is on disk. Nothing is ever deleted or re-cloned.
//!
//! Students whose sync succeeded can be forwarded, unchanged and in roster
//! order, to a downstream sink. The CLI uses this to pipe the successfully
//! synchronized rows straight into a checkout batch.

use crate::defaults::DEFAULT_BRANCH;
use crate::error::Result;
use crate::repository::{GitOperations, RepoRoot};
use crate::roster::StudentRecord;
use log::{error, info};

/// Result of synchronizing one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No clone existed; the repository was cloned.
    Cloned,
    /// A clone existed; the default branch was checked out and pulled.
    Pulled,
    /// The clone or pull failed; the reason is the underlying error.
    Failed(String),
}

impl SyncOutcome {
    /// Whether this student should be forwarded downstream.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Cloned | SyncOutcome::Pulled)
    }
}

/// Per-student outcomes of one synchronization batch, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub outcomes: Vec<(String, SyncOutcome)>,
}

impl SyncReport {
    pub fn cloned(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Cloned))
    }

    pub fn pulled(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Pulled))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Clones or pulls student repositories under a [`RepoRoot`].
pub struct RepoSynchronizer<'a> {
    git: &'a dyn GitOperations,
    root: RepoRoot,
    branch: String,
}

impl<'a> RepoSynchronizer<'a> {
    pub fn new(git: &'a dyn GitOperations, root: RepoRoot) -> Self {
        Self {
            git,
            root,
            branch: DEFAULT_BRANCH.to_string(),
        }
    }

    /// Use `branch` instead of the default when pulling existing clones.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Synchronize a single student.
    pub fn sync(&self, record: &StudentRecord) -> SyncOutcome {
        let repo_path = self.root.repo_path(&record.username);

        if !repo_path.exists() {
            match self.git.clone_repo(&record.repo_url, &repo_path) {
                Ok(()) => {
                    info!("{}: successfully cloned repo", record.username);
                    SyncOutcome::Cloned
                }
                Err(e) => {
                    error!("{}: failed to clone repo: {}", record.username, e);
                    SyncOutcome::Failed(e.to_string())
                }
            }
        } else {
            let pulled = self
                .git
                .checkout_branch(&repo_path, &self.branch)
                .and_then(|()| self.git.pull(&repo_path));
            match pulled {
                Ok(()) => {
                    info!("{}: successfully pulled repo", record.username);
                    SyncOutcome::Pulled
                }
                Err(e) => {
                    error!("{}: failed to pull repo: {}", record.username, e);
                    SyncOutcome::Failed(e.to_string())
                }
            }
        }
    }

    /// Synchronize every student in roster order.
    ///
    /// The repository root is created when missing. `forward` is called with
    /// each record whose outcome was [`SyncOutcome::Cloned`] or
    /// [`SyncOutcome::Pulled`], immediately after that record finishes. An
    /// error from `forward` aborts the batch, since the downstream stream is
    /// gone.
    pub fn sync_all<F>(&self, roster: &[StudentRecord], mut forward: F) -> Result<SyncReport>
    where
        F: FnMut(&StudentRecord) -> Result<()>,
    {
        self.root.ensure_exists()?;

        let mut report = SyncReport::default();
        for record in roster {
            let outcome = self.sync(record);
            if outcome.is_success() {
                forward(record)?;
            }
            report.outcomes.push((record.username.clone(), outcome));
        }

        info!(
            "sync finished: {} cloned, {} pulled, {} failed",
            report.cloned(),
            report.pulled(),
            report.failed()
        );
        Ok(report)
    }
}

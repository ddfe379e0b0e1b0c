//! # Submission Checkout
//!
//! Moves each student's local clone to the commit they submitted on the LMS.
//! Only students that were already cloned are touched; run a sync batch
//! first (or pipe its forwarded rows into this one).
//!
//! A failed checkout leaves the working tree exactly as `git checkout` left
//! it. There is no rollback; re-running the batch is the recovery path.

use crate::error::Result;
use crate::lms::CourseClient;
use crate::repository::{GitOperations, RepoRoot};
use crate::roster::StudentRecord;
use crate::submission::{SubmissionResolver, SubmissionStatus};
use log::{error, info};
use std::path::Path;

/// Result of processing one student in a checkout batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The clone now sits at this commit.
    CheckedOut(String),
    /// The LMS has no submission for this student.
    NotSubmitted,
    /// The student has no local clone.
    MissingClone,
    /// The submission text holds no commit id.
    InvalidCommitId,
    /// The LMS request for the submission failed.
    SubmissionError(String),
    /// `git checkout` rejected the commit.
    Failed(String),
}

/// Per-student outcomes of one checkout batch, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutReport {
    pub outcomes: Vec<(String, CheckoutOutcome)>,
}

impl CheckoutReport {
    pub fn checked_out(&self) -> usize {
        self.count(|o| matches!(o, CheckoutOutcome::CheckedOut(_)))
    }

    pub fn not_submitted(&self) -> usize {
        self.count(|o| matches!(o, CheckoutOutcome::NotSubmitted))
    }

    pub fn missing_clone(&self) -> usize {
        self.count(|o| matches!(o, CheckoutOutcome::MissingClone))
    }

    pub fn invalid_commit(&self) -> usize {
        self.count(|o| matches!(o, CheckoutOutcome::InvalidCommitId))
    }

    pub fn submission_error(&self) -> usize {
        self.count(|o| matches!(o, CheckoutOutcome::SubmissionError(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CheckoutOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&CheckoutOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Checks out exact commits in existing clones.
pub struct CheckoutExecutor<'a> {
    git: &'a dyn GitOperations,
}

impl<'a> CheckoutExecutor<'a> {
    pub fn new(git: &'a dyn GitOperations) -> Self {
        Self { git }
    }

    /// Check out `commit_id` in the clone at `repo_path`.
    pub fn checkout(&self, repo_path: &Path, commit_id: &str) -> Result<()> {
        self.git.checkout_commit(repo_path, commit_id)
    }
}

/// Check out every rostered student's submitted commit for an assignment.
///
/// Fails before touching any student when the repository root is missing or
/// the assignment cannot be found. Every other problem is recorded for that
/// student and the batch moves on.
pub fn checkout_submissions(
    course: &dyn CourseClient,
    git: &dyn GitOperations,
    root: &RepoRoot,
    roster: &[StudentRecord],
    assignment_number: &str,
) -> Result<CheckoutReport> {
    root.require_exists()?;
    let resolver = SubmissionResolver::new(course, assignment_number)?;
    let executor = CheckoutExecutor::new(git);

    let mut report = CheckoutReport::default();
    for record in roster {
        let outcome = checkout_one(&resolver, &executor, root, record);
        report.outcomes.push((record.username.clone(), outcome));
    }

    info!(
        "checkout finished: {} checked out, {} not submitted, {} not cloned, {} invalid commit ID, {} submission errors, {} failed",
        report.checked_out(),
        report.not_submitted(),
        report.missing_clone(),
        report.invalid_commit(),
        report.submission_error(),
        report.failed()
    );
    Ok(report)
}

fn checkout_one(
    resolver: &SubmissionResolver<'_>,
    executor: &CheckoutExecutor<'_>,
    root: &RepoRoot,
    record: &StudentRecord,
) -> CheckoutOutcome {
    let username = &record.username;

    let submission = match resolver.fetch(record) {
        Ok(submission) => submission,
        Err(e) => {
            error!("{}: assignment submission error: {}", username, e);
            return CheckoutOutcome::SubmissionError(e.to_string());
        }
    };

    let repo_path = root.repo_path(username);
    if !repo_path.exists() {
        error!("{}: {}: directory not found", username, repo_path.display());
        return CheckoutOutcome::MissingClone;
    }

    let commit_id = match resolver.decide(&submission) {
        SubmissionStatus::Commit(commit_id) => commit_id,
        SubmissionStatus::NotSubmitted => return CheckoutOutcome::NotSubmitted,
        SubmissionStatus::MissingCommitId => return CheckoutOutcome::InvalidCommitId,
    };

    match executor.checkout(&repo_path, &commit_id) {
        Ok(()) => {
            info!("{}: checked out commit {}", username, commit_id);
            CheckoutOutcome::CheckedOut(commit_id)
        }
        Err(e) => {
            error!("{}: failed to check out {}: {}", username, commit_id, e);
            CheckoutOutcome::Failed(e.to_string())
        }
    }
}

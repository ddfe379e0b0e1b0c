//! # Submission Resolution
//!
//! Students declare their submission by pasting a commit id into the LMS
//! text-entry box. This module finds the assignment for a given number and
//! turns each student's free-text submission into the commit to check out.
//!
//! A commit id is the first run of 8 to 40 hexadecimal characters bounded by
//! non-word characters. When a body holds several such runs only the first is
//! used, so stray hex-looking text pasted before the real id wins.

use crate::error::{Error, Result};
use crate::lms::{Assignment, CourseClient, Submission};
use crate::roster::StudentRecord;
use log::{error, info};
use regex::Regex;
use std::sync::LazyLock;

/// Assignments whose names contain this marker hold design documents, not code.
pub const DESIGN_MARKER: &str = "DESIGN";

static COMMIT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-fA-F0-9]{8,40})\b").expect("commit id pattern is a valid regex")
});

/// Return the first commit-id-shaped token in `text`.
pub fn extract_commit_id(text: &str) -> Option<&str> {
    COMMIT_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Find the code assignment numbered `number`.
///
/// Matches the first assignment whose name contains `Assignment {number}` and
/// is not a design-document variant. Not finding one is fatal for the batch.
pub fn locate_assignment(course: &dyn CourseClient, number: &str) -> Result<Assignment> {
    course
        .get_assignment_by_name_fragment(&format!("Assignment {}", number), DESIGN_MARKER)?
        .ok_or_else(|| Error::AssignmentNotFound {
            number: number.to_string(),
        })
}

/// A student's submission with its commit id resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubmission {
    pub username: String,
    pub assignment_number: String,
    pub submitted_at: Option<String>,
    pub raw_text: String,
    pub commit_id: Option<String>,
}

impl ResolvedSubmission {
    fn from_lms(record: &StudentRecord, assignment_number: &str, submission: Submission) -> Self {
        let raw_text = submission.body.unwrap_or_default();
        let commit_id = extract_commit_id(&raw_text).map(str::to_string);
        Self {
            username: record.username.clone(),
            assignment_number: assignment_number.to_string(),
            submitted_at: submission.submitted_at,
            raw_text,
            commit_id,
        }
    }

    /// Whether the LMS recorded an actual submission.
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// What to do with this submission. A commit id only counts when the LMS
    /// recorded an actual submission.
    pub fn status(&self) -> SubmissionStatus {
        if !self.is_submitted() {
            return SubmissionStatus::NotSubmitted;
        }
        match &self.commit_id {
            Some(commit_id) => SubmissionStatus::Commit(commit_id.clone()),
            None => SubmissionStatus::MissingCommitId,
        }
    }
}

/// Outcome of resolving one student's submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Nothing was submitted.
    NotSubmitted,
    /// Submitted, but the text holds no commit id.
    MissingCommitId,
    /// The commit to check out.
    Commit(String),
}

/// Resolves students' submitted commits for one assignment.
pub struct SubmissionResolver<'a> {
    course: &'a dyn CourseClient,
    assignment: Assignment,
    assignment_number: String,
}

impl<'a> SubmissionResolver<'a> {
    /// Locate the assignment up front; fails the batch when it is missing.
    pub fn new(course: &'a dyn CourseClient, assignment_number: &str) -> Result<Self> {
        let assignment = locate_assignment(course, assignment_number)?;
        info!(
            "resolving submissions for \"{}\" (id {})",
            assignment.name, assignment.id
        );
        Ok(Self {
            course,
            assignment,
            assignment_number: assignment_number.to_string(),
        })
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Fetch and parse a student's submission.
    pub fn fetch(&self, record: &StudentRecord) -> Result<ResolvedSubmission> {
        let submission = self
            .course
            .get_submission(&self.assignment, &record.platform_id)?;
        Ok(ResolvedSubmission::from_lms(
            record,
            &self.assignment_number,
            submission,
        ))
    }

    /// Classify a fetched submission, logging the students that are skipped.
    pub fn decide(&self, submission: &ResolvedSubmission) -> SubmissionStatus {
        let status = submission.status();
        match &status {
            SubmissionStatus::NotSubmitted => {
                info!("{}: nothing submitted", submission.username)
            }
            SubmissionStatus::MissingCommitId => error!(
                "{}: invalid or missing commit ID submission",
                submission.username
            ),
            SubmissionStatus::Commit(_) => {}
        }
        status
    }

    /// The commit `record` submitted, if any.
    ///
    /// Returns `Ok(None)` for students who have not submitted or whose text
    /// has no commit id; the latter is logged. A failing LMS request is an
    /// error for this student only.
    pub fn resolve(&self, record: &StudentRecord) -> Result<Option<String>> {
        let submission = self.fetch(record)?;
        Ok(match self.decide(&submission) {
            SubmissionStatus::Commit(commit_id) => Some(commit_id),
            SubmissionStatus::NotSubmitted | SubmissionStatus::MissingCommitId => None,
        })
    }
}

//! # Course Repositories Library
//!
//! This library automates the per-student repository chores of running a
//! programming course: keeping a local clone of every student's repository
//! up to date, checking out the commit each student declared as their
//! submission on the learning-management system (LMS), and granting students
//! access to a shared resource repository. It is designed to be used by the
//! `course-repos` command-line tool but the batch engines can be driven from
//! any program that supplies a roster.
//!
//! ## Quick Example
//!
//! ```
//! use course_repos::roster::{read_roster, select_range};
//! use course_repos::submission::extract_commit_id;
//!
//! let csv = "Ann,1,ann1,git@git.example.edu:c/ann1.git\n\
//!            Beth,2,beth2,git@git.example.edu:c/beth2.git\n\
//!            Cid,3,cid3,git@git.example.edu:c/cid3.git\n";
//! let roster = read_roster(csv.as_bytes()).unwrap();
//!
//! let graded = select_range(roster, Some("beth2"), None);
//! assert_eq!(graded.len(), 2);
//!
//! assert_eq!(extract_commit_id("Committed abc123DE at 10am"), Some("abc123DE"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Roster (`roster`)**: The ordered list of students driving every batch.
//!   `username` is the key shared by the local clone directory, the LMS
//!   submission and the platform membership.
//! - **Synchronization (`sync`)**: Clones missing repositories and pulls
//!   existing ones. Idempotent, so a failed batch is simply re-run.
//! - **Submission Resolution (`submission`)**: Finds an assignment by number
//!   and extracts the submitted commit id from each student's text entry.
//! - **Checkout (`checkout`)**: Moves each clone to its submitted commit.
//! - **Access (`access`)**: Raises every student to reporter access on the
//!   resource repository without ever lowering an existing privilege.
//!
//! ## Capability Seams
//!
//! The engines reach the outside world only through three traits:
//! [`repository::GitOperations`], [`lms::CourseClient`] and
//! [`platform::PlatformClient`]. The default implementations shell out to
//! `git`, call the Canvas API, and call the GitLab API respectively; tests
//! substitute in-memory doubles.
//!
//! ## Failure Model
//!
//! Every batch is sequential. Fatal problems (missing repository root,
//! unknown assignment, rejected token, unknown resource repository, bad
//! configuration) abort before the first student; everything else is logged
//! against the offending username and the batch continues. See
//! [`error::Error::is_fatal`].

pub mod access;
pub mod checkout;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod lms;
pub mod platform;
pub mod repository;
pub mod roster;
pub mod submission;
pub mod sync;

#[cfg(test)]
mod batch_proptest;

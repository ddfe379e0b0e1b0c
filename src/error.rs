//! # Error Handling
//!
//! This module defines the centralized error type for the `course-repos`
//! library. It uses `thiserror` to build a single `Error` enum whose variants
//! carry enough context (paths, URLs, git stderr) to produce a useful log
//! line without any extra bookkeeping at the call site.
//!
//! ## Two tiers
//!
//! Batch operations distinguish between two kinds of failure:
//!
//! - **Fatal** errors abort a batch before any student is processed: a missing
//!   repository root, an assignment that cannot be found, rejected
//!   credentials, an unknown resource repository, or a broken configuration.
//! - **Per-record** errors belong to one student. They are logged with the
//!   offending username and the batch moves on to the next record.
//!
//! [`Error::is_fatal`] encodes that split so callers never have to match on
//! individual variants to decide whether to continue.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for course-repos operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be read or parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A configuration key required by the current command is absent.
    #[error("missing {field} in configuration")]
    ConfigMissing { field: String },

    /// The local directory holding the student repositories does not exist.
    #[error("{}: directory not found", path.display())]
    RepoDirNotFound { path: PathBuf },

    /// No LMS assignment matches the requested assignment number.
    #[error("assignment {number} not found")]
    AssignmentNotFound { number: String },

    /// The hosting platform rejected the configured token.
    #[error("invalid platform token for {server}: {message}")]
    Authentication { server: String, message: String },

    /// The shared resource repository could not be found.
    #[error("invalid resource repo ID {id}: {message}")]
    ResourceRepoNotFound { id: String, message: String },

    /// Cloning a student repository failed.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A git command run inside an existing clone failed.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// A request to the learning-management system failed.
    #[error("LMS request failed for {url}: {message}")]
    Lms { url: String, message: String },

    /// A request to the hosting platform failed.
    #[error("Platform request failed for {url}: {message}")]
    Platform { url: String, message: String },

    /// A roster row could not be read or written.
    #[error("Roster error: {message}")]
    Roster { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV error, wrapped from `csv::Error`.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` for errors that must abort a batch before any
    /// per-student work happens.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigParse { .. }
                | Error::ConfigMissing { .. }
                | Error::RepoDirNotFound { .. }
                | Error::AssignmentNotFound { .. }
                | Error::Authentication { .. }
                | Error::ResourceRepoNotFound { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

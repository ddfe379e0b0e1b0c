//! # Course Roster
//!
//! The roster is the ordered list of students that drives every batch. Each
//! row is a headerless four-column CSV record:
//!
//! ```text
//! name, platform_id, username, repo_url
//! ```
//!
//! `username` is the key that ties a student to their local clone directory,
//! their LMS submission and their membership on the hosting platform.
//!
//! Besides reading and writing rows, this module builds a roster from the
//! LMS enrollment list and restricts a name-sorted roster to a range of
//! usernames, which is how staff split a large class between graders.

use crate::config::RepoNamespace;
use crate::error::{Error, Result};
use crate::lms::LmsStudent;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

/// One student row of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Sortable display name (`"Last, First"`).
    pub display_name: String,
    /// Identifier of the student on the LMS.
    pub platform_id: String,
    /// Unique username; also the local clone directory name.
    pub username: String,
    /// Clone URL of the student's repository.
    pub repo_url: String,
}

impl StudentRecord {
    pub fn new(
        display_name: impl Into<String>,
        platform_id: impl Into<String>,
        username: impl Into<String>,
        repo_url: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            platform_id: platform_id.into(),
            username: username.into(),
            repo_url: repo_url.into(),
        }
    }
}

/// Read every roster row from `reader`.
///
/// Fails on the first malformed row so that a truncated or mis-shaped file
/// never produces a partial batch. A username may appear only once, since it
/// names the student's clone directory.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<StudentRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, row) in csv_reader.deserialize().enumerate() {
        let row_number = index + 1;
        let record: StudentRecord = row.map_err(|e| Error::Roster {
            message: format!("row {}: {}", row_number, e),
        })?;
        if let Some(first) = seen.insert(record.username.clone(), row_number) {
            return Err(Error::Roster {
                message: format!(
                    "row {}: username {} already used on row {}",
                    row_number, record.username, first
                ),
            });
        }
        records.push(record);
    }
    Ok(records)
}

/// Writes roster rows as headerless CSV, flushing after every row.
///
/// Flushing per row lets a downstream process start on the first student
/// while the upstream batch is still running.
pub struct RosterWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RosterWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    /// Append one record.
    pub fn write(&mut self, record: &StudentRecord) -> Result<()> {
        self.inner.serialize(record)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Append every record in order.
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a StudentRecord>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }
}

/// Restrict a roster to the usernames from `start` through `end`, inclusive.
///
/// Emission starts at the first record whose username equals `start` (or
/// immediately when `start` is `None`) and stops after the first record whose
/// username equals `end` (or at the end of the roster when `end` is `None`).
/// A `start` that never appears yields an empty roster.
pub fn select_range(
    records: impl IntoIterator<Item = StudentRecord>,
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<StudentRecord> {
    let mut emitting = start.is_none();
    let mut selected = Vec::new();

    for record in records {
        if Some(record.username.as_str()) == start {
            emitting = true;
        }
        let is_end = Some(record.username.as_str()) == end;
        if emitting {
            selected.push(record);
        }
        if is_end {
            break;
        }
    }
    selected
}

/// Parse a `start,end` range argument.
pub fn parse_range(range: &str) -> std::result::Result<(String, String), String> {
    match range.split(',').collect::<Vec<_>>().as_slice() {
        [start, end] if !start.trim().is_empty() && !end.trim().is_empty() => {
            Ok((start.trim().to_string(), end.trim().to_string()))
        }
        _ => Err(format!("expected START,END but got '{}'", range)),
    }
}

/// Derive a username from an institutional email address.
///
/// The username is the local part with any `+tag` suffix removed, so
/// `jdoe+cse13s@ucsc.edu` becomes `jdoe`.
pub fn username_from_email(email: &str) -> Option<&str> {
    let (local, domain) = email.split_once('@')?;
    if domain.is_empty() {
        return None;
    }
    let username = local.split('+').next().unwrap_or(local);
    if username.is_empty() {
        None
    } else {
        Some(username)
    }
}

/// Build a name-sorted roster from LMS enrollments.
///
/// Students without a usable email are logged and left out; they cannot be
/// matched to a repository.
pub fn build_roster(
    students: Vec<LmsStudent>,
    namespace: &RepoNamespace<'_>,
    host: &str,
) -> Vec<StudentRecord> {
    let mut records: Vec<StudentRecord> = students
        .into_iter()
        .filter_map(|student| {
            let username = match student.email.as_deref().and_then(username_from_email) {
                Some(username) => username.to_string(),
                None => {
                    warn!(
                        "{}: no usable email address, leaving out of roster",
                        student.sortable_name
                    );
                    return None;
                }
            };
            let repo_url = namespace.repo_url(host, &username);
            Some(StudentRecord {
                display_name: student.sortable_name,
                platform_id: student.id,
                username,
                repo_url,
            })
        })
        .collect();

    records.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    records
}

//! Roster command implementation
//!
//! Writes the active students of the LMS course as a roster CSV, sorted by
//! name. Sorting by name keeps ranges stable between runs, so graders can
//! split the class with `--start`/`--end` (or `--range`) using usernames,
//! which are easier to type than full names.

use anyhow::Result;
use clap::Args;
use course_repos::lms::{CanvasClient, CourseClient};
use course_repos::roster::{build_roster, parse_range, select_range, RosterWriter};
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::load_config;

/// Arguments for the roster command
#[derive(Args, Debug)]
pub struct RosterArgs {
    /// Output file for the generated CSV (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub outfile: Option<PathBuf>,

    /// First username to start the CSV output from
    #[arg(short, long, value_name = "USERNAME", conflicts_with = "range")]
    pub start: Option<String>,

    /// Last username to end the CSV output with
    #[arg(short, long, value_name = "USERNAME", conflicts_with = "range")]
    pub end: Option<String>,

    /// Range of usernames to output (ex: --range=start,end)
    #[arg(short, long, value_name = "START,END", value_parser = parse_range)]
    pub range: Option<(String, String)>,
}

impl RosterArgs {
    fn bounds(&self) -> (Option<&str>, Option<&str>) {
        match &self.range {
            Some((start, end)) => (Some(start.as_str()), Some(end.as_str())),
            None => (self.start.as_deref(), self.end.as_deref()),
        }
    }
}

/// Execute the roster command
pub fn execute(args: RosterArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let lms = config.lms()?;
    let namespace = config.repo_namespace()?;
    let host = config.platform_host()?;

    let course = CanvasClient::new(lms.url, lms.course_id, lms.token)?;
    let students = course.list_students()?;
    let roster = build_roster(students, &namespace, &host);

    let (start, end) = args.bounds();
    let selected = select_range(roster, start, end);
    info!("writing {} students", selected.len());

    let output: Box<dyn Write> = match &args.outfile {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    RosterWriter::new(output).write_all(&selected)?;

    Ok(())
}

//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `course-repos` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and runs the batch,
//!   calling into the `course_repos` library to perform the core logic.
//!
//! Rosters are read from a `--csv` file or, when none is given, from stdin so
//! that commands can be chained with pipes:
//!
//! ```bash
//! course-repos clone --forward < roster.csv | course-repos checkout -a 3
//! ```

pub mod access;
pub mod checkout;
pub mod clone;
pub mod roster;

use anyhow::{Context, Result};
use course_repos::config::{self, Config};
use course_repos::defaults::default_config_path;
use course_repos::roster::{read_roster, StudentRecord};
use std::fs::File;
use std::io;
use std::path::Path;

/// Load the course configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    Ok(config::from_file(path)?)
}

/// Read the roster from `csv`, or from stdin when no file is given.
pub fn read_input(csv: Option<&Path>) -> Result<Vec<StudentRecord>> {
    match csv {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open roster {}", path.display()))?;
            Ok(read_roster(file)?)
        }
        None => Ok(read_roster(io::stdin().lock())?),
    }
}

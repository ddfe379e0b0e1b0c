//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_config(configs::LMS_ONLY);
//! fixture.command().arg("checkout").arg("-a").arg("1").assert().code(1);
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::git_origin;
    pub use super::TestFixture;
}

/// Course configuration snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// LMS settings only; nothing is listening on the URL.
    pub const LMS_ONLY: &str = r#"{
    "lms_url": "http://127.0.0.1:9",
    "course_id": 1234,
    "lms_token": "token"
}"#;

    /// Platform settings without a token.
    pub const PLATFORM_NO_TOKEN: &str = r#"{
    "platform_server_url": "https://git.example.edu",
    "resource_repo_id": "77"
}"#;

    /// Not a JSON object at all.
    pub const INVALID_JSON: &str = "lms_url = http://lms";
}

/// A temporary directory holding a `config.json` and roster files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `config.json` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file("config.json", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.json")
    }

    /// A `course-repos` command running inside the fixture directory.
    ///
    /// The configuration and repo directory environment variables are
    /// cleared so the developer's own settings never leak into a test.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("course-repos");
        cmd.current_dir(self.path())
            .env_remove("COURSE_REPOS_CONFIG")
            .env_remove("COURSE_REPOS_REPODIR");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a bare repository at `dir/name.git` with one commit on `master`.
///
/// Returns the path usable as a clone URL.
#[allow(dead_code)]
pub fn git_origin(dir: &Path, name: &str) -> PathBuf {
    let work = dir.join(format!("{}-work", name));
    let bare = dir.join(format!("{}.git", name));
    std::fs::create_dir_all(&work).expect("Failed to create work tree");

    git(&work, &["init", "--quiet"]);
    git(&work, &["checkout", "--quiet", "-b", "master"]);
    std::fs::write(work.join("README.md"), format!("# {}\n", name)).expect("Failed to write");
    git(&work, &["add", "README.md"]);
    commit(&work, "initial");
    git(
        dir,
        &[
            "clone",
            "--quiet",
            "--bare",
            work.to_str().expect("utf-8 path"),
            bare.to_str().expect("utf-8 path"),
        ],
    );
    bare
}

/// Commit everything in `work` with the test identity.
#[allow(dead_code)]
pub fn commit(work: &Path, message: &str) {
    git(
        work,
        &[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.edu",
            "commit",
            "--quiet",
            "-m",
            message,
        ],
    );
}

/// Run git in `dir` and return its trimmed stdout, panicking when it fails.
#[allow(dead_code)]
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Run git in `dir`, panicking when it fails.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

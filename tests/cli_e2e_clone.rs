//! End-to-end tests for the `clone` command against local git repositories.
//!
//! These tests shell out to `git`, so they only run with the integration
//! feature:
//!
//! ```bash
//! cargo test --features integration-tests --test cli_e2e_clone
//! ```

mod common;

use common::prelude::*;
use common::{commit, git};
use std::path::Path;

fn roster_row(username: &str, origin: &Path) -> String {
    format!("Student {},1,{},{}\n", username, username, origin.display())
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clone_then_pull() {
    let fixture = TestFixture::new();
    let origin = git_origin(fixture.path(), "jdoe");
    let repodir = fixture.path().join("repos");
    let roster = roster_row("jdoe", &origin);

    fixture
        .command()
        .args(["clone", "-r"])
        .arg(&repodir)
        .write_stdin(roster.clone())
        .assert()
        .success()
        .stderr(predicate::str::contains("jdoe: successfully cloned repo"));
    assert!(repodir.join("jdoe").join("README.md").is_file());

    // Push a new commit upstream; the second run must pull it
    let work = fixture.path().join("jdoe-work");
    std::fs::write(work.join("lab1.c"), "int main(void) { return 0; }\n").unwrap();
    git(&work, &["add", "lab1.c"]);
    commit(&work, "lab 1");
    git(&work, &["push", "--quiet", origin.to_str().unwrap(), "master"]);

    fixture
        .command()
        .args(["clone", "-r"])
        .arg(&repodir)
        .write_stdin(roster)
        .assert()
        .success()
        .stderr(predicate::str::contains("jdoe: successfully pulled repo"));
    assert!(repodir.join("jdoe").join("lab1.c").is_file());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clone_forwards_only_successes() {
    let fixture = TestFixture::new();
    let good = git_origin(fixture.path(), "good");
    let missing = fixture.path().join("nowhere.git");
    let repodir = fixture.path().join("repos");

    let input = format!(
        "{}{}",
        roster_row("good", &good),
        roster_row("gone", &missing)
    );

    fixture
        .command()
        .args(["clone", "--forward", "-r"])
        .arg(&repodir)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::eq(roster_row("good", &good)))
        .stderr(predicate::str::contains("gone: failed to clone repo"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clone_reads_roster_file() {
    let fixture = TestFixture::new();
    let origin = git_origin(fixture.path(), "ann");
    let fixture = fixture.with_file("roster.csv", &roster_row("ann", &origin));
    let repodir = fixture.path().join("repos");

    fixture
        .command()
        .args(["clone", "--csv", "roster.csv", "--repodir"])
        .arg(&repodir)
        .assert()
        .success();
    assert!(repodir.join("ann").join(".git").is_dir());
}

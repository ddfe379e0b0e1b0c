//! Property-based tests for the batch engines.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::access::{AccessReconciler, TARGET_LEVEL};
    use crate::platform::mock::MockPlatformClient;
    use crate::platform::{AccessLevel, ResourceRepo};
    use crate::repository::mock::MockGitOperations;
    use crate::repository::RepoRoot;
    use crate::roster::{select_range, StudentRecord};
    use crate::submission::extract_commit_id;
    use crate::sync::RepoSynchronizer;
    use proptest::prelude::*;

    fn record(username: &str) -> StudentRecord {
        StudentRecord::new(
            format!("Name {}", username),
            "1",
            username,
            format!("git@git.example.edu:cse13s/{}.git", username),
        )
    }

    fn access_level() -> impl Strategy<Value = AccessLevel> {
        proptest::sample::select(AccessLevel::ALL.to_vec())
    }

    // ============================================================================
    // extract_commit_id property tests
    // ============================================================================

    proptest! {
        /// Property: a hex run of 8-40 chars between spaces is always found
        #[test]
        fn commit_id_found_between_separators(
            prefix in "[ g-z]{0,10}",
            id in "[a-fA-F0-9]{8,40}",
            suffix in "[ .,!]{0,10}",
        ) {
            let text = format!("{} {}{}", prefix, id, suffix);
            prop_assert_eq!(extract_commit_id(&text), Some(id.as_str()));
        }

        /// Property: runs shorter than 8 characters are never accepted
        #[test]
        fn short_hex_runs_rejected(id in "[a-f0-9]{1,7}") {
            let text = format!("commit {} pushed", id);
            prop_assert_eq!(extract_commit_id(&text), None);
        }

        /// Property: text without any hex digit never yields a commit id
        #[test]
        fn text_without_hex_yields_none(text in "[g-zG-Z .,]{0,80}") {
            prop_assert_eq!(extract_commit_id(&text), None);
        }

        /// Property: a run glued to a non-hex word character is rejected
        #[test]
        fn hex_run_with_non_hex_letter_rejected(id in "[a-f0-9]{8,20}", tail in "[g-z]") {
            let text = format!("{}{}", id, tail);
            prop_assert_eq!(extract_commit_id(&text), None);
        }

        /// Property: any accepted id is 8-40 hex characters taken from the input
        #[test]
        fn accepted_ids_are_well_formed(text in ".{0,120}") {
            if let Some(id) = extract_commit_id(&text) {
                prop_assert!((8..=40).contains(&id.len()));
                prop_assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
                prop_assert!(text.contains(id));
            }
        }
    }

    // ============================================================================
    // select_range property tests
    // ============================================================================

    proptest! {
        /// Property: the range is a contiguous slice from start through end
        #[test]
        fn range_is_contiguous_slice(
            count in 1usize..20,
            start_at in proptest::option::of(0usize..20),
            end_at in proptest::option::of(0usize..20),
        ) {
            let roster: Vec<StudentRecord> =
                (0..count).map(|i| record(&format!("user{:02}", i))).collect();
            let start = start_at.filter(|i| *i < count).map(|i| roster[i].username.clone());
            let end = end_at.filter(|i| *i < count).map(|i| roster[i].username.clone());

            let selected = select_range(roster.clone(), start.as_deref(), end.as_deref());

            let from = start_at.filter(|i| *i < count).unwrap_or(0);
            let expected: Vec<StudentRecord> = match end_at.filter(|i| *i < count) {
                Some(to) if to < from => {
                    // End passed before start was reached: nothing emitted
                    Vec::new()
                }
                Some(to) => roster[from..=to].to_vec(),
                None => roster[from..].to_vec(),
            };
            prop_assert_eq!(selected, expected);
        }

        /// Property: omitting both bounds returns the roster unchanged
        #[test]
        fn unbounded_range_is_identity(count in 0usize..30) {
            let roster: Vec<StudentRecord> =
                (0..count).map(|i| record(&format!("u{}", i))).collect();
            prop_assert_eq!(select_range(roster.clone(), None, None), roster);
        }
    }

    // ============================================================================
    // access monotonicity property tests
    // ============================================================================

    proptest! {
        /// Property: reconciling never lowers a member's level, and always
        /// leaves a registered user at or above the target
        #[test]
        fn reconcile_never_lowers_access(
            initial in proptest::option::of(access_level()),
            runs in 1usize..4,
        ) {
            let mut platform = MockPlatformClient::with_users(&["jdoe"]);
            if let Some(level) = initial {
                platform = platform.with_member("jdoe", level);
            }
            let repo = ResourceRepo { id: 1, path_with_namespace: String::new() };
            let reconciler = AccessReconciler::new(&platform, repo);

            let mut before = platform.level_of("jdoe");
            for _ in 0..runs {
                reconciler.reconcile("jdoe");
                let after = platform.level_of("jdoe");
                prop_assert!(after >= before);
                prop_assert!(after.is_some_and(|level| level >= TARGET_LEVEL));
                before = after;
            }
        }
    }

    // ============================================================================
    // sync forwarding property tests
    // ============================================================================

    proptest! {
        /// Property: forwarded records are exactly the successes, in roster
        /// order, with no duplicates; re-running never clones twice
        #[test]
        fn forwarding_matches_successes(
            failures in proptest::collection::vec(any::<bool>(), 1..12),
        ) {
            let temp_dir = tempfile::TempDir::new().unwrap();
            let roster: Vec<StudentRecord> =
                (0..failures.len()).map(|i| record(&format!("s{}", i))).collect();

            let mut git = MockGitOperations::new();
            for (record, fails) in roster.iter().zip(&failures) {
                if *fails {
                    git = git.failing_for(&record.username);
                }
            }
            let sync = RepoSynchronizer::new(&git, RepoRoot::new(temp_dir.path()));

            let mut forwarded = Vec::new();
            let report = sync
                .sync_all(&roster, |r| {
                    forwarded.push(r.clone());
                    Ok(())
                })
                .unwrap();

            let expected: Vec<StudentRecord> = roster
                .iter()
                .zip(&failures)
                .filter(|(_, fails)| !**fails)
                .map(|(r, _)| r.clone())
                .collect();
            prop_assert_eq!(&forwarded, &expected);
            prop_assert_eq!(report.cloned(), expected.len());

            let second = sync.sync_all(&roster, |_| Ok(())).unwrap();
            prop_assert_eq!(second.cloned(), 0);
        }
    }
}

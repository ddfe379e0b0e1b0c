//! # Resource Repository Access
//!
//! Grants every rostered student read access to the course's shared resource
//! repository. Each student is reconciled independently:
//!
//! 1. No platform account yet: counted as `no_user` and skipped.
//! 2. No membership: a membership is created at the target level.
//! 3. A membership below the target: raised to the target level.
//! 4. A membership at or above the target: left alone. Elevated privileges
//!    (for example a student who is also a tutor) are never lowered.
//!
//! Failures while creating or updating a membership are counted as errors
//! and the batch continues. The counters live in a [`BatchCounters`] value
//! returned from the batch, so repeated runs never share counts.

use crate::config::PlatformSettings;
use crate::error::{Error, Result};
use crate::platform::{AccessLevel, Member, PlatformClient, ResourceRepo};
use crate::roster::StudentRecord;
use log::{error, info, warn};
use serde::Serialize;

/// Level granted to students: read and comment, no write.
pub const TARGET_LEVEL: AccessLevel = AccessLevel::Reporter;

/// Result of reconciling one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new membership was created at the target level.
    Created,
    /// An existing membership was raised to the target level.
    Updated,
    /// The existing membership was already at or above the target.
    Unchanged,
    /// The student has no platform account yet.
    NoUser,
    /// A platform call failed.
    Error(String),
}

/// Outcome counts for one access batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounters {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub no_user: usize,
    pub error: usize,
}

impl BatchCounters {
    pub fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Created => self.created += 1,
            ReconcileOutcome::Updated => self.updated += 1,
            ReconcileOutcome::Unchanged => self.unchanged += 1,
            ReconcileOutcome::NoUser => self.no_user += 1,
            ReconcileOutcome::Error(_) => self.error += 1,
        }
    }

    /// Counter names and values, sorted by name.
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("access_created", self.created),
            ("access_updated", self.updated),
            ("error", self.error),
            ("nouser", self.no_user),
            ("unchanged", self.unchanged),
        ]
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.no_user + self.error
    }
}

/// Reconciles student memberships on one resource repository.
pub struct AccessReconciler<'a> {
    platform: &'a dyn PlatformClient,
    repo: ResourceRepo,
    target: AccessLevel,
}

impl<'a> AccessReconciler<'a> {
    pub fn new(platform: &'a dyn PlatformClient, repo: ResourceRepo) -> Self {
        Self {
            platform,
            repo,
            target: TARGET_LEVEL,
        }
    }

    /// Check the token and look up the resource repository.
    ///
    /// Both checks are fatal: a rejected token or an unknown repository stops
    /// the batch before any student is processed.
    pub fn connect(
        platform: &'a dyn PlatformClient,
        settings: &PlatformSettings<'_>,
    ) -> Result<Self> {
        let staff = platform
            .authenticate()
            .map_err(|e| Error::Authentication {
                server: settings.server_url.to_string(),
                message: e.to_string(),
            })?;
        info!("authenticated to {} as {}", settings.server_url, staff.username);

        let repo = platform
            .get_project(settings.resource_repo_id)
            .map_err(|e| Error::ResourceRepoNotFound {
                id: settings.resource_repo_id.to_string(),
                message: e.to_string(),
            })?;
        info!("granting access to {}", repo.path_with_namespace);

        Ok(Self::new(platform, repo))
    }

    pub fn repo(&self) -> &ResourceRepo {
        &self.repo
    }

    /// Bring `username`'s membership up to the target level.
    pub fn reconcile(&self, username: &str) -> ReconcileOutcome {
        let user = match self.platform.find_user(username) {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("{}: user doesn't (yet) exist... skipping", username);
                return ReconcileOutcome::NoUser;
            }
            Err(e) => {
                warn!("{}: user lookup failed ({})... skipping", username, e);
                return ReconcileOutcome::NoUser;
            }
        };

        let existing = match self.find_member(username) {
            Ok(existing) => existing,
            Err(e) => {
                error!("{}: unable to read membership: {}", username, e);
                return ReconcileOutcome::Error(e.to_string());
            }
        };

        match existing {
            None => match self.platform.create_member(&self.repo, &user, self.target) {
                Ok(_) => {
                    info!("{}: added as {}", username, self.target);
                    ReconcileOutcome::Created
                }
                Err(e) => {
                    error!("{}: unable to add for access: {}", username, e);
                    ReconcileOutcome::Error(e.to_string())
                }
            },
            Some(member) if member.access_level > self.target => {
                warn!(
                    "{}: has higher access than {} ({}), leaving as is",
                    username, self.target, member.access_level
                );
                ReconcileOutcome::Unchanged
            }
            Some(member) if member.access_level == self.target => {
                info!("{}: is already a {}", username, self.target);
                ReconcileOutcome::Unchanged
            }
            Some(member) => {
                match self
                    .platform
                    .update_member_level(&self.repo, &member, self.target)
                {
                    Ok(_) => {
                        info!("{}: given {} access", username, self.target);
                        ReconcileOutcome::Updated
                    }
                    Err(e) => {
                        error!("{}: not given {} access: {}", username, self.target, e);
                        ReconcileOutcome::Error(e.to_string())
                    }
                }
            }
        }
    }

    /// Reconcile every student in roster order.
    pub fn reconcile_all(&self, roster: &[StudentRecord]) -> BatchCounters {
        let mut counters = BatchCounters::default();
        for record in roster {
            let outcome = self.reconcile(&record.username);
            counters.record(&outcome);
        }
        info!(
            "access finished: {} created, {} updated, {} unchanged, {} without account, {} errors",
            counters.created, counters.updated, counters.unchanged, counters.no_user, counters.error
        );
        counters
    }

    /// The member query is a substring search, so pick the exact username.
    fn find_member(&self, username: &str) -> Result<Option<Member>> {
        Ok(self
            .platform
            .list_members(&self.repo, username)?
            .into_iter()
            .find(|m| m.username == username))
    }
}

//! # Hosting Platform Access
//!
//! Membership on the shared resource repository is managed through the
//! [`PlatformClient`] trait. [`GitLabClient`] implements it over the GitLab
//! v4 REST API with blocking HTTP calls and a personal access token.
//!
//! Access levels are totally ordered, so the reconciler can compare a
//! member's current level with the target using plain `<`/`>`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Membership level on a repository, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum AccessLevel {
    NoAccess = 0,
    MinimalAccess = 5,
    Guest = 10,
    Planner = 15,
    Reporter = 20,
    Developer = 30,
    Maintainer = 40,
    Owner = 50,
}

impl AccessLevel {
    /// Every level, in ascending order.
    pub const ALL: [AccessLevel; 8] = [
        AccessLevel::NoAccess,
        AccessLevel::MinimalAccess,
        AccessLevel::Guest,
        AccessLevel::Planner,
        AccessLevel::Reporter,
        AccessLevel::Developer,
        AccessLevel::Maintainer,
        AccessLevel::Owner,
    ];
}

impl TryFrom<u32> for AccessLevel {
    type Error = String;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        AccessLevel::ALL
            .into_iter()
            .find(|level| u32::from(*level) == value)
            .ok_or_else(|| format!("unknown access level {}", value))
    }
}

impl From<AccessLevel> for u32 {
    fn from(level: AccessLevel) -> Self {
        level as u32
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessLevel::NoAccess => "no access",
            AccessLevel::MinimalAccess => "minimal access",
            AccessLevel::Guest => "guest",
            AccessLevel::Planner => "planner",
            AccessLevel::Reporter => "reporter",
            AccessLevel::Developer => "developer",
            AccessLevel::Maintainer => "maintainer",
            AccessLevel::Owner => "owner",
        };
        f.write_str(name)
    }
}

/// A registered platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: u64,
    pub username: String,
}

/// A user's membership on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Id of the member's user account.
    pub id: u64,
    pub username: String,
    pub access_level: AccessLevel,
}

/// The shared repository students are granted access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRepo {
    pub id: u64,
    #[serde(default)]
    pub path_with_namespace: String,
}

/// Capability contract for the hosting platform.
pub trait PlatformClient {
    /// The account the token belongs to; fails when the token is rejected.
    fn authenticate(&self) -> Result<PlatformUser>;

    /// Look up a repository by id.
    fn get_project(&self, id: &str) -> Result<ResourceRepo>;

    /// Look up a user account by username.
    fn find_user(&self, username: &str) -> Result<Option<PlatformUser>>;

    /// Direct and inherited members of `repo` matching `query`.
    fn list_members(&self, repo: &ResourceRepo, query: &str) -> Result<Vec<Member>>;

    /// Add `user` to `repo` at `level`.
    fn create_member(
        &self,
        repo: &ResourceRepo,
        user: &PlatformUser,
        level: AccessLevel,
    ) -> Result<Member>;

    /// Change an existing member's level.
    fn update_member_level(
        &self,
        repo: &ResourceRepo,
        member: &Member,
        level: AccessLevel,
    ) -> Result<Member>;
}

/// GitLab v4 REST API client.
pub struct GitLabClient {
    agent: ureq::Agent,
    api_url: Url,
    token: String,
}

impl GitLabClient {
    pub fn new(server_url: &str, token: &str) -> Result<Self> {
        let mut api_url = Url::parse(server_url)?;
        let path = format!("{}/api/v4/", api_url.path().trim_end_matches('/'));
        api_url.set_path(&path);
        Ok(Self {
            agent: ureq::AgentBuilder::new().build(),
            api_url,
            token: token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api_url.join(path)?)
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        self.agent
            .request_url(method, url)
            .set("PRIVATE-TOKEN", &self.token)
    }

    fn read<T: serde::de::DeserializeOwned>(
        url: &Url,
        response: std::result::Result<ureq::Response, ureq::Error>,
    ) -> Result<T> {
        let platform_error = |message: String| Error::Platform {
            url: url.to_string(),
            message,
        };
        response
            .map_err(|e| platform_error(e.to_string()))?
            .into_json()
            .map_err(|e| platform_error(format!("invalid response body: {}", e)))
    }

    fn project_path(repo_id: &str) -> String {
        format!("projects/{}", repo_id.replace('/', "%2F"))
    }
}

impl PlatformClient for GitLabClient {
    fn authenticate(&self) -> Result<PlatformUser> {
        let url = self.endpoint("user")?;
        Self::read(&url, self.request("GET", &url).call())
    }

    fn get_project(&self, id: &str) -> Result<ResourceRepo> {
        let url = self.endpoint(&Self::project_path(id))?;
        Self::read(&url, self.request("GET", &url).call())
    }

    fn find_user(&self, username: &str) -> Result<Option<PlatformUser>> {
        let mut url = self.endpoint("users")?;
        url.query_pairs_mut().append_pair("username", username);
        let users: Vec<PlatformUser> = Self::read(&url, self.request("GET", &url).call())?;
        Ok(users.into_iter().next())
    }

    fn list_members(&self, repo: &ResourceRepo, query: &str) -> Result<Vec<Member>> {
        let mut url = self.endpoint(&format!("projects/{}/members/all", repo.id))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("per_page", "100");
        Self::read(&url, self.request("GET", &url).call())
    }

    fn create_member(
        &self,
        repo: &ResourceRepo,
        user: &PlatformUser,
        level: AccessLevel,
    ) -> Result<Member> {
        let url = self.endpoint(&format!("projects/{}/members", repo.id))?;
        let body = serde_json::json!({
            "user_id": user.id,
            "access_level": u32::from(level),
        });
        Self::read(&url, self.request("POST", &url).send_json(body))
    }

    fn update_member_level(
        &self,
        repo: &ResourceRepo,
        member: &Member,
        level: AccessLevel,
    ) -> Result<Member> {
        let url = self.endpoint(&format!("projects/{}/members/{}", repo.id, member.id))?;
        let body = serde_json::json!({ "access_level": u32::from(level) });
        Self::read(&url, self.request("PUT", &url).send_json(body))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory platform for testing.
    ///
    /// `users` are the registered accounts; `members` holds memberships of
    /// the single resource repository. Usernames in `failing_writes` make
    /// create and update calls fail.
    #[derive(Default)]
    pub struct MockPlatformClient {
        pub users: Vec<PlatformUser>,
        pub members: Mutex<HashMap<String, Member>>,
        pub failing_writes: Vec<String>,
        pub reject_token: bool,
        pub writes: Mutex<Vec<(String, AccessLevel)>>,
    }

    impl MockPlatformClient {
        pub fn with_users(usernames: &[&str]) -> Self {
            Self {
                users: usernames
                    .iter()
                    .enumerate()
                    .map(|(i, name)| PlatformUser {
                        id: i as u64 + 1,
                        username: name.to_string(),
                    })
                    .collect(),
                ..Self::default()
            }
        }

        pub fn with_member(self, username: &str, level: AccessLevel) -> Self {
            let id = self
                .users
                .iter()
                .find(|u| u.username == username)
                .map(|u| u.id)
                .unwrap_or(999);
            self.members.lock().unwrap().insert(
                username.to_string(),
                Member {
                    id,
                    username: username.to_string(),
                    access_level: level,
                },
            );
            self
        }

        pub fn failing_writes_for(mut self, username: &str) -> Self {
            self.failing_writes.push(username.to_string());
            self
        }

        pub fn level_of(&self, username: &str) -> Option<AccessLevel> {
            self.members
                .lock()
                .unwrap()
                .get(username)
                .map(|m| m.access_level)
        }

        fn write(&self, username: &str, id: u64, level: AccessLevel) -> Result<Member> {
            if self.failing_writes.iter().any(|u| u == username) {
                return Err(Error::Platform {
                    url: "mock://members".to_string(),
                    message: "403 Forbidden".to_string(),
                });
            }
            let member = Member {
                id,
                username: username.to_string(),
                access_level: level,
            };
            self.members
                .lock()
                .unwrap()
                .insert(username.to_string(), member.clone());
            self.writes
                .lock()
                .unwrap()
                .push((username.to_string(), level));
            Ok(member)
        }
    }

    impl PlatformClient for MockPlatformClient {
        fn authenticate(&self) -> Result<PlatformUser> {
            if self.reject_token {
                return Err(Error::Platform {
                    url: "mock://user".to_string(),
                    message: "401 Unauthorized".to_string(),
                });
            }
            Ok(PlatformUser {
                id: 0,
                username: "staff".to_string(),
            })
        }

        fn get_project(&self, id: &str) -> Result<ResourceRepo> {
            match id.parse::<u64>() {
                Ok(id) => Ok(ResourceRepo {
                    id,
                    path_with_namespace: "course/resources".to_string(),
                }),
                Err(_) => Err(Error::Platform {
                    url: format!("mock://projects/{}", id),
                    message: "404 Not Found".to_string(),
                }),
            }
        }

        fn find_user(&self, username: &str) -> Result<Option<PlatformUser>> {
            Ok(self.users.iter().find(|u| u.username == username).cloned())
        }

        fn list_members(&self, _repo: &ResourceRepo, query: &str) -> Result<Vec<Member>> {
            // Fuzzy like the real API: every member whose name contains the query
            Ok(self
                .members
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.username.contains(query))
                .cloned()
                .collect())
        }

        fn create_member(
            &self,
            _repo: &ResourceRepo,
            user: &PlatformUser,
            level: AccessLevel,
        ) -> Result<Member> {
            self.write(&user.username, user.id, level)
        }

        fn update_member_level(
            &self,
            _repo: &ResourceRepo,
            member: &Member,
            level: AccessLevel,
        ) -> Result<Member> {
            self.write(&member.username, member.id, level)
        }
    }
}

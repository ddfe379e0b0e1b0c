//! # Course Configuration
//!
//! This module defines the `config.json` file shared by every batch command
//! and the validation each command performs before touching any student.
//!
//! ## Format
//!
//! ```json
//! {
//!   "lms_url": "https://canvas.example.edu",
//!   "course_id": 12345,
//!   "lms_token": "...",
//!   "platform_server_url": "https://git.example.edu",
//!   "platform_token": "...",
//!   "resource_repo_id": 678,
//!   "course": "cse13s",
//!   "quarter": "fall",
//!   "year": 2024
//! }
//! ```
//!
//! Older configuration files use `canvas_url`,
//! `canvas_course_id`, `canvas_token`, `server` and `gitlab_token`; those keys
//! are accepted as aliases. Setting both a legacy key and its current name
//! is a parse error. Identifiers may be written as JSON numbers or strings.
//!
//! ## Validation
//!
//! Every key is optional at parse time. Commands ask for the group of keys
//! they need through [`Config::lms`], [`Config::platform`] and
//! [`Config::repo_namespace`], which fail with [`Error::ConfigMissing`] naming
//! the first absent key.

use crate::defaults::DEFAULT_PLATFORM_SERVER;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Parsed contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the learning-management system.
    #[serde(default, alias = "canvas_url")]
    pub lms_url: Option<String>,
    /// Course identifier on the learning-management system.
    #[serde(default, alias = "canvas_course_id", deserialize_with = "id_string")]
    pub course_id: Option<String>,
    /// API token for the learning-management system.
    #[serde(default, alias = "canvas_token")]
    pub lms_token: Option<String>,
    /// Base URL of the hosting platform.
    #[serde(default, alias = "server")]
    pub platform_server_url: Option<String>,
    /// API token for the hosting platform.
    #[serde(default, alias = "gitlab_token")]
    pub platform_token: Option<String>,
    /// Project identifier of the shared resource repository.
    #[serde(default, deserialize_with = "id_string")]
    pub resource_repo_id: Option<String>,
    /// Course slug used in student repository paths (e.g. `cse13s`).
    #[serde(default)]
    pub course: Option<String>,
    /// Academic term used in student repository paths (e.g. `fall`).
    #[serde(default)]
    pub quarter: Option<String>,
    /// Academic year used in student repository paths.
    #[serde(default, deserialize_with = "id_string")]
    pub year: Option<String>,
}

/// LMS connection settings, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmsSettings<'a> {
    pub url: &'a str,
    pub course_id: &'a str,
    pub token: &'a str,
}

/// Hosting platform settings, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSettings<'a> {
    pub server_url: &'a str,
    pub token: &'a str,
    pub resource_repo_id: &'a str,
}

/// Where student repositories live on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoNamespace<'a> {
    pub course: &'a str,
    pub quarter: &'a str,
    pub year: &'a str,
}

impl RepoNamespace<'_> {
    /// SSH clone URL of `username`'s repository on `host`.
    pub fn repo_url(&self, host: &str, username: &str) -> String {
        format!(
            "git@{}:{}/{}{}/{}.git",
            host, self.course, self.quarter, self.year, username
        )
    }
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// A file that sets both a legacy key and its current name is rejected as
    /// a duplicate field; the hint names the pair so one of them can be removed.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            let message = e.to_string();
            let hint = match duplicated_alias(&message) {
                Some((current, legacy)) => format!(
                    "`{}` and `{}` set the same value; keep only `{}`",
                    legacy, current, current
                ),
                None => "config.json must be a single JSON object".to_string(),
            };
            Error::ConfigParse {
                message,
                hint: Some(hint),
            }
        })
    }

    /// The LMS URL, course identifier and token.
    pub fn lms(&self) -> Result<LmsSettings<'_>> {
        Ok(LmsSettings {
            url: require(&self.lms_url, "lms_url")?,
            course_id: require(&self.course_id, "course_id")?,
            token: require(&self.lms_token, "lms_token")?,
        })
    }

    /// The platform server, token and resource repository.
    ///
    /// The server falls back to the default platform when absent. A missing
    /// token or resource repository is a fatal validation error.
    pub fn platform(&self) -> Result<PlatformSettings<'_>> {
        Ok(PlatformSettings {
            server_url: self
                .platform_server_url
                .as_deref()
                .unwrap_or(DEFAULT_PLATFORM_SERVER),
            token: require(&self.platform_token, "platform_token")?,
            resource_repo_id: require(&self.resource_repo_id, "resource_repo_id")?,
        })
    }

    /// The course, quarter and year that make up repository paths.
    pub fn repo_namespace(&self) -> Result<RepoNamespace<'_>> {
        Ok(RepoNamespace {
            course: require(&self.course, "course")?,
            quarter: require(&self.quarter, "quarter")?,
            year: require(&self.year, "year")?,
        })
    }

    /// Host name of the platform server, for building SSH clone URLs.
    pub fn platform_host(&self) -> Result<String> {
        let server = self
            .platform_server_url
            .as_deref()
            .unwrap_or(DEFAULT_PLATFORM_SERVER);
        let parsed = url::Url::parse(server)?;
        parsed
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| Error::ConfigParse {
                message: format!("platform_server_url has no host: {}", server),
                hint: None,
            })
    }
}

/// Load a configuration from a file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("{}: {}", path.display(), e),
        hint: Some("pass --config or set COURSE_REPOS_CONFIG".to_string()),
    })?;
    Config::parse(&content)
}

/// Current key names paired with the legacy names accepted for them.
const LEGACY_KEYS: [(&str, &str); 5] = [
    ("lms_url", "canvas_url"),
    ("course_id", "canvas_course_id"),
    ("lms_token", "canvas_token"),
    ("platform_server_url", "server"),
    ("platform_token", "gitlab_token"),
];

/// The key pair behind a serde `duplicate field` error, if any.
fn duplicated_alias(message: &str) -> Option<(&'static str, &'static str)> {
    let rest = message.split_once("duplicate field `")?.1;
    let field = rest.split('`').next()?;
    LEGACY_KEYS
        .into_iter()
        .find(|(current, legacy)| *current == field || *legacy == field)
}

fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::ConfigMissing {
            field: field.to_string(),
        }),
    }
}

/// Accepts identifiers written either as JSON numbers or strings.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    }))
}

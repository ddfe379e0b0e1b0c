//! # Learning-Management System Access
//!
//! The core only talks to the LMS through the [`CourseClient`] trait: list a
//! course's assignments, fetch one student's submission, and list the active
//! student enrollments. [`CanvasClient`] implements it over the Canvas REST
//! API with blocking HTTP calls; tests substitute an in-memory double.
//!
//! Calls are synchronous with no retry. A hung request stalls the batch at
//! that student, and the remedy is re-running the batch.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Page size requested from paginated endpoints.
const PER_PAGE: &str = "100";

/// An assignment in the course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// A student's submission for one assignment, as the LMS reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// When the student submitted; `None` means nothing was submitted.
    #[serde(default)]
    pub submitted_at: Option<String>,
    /// Free-text body of an online text-entry submission.
    #[serde(default)]
    pub body: Option<String>,
}

/// An active student enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmsStudent {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub sortable_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Capability contract for the learning-management system.
pub trait CourseClient {
    /// Every assignment in the course.
    fn list_assignments(&self) -> Result<Vec<Assignment>>;

    /// The first assignment whose name contains `fragment` and does not
    /// contain `excluded`.
    fn get_assignment_by_name_fragment(
        &self,
        fragment: &str,
        excluded: &str,
    ) -> Result<Option<Assignment>> {
        Ok(self
            .list_assignments()?
            .into_iter()
            .find(|a| a.name.contains(fragment) && !a.name.contains(excluded)))
    }

    /// The submission of `student_id` for `assignment`.
    fn get_submission(&self, assignment: &Assignment, student_id: &str) -> Result<Submission>;

    /// Active student enrollments of the course.
    fn list_students(&self) -> Result<Vec<LmsStudent>>;
}

/// Canvas REST API client.
pub struct CanvasClient {
    agent: ureq::Agent,
    base_url: Url,
    course_id: String,
    token: String,
}

impl CanvasClient {
    pub fn new(base_url: &str, course_id: &str, token: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url,
            course_id: course_id.to_string(),
            token: token.to_string(),
        })
    }

    fn course_url(&self, suffix: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("api/v1/courses/{}/{}", self.course_id, suffix))?)
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        self.agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .call()
            .map_err(|e| Error::Lms {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get(url)?.into_json().map_err(|e| Error::Lms {
            url: url.to_string(),
            message: format!("invalid response body: {}", e),
        })
    }

    /// Follows `Link: rel="next"` headers until the last page.
    fn get_paged<T: DeserializeOwned>(&self, mut url: Url) -> Result<Vec<T>> {
        url.query_pairs_mut().append_pair("per_page", PER_PAGE);

        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(page_url) = next {
            let response = self.get(&page_url)?;
            next = response.header("Link").and_then(next_link);
            let page: Vec<T> = response.into_json().map_err(|e| Error::Lms {
                url: page_url.clone(),
                message: format!("invalid response body: {}", e),
            })?;
            items.extend(page);
        }
        Ok(items)
    }
}

impl CourseClient for CanvasClient {
    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.get_paged(self.course_url("assignments")?)
    }

    fn get_submission(&self, assignment: &Assignment, student_id: &str) -> Result<Submission> {
        let url = self.course_url(&format!(
            "assignments/{}/submissions/{}",
            assignment.id, student_id
        ))?;
        self.get_json(url.as_str())
    }

    fn list_students(&self) -> Result<Vec<LmsStudent>> {
        let mut url = self.course_url("users")?;
        url.query_pairs_mut()
            .append_pair("enrollment_type[]", "student")
            .append_pair("enrollment_state[]", "active")
            .append_pair("include[]", "email");
        self.get_paged(url)
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim();
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// LMS identifiers arrive as JSON numbers; roster rows carry them as text.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}

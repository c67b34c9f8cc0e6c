//! Stored entities and their create payloads.
//!
//! Entities carry server-populated fields (`id`, `created_at`); payloads
//! (`New*`) carry exactly what a client may send. `validate()` on a payload
//! is the only gate between request bodies and the store.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TmsError};

use super::role::Role;

/// Unix milliseconds.
pub type Timestamp = i64;

/// Outcome of a test case, also used as its persisted status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Pending => "pending",
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TestStatus::Pending),
            "passed" => Ok(TestStatus::Passed),
            "failed" => Ok(TestStatus::Failed),
            other => Err(TmsError::Validation(format!("unknown test status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub responsible_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    pub is_archived: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProject {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub responsible_name: String,
    #[serde(default = "default_project_status")]
    pub status: String,
    #[serde(default)]
    pub completion_date: Option<String>,
}

fn default_project_status() -> String {
    "active".into()
}

impl NewProject {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("responsible_name", &self.responsible_name)?;
        require_text("status", &self.status)?;
        if let Some(date) = &self.completion_date {
            validate_date("completion_date", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRequirement {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewRequirement {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub status: TestStatus,
    pub requirement_ids: Vec<Uuid>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTestCase {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub requirement_ids: Vec<Uuid>,
}

impl NewTestCase {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        reject_duplicates("requirement_ids", &self.requirement_ids)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub id: Uuid,
    pub name: String,
    pub test_case_ids: Vec<Uuid>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTestSuite {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub test_case_ids: Vec<Uuid>,
}

impl NewTestSuite {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        reject_duplicates("test_case_ids", &self.test_case_ids)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTestPlan {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub deadline: Option<String>,
}

impl NewTestPlan {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        if let Some(date) = &self.deadline {
            validate_date("deadline", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub id: Uuid,
    pub project_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_plan_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_suite_id: Option<Uuid>,
    pub passed_tests: u32,
    pub total_tests: u32,
    /// Milliseconds.
    pub duration: u64,
    pub created_at: Timestamp,
}

/// Report row as recorded by a run. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewTestReport {
    pub project_id: Uuid,
    pub test_plan_id: Option<Uuid>,
    pub test_suite_id: Option<Uuid>,
    pub passed_tests: u32,
    pub total_tests: u32,
    pub duration: u64,
}

/// Body of `POST /run-tests`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    pub project_id: Uuid,
    #[serde(default)]
    pub test_plan_id: Option<Uuid>,
    #[serde(default)]
    pub test_suite_id: Option<Uuid>,
    #[serde(default)]
    pub test_case_ids: Vec<Uuid>,
}

/// One record per executed test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub test_case_id: Uuid,
    pub status: TestStatus,
    pub timestamp: Timestamp,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TmsError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Accepts calendar dates in `YYYY-MM-DD` form.
/// Calendar dates travel as `YYYY-MM-DD` strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_date(field: &str, value: &str) -> Result<()> {
    // chrono accepts single-digit months and days; the wire format does not.
    let shaped = value.len() == 10
        && value
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    if shaped && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok() {
        return Ok(());
    }
    Err(TmsError::Validation(format!(
        "{field} must be a YYYY-MM-DD date, got {value:?}"
    )))
}

fn reject_duplicates(field: &str, ids: &[Uuid]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(TmsError::Validation(format!("{field} lists {dup} more than once")));
    }
    Ok(())
}

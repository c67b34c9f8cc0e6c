//! HTTP handlers.
//!
//! Handlers are thin: decode the request, call the repository on the
//! blocking pool, encode the answer. Creates answer `{"id": ...}`, deletes
//! and targeted mutations answer `204 No Content`.

pub mod error;
pub mod middleware;

pub mod login;
pub mod projects;
pub mod reports;
pub mod requirements;
pub mod test_cases;
pub mod test_plans;
pub mod test_suites;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tms_core::model::{NewTestSuite, TestSuite};
use uuid::Uuid;

use super::{ApiResult, Created, IdQuery};
use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuiteLink {
    pub test_suite_id: Uuid,
    pub test_case_id: Uuid,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<TestSuite>>> {
    let suites = state.db(|repo| repo.list_test_suites()).await?;
    Ok(Json(suites))
}

pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<TestSuite>> {
    let Query(q) = query?;
    let suite = state.db(move |repo| repo.get_test_suite(q.id)).await?;
    Ok(Json(suite))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewTestSuite>, JsonRejection>,
) -> ApiResult<Json<Created>> {
    let Json(suite) = body?;
    let id = state.db(move |repo| repo.create_test_suite(&suite)).await?;
    Ok(Json(Created { id }))
}

pub async fn delete(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.delete_test_suite(q.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_test_case(
    State(state): State<AppState>,
    query: Result<Query<SuiteLink>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(link) = query?;
    state
        .db(move |repo| repo.add_test_case_to_suite(link.test_suite_id, link.test_case_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_test_case(
    State(state): State<AppState>,
    query: Result<Query<SuiteLink>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(link) = query?;
    state
        .db(move |repo| repo.remove_test_case_from_suite(link.test_suite_id, link.test_case_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

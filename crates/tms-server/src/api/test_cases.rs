use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tms_core::model::{NewTestCase, TestCase};
use uuid::Uuid;

use super::{ApiResult, Created, IdQuery, ProjectFilter};
use crate::app_state::AppState;
use crate::auth::Claims;

#[derive(Debug, Deserialize)]
pub struct RequirementLink {
    pub test_case_id: Uuid,
    pub requirement_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BatchCreated {
    pub ids: Vec<Uuid>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ProjectFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<TestCase>>> {
    let Query(filter) = query?;
    let cases = state
        .db(move |repo| repo.list_test_cases(filter.project_id))
        .await?;
    Ok(Json(cases))
}

pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<TestCase>> {
    let Query(q) = query?;
    let tc = state.db(move |repo| repo.get_test_case(q.id)).await?;
    Ok(Json(tc))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewTestCase>, JsonRejection>,
) -> ApiResult<Json<Created>> {
    let Json(tc) = body?;
    let id = state.db(move |repo| repo.create_test_case(&tc)).await?;
    Ok(Json(Created { id }))
}

pub async fn batch_create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<Vec<NewTestCase>>, JsonRejection>,
) -> ApiResult<Json<BatchCreated>> {
    let Json(batch) = body?;
    let size = batch.len();
    let ids = match state.db(move |repo| repo.batch_create_test_cases(&batch)).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(size, by = %claims.username, error = %e, "test case batch rolled back");
            return Err(e.into());
        }
    };
    Ok(Json(BatchCreated { ids }))
}

pub async fn delete(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.delete_test_case(q.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_requirement(
    State(state): State<AppState>,
    query: Result<Query<RequirementLink>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(link) = query?;
    state
        .db(move |repo| repo.add_requirement_to_test_case(link.test_case_id, link.requirement_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_requirement(
    State(state): State<AppState>,
    query: Result<Query<RequirementLink>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(link) = query?;
    state
        .db(move |repo| {
            repo.remove_requirement_from_test_case(link.test_case_id, link.requirement_id)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tms_core::model::{RunRequest, TestReport};

use super::{ApiResult, IdQuery, ProjectFilter};
use crate::app_state::AppState;
use crate::auth::Claims;
use crate::runner::{self, RunOutcome};

pub async fn run_tests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<RunRequest>, JsonRejection>,
) -> ApiResult<Json<RunOutcome>> {
    let Json(req) = body?;
    tracing::info!(project_id = %req.project_id, by = %claims.username, "test run requested");
    let outcome = runner::trigger_run(&state, req).await?;
    Ok(Json(outcome))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ProjectFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<TestReport>>> {
    let Query(filter) = query?;
    let reports = state
        .db(move |repo| repo.list_test_reports(filter.project_id))
        .await?;
    Ok(Json(reports))
}

pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<TestReport>> {
    let Query(q) = query?;
    let report = state.db(move |repo| repo.get_test_report(q.id)).await?;
    Ok(Json(report))
}

pub async fn delete(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.delete_test_report(q.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tms_core::model::{NewTestPlan, TestPlan};

use super::{ApiResult, Created, IdQuery, ProjectFilter};
use crate::app_state::AppState;

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ProjectFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<TestPlan>>> {
    let Query(filter) = query?;
    let plans = state
        .db(move |repo| repo.list_test_plans(filter.project_id))
        .await?;
    Ok(Json(plans))
}

pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<TestPlan>> {
    let Query(q) = query?;
    let plan = state.db(move |repo| repo.get_test_plan(q.id)).await?;
    Ok(Json(plan))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewTestPlan>, JsonRejection>,
) -> ApiResult<Json<Created>> {
    let Json(plan) = body?;
    let id = state.db(move |repo| repo.create_test_plan(&plan)).await?;
    Ok(Json(Created { id }))
}

pub async fn delete(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.delete_test_plan(q.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

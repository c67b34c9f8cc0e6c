use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tms_core::model::{NewRequirement, Requirement};

use super::{ApiResult, Created, IdQuery};
use crate::app_state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Requirement>>> {
    let reqs = state.db(|repo| repo.list_requirements()).await?;
    Ok(Json(reqs))
}

pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<Requirement>> {
    let Query(q) = query?;
    let req = state.db(move |repo| repo.get_requirement(q.id)).await?;
    Ok(Json(req))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewRequirement>, JsonRejection>,
) -> ApiResult<Json<Created>> {
    let Json(req) = body?;
    let id = state.db(move |repo| repo.create_requirement(&req)).await?;
    Ok(Json(Created { id }))
}

pub async fn delete(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.delete_requirement(q.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

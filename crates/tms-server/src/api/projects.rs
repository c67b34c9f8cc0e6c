use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use tms_core::model::{NewProject, Project};

use super::{ApiResult, Created, IdQuery};
use crate::app_state::AppState;
use crate::auth::Claims;

#[derive(Debug, Deserialize)]
pub struct CompletionDateBody {
    pub completion_date: String,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.db(|repo| repo.list_projects()).await?;
    Ok(Json(projects))
}

pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<Json<Project>> {
    let Query(q) = query?;
    let project = state.db(move |repo| repo.get_project(q.id)).await?;
    Ok(Json(project))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewProject>, JsonRejection>,
) -> ApiResult<Json<Created>> {
    let Json(project) = body?;
    let id = state.db(move |repo| repo.create_project(&project)).await?;
    tracing::info!(project_id = %id, by = %claims.username, "project created");
    Ok(Json(Created { id }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.delete_project(q.id)).await?;
    tracing::info!(project_id = %q.id, by = %claims.username, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn archive(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    state.db(move |repo| repo.archive_project(q.id)).await?;
    tracing::info!(project_id = %q.id, by = %claims.username, "project archived");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_completion_date(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
    body: Result<Json<CompletionDateBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Query(q) = query?;
    let Json(b) = body?;
    state
        .db(move |repo| repo.set_project_completion_date(q.id, &b.completion_date))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tms_core::model::User;

use super::ApiResult;
use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = body?;
    let username = req.username.clone();

    let user = match state.authenticate(req.username, req.password).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(%username, "login rejected");
            return Err(e.into());
        }
    };

    let token = state.tokens().issue(&user.username, user.role)?;
    tracing::info!(username = %user.username, role = %user.role, "login succeeded");
    Ok(Json(LoginResponse { token, user }))
}

//! HTTP mapping for `TmsError`.
//!
//! Every failure is answered with a plain-text message and the status of its
//! client code. Internal errors are logged and replaced by a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tms_core::TmsError;

use crate::auth::AuthError;
use crate::repo::RepoError;

#[derive(Debug)]
pub struct ApiError(pub TmsError);

impl From<TmsError> for ApiError {
    fn from(e: TmsError) -> Self {
        Self(e)
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        Self(e.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self(TmsError::Validation(format!("invalid request body: {}", e.body_text())))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self(TmsError::Validation(format!("invalid query: {}", e.body_text())))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        if let TmsError::Internal(detail) = &self.0 {
            tracing::error!(error = %detail, "request failed");
        }
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.0.public_message()).into_response()
    }
}

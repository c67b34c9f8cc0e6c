//! Request middleware: role gate, CORS, request deadline.

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::ApiError;
use crate::app_state::{AppState, REQUEST_DEADLINE};

/// Role gate for protected routes. Verified claims are attached to the
/// request extensions for handlers.
pub async fn require_role(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let claims = state.gate().authorize(req.headers(), req.method(), &route)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub async fn cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = state.cors_origin().clone();

    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = res.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    res
}

/// Sets the request deadline for everything downstream. The handler is never
/// dropped mid-flight; store work and run execution stop at the deadline on
/// their own and answer `408` with nothing committed.
pub async fn request_timeout(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limit = Duration::from_millis(state.cfg().server.request_timeout_ms);
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let res = REQUEST_DEADLINE.scope(Instant::now() + limit, next.run(req)).await;
    if res.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!(%method, %path, timeout_ms = limit.as_millis() as u64, "request timed out");
    }
    res
}

//! Operational HTTP endpoints.
//!
//! - `/status`       : liveness
//! - `/swagger.json` : API description stub

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::policy::PROTECTED_ROUTES;

pub async fn status() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Minimal OpenAPI document listing every route. Schemas are not described.
pub async fn swagger() -> Response {
    let mut paths = Map::new();
    for (method, path) in public_routes().chain(protected_routes()) {
        let entry = paths
            .entry(path.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(ops) = entry {
            ops.insert(method.to_ascii_lowercase(), json!({ "responses": {} }));
        }
    }

    let doc = json!({
        "openapi": "3.0.0",
        "info": { "title": "tms", "version": env!("CARGO_PKG_VERSION") },
        "paths": paths,
    });

    ([(header::CONTENT_TYPE, "application/json")], doc.to_string()).into_response()
}

fn public_routes() -> impl Iterator<Item = (&'static str, &'static str)> {
    [("POST", "/login"), ("GET", "/status"), ("GET", "/swagger.json")].into_iter()
}

fn protected_routes() -> impl Iterator<Item = (&'static str, &'static str)> {
    PROTECTED_ROUTES
        .iter()
        .filter_map(|key| key.split_once(' '))
}

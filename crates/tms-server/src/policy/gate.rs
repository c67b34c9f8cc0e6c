use std::sync::Arc;

use axum::http::{header, HeaderMap, Method};
use tms_core::error::{Result, TmsError};

use crate::auth::{Claims, TokenService};

use super::table::{PolicyDecision, PolicyTable};

/// Per-route authorization: bearer token → verified claims → policy table.
///
/// Only the `Authorization` header is consulted. There is no other way past
/// the gate.
pub struct RoleGate {
    table: PolicyTable,
    tokens: Arc<TokenService>,
}

impl RoleGate {
    pub fn new(table: PolicyTable, tokens: Arc<TokenService>) -> Self {
        Self { table, tokens }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    pub fn authorize(&self, headers: &HeaderMap, method: &Method, route: &str) -> Result<Claims> {
        let token = bearer_token(headers)?;
        let claims = self.tokens.verify(token)?;

        match self.table.check(method.as_str(), route, claims.role) {
            PolicyDecision::Allow => Ok(claims),
            PolicyDecision::Deny => {
                tracing::info!(
                    username = %claims.username,
                    role = %claims.role,
                    %method,
                    route,
                    "role not allowed for route"
                );
                Err(TmsError::Forbidden(format!(
                    "role {} may not access {method} {route}",
                    claims.role
                )))
            }
            PolicyDecision::UnknownRoute => {
                tracing::warn!(%method, route, "route missing from policy table");
                Err(TmsError::Forbidden(format!("{method} {route} is not accessible")))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| TmsError::Unauthorized("missing authorization header".into()))?;
    let value = raw
        .to_str()
        .map_err(|_| TmsError::Unauthorized("malformed authorization header".into()))?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TmsError::Unauthorized("expected a bearer token".into()))?;
    Ok(token)
}

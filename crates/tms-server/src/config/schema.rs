use axum::http::HeaderValue;
use serde::Deserialize;
use tms_core::error::{Result, TmsError};
use tms_core::Role;

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 16;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub access: AccessSection,

    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TmsError::Validation(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;

        for u in &self.seed_users {
            if u.username.trim().is_empty() {
                return Err(TmsError::Validation("seed_users.username must not be empty".into()));
            }
            if !u.password_hash.starts_with("$2") {
                return Err(TmsError::Validation(format!(
                    "seed_users[{}].password_hash must be a bcrypt hash",
                    u.username
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            cors_allow_origin: default_cors_allow_origin(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=300_000).contains(&self.request_timeout_ms) {
            return Err(TmsError::Validation(
                "server.request_timeout_ms must be between 100 and 300000".into(),
            ));
        }
        if self.cors_allow_origin.trim().is_empty() {
            return Err(TmsError::Validation(
                "server.cors_allow_origin must not be empty".into(),
            ));
        }
        if HeaderValue::from_str(&self.cors_allow_origin).is_err() {
            return Err(TmsError::Validation(
                "server.cors_allow_origin is not a valid header value".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_cors_allow_origin() -> String {
    "*".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseSection {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(TmsError::Validation("database.path must not be empty".into()));
        }
        if self.busy_timeout_ms > 60_000 {
            return Err(TmsError::Validation(
                "database.busy_timeout_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_db_path() -> String {
    "tms.db".into()
}
fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Required. No default; `TMS_JWT_SECRET` overrides the file value.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        match &self.jwt_secret {
            None => return Err(TmsError::Validation("auth.jwt_secret is required".into())),
            Some(s) if s.len() < MIN_SECRET_BYTES => {
                return Err(TmsError::Validation(format!(
                    "auth.jwt_secret must be at least {MIN_SECRET_BYTES} bytes"
                )));
            }
            Some(_) => {}
        }
        if !(60..=7 * 86_400).contains(&self.token_ttl_secs) {
            return Err(TmsError::Validation(
                "auth.token_ttl_secs must be between 60 and 604800".into(),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(TmsError::Validation(
                "auth.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        Ok(())
    }

    /// Secret bytes. Only meaningful after `validate()` succeeded.
    pub fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_deref().unwrap_or_default().as_bytes()
    }
}

fn default_token_ttl_secs() -> u64 {
    24 * 60 * 60
}
fn default_bcrypt_cost() -> u32 {
    10
}

/// Per-route role overrides. Routes not listed keep the default (manager only).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessSection {
    #[serde(default)]
    pub overrides: Vec<RouteOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteOverride {
    /// `"METHOD /path"`, e.g. `"GET /test-reports"`.
    pub route: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

//! Service config loader (strict parsing).
//!
//! `STAGE` selects one of three documents under the config directory
//! (`TMS_CONFIG_DIR`, default `config`): `local.yaml`, `dev.yaml`, `prod.yaml`.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use tms_core::error::{Result, TmsError};

pub use schema::{
    AccessSection, AuthSection, DatabaseSection, RouteOverride, SeedUser, ServerSection,
    ServiceConfig,
};

pub const STAGE_ENV: &str = "STAGE";
pub const CONFIG_DIR_ENV: &str = "TMS_CONFIG_DIR";
pub const JWT_SECRET_ENV: &str = "TMS_JWT_SECRET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Local,
    Dev,
    Prod,
}

impl Stage {
    /// Resolve the stage selector. Unset or unrecognized values fall back to `Local`.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("prod") => Stage::Prod,
            Some("dev") => Stage::Dev,
            Some("local") => Stage::Local,
            None | Some("") => {
                tracing::info!("STAGE is not set, using local config (available: prod, dev, local)");
                Stage::Local
            }
            Some(other) => {
                tracing::warn!(stage = %other, "unrecognized STAGE, using local config (available: prod, dev, local)");
                Stage::Local
            }
        }
    }

    pub fn from_env() -> Self {
        Self::resolve(std::env::var(STAGE_ENV).ok().as_deref())
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Stage::Local => "local.yaml",
            Stage::Dev => "dev.yaml",
            Stage::Prod => "prod.yaml",
        }
    }
}

pub fn config_path(stage: Stage) -> PathBuf {
    let dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".into());
    Path::new(&dir).join(stage.file_name())
}

/// Load the document selected by `STAGE`, apply env overrides, validate.
pub fn load_for_stage() -> Result<ServiceConfig> {
    let stage = Stage::from_env();
    let path = config_path(stage);
    tracing::info!(?stage, path = %path.display(), "loading config");
    load_from_file(&path)
}

pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path).map_err(|e| {
        TmsError::Internal(format!("read config failed ({}): {e}", path.display()))
    })?;
    let mut cfg = parse(&s)?;
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

/// Parse and validate without consulting the environment.
pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg = parse(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse(s: &str) -> Result<ServiceConfig> {
    serde_yaml::from_str(s).map_err(|e| TmsError::Validation(format!("invalid yaml: {e}")))
}

fn apply_env_overrides(cfg: &mut ServiceConfig) {
    if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
        if !secret.is_empty() {
            cfg.auth.jwt_secret = Some(secret);
        }
    }
}

//! Shared application state for the tms server.
//!
//! Built once at startup and handed to every handler through axum's `State`.
//! Holds no per-request data and no locks; the store is the only shared
//! mutable resource and it coordinates itself.
//!
//! The request deadline travels as a task-local set by the timeout
//! middleware. Store work reads it before moving to the blocking pool and
//! will not commit past it, so a `408` never follows a persisted write.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderValue;
use tms_core::error::{Result, TmsError};
use tms_core::model::User;

use crate::auth::{self, AuthError, TokenService};
use crate::config::ServiceConfig;
use crate::policy::{PolicyTable, RoleGate};
use crate::repo::{RepoResult, Repository};
use crate::runner::TestRunner;
use crate::store::Store;

tokio::task_local! {
    pub(crate) static REQUEST_DEADLINE: Instant;
}

/// Deadline of the request being served on this task, if any.
pub(crate) fn request_deadline() -> Option<Instant> {
    REQUEST_DEADLINE.try_with(|d| *d).ok()
}

/// Await `fut`, giving up with `Timeout` at the request deadline.
pub(crate) async fn within_deadline<F: Future>(fut: F) -> Result<F::Output> {
    match request_deadline() {
        Some(deadline) => tokio::time::timeout_at(deadline.into(), fut)
            .await
            .map_err(|_| TmsError::Timeout),
        None => Ok(fut.await),
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    store: Store,
    tokens: Arc<TokenService>,
    gate: RoleGate,
    runner: TestRunner,
    cors_origin: HeaderValue,
}

impl AppState {
    /// Build application state with the stub run strategies.
    pub fn new(cfg: ServiceConfig, store: Store) -> Result<Self> {
        Self::with_runner(cfg, store, TestRunner::stub())
    }

    pub fn with_runner(cfg: ServiceConfig, store: Store, runner: TestRunner) -> Result<Self> {
        // 1) Compile route policy
        let table = PolicyTable::compile(&cfg.access.overrides)?;

        // 2) Token signer from the configured secret
        let tokens = Arc::new(TokenService::new(
            cfg.auth.secret_bytes(),
            cfg.auth.token_ttl_secs,
        ));
        let gate = RoleGate::new(table, Arc::clone(&tokens));

        // 3) CORS origin, checked once
        let cors_origin = HeaderValue::from_str(&cfg.server.cors_allow_origin).map_err(|_| {
            TmsError::Validation("server.cors_allow_origin is not a valid header value".into())
        })?;

        for o in &cfg.access.overrides {
            tracing::info!(route = %o.route, roles = ?o.roles, "access override applied");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                tokens,
                gate,
                runner,
                cors_origin,
            }),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn gate(&self) -> &RoleGate {
        &self.inner.gate
    }

    pub fn runner(&self) -> &TestRunner {
        &self.inner.runner
    }

    pub fn cors_origin(&self) -> &HeaderValue {
        &self.inner.cors_origin
    }

    /// Run `f` against a fresh connection on the blocking pool. Inside a
    /// request, the repository carries that request's deadline.
    pub async fn db<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository<'_>) -> RepoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let deadline = request_deadline();
        tokio::task::spawn_blocking(move || {
            let conn = inner.store.connect().map_err(crate::repo::RepoError::from)?;
            let repo = Repository::with_deadline(&conn, deadline);
            repo.check_deadline()?;
            f(&repo)
        })
        .await
        .map_err(|e| TmsError::Internal(format!("store worker failed: {e}")))?
        .map_err(TmsError::from)
    }

    /// Look up the user and check the password. Unknown user and wrong
    /// password fail identically.
    pub async fn authenticate(&self, username: String, password: String) -> Result<User> {
        let found = self
            .db(move |repo| {
                let creds = repo.find_user_credentials(&username)?;
                let hash = creds.as_ref().map(|(_, h)| h.as_str());
                let ok = auth::verify_password(&password, hash);
                Ok(creds.filter(|_| ok).map(|(user, _)| user))
            })
            .await?;

        found.ok_or_else(|| AuthError::InvalidCredentials.into())
    }
}

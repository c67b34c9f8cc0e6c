#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use tms_core::Role;
use tms_server::app_state::AppState;
use tms_server::auth;
use tms_server::config::{self, ServiceConfig};
use tms_server::repo::Repository;
use tms_server::router::build_router;
use tms_server::runner::TestRunner;
use tms_server::store::Store;

pub const SECRET: &str = "integration-test-secret-0123456789";
pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    pub router: Router,
}

pub fn test_config(extra: &str) -> ServiceConfig {
    let doc = format!(
        r#"
version: 1
auth:
  jwt_secret: "{SECRET}"
  token_ttl_secs: 3600
  bcrypt_cost: 4
{extra}
"#
    );
    config::load_from_str(&doc).expect("test config")
}

pub fn open_store(dir: &TempDir) -> Store {
    Store::open_path(dir.path().join("tms.db"), Duration::from_secs(5)).expect("open store")
}

pub fn spawn_app() -> TestApp {
    spawn_app_with("", TestRunner::stub())
}

pub fn spawn_app_with(extra_config: &str, runner: TestRunner) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    {
        let conn = store.connect().unwrap();
        let repo = Repository::new(&conn);
        let hash = auth::hash_password(PASSWORD, 4).unwrap();
        repo.create_user("mia", "Mia Manager", Role::Manager, &hash).unwrap();
        repo.create_user("ana", "Ana Analyst", Role::TestAnalyst, &hash).unwrap();
        repo.create_user("tom", "Tom Tester", Role::Tester, &hash).unwrap();
    }

    let state = AppState::with_runner(test_config(extra_config), store, runner).unwrap();
    let router = build_router(state.clone());
    TestApp { dir, state, router }
}

impl TestApp {
    pub fn token(&self, username: &str, role: Role) -> String {
        self.state.tokens().issue(username, role).unwrap()
    }

    pub fn manager_token(&self) -> String {
        self.token("mia", Role::Manager)
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, String) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, String) {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(req.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn post_empty(&self, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().method("POST").uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().method("DELETE").uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

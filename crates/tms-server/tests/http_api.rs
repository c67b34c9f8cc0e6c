#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tms_core::model::NewProject;
use tms_core::Role;
use tms_server::runner::TestRunner;

use common::{json, spawn_app, spawn_app_with, PASSWORD};

#[tokio::test]
async fn status_and_swagger_are_public() {
    let app = spawn_app();

    let (status, body) = app.get("/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "status": "ok" }));

    let (status, body) = app.get("/swagger.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let doc = json(&body);
    assert!(doc["paths"]["/test-cases/batch"]["post"].is_object());
    assert!(doc["paths"]["/project"]["delete"].is_object());
}

#[tokio::test]
async fn login_issues_token_without_password() {
    let app = spawn_app();

    let (status, body) = app
        .post_json("/login", None, json!({ "username": "mia", "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let v = json(&body);
    assert_eq!(v["user"]["username"], "mia");
    assert_eq!(v["user"]["role"], "manager");
    assert!(v["user"].get("password").is_none());
    assert!(v["user"].get("password_hash").is_none());
    assert!(!body.contains(PASSWORD));

    let token = v["token"].as_str().unwrap();
    let claims = app.state.tokens().verify(token).unwrap();
    assert_eq!(claims.role, Role::Manager);
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let app = spawn_app();

    let (wrong_pw, body_a) = app
        .post_json("/login", None, json!({ "username": "mia", "password": "nope" }))
        .await;
    let (no_user, body_b) = app
        .post_json("/login", None, json!({ "username": "ghost", "password": "nope" }))
        .await;
    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);

    let (status, _) = app.post_json("/login", None, json!({ "username": "mia" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_need_a_manager() {
    let app = spawn_app();

    let (status, _) = app.get("/projects", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/projects", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let tester = app.token("tom", Role::Tester);
    let (status, _) = app.get("/projects", Some(&tester)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/projects", Some(&app.manager_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!([]));
}

#[tokio::test]
async fn bypass_header_is_ignored() {
    let app = spawn_app();
    let req = Request::builder()
        .method("GET")
        .uri("/projects")
        .header("bypass", "true")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_override_applies_over_http() {
    let extra = r#"
access:
  overrides:
    - route: "GET /test-reports"
      roles: [manager, tester]
"#;
    let app = spawn_app_with(extra, TestRunner::stub());
    let tester = app.token("tom", Role::Tester);

    let (status, _) = app.get("/test-reports", Some(&tester)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/test-plans", Some(&tester)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn project_lifecycle() {
    let app = spawn_app();
    let t = app.manager_token();

    let (status, body) = app
        .post_json(
            "/project",
            Some(&t),
            json!({ "name": "Mobile", "responsible_name": "alice" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = json(&body)["id"].as_str().unwrap().to_owned();

    let (status, body) = app.get(&format!("/project?id={id}"), Some(&t)).await;
    assert_eq!(status, StatusCode::OK);
    let p = json(&body);
    assert_eq!(p["name"], "Mobile");
    assert_eq!(p["status"], "active");
    assert_eq!(p["is_archived"], false);

    let (status, _) = app
        .post_json(
            &format!("/project/set-completion-date?id={id}"),
            Some(&t),
            json!({ "completion_date": "2025-03-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.post_empty(&format!("/project/archive?id={id}"), Some(&t)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&format!("/project?id={id}"), Some(&t)).await;
    let p = json(&body);
    assert_eq!(p["is_archived"], true);
    assert_eq!(p["completion_date"], "2025-03-01");

    let (status, _) = app.delete(&format!("/project?id={id}"), Some(&t)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/project?id={id}"), Some(&t)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let app = spawn_app();
    let t = app.manager_token();

    let (status, _) = app.get("/project?id=not-a-uuid", Some(&t)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/project", Some(&t)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json("/project", Some(&t), json!({ "name": "x", "owner": "y" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json(
            "/test-case",
            Some(&t),
            json!({ "project_id": uuid::Uuid::new_v4(), "name": "orphan" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_rolls_back_over_http() {
    let app = spawn_app();
    let t = app.manager_token();

    let (_, body) = app
        .post_json("/project", Some(&t), json!({ "name": "Web", "responsible_name": "bob" }))
        .await;
    let pid = json(&body)["id"].as_str().unwrap().to_owned();

    let (status, body) = app
        .post_json(
            "/test-cases/batch",
            Some(&t),
            json!([
                { "project_id": pid, "name": "one" },
                { "project_id": pid, "name": "" },
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("batch item 1"));

    let (_, body) = app.get(&format!("/test-cases?project_id={pid}"), Some(&t)).await;
    assert_eq!(json(&body), json!([]));

    let (status, body) = app
        .post_json(
            "/test-cases/batch",
            Some(&t),
            json!([
                { "project_id": pid, "name": "one" },
                { "project_id": pid, "name": "two" },
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn associations_over_http() {
    let app = spawn_app();
    let t = app.manager_token();

    let (_, body) = app
        .post_json("/project", Some(&t), json!({ "name": "Api", "responsible_name": "eve" }))
        .await;
    let pid = json(&body)["id"].as_str().unwrap().to_owned();
    let (_, body) = app
        .post_json("/test-case", Some(&t), json!({ "project_id": pid, "name": "c1" }))
        .await;
    let tc = json(&body)["id"].as_str().unwrap().to_owned();
    let (_, body) = app
        .post_json("/requirement", Some(&t), json!({ "name": "REQ-7" }))
        .await;
    let req = json(&body)["id"].as_str().unwrap().to_owned();
    let (_, body) = app
        .post_json("/test-suite", Some(&t), json!({ "name": "smoke" }))
        .await;
    let suite = json(&body)["id"].as_str().unwrap().to_owned();

    let link = format!("/test-case/add-requirement?test_case_id={tc}&requirement_id={req}");
    assert_eq!(app.post_empty(&link, Some(&t)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(app.post_empty(&link, Some(&t)).await.0, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&format!("/test-case?id={tc}"), Some(&t)).await;
    assert_eq!(json(&body)["requirement_ids"], json!([req]));

    let add = format!("/test-suite/add-test-case?test_suite_id={suite}&test_case_id={tc}");
    assert_eq!(app.post_empty(&add, Some(&t)).await.0, StatusCode::NO_CONTENT);
    let (_, body) = app.get(&format!("/test-suite?id={suite}"), Some(&t)).await;
    assert_eq!(json(&body)["test_case_ids"], json!([tc]));

    let remove = format!("/test-suite/remove-test-case?test_suite_id={suite}&test_case_id={tc}");
    assert_eq!(app.post_empty(&remove, Some(&t)).await.0, StatusCode::NO_CONTENT);

    let missing = format!(
        "/test-case/add-requirement?test_case_id={tc}&requirement_id={}",
        uuid::Uuid::new_v4()
    );
    assert_eq!(app.post_empty(&missing, Some(&t)).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_short_circuits() {
    let app = spawn_app();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/projects")
        .body(Body::empty())
        .unwrap();
    let res = tower::ServiceExt::oneshot(app.router.clone(), req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = spawn_app();
    let (status, _) = app.get("/does-not-exist", Some(&app.manager_token())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn timed_out_batch_persists_nothing() {
    let app = spawn_app_with("server:\n  request_timeout_ms: 100\n", TestRunner::stub());
    let t = app.manager_token();

    // seeded outside any request, so the short deadline does not apply
    let pid = app
        .state
        .db(|repo| {
            repo.create_project(&NewProject {
                id: None,
                name: "Bulk".into(),
                responsible_name: "bob".into(),
                status: "active".into(),
                completion_date: None,
            })
        })
        .await
        .unwrap();

    let size = 15_000;
    let batch: Vec<_> = (0..size)
        .map(|i| json!({ "project_id": pid, "name": format!("case {i}") }))
        .collect();
    let (status, _) = app
        .post_json("/test-cases/batch", Some(&t), serde_json::Value::Array(batch))
        .await;

    let stored = app
        .state
        .db(move |repo| repo.list_test_cases(Some(pid)))
        .await
        .unwrap()
        .len();
    match status {
        StatusCode::OK => assert_eq!(stored, size),
        StatusCode::REQUEST_TIMEOUT => assert_eq!(stored, 0),
        other => panic!("unexpected status {other}"),
    }
}

#[tokio::test]
async fn configured_cors_origin_is_echoed() {
    let app = spawn_app_with(
        "server:\n  cors_allow_origin: \"https://app.example.test\"\n",
        TestRunner::stub(),
    );
    let req = Request::builder()
        .method("GET")
        .uri("/status")
        .body(Body::empty())
        .unwrap();
    let res = tower::ServiceExt::oneshot(app.router.clone(), req).await.unwrap();
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.test"
    );
}

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue, Method};
use tms_core::{ClientCode, Role};
use tms_server::auth::{AuthError, TokenService};
use tms_server::config::RouteOverride;
use tms_server::policy::{PolicyTable, RoleGate};

const SECRET: &[u8] = b"gate-test-secret-0123456789";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn bearer(token: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    h
}

#[test]
fn token_roundtrip_keeps_identity() {
    let svc = TokenService::new(SECRET, 600);
    let token = svc.issue("ana", Role::TestAnalyst).unwrap();
    let claims = svc.verify(&token).unwrap();
    assert_eq!(claims.username, "ana");
    assert_eq!(claims.role, Role::TestAnalyst);
    assert_eq!(claims.exp - claims.iat, 600);
}

#[test]
fn expired_token_rejected() {
    let svc = TokenService::new(SECRET, 60);
    let token = svc.issue_at("mia", Role::Manager, now() - 3_600).unwrap();
    assert_eq!(svc.verify(&token).unwrap_err(), AuthError::ExpiredToken);
}

#[test]
fn foreign_signature_rejected() {
    let ours = TokenService::new(SECRET, 600);
    let theirs = TokenService::new(b"some-other-secret-abcdefgh", 600);
    let token = theirs.issue("mia", Role::Manager).unwrap();
    assert_eq!(ours.verify(&token).unwrap_err(), AuthError::InvalidToken);
    assert_eq!(ours.verify("not.a.jwt").unwrap_err(), AuthError::InvalidToken);
}

#[test]
fn gate_requires_bearer_token() {
    let tokens = Arc::new(TokenService::new(SECRET, 600));
    let gate = RoleGate::new(PolicyTable::uniform(), tokens);

    let err = gate
        .authorize(&HeaderMap::new(), &Method::GET, "/projects")
        .unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unauthorized);

    let mut basic = HeaderMap::new();
    basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic bWlhOnB3"));
    let err = gate.authorize(&basic, &Method::GET, "/projects").unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unauthorized);
}

#[test]
fn gate_has_no_side_door() {
    let tokens = Arc::new(TokenService::new(SECRET, 600));
    let gate = RoleGate::new(PolicyTable::uniform(), tokens);

    // headers other than Authorization never grant access
    let mut h = HeaderMap::new();
    h.insert("bypass", HeaderValue::from_static("true"));
    h.insert("x-role", HeaderValue::from_static("manager"));
    let err = gate.authorize(&h, &Method::DELETE, "/project").unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unauthorized);
}

#[test]
fn gate_enforces_roles() {
    let tokens = Arc::new(TokenService::new(SECRET, 600));
    let gate = RoleGate::new(PolicyTable::uniform(), Arc::clone(&tokens));

    let manager = tokens.issue("mia", Role::Manager).unwrap();
    let tester = tokens.issue("tom", Role::Tester).unwrap();

    let claims = gate.authorize(&bearer(&manager), &Method::GET, "/projects").unwrap();
    assert_eq!(claims.username, "mia");

    let err = gate.authorize(&bearer(&tester), &Method::GET, "/projects").unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Forbidden);

    let err = gate.authorize(&bearer(&manager), &Method::GET, "/nowhere").unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Forbidden);
}

#[test]
fn overrides_widen_access() {
    let table = PolicyTable::compile(&[RouteOverride {
        route: "post /run-tests".into(),
        roles: vec![Role::Manager, Role::Tester],
    }])
    .unwrap();
    let tokens = Arc::new(TokenService::new(SECRET, 600));
    let gate = RoleGate::new(table, Arc::clone(&tokens));

    let tester = tokens.issue("tom", Role::Tester).unwrap();
    assert!(gate.authorize(&bearer(&tester), &Method::POST, "/run-tests").is_ok());
    assert!(gate.authorize(&bearer(&tester), &Method::GET, "/test-reports").is_err());
}

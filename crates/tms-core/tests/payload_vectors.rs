//! Request payload vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use tms_core::model::{NewProject, NewTestCase, RunRequest, TestStatus};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_project_min_applies_defaults() {
    let p: NewProject = serde_json::from_str(&load("new_project_min.json")).unwrap();
    assert!(p.id.is_none());
    assert_eq!(p.name, "Client portal");
    assert_eq!(p.status, "active");
    assert!(p.completion_date.is_none());
    p.validate().unwrap();
}

#[test]
fn parse_test_case_full() {
    let tc: NewTestCase = serde_json::from_str(&load("new_test_case_full.json")).unwrap();
    assert!(tc.id.is_some());
    assert_eq!(tc.status, TestStatus::Passed);
    assert_eq!(tc.requirement_ids.len(), 1);
}

#[test]
fn unknown_field_rejected() {
    let res = serde_json::from_str::<NewTestCase>(&load("new_test_case_unknown_field.json"));
    assert!(res.is_err());
}

#[test]
fn run_request_defaults_to_empty_case_list() {
    let req: RunRequest = serde_json::from_str(&load("run_request.json")).unwrap();
    assert!(req.test_case_ids.is_empty());
    assert!(req.test_plan_id.is_none());
    assert!(req.test_suite_id.is_some());
}

//! Axum router wiring.
//!
//! Protected routes sit behind the role gate (`route_layer`, so unmatched
//! paths still 404). Deadline and CORS wrap everything, CORS outermost so
//! preflights never reach the gate.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use crate::api::{self, middleware};
use crate::app_state::AppState;
use crate::ops;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        // projects
        .route("/projects", get(api::projects::list))
        .route(
            "/project",
            get(api::projects::get)
                .post(api::projects::create)
                .delete(api::projects::delete),
        )
        .route("/project/archive", post(api::projects::archive))
        .route(
            "/project/set-completion-date",
            post(api::projects::set_completion_date),
        )
        // test cases
        .route("/test-cases", get(api::test_cases::list))
        .route("/test-cases/batch", post(api::test_cases::batch_create))
        .route(
            "/test-case",
            get(api::test_cases::get)
                .post(api::test_cases::create)
                .delete(api::test_cases::delete),
        )
        .route(
            "/test-case/add-requirement",
            post(api::test_cases::add_requirement),
        )
        .route(
            "/test-case/remove-requirement",
            post(api::test_cases::remove_requirement),
        )
        // test plans
        .route("/test-plans", get(api::test_plans::list))
        .route(
            "/test-plan",
            get(api::test_plans::get)
                .post(api::test_plans::create)
                .delete(api::test_plans::delete),
        )
        // test suites
        .route("/test-suites", get(api::test_suites::list))
        .route(
            "/test-suite",
            get(api::test_suites::get)
                .post(api::test_suites::create)
                .delete(api::test_suites::delete),
        )
        .route(
            "/test-suite/add-test-case",
            post(api::test_suites::add_test_case),
        )
        .route(
            "/test-suite/remove-test-case",
            post(api::test_suites::remove_test_case),
        )
        // requirements
        .route("/requirements", get(api::requirements::list))
        .route(
            "/requirement",
            get(api::requirements::get)
                .post(api::requirements::create)
                .delete(api::requirements::delete),
        )
        // runs and reports
        .route("/run-tests", post(api::reports::run_tests))
        .route("/test-reports", get(api::reports::list))
        .route(
            "/test-report",
            get(api::reports::get).delete(api::reports::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_role));

    let public = Router::new()
        .route("/login", post(api::login::login))
        .route("/status", get(ops::status))
        .route("/swagger.json", get(ops::swagger));

    public
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), middleware::request_timeout))
        .layer(from_fn_with_state(state.clone(), middleware::cors))
        .with_state(state)
}

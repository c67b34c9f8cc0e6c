//! Run trigger.
//!
//! The orchestration contract is fixed: one `RunResult` per targeted test
//! case, each delivered to the notification sink, then a report recorded.
//! How a status is decided and where notifications go are injected
//! strategies (`ResultProvider`, `NotificationSink`).

pub mod strategy;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tms_core::error::Result;
use tms_core::model::{NewTestReport, RunRequest, RunResult, TestCase, TestStatus};
use uuid::Uuid;

use crate::app_state::{within_deadline, AppState};

pub use strategy::{LogNotificationSink, NotificationSink, ParityResultProvider, ResultProvider};

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Id of the recorded report.
    pub id: Uuid,
    pub results: Vec<RunResult>,
}

#[derive(Clone)]
pub struct TestRunner {
    provider: Arc<dyn ResultProvider>,
    sink: Arc<dyn NotificationSink>,
}

impl TestRunner {
    pub fn new(provider: Arc<dyn ResultProvider>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { provider, sink }
    }

    /// Parity provider + log sink.
    pub fn stub() -> Self {
        Self::new(
            Arc::new(ParityResultProvider::new()),
            Arc::new(LogNotificationSink),
        )
    }

    /// Produce one result per case, in order. A failing sink is logged and
    /// does not fail the run.
    pub async fn execute(&self, cases: &[TestCase]) -> Vec<RunResult> {
        let mut results = Vec::with_capacity(cases.len());
        for tc in cases {
            let status = self.provider.outcome(tc).await;
            let result = RunResult {
                test_case_id: tc.id,
                status,
                timestamp: now_millis(),
            };
            if let Err(e) = self.sink.notify(tc, &result).await {
                tracing::warn!(
                    sink = self.sink.name(),
                    test_case_id = %tc.id,
                    error = %e,
                    "notification delivery failed"
                );
            }
            results.push(result);
        }
        results
    }
}

/// Resolve targets, execute them, and record the report.
pub async fn trigger_run(state: &AppState, req: RunRequest) -> Result<RunOutcome> {
    let started_at = Instant::now();

    let lookup = req.clone();
    let cases = state.db(move |repo| repo.resolve_run_targets(&lookup)).await?;

    // nothing is persisted yet, so giving up here leaves no trace
    let results = within_deadline(state.runner().execute(&cases)).await?;

    let report = NewTestReport {
        project_id: req.project_id,
        test_plan_id: req.test_plan_id,
        test_suite_id: req.test_suite_id,
        passed_tests: count_status(&results, TestStatus::Passed),
        total_tests: u32::try_from(results.len()).unwrap_or(u32::MAX),
        duration: started_at.elapsed().as_millis() as u64,
    };

    let recorded = results.clone();
    let id = state.db(move |repo| repo.record_run(&report, &recorded)).await?;

    tracing::info!(
        report_id = %id,
        project_id = %req.project_id,
        total = results.len(),
        "test run recorded"
    );
    Ok(RunOutcome { id, results })
}

fn count_status(results: &[RunResult], status: TestStatus) -> u32 {
    let n = results.iter().filter(|r| r.status == status).count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

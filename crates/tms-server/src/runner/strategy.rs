use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tms_core::error::Result;
use tms_core::model::{RunResult, TestCase, TestStatus};

/// Decides the outcome of one test case.
#[async_trait]
pub trait ResultProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn outcome(&self, test_case: &TestCase) -> TestStatus;
}

/// Receives every result as it is produced.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn notify(&self, test_case: &TestCase, result: &RunResult) -> Result<()>;
}

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Stub provider: even wall-clock second passes, odd second fails.
pub struct ParityResultProvider {
    clock: Clock,
}

impl ParityResultProvider {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(|| Utc::now().timestamp()))
    }

    /// Clock returns unix seconds.
    pub fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }
}

impl Default for ParityResultProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultProvider for ParityResultProvider {
    fn name(&self) -> &'static str {
        "parity"
    }

    async fn outcome(&self, _test_case: &TestCase) -> TestStatus {
        if (self.clock)() % 2 == 0 {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        }
    }
}

/// Emits one structured log event per result.
#[derive(Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, test_case: &TestCase, result: &RunResult) -> Result<()> {
        tracing::info!(
            test_case_id = %result.test_case_id,
            test_case = %test_case.name,
            status = result.status.as_str(),
            timestamp = result.timestamp,
            "test case finished"
        );
        Ok(())
    }
}

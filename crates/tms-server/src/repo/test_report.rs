use rusqlite::{params, Row};
use tms_core::model::{NewTestReport, RunRequest, RunResult, TestCase, TestReport};
use tms_core::TmsError;
use uuid::Uuid;

use super::test_case::{load_test_case, set_test_case_status};
use super::test_suite::suite_case_ids;
use super::{
    delete_row, opt_uuid_col, opt_uuid_param, require_parent, uuid_col, RepoError, RepoResult,
    Repository, Table,
};

const TEST_REPORT_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    test_plan_id,
    test_suite_id,
    passed_tests,
    total_tests,
    duration,
    created_at
FROM test_reports";

impl Repository<'_> {
    pub fn list_test_reports(&self, project_id: Option<Uuid>) -> RepoResult<Vec<TestReport>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEST_REPORT_SELECT_SQL} WHERE (?1 IS NULL OR project_id = ?1);"
        ))?;
        let rows =
            stmt.query_map(params![opt_uuid_param(project_id)], parse_test_report_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_test_report(&self, id: Uuid) -> RepoResult<TestReport> {
        let mut stmt = self.conn.prepare(&format!("{TEST_REPORT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(parse_test_report_row(row)?);
        }
        Err(RepoError::NotFound { kind: "test report", id })
    }

    pub fn delete_test_report(&self, id: Uuid) -> RepoResult<()> {
        delete_row(self.conn, Table::TestReports, id)
    }

    /// Test cases a run request targets: the explicit ids, else the suite's
    /// cases, else every case of the project. Every case must belong to the
    /// requested project.
    pub fn resolve_run_targets(&self, req: &RunRequest) -> RepoResult<Vec<TestCase>> {
        require_parent(self.conn, Table::Projects, req.project_id)?;
        if let Some(plan) = req.test_plan_id {
            require_parent(self.conn, Table::TestPlans, plan)?;
        }
        if let Some(suite) = req.test_suite_id {
            require_parent(self.conn, Table::TestSuites, suite)?;
        }

        if req.test_case_ids.is_empty() {
            let cases = match req.test_suite_id {
                Some(suite) => suite_case_ids(self.conn, suite)?
                    .into_iter()
                    .map(|id| load_test_case(self.conn, id))
                    .collect::<RepoResult<Vec<_>>>()?,
                None => self.list_test_cases(Some(req.project_id))?,
            };
            return Ok(cases
                .into_iter()
                .filter(|tc| tc.project_id == req.project_id)
                .collect());
        }

        let mut cases = Vec::with_capacity(req.test_case_ids.len());
        for id in &req.test_case_ids {
            let tc = load_test_case(self.conn, *id)?;
            if tc.project_id != req.project_id {
                return Err(TmsError::Validation(format!(
                    "test case {id} does not belong to project {}",
                    req.project_id
                ))
                .into());
            }
            cases.push(tc);
        }
        Ok(cases)
    }

    /// Persist a finished run: one report row plus the new status of every
    /// executed case, in a single transaction.
    pub fn record_run(&self, report: &NewTestReport, results: &[RunResult]) -> RepoResult<Uuid> {
        let tx = self.conn.unchecked_transaction()?;

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO test_reports (
                id,
                project_id,
                test_plan_id,
                test_suite_id,
                passed_tests,
                total_tests,
                duration
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                report.project_id.to_string(),
                opt_uuid_param(report.test_plan_id),
                opt_uuid_param(report.test_suite_id),
                report.passed_tests,
                report.total_tests,
                i64::try_from(report.duration).unwrap_or(i64::MAX),
            ],
        )?;
        for r in results {
            set_test_case_status(&tx, r.test_case_id, r.status)?;
        }
        self.commit(tx)?;
        Ok(id)
    }
}

fn parse_test_report_row(row: &Row<'_>) -> rusqlite::Result<TestReport> {
    Ok(TestReport {
        id: uuid_col(row, 0)?,
        project_id: uuid_col(row, 1)?,
        test_plan_id: opt_uuid_col(row, 2)?,
        test_suite_id: opt_uuid_col(row, 3)?,
        passed_tests: row.get(4)?,
        total_tests: row.get(5)?,
        duration: row.get::<_, i64>(6)?.max(0) as u64,
        created_at: row.get(7)?,
    })
}

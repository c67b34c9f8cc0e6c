use rusqlite::{params, Row};
use tms_core::model::{NewTestPlan, TestPlan};
use uuid::Uuid;

use super::{delete_row, require_parent, uuid_col, RepoError, RepoResult, Repository, Table};

const TEST_PLAN_SELECT_SQL: &str =
    "SELECT id, project_id, name, goal, deadline, created_at FROM test_plans";

impl Repository<'_> {
    pub fn list_test_plans(&self, project_id: Option<Uuid>) -> RepoResult<Vec<TestPlan>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEST_PLAN_SELECT_SQL} WHERE (?1 IS NULL OR project_id = ?1);"
        ))?;
        let rows = stmt.query_map(params![project_id.map(|id| id.to_string())], parse_test_plan_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_test_plan(&self, id: Uuid) -> RepoResult<TestPlan> {
        let mut stmt = self.conn.prepare(&format!("{TEST_PLAN_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(parse_test_plan_row(row)?);
        }
        Err(RepoError::NotFound { kind: "test plan", id })
    }

    pub fn create_test_plan(&self, plan: &NewTestPlan) -> RepoResult<Uuid> {
        plan.validate()?;
        require_parent(self.conn, Table::Projects, plan.project_id)?;

        let id = plan.id.unwrap_or_else(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO test_plans (id, project_id, name, goal, deadline)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                plan.project_id.to_string(),
                plan.name.as_str(),
                plan.goal.as_str(),
                plan.deadline.as_deref(),
            ],
        )?;
        Ok(id)
    }

    pub fn delete_test_plan(&self, id: Uuid) -> RepoResult<()> {
        delete_row(self.conn, Table::TestPlans, id)
    }
}

fn parse_test_plan_row(row: &Row<'_>) -> rusqlite::Result<TestPlan> {
    Ok(TestPlan {
        id: uuid_col(row, 0)?,
        project_id: uuid_col(row, 1)?,
        name: row.get(2)?,
        goal: row.get(3)?,
        deadline: row.get(4)?,
        created_at: row.get(5)?,
    })
}

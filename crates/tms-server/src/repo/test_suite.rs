use std::collections::HashMap;

use rusqlite::{params, Connection, Row};
use tms_core::model::{NewTestSuite, TestSuite};
use uuid::Uuid;

use super::{
    delete_row, require_parent, require_row, uuid_col, RepoError, RepoResult, Repository, Table,
};

const TEST_SUITE_SELECT_SQL: &str = "SELECT id, name, created_at FROM test_suites";

impl Repository<'_> {
    pub fn list_test_suites(&self) -> RepoResult<Vec<TestSuite>> {
        let mut stmt = self.conn.prepare(TEST_SUITE_SELECT_SQL)?;
        let rows = stmt.query_map([], parse_test_suite_row)?;
        let mut suites = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT test_suite_id, test_case_id FROM test_suite_cases ORDER BY rowid;")?;
        let pairs = stmt.query_map([], |row| Ok((uuid_col(row, 0)?, uuid_col(row, 1)?)))?;
        let mut links: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for pair in pairs {
            let (suite, tc) = pair?;
            links.entry(suite).or_default().push(tc);
        }

        for suite in &mut suites {
            suite.test_case_ids = links.remove(&suite.id).unwrap_or_default();
        }
        Ok(suites)
    }

    pub fn get_test_suite(&self, id: Uuid) -> RepoResult<TestSuite> {
        let mut stmt = self.conn.prepare(&format!("{TEST_SUITE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Err(RepoError::NotFound { kind: "test suite", id });
        };
        let mut suite = parse_test_suite_row(row)?;
        suite.test_case_ids = suite_case_ids(self.conn, id)?;
        Ok(suite)
    }

    pub fn create_test_suite(&self, suite: &NewTestSuite) -> RepoResult<Uuid> {
        suite.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        for tc in &suite.test_case_ids {
            require_parent(&tx, Table::TestCases, *tc)?;
        }

        let id = suite.id.unwrap_or_else(Uuid::new_v4);
        tx.execute(
            "INSERT INTO test_suites (id, name) VALUES (?1, ?2);",
            params![id.to_string(), suite.name.as_str()],
        )?;
        for tc in &suite.test_case_ids {
            link_test_case(&tx, id, *tc)?;
        }
        self.commit(tx)?;
        Ok(id)
    }

    /// Links cascade; reports keep their row with the suite reference cleared.
    pub fn delete_test_suite(&self, id: Uuid) -> RepoResult<()> {
        delete_row(self.conn, Table::TestSuites, id)
    }

    pub fn add_test_case_to_suite(&self, test_suite_id: Uuid, test_case_id: Uuid) -> RepoResult<()> {
        require_row(self.conn, Table::TestSuites, test_suite_id)?;
        require_row(self.conn, Table::TestCases, test_case_id)?;
        link_test_case(self.conn, test_suite_id, test_case_id)
    }

    pub fn remove_test_case_from_suite(
        &self,
        test_suite_id: Uuid,
        test_case_id: Uuid,
    ) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM test_suite_cases WHERE test_suite_id = ?1 AND test_case_id = ?2;",
            params![test_suite_id.to_string(), test_case_id.to_string()],
        )?;
        Ok(())
    }
}

pub(super) fn suite_case_ids(conn: &Connection, suite_id: Uuid) -> RepoResult<Vec<Uuid>> {
    let mut stmt =
        conn.prepare("SELECT test_case_id FROM test_suite_cases WHERE test_suite_id = ?1 ORDER BY rowid;")?;
    let ids = stmt.query_map(params![suite_id.to_string()], |row| uuid_col(row, 0))?;
    Ok(ids.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn link_test_case(conn: &Connection, test_suite_id: Uuid, test_case_id: Uuid) -> RepoResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO test_suite_cases (test_suite_id, test_case_id) VALUES (?1, ?2);",
        params![test_suite_id.to_string(), test_case_id.to_string()],
    )?;
    Ok(())
}

fn parse_test_suite_row(row: &Row<'_>) -> rusqlite::Result<TestSuite> {
    Ok(TestSuite {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        test_case_ids: Vec::new(),
        created_at: row.get(2)?,
    })
}

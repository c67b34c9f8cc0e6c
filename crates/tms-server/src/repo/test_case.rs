use std::collections::HashMap;

use rusqlite::{params, Connection, Row};
use tms_core::model::{NewTestCase, TestCase, TestStatus};
use uuid::Uuid;

use super::{
    delete_row, require_parent, require_row, uuid_col, RepoError, RepoResult, Repository, Table,
};

const TEST_CASE_SELECT_SQL: &str = "SELECT id, project_id, name, status, created_at FROM test_cases";

impl Repository<'_> {
    /// All test cases, or only those of `project_id`.
    pub fn list_test_cases(&self, project_id: Option<Uuid>) -> RepoResult<Vec<TestCase>> {
        let filter = project_id.map(|id| id.to_string());

        let mut stmt = self.conn.prepare(&format!(
            "{TEST_CASE_SELECT_SQL} WHERE (?1 IS NULL OR project_id = ?1);"
        ))?;
        let rows = stmt.query_map(params![filter], parse_test_case_row)?;
        let mut cases = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut links = requirement_links(self.conn, filter.as_deref())?;
        for tc in &mut cases {
            tc.requirement_ids = links.remove(&tc.id).unwrap_or_default();
        }
        Ok(cases)
    }

    pub fn get_test_case(&self, id: Uuid) -> RepoResult<TestCase> {
        load_test_case(self.conn, id)
    }

    /// Insert one test case with its requirement links, atomically.
    pub fn create_test_case(&self, tc: &NewTestCase) -> RepoResult<Uuid> {
        let tx = self.conn.unchecked_transaction()?;
        let id = insert_test_case(&tx, tc)?;
        self.commit(tx)?;
        Ok(id)
    }

    /// All-or-nothing: any failing item rolls back every insert of the batch.
    pub fn batch_create_test_cases(&self, batch: &[NewTestCase]) -> RepoResult<Vec<Uuid>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(batch.len());
        for (index, tc) in batch.iter().enumerate() {
            let id = insert_test_case(&tx, tc).map_err(|e| RepoError::Batch {
                index,
                source: Box::new(e),
            })?;
            ids.push(id);
        }
        self.commit(tx)?;

        tracing::info!(count = ids.len(), "test case batch committed");
        Ok(ids)
    }

    pub fn delete_test_case(&self, id: Uuid) -> RepoResult<()> {
        delete_row(self.conn, Table::TestCases, id)
    }

    pub fn add_requirement_to_test_case(
        &self,
        test_case_id: Uuid,
        requirement_id: Uuid,
    ) -> RepoResult<()> {
        require_row(self.conn, Table::TestCases, test_case_id)?;
        require_row(self.conn, Table::Requirements, requirement_id)?;
        link_requirement(self.conn, test_case_id, requirement_id)
    }

    pub fn remove_requirement_from_test_case(
        &self,
        test_case_id: Uuid,
        requirement_id: Uuid,
    ) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM test_case_requirements WHERE test_case_id = ?1 AND requirement_id = ?2;",
            params![test_case_id.to_string(), requirement_id.to_string()],
        )?;
        Ok(())
    }
}

pub(super) fn load_test_case(conn: &Connection, id: Uuid) -> RepoResult<TestCase> {
    let mut stmt = conn.prepare(&format!("{TEST_CASE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query(params![id.to_string()])?;
    let Some(row) = rows.next()? else {
        return Err(RepoError::NotFound { kind: "test case", id });
    };
    let mut tc = parse_test_case_row(row)?;

    let mut stmt = conn.prepare(
        "SELECT requirement_id FROM test_case_requirements WHERE test_case_id = ?1 ORDER BY rowid;",
    )?;
    let ids = stmt.query_map(params![id.to_string()], |row| uuid_col(row, 0))?;
    tc.requirement_ids = ids.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tc)
}

pub(super) fn set_test_case_status(conn: &Connection, id: Uuid, status: TestStatus) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE test_cases SET status = ?1 WHERE id = ?2;",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound { kind: "test case", id });
    }
    Ok(())
}

fn insert_test_case(conn: &Connection, tc: &NewTestCase) -> RepoResult<Uuid> {
    tc.validate()?;
    require_parent(conn, Table::Projects, tc.project_id)?;
    for req_id in &tc.requirement_ids {
        require_parent(conn, Table::Requirements, *req_id)?;
    }

    let id = tc.id.unwrap_or_else(Uuid::new_v4);
    conn.execute(
        "INSERT INTO test_cases (id, project_id, name, status) VALUES (?1, ?2, ?3, ?4);",
        params![
            id.to_string(),
            tc.project_id.to_string(),
            tc.name.as_str(),
            tc.status.as_str(),
        ],
    )?;
    for req_id in &tc.requirement_ids {
        link_requirement(conn, id, *req_id)?;
    }
    Ok(id)
}

fn link_requirement(conn: &Connection, test_case_id: Uuid, requirement_id: Uuid) -> RepoResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO test_case_requirements (test_case_id, requirement_id)
         VALUES (?1, ?2);",
        params![test_case_id.to_string(), requirement_id.to_string()],
    )?;
    Ok(())
}

fn requirement_links(
    conn: &Connection,
    project_id: Option<&str>,
) -> RepoResult<HashMap<Uuid, Vec<Uuid>>> {
    let mut stmt = conn.prepare(
        "SELECT l.test_case_id, l.requirement_id
         FROM test_case_requirements l
         JOIN test_cases tc ON tc.id = l.test_case_id
         WHERE (?1 IS NULL OR tc.project_id = ?1)
         ORDER BY l.rowid;",
    )?;
    let rows = stmt.query_map(params![project_id], |row| {
        Ok((uuid_col(row, 0)?, uuid_col(row, 1)?))
    })?;

    let mut out: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for pair in rows {
        let (tc, req) = pair?;
        out.entry(tc).or_default().push(req);
    }
    Ok(out)
}

fn parse_test_case_row(row: &Row<'_>) -> rusqlite::Result<TestCase> {
    let raw_status: String = row.get(3)?;
    let status = TestStatus::parse(&raw_status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
        )
    })?;

    Ok(TestCase {
        id: uuid_col(row, 0)?,
        project_id: uuid_col(row, 1)?,
        name: row.get(2)?,
        status,
        requirement_ids: Vec::new(),
        created_at: row.get(4)?,
    })
}

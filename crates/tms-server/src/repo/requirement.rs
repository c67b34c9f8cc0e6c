use rusqlite::{params, Row};
use tms_core::model::{NewRequirement, Requirement};
use uuid::Uuid;

use super::{delete_row, uuid_col, RepoError, RepoResult, Repository, Table};

const REQUIREMENT_SELECT_SQL: &str = "SELECT id, name, description, created_at FROM requirements";

impl Repository<'_> {
    pub fn list_requirements(&self) -> RepoResult<Vec<Requirement>> {
        let mut stmt = self.conn.prepare(REQUIREMENT_SELECT_SQL)?;
        let rows = stmt.query_map([], parse_requirement_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_requirement(&self, id: Uuid) -> RepoResult<Requirement> {
        let mut stmt = self.conn.prepare(&format!("{REQUIREMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(parse_requirement_row(row)?);
        }
        Err(RepoError::NotFound { kind: "requirement", id })
    }

    pub fn create_requirement(&self, req: &NewRequirement) -> RepoResult<Uuid> {
        req.validate()?;

        let id = req.id.unwrap_or_else(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO requirements (id, name, description) VALUES (?1, ?2, ?3);",
            params![id.to_string(), req.name.as_str(), req.description.as_str()],
        )?;
        Ok(id)
    }

    /// Links to test cases cascade.
    pub fn delete_requirement(&self, id: Uuid) -> RepoResult<()> {
        delete_row(self.conn, Table::Requirements, id)
    }
}

fn parse_requirement_row(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    Ok(Requirement {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

use rusqlite::{params, Row};
use tms_core::model::entity::validate_date;
use tms_core::model::{NewProject, Project};
use uuid::Uuid;

use super::{delete_row, uuid_col, RepoError, RepoResult, Repository, Table};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    responsible_name,
    status,
    completion_date,
    is_archived,
    created_at
FROM projects";

impl Repository<'_> {
    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(PROJECT_SELECT_SQL)?;
        let rows = stmt.query_map([], parse_project_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_project(&self, id: Uuid) -> RepoResult<Project> {
        let mut stmt = self.conn.prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(parse_project_row(row)?);
        }
        Err(RepoError::NotFound { kind: "project", id })
    }

    pub fn create_project(&self, project: &NewProject) -> RepoResult<Uuid> {
        project.validate()?;

        let id = project.id.unwrap_or_else(Uuid::new_v4);
        self.conn.execute(
            "INSERT INTO projects (id, name, responsible_name, status, completion_date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                project.name.as_str(),
                project.responsible_name.as_str(),
                project.status.as_str(),
                project.completion_date.as_deref(),
            ],
        )?;

        tracing::debug!(project_id = %id, "project created");
        Ok(id)
    }

    /// Hard delete. Test cases, plans and reports of the project cascade.
    pub fn delete_project(&self, id: Uuid) -> RepoResult<()> {
        delete_row(self.conn, Table::Projects, id)
    }

    /// Soft delete: the row stays retrievable with `is_archived = true`.
    pub fn archive_project(&self, id: Uuid) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects SET is_archived = 1 WHERE id = ?1;",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind: "project", id });
        }
        Ok(())
    }

    pub fn set_project_completion_date(&self, id: Uuid, date: &str) -> RepoResult<()> {
        validate_date("completion_date", date)?;

        let changed = self.conn.execute(
            "UPDATE projects SET completion_date = ?1 WHERE id = ?2;",
            params![date, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind: "project", id });
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        responsible_name: row.get(2)?,
        status: row.get(3)?,
        completion_date: row.get(4)?,
        is_archived: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

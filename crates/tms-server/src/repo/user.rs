use rusqlite::{params, Row};
use tms_core::model::User;
use tms_core::{Role, TmsError};
use uuid::Uuid;

use super::{uuid_col, RepoResult, Repository};

use crate::config::SeedUser;

impl Repository<'_> {
    pub fn create_user(
        &self,
        username: &str,
        name: &str,
        role: Role,
        password_hash: &str,
    ) -> RepoResult<Uuid> {
        if username.trim().is_empty() {
            return Err(TmsError::Validation("username must not be empty".into()).into());
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO users (id, username, password_hash, name, role) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![id.to_string(), username, password_hash, name, role.as_str()],
        )?;
        Ok(id)
    }

    /// Insert configured users that do not exist yet. Existing rows are left
    /// untouched. Returns how many were inserted.
    pub fn seed_users(&self, seeds: &[SeedUser]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        for seed in seeds {
            inserted += tx.execute(
                "INSERT OR IGNORE INTO users (id, username, password_hash, name, role)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    Uuid::new_v4().to_string(),
                    seed.username.as_str(),
                    seed.password_hash.as_str(),
                    seed.name.as_str(),
                    seed.role.as_str(),
                ],
            )?;
        }
        self.commit(tx)?;
        Ok(inserted)
    }

    /// User and stored password hash, if the username exists.
    pub fn find_user_credentials(&self, username: &str) -> RepoResult<Option<(User, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, name, role, created_at, password_hash FROM users WHERE username = ?1;",
        )?;
        let mut rows = stmt.query(params![username])?;
        if let Some(row) = rows.next()? {
            let user = parse_user_row(row)?;
            let hash: String = row.get(5)?;
            return Ok(Some((user, hash)));
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let raw_role: String = row.get(3)?;
    let role = raw_role.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        id: uuid_col(row, 0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        role,
        created_at: row.get(4)?,
    })
}

//! Entity repository over the SQLite store.
//!
//! # Responsibility
//! - CRUD for projects, requirements, test cases, suites, plans, reports and users.
//! - Referential checks before insert: a missing parent is a
//!   `MissingParent` (foreign key violation), never a raw constraint error.
//!
//! # Invariants
//! - Write paths call the payload's `validate()` before any SQL mutation.
//! - Multi-row writes run inside one transaction. `rusqlite::Transaction`
//!   rolls back on drop, so every early return or panic releases it.
//! - Association writes are idempotent (`INSERT OR IGNORE` / delete-if-present).
//! - A repository bound to a request deadline refuses to commit once it has
//!   passed; the transaction is dropped and rolled back instead.

use std::time::Instant;

use rusqlite::{ffi, params, Connection, Row, Transaction};
use thiserror::Error;
use tms_core::TmsError;
use uuid::Uuid;

mod project;
mod requirement;
mod test_case;
mod test_plan;
mod test_report;
mod test_suite;
mod user;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] TmsError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("{kind} does not exist: {id}")]
    MissingParent { kind: &'static str, id: Uuid },
    #[error("batch item {index}: {source}")]
    Batch {
        index: usize,
        #[source]
        source: Box<RepoError>,
    },
    #[error("store: {0}")]
    Db(#[from] rusqlite::Error),
}

impl From<RepoError> for TmsError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Core(inner) => inner,
            e @ RepoError::NotFound { .. } => TmsError::NotFound(e.to_string()),
            e @ RepoError::MissingParent { .. } => TmsError::ForeignKeyViolation(e.to_string()),
            RepoError::Batch { index, source } => {
                prefix_message(TmsError::from(*source), &format!("batch item {index}"))
            }
            RepoError::Db(err) => from_sqlite(err),
        }
    }
}

fn prefix_message(err: TmsError, prefix: &str) -> TmsError {
    match err {
        TmsError::Validation(m) => TmsError::Validation(format!("{prefix}: {m}")),
        TmsError::NotFound(m) => TmsError::NotFound(format!("{prefix}: {m}")),
        TmsError::ForeignKeyViolation(m) => {
            TmsError::ForeignKeyViolation(format!("{prefix}: {m}"))
        }
        other => other,
    }
}

fn from_sqlite(err: rusqlite::Error) -> TmsError {
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
        match code.extended_code {
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return TmsError::ForeignKeyViolation("referenced row does not exist".into());
            }
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                return TmsError::Validation("a row with this key already exists".into());
            }
            _ => {}
        }
    }
    TmsError::Internal(err.to_string())
}

/// Repository bound to one connection for the duration of a unit of work.
pub struct Repository<'conn> {
    conn: &'conn Connection,
    deadline: Option<Instant>,
}

impl<'conn> Repository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_deadline(conn, None)
    }

    pub fn with_deadline(conn: &'conn Connection, deadline: Option<Instant>) -> Self {
        Self { conn, deadline }
    }

    /// `Timeout` once the deadline has passed.
    pub fn check_deadline(&self) -> RepoResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(TmsError::Timeout.into()),
            _ => Ok(()),
        }
    }

    fn commit(&self, tx: Transaction<'_>) -> RepoResult<()> {
        // dropping `tx` on the error path rolls the unit of work back
        self.check_deadline()?;
        tx.commit()?;
        Ok(())
    }
}

/// Tables with a `TEXT` uuid primary key named `id`.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Table {
    Projects,
    Requirements,
    TestCases,
    TestSuites,
    TestPlans,
    TestReports,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Projects => "projects",
            Table::Requirements => "requirements",
            Table::TestCases => "test_cases",
            Table::TestSuites => "test_suites",
            Table::TestPlans => "test_plans",
            Table::TestReports => "test_reports",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Table::Projects => "project",
            Table::Requirements => "requirement",
            Table::TestCases => "test case",
            Table::TestSuites => "test suite",
            Table::TestPlans => "test plan",
            Table::TestReports => "test report",
        }
    }
}

fn exists(conn: &Connection, table: Table, id: Uuid) -> RepoResult<bool> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = ?1);", table.name());
    let found: i64 = conn.query_row(&sql, params![id.to_string()], |row| row.get(0))?;
    Ok(found != 0)
}

/// `NotFound` unless the row exists. Used for addressed targets (`?id=`).
fn require_row(conn: &Connection, table: Table, id: Uuid) -> RepoResult<()> {
    if exists(conn, table, id)? {
        Ok(())
    } else {
        Err(RepoError::NotFound { kind: table.kind(), id })
    }
}

/// `MissingParent` unless the row exists. Used for references inside payloads.
fn require_parent(conn: &Connection, table: Table, id: Uuid) -> RepoResult<()> {
    if exists(conn, table, id)? {
        Ok(())
    } else {
        Err(RepoError::MissingParent { kind: table.kind(), id })
    }
}

fn delete_row(conn: &Connection, table: Table, id: Uuid) -> RepoResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1;", table.name());
    let changed = conn.execute(&sql, params![id.to_string()])?;
    if changed == 0 {
        return Err(RepoError::NotFound { kind: table.kind(), id });
    }
    Ok(())
}

fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn opt_uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Uuid::parse_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

fn opt_uuid_param(id: Option<Uuid>) -> Option<String> {
    id.map(|u| u.to_string())
}

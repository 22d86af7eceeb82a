//! SQLite-backed entity store
//!
//! The store is the single source of truth for projects, equipment,
//! checklists, checklist items and action plans. It:
//! - Enforces uniqueness (project number, project+tag) with table constraints
//! - Maps constraint violations to [`StoreError::DuplicateKey`]
//! - Writes immediately; multi-row operations go through [`EntityStore::transaction`]
//!
//! Write helpers live in [`records`] as free functions over a
//! [`Connection`] so they can run either directly or inside a transaction
//! (a `&Transaction` derefs to `&Connection`).

pub mod records;

mod queries;
mod schema;

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use miette::Diagnostic;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row, Transaction};
use thiserror::Error;

use crate::core::identity::EntityKind;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Errors raised by store operations
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("{entity} '{key}' already exists")]
    #[diagnostic(
        code(ect::store::duplicate_key),
        help("Project numbers are unique, and a tag can only be registered once per project.")
    )]
    DuplicateKey { entity: EntityKind, key: String },

    #[error("{entity} '{key}' not found")]
    #[diagnostic(code(ect::store::not_found))]
    NotFound { entity: EntityKind, key: String },

    #[error("validation failed: {0}")]
    #[diagnostic(code(ect::store::validation))]
    Validation(String),

    #[error("database schema version {found} is newer than this tool supports ({supported})")]
    #[diagnostic(
        code(ect::store::schema_version),
        help("Upgrade ect, or point `database` in .ect/config.yaml at another file.")
    )]
    SchemaVersion { found: i32, supported: i32 },

    #[error("database error: {0}")]
    #[diagnostic(code(ect::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(ect::store::io))]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Translate a failed write into a typed error
    ///
    /// UNIQUE violations become `DuplicateKey`, FOREIGN KEY violations become
    /// `NotFound` for the parent row. Anything else stays a database error.
    pub(crate) fn from_write(
        err: rusqlite::Error,
        entity: EntityKind,
        key: impl ToString,
        parent: EntityKind,
        parent_key: impl ToString,
    ) -> Self {
        if let rusqlite::Error::SqliteFailure(ref e, _) = err {
            if e.code == ErrorCode::ConstraintViolation {
                match e.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return StoreError::DuplicateKey {
                            entity,
                            key: key.to_string(),
                        };
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        return StoreError::not_found(parent, parent_key);
                    }
                    _ => {}
                }
            }
        }
        StoreError::Sqlite(err)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The entity store backed by SQLite
pub struct EntityStore {
    conn: Connection,
}

impl EntityStore {
    /// Open or create the database file at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let mut store = Self { conn };
        store.prepare()?;
        tracing::debug!(path = %path.display(), "opened entity store");
        Ok(store)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.prepare()?;
        Ok(store)
    }

    /// Read-only access to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn prepare(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let version = self.schema_version()?;
        if version == 0 {
            self.init_schema()?;
        } else if version > SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Stored schema version, 0 for a fresh database
    fn schema_version(&self) -> StoreResult<i32> {
        let has_table: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(0);
        }

        let version: Option<i32> =
            self.conn
                .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                    row.get(0)
                })?;
        Ok(version.unwrap_or(0))
    }

    /// Run `f` inside a single transaction
    ///
    /// Commits when `f` returns `Ok`; any error rolls back every write made
    /// through the transaction.
    pub fn transaction<T, F>(&mut self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> StoreResult<T>,
    {
        let tx = self.conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Parse a SQLite timestamp (`CURRENT_TIMESTAMP` text or RFC 3339)
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
}

/// Read a timestamp column; unparseable text is a conversion error
pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).map_err(|e| {
        tracing::warn!(column = idx, value = %text, "unparseable timestamp");
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests;

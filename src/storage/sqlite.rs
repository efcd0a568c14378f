//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction};
use crate::{Error, Result};
use super::schema;

/// SQLite-backed storage handle for the catalog.
///
/// Owns exactly one connection. It is passed explicitly to the loader and the
/// query engine and released when dropped, on success and failure paths alike.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open a database file (creates if doesn't exist).
    ///
    /// Does not create any tables; call [`CatalogStore::ensure_schema`] for that.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(Error::StorageUnavailable)?;
        let store = Self { conn };
        store.check_readable()?;
        tracing::debug!("Opened catalog database {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::StorageUnavailable)?;
        Ok(Self { conn })
    }

    /// Read the schema catalog so unreadable or non-database files fail at open time
    fn check_readable(&self) -> Result<()> {
        self.conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(Error::StorageUnavailable)?;
        Ok(())
    }

    /// Create every catalog table and index that does not exist yet.
    ///
    /// Existing tables are never altered and their rows are preserved, so this
    /// is safe to call on every start.
    pub fn ensure_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::debug!("Schema ensured ({} tables)", schema::ALL_TABLES.len());
        Ok(())
    }

    /// Check whether a table exists
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Catalog tables that are not present in the database
    pub fn missing_tables(&self) -> Result<Vec<&'static str>> {
        let mut missing = Vec::new();
        for table in schema::ALL_TABLES {
            if !self.table_exists(table)? {
                missing.push(*table);
            }
        }
        Ok(missing)
    }

    /// Fail with `SchemaMissing` unless every catalog table exists
    pub fn require_schema(&self) -> Result<()> {
        match self.missing_tables()?.first() {
            Some(table) => Err(Error::SchemaMissing(table.to_string())),
            None => Ok(()),
        }
    }

    /// Count the rows of one catalog table
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        if !schema::ALL_TABLES.contains(&table) {
            return Err(Error::InvalidValue(format!("not a catalog table: {}", table)));
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Borrow the underlying connection for read queries
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction; it rolls back when dropped without `commit()`
    pub(crate) fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn.transaction().map_err(Error::StorageUnavailable)
    }

    /// Close the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| Error::StorageUnavailable(err))
    }
}

/// Map a rusqlite error onto the catalog error taxonomy
pub(crate) fn classify(err: rusqlite::Error) -> Error {
    let (code, missing_table) = match &err {
        rusqlite::Error::SqliteFailure(ffi_err, msg) => (
            Some(ffi_err.code),
            msg.as_deref()
                .and_then(|m| m.strip_prefix("no such table: "))
                .map(|t| t.trim_start_matches("main.").to_string()),
        ),
        _ => (None, None),
    };

    if let Some(table) = missing_table {
        return Error::SchemaMissing(table);
    }
    match code {
        Some(ErrorCode::ConstraintViolation) => Error::ConstraintViolation(err),
        _ => Error::StorageUnavailable(err),
    }
}

//! Key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Provide read/overwrite access to named text slots.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Slot keys are non-empty after trimming.
//! - `write_slot` replaces any prior value in full.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    InvalidKey(String),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid slot key: `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value slot storage.
pub trait SlotRepository {
    /// Returns the raw slot value, or `None` when the slot was never written.
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>>;
    /// Overwrites the slot with `value`.
    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()>;
}

impl<R: SlotRepository + ?Sized> SlotRepository for &R {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).write_slot(key, value)
    }
}

/// SQLite-backed slot repository over the `slots` table.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local slot repository.
///
/// Contents live as long as the repository value; used by tests and by
/// embedders that have no durable storage.
#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn normalize_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

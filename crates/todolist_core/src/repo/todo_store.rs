//! Persistent store adapter for the todo collection.
//!
//! # Responsibility
//! - Restore the collection from one fixed slot at startup.
//! - Serialize and overwrite the full collection after each mutation.
//!
//! # Invariants
//! - `load` never fails: absent, unreadable or unparsable slots yield an
//!   empty collection.
//! - After a failed read, `save` refuses to overwrite a slot that still holds
//!   content until a later `load` reads it successfully.
//! - `save` writes the whole collection; it never appends or patches.
//! - Persisted layout is a JSON array of `{id, text, completed}` objects.

use crate::model::todo::{retain_unique_ids, TodoCollection, TodoRecord};
use crate::repo::slot_repo::{RepoError, SlotRepository};
use log::{debug, error, info, warn};
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot name used when no override is configured.
pub const DEFAULT_SLOT_KEY: &str = "todos";
/// Extra write attempts after a failed save.
pub const DEFAULT_SAVE_RETRIES: u32 = 1;

/// Store adapter tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Slot holding the serialized collection.
    pub slot_key: String,
    /// Extra write attempts after the first failure.
    pub save_retries: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            save_retries: DEFAULT_SAVE_RETRIES,
        }
    }
}

/// Save failure reported to the collection manager.
#[derive(Debug)]
pub enum StoreError {
    Serialize(serde_json::Error),
    /// Every write attempt failed; `source` is the last failure.
    Write { attempts: u32, source: RepoError },
    /// The last load could not read the slot and it may still hold records.
    UnreadSlot { slot: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize todos: {err}"),
            Self::Write { attempts, source } => {
                write!(f, "failed to save todos after {attempts} attempt(s): {source}")
            }
            Self::UnreadSlot { slot } => write!(
                f,
                "refusing to overwrite slot `{slot}`: it was never read successfully; reload first"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Write { source, .. } => Some(source),
            Self::UnreadSlot { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Load/overwrite pair over one named slot.
pub struct TodoStore<R: SlotRepository> {
    repo: R,
    options: StoreOptions,
    read_failed: Cell<bool>,
}

impl<R: SlotRepository> TodoStore<R> {
    /// Creates a store over the default `todos` slot.
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, StoreOptions::default())
    }

    pub fn with_options(repo: R, options: StoreOptions) -> Self {
        Self {
            repo,
            options,
            read_failed: Cell::new(false),
        }
    }

    pub fn slot_key(&self) -> &str {
        self.options.slot_key.as_str()
    }

    /// Whether the last `load` failed to read the slot.
    pub fn needs_reload(&self) -> bool {
        self.read_failed.get()
    }

    /// Reads the persisted collection.
    ///
    /// Corrupt content is treated as "no prior data". Records repeating an
    /// earlier id are dropped so the returned collection has unique ids.
    /// A read error also yields an empty collection, but marks the store so
    /// that `save` will not clobber the unread slot.
    pub fn load(&self) -> TodoCollection {
        let key = self.slot_key();
        let read = self.repo.read_slot(key);
        self.read_failed.set(read.is_err());
        let raw = match read {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=todos_load module=store status=ok slot={key} source=absent count=0");
                return TodoCollection::new();
            }
            Err(err) => {
                error!(
                    "event=todos_load module=store status=error slot={key} error_code=slot_read_failed error={err}"
                );
                return TodoCollection::new();
            }
        };

        let mut todos = match serde_json::from_str::<TodoCollection>(&raw) {
            Ok(todos) => todos,
            Err(err) => {
                warn!(
                    "event=todos_load module=store status=error slot={} bytes={} error_code=slot_corrupt error={}",
                    key,
                    raw.len(),
                    err
                );
                return TodoCollection::new();
            }
        };

        let dropped = retain_unique_ids(&mut todos);
        if dropped > 0 {
            warn!("event=todos_load module=store status=ok slot={key} duplicate_ids_dropped={dropped}");
        }
        info!(
            "event=todos_load module=store status=ok slot={} source=slot count={}",
            key,
            todos.len()
        );
        todos
    }

    /// Overwrites the slot with the full collection.
    ///
    /// # Errors
    /// - `StoreError::Serialize` when JSON encoding fails (no write attempted).
    /// - `StoreError::Write` when every write attempt fails.
    /// - `StoreError::UnreadSlot` when the last load failed to read the slot
    ///   and a fresh read shows it is still unreadable or holds content.
    pub fn save(&self, todos: &[TodoRecord]) -> Result<(), StoreError> {
        let key = self.slot_key();
        self.ensure_slot_was_read()?;
        let payload = serde_json::to_string(todos)?;
        let max_attempts = self.options.save_retries.saturating_add(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.repo.write_slot(key, &payload) {
                Ok(()) => {
                    debug!(
                        "event=todos_save module=store status=ok slot={} count={} bytes={} attempt={}",
                        key,
                        todos.len(),
                        payload.len(),
                        attempt
                    );
                    return Ok(());
                }
                Err(err) if attempt < max_attempts => {
                    warn!(
                        "event=todos_save module=store status=retry slot={key} attempt={attempt} error={err}"
                    );
                }
                Err(err) => {
                    error!(
                        "event=todos_save module=store status=error slot={key} attempts={attempt} error_code=slot_write_failed error={err}"
                    );
                    return Err(StoreError::Write {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    // An absent slot has nothing to lose, so a clean re-check lifts the guard.
    fn ensure_slot_was_read(&self) -> Result<(), StoreError> {
        if !self.read_failed.get() {
            return Ok(());
        }

        let key = self.slot_key();
        match self.repo.read_slot(key) {
            Ok(None) => {
                info!("event=todos_save module=store status=ok slot={key} guard=cleared");
                self.read_failed.set(false);
                Ok(())
            }
            Ok(Some(_)) => {
                warn!("event=todos_save module=store status=error slot={key} error_code=slot_unread");
                Err(StoreError::UnreadSlot {
                    slot: key.to_string(),
                })
            }
            Err(err) => {
                error!(
                    "event=todos_save module=store status=error slot={key} error_code=slot_unread error={err}"
                );
                Err(StoreError::UnreadSlot {
                    slot: key.to_string(),
                })
            }
        }
    }
}

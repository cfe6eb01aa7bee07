//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value slot contract used for durable todo storage.
//! - Isolate SQLite query details from store/service orchestration.
//! - Serialize and restore the todo collection through one fixed slot.
//!
//! # Invariants
//! - Slot writes overwrite the whole value; no partial/delta writes.
//! - `TodoStore::load` never surfaces an error to its caller.

pub mod slot_repo;
pub mod todo_store;

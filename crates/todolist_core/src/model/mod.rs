//! Todo domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every record is identified by a stable `TodoId`.
//! - Deletion is a hard removal from the collection; no tombstones.

pub mod todo;

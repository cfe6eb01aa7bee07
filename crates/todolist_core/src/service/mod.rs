//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory todo collection and its mutations.
//! - Keep presentation callers decoupled from storage details.

pub mod todo_service;

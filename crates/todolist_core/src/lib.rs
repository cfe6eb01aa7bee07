//! Core state management for the todo list.
//! This crate owns the todo collection and its persistence; presentation
//! layers drive it through `TodoService` and re-render from its listeners.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::todo::{TodoCollection, TodoId, TodoRecord};
pub use repo::slot_repo::{
    MemorySlotRepository, RepoError, RepoResult, SlotRepository, SqliteSlotRepository,
};
pub use repo::todo_store::{
    StoreError, StoreOptions, TodoStore, DEFAULT_SAVE_RETRIES, DEFAULT_SLOT_KEY,
};
pub use service::todo_service::{SubscriptionId, TodoService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

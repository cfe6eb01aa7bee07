//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record shared by storage and presentation.
//! - Provide identity generation and the completion toggle.
//!
//! # Invariants
//! - `id` is assigned at creation and never changes.
//! - `text` is immutable after creation; no edit path exists.
//! - Ids are unique within one collection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identifier of one todo record.
///
/// Serialized as a plain JSON string. Generated ids are UUID v4 text, but any
/// string read back from storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: TodoId,
    /// User-entered text. Empty text is accepted.
    pub text: String,
    pub completed: bool,
}

/// Ordered todo records; insertion order is display order.
pub type TodoCollection = Vec<TodoRecord>;

impl TodoRecord {
    /// Creates an open record with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(TodoId::generate(), text)
    }

    /// Creates an open record with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: impl Into<TodoId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        }
    }

    /// Returns a copy with `completed` inverted.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Drops records whose id already appeared earlier in the collection.
///
/// Returns the number of records removed. The first occurrence wins and
/// relative order of the survivors is preserved.
pub fn retain_unique_ids(todos: &mut TodoCollection) -> usize {
    let before = todos.len();
    let mut seen = HashSet::with_capacity(before);
    todos.retain(|todo| seen.insert(todo.id.clone()));
    before - todos.len()
}

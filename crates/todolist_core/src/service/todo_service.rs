//! Todo collection use-case service.
//!
//! # Responsibility
//! - Own the current todo collection for one session.
//! - Apply add/toggle/delete and persist the result through `TodoStore`.
//! - Hand every committed collection to subscribed listeners.
//!
//! # Invariants
//! - The in-memory collection only changes after the store accepted it, so
//!   memory and slot agree once a mutation returns `Ok`.
//! - A failed save leaves the previous collection in place and is returned
//!   to the caller; listeners are not notified.
//! - Lookup misses on toggle/delete are no-ops, not errors.
//! - If the startup load could not read the slot, mutations fail with
//!   `StoreError::UnreadSlot` until `reload` succeeds.
//! - Single-threaded use only; each call runs to completion.

use crate::model::todo::{TodoCollection, TodoId, TodoRecord};
use crate::repo::slot_repo::SlotRepository;
use crate::repo::todo_store::{StoreError, TodoStore};
use log::{error, info};

type Listener = Box<dyn FnMut(&[TodoRecord])>;

/// Handle returned by [`TodoService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Collection manager over a persistent store.
pub struct TodoService<R: SlotRepository> {
    store: TodoStore<R>,
    todos: TodoCollection,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<R: SlotRepository> TodoService<R> {
    /// Loads the persisted collection once and takes ownership of the store.
    pub fn open(store: TodoStore<R>) -> Self {
        let todos = store.load();
        Self {
            store,
            todos,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current collection in display order.
    pub fn todos(&self) -> &[TodoRecord] {
        &self.todos
    }

    pub fn get(&self, id: &TodoId) -> Option<&TodoRecord> {
        self.todos.iter().find(|todo| &todo.id == id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Number of records not yet completed.
    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.len() - self.active_count()
    }

    /// Appends a new open record and persists the collection.
    ///
    /// Empty text is accepted.
    ///
    /// # Errors
    /// Returns the store error when the collection could not be saved; the
    /// record is then not part of the collection.
    pub fn add(&mut self, text: impl Into<String>) -> Result<TodoRecord, StoreError> {
        let record = TodoRecord::with_id(self.fresh_id(), text);

        let mut next = Vec::with_capacity(self.todos.len() + 1);
        next.extend_from_slice(&self.todos);
        next.push(record.clone());

        self.commit("todo_add", next)?;
        Ok(record)
    }

    /// Inverts `completed` on the matching record.
    ///
    /// An unknown id leaves the collection unchanged; it is still persisted.
    ///
    /// # Errors
    /// Returns the store error when the collection could not be saved.
    pub fn toggle(&mut self, id: &TodoId) -> Result<(), StoreError> {
        let next = self
            .todos
            .iter()
            .map(|todo| {
                if &todo.id == id {
                    todo.toggled()
                } else {
                    todo.clone()
                }
            })
            .collect();
        self.commit("todo_toggle", next)
    }

    /// Removes the matching record.
    ///
    /// An unknown id leaves the collection unchanged; it is still persisted.
    ///
    /// # Errors
    /// Returns the store error when the collection could not be saved.
    pub fn delete(&mut self, id: &TodoId) -> Result<(), StoreError> {
        let next = self
            .todos
            .iter()
            .filter(|todo| &todo.id != id)
            .cloned()
            .collect();
        self.commit("todo_delete", next)
    }

    /// Registers a listener called with the new collection after each
    /// successful mutation, in subscription order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[TodoRecord]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Re-reads the slot and replaces the in-memory collection.
    ///
    /// Used to recover after `StoreError::UnreadSlot`. Listeners receive the
    /// reloaded collection.
    pub fn reload(&mut self) {
        self.todos = self.store.load();
        info!(
            "event=todo_reload module=service status={} count={}",
            if self.store.needs_reload() { "error" } else { "ok" },
            self.todos.len()
        );
        self.notify();
    }

    /// Whether the slot must be reloaded before mutations can persist.
    pub fn needs_reload(&self) -> bool {
        self.store.needs_reload()
    }

    fn fresh_id(&self) -> TodoId {
        loop {
            let id = TodoId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, event: &'static str, next: TodoCollection) -> Result<(), StoreError> {
        if let Err(err) = self.store.save(&next) {
            error!(
                "event={} module=service status=error count={} error={}",
                event,
                self.todos.len(),
                err
            );
            return Err(err);
        }

        let changed = next != self.todos;
        self.todos = next;
        info!(
            "event={} module=service status=ok count={} changed={}",
            event,
            self.todos.len(),
            changed
        );

        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(self.todos.as_slice());
        }
    }
}

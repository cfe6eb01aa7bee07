use std::cell::Cell;
use todolist_core::db::DbError;
use todolist_core::{MemorySlotRepository, RepoError, RepoResult, SlotRepository};

/// Memory slot that rejects the next `failures` writes or reads.
#[derive(Default)]
pub struct FlakySlotRepository {
    pub inner: MemorySlotRepository,
    write_failures: Cell<u32>,
    read_failures: Cell<u32>,
    pub write_attempts: Cell<u32>,
}

impl FlakySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_writes(&self, count: u32) {
        self.write_failures.set(count);
    }

    pub fn fail_next_reads(&self, count: u32) {
        self.read_failures.set(count);
    }
}

fn take_failure(counter: &Cell<u32>) -> bool {
    let remaining = counter.get();
    if remaining == 0 {
        return false;
    }
    counter.set(remaining - 1);
    true
}

fn injected_error() -> RepoError {
    RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
}

impl SlotRepository for FlakySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        if take_failure(&self.read_failures) {
            return Err(injected_error());
        }
        self.inner.read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        self.write_attempts.set(self.write_attempts.get() + 1);
        if take_failure(&self.write_failures) {
            return Err(injected_error());
        }
        self.inner.write_slot(key, value)
    }
}

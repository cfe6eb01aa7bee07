mod common;

use common::FlakySlotRepository;
use todolist_core::db::open_db_in_memory;
use todolist_core::{
    MemorySlotRepository, SlotRepository, SqliteSlotRepository, StoreError, StoreOptions,
    TodoRecord, TodoStore, DEFAULT_SLOT_KEY,
};

#[test]
fn absent_slot_loads_empty() {
    let repo = MemorySlotRepository::new();
    assert!(TodoStore::new(&repo).load().is_empty());
}

#[test]
fn corrupt_slot_loads_empty() {
    let repo = MemorySlotRepository::new();
    let store = TodoStore::new(&repo);

    for raw in [
        "not json",
        "null",
        r#"{"id":"a"}"#,
        r#"[{"id":"a","text":"missing completed"}]"#,
        r#"[{"id":1,"text":"x","completed":false}]"#,
        "[{\"id\":\"a\",\"text\":\"trunc",
    ] {
        repo.write_slot(DEFAULT_SLOT_KEY, raw).unwrap();
        assert!(store.load().is_empty(), "expected empty load for `{raw}`");
    }
}

#[test]
fn foreign_ids_are_kept_verbatim() {
    let repo = MemorySlotRepository::new();
    repo.write_slot(
        DEFAULT_SLOT_KEY,
        r#"[{"id":"0.7312945","text":"Buy milk","completed":true}]"#,
    )
    .unwrap();

    let todos = TodoStore::new(&repo).load();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id.as_str(), "0.7312945");
    assert_eq!(todos[0].text, "Buy milk");
    assert!(todos[0].completed);
}

#[test]
fn duplicate_ids_keep_first_record() {
    let repo = MemorySlotRepository::new();
    repo.write_slot(
        DEFAULT_SLOT_KEY,
        r#"[
            {"id":"a","text":"first","completed":false},
            {"id":"b","text":"second","completed":false},
            {"id":"a","text":"again","completed":true}
        ]"#,
    )
    .unwrap();

    let todos = TodoStore::new(&repo).load();
    let texts = todos.iter().map(|todo| todo.text.as_str()).collect::<Vec<_>>();
    assert_eq!(texts, vec!["first", "second"]);
}

#[test]
fn save_then_load_roundtrips_through_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let store = TodoStore::new(SqliteSlotRepository::new(&conn));

    let mut done = TodoRecord::new("Walk dog");
    done.completed = true;
    let todos = vec![TodoRecord::new("Buy milk"), done, TodoRecord::new("")];
    store.save(&todos).unwrap();

    assert_eq!(store.load(), todos);
}

#[test]
fn save_uses_expected_wire_fields() {
    let repo = MemorySlotRepository::new();
    TodoStore::new(&repo)
        .save(&[TodoRecord::with_id("id-1", "Buy milk")])
        .unwrap();

    let raw = repo.read_slot(DEFAULT_SLOT_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "id": "id-1", "text": "Buy milk", "completed": false }])
    );
}

#[test]
fn save_retries_once_by_default() {
    let repo = FlakySlotRepository::new();
    repo.fail_next_writes(1);

    TodoStore::new(&repo)
        .save(&[TodoRecord::with_id("a", "x")])
        .unwrap();

    assert_eq!(repo.write_attempts.get(), 2);
    assert!(repo.inner.read_slot(DEFAULT_SLOT_KEY).unwrap().is_some());
}

#[test]
fn save_reports_error_after_retries_exhausted() {
    let repo = FlakySlotRepository::new();
    repo.fail_next_writes(3);
    let store = TodoStore::with_options(
        &repo,
        StoreOptions {
            save_retries: 2,
            ..StoreOptions::default()
        },
    );

    let err = store.save(&[]).unwrap_err();
    assert!(matches!(err, StoreError::Write { attempts: 3, .. }));
    assert_eq!(repo.write_attempts.get(), 3);
    assert_eq!(repo.inner.read_slot(DEFAULT_SLOT_KEY).unwrap(), None);
}

#[test]
fn read_error_blocks_overwrite_of_existing_slot() {
    let repo = FlakySlotRepository::new();
    let saved = vec![
        TodoRecord::with_id("old-1", "Buy milk"),
        TodoRecord::with_id("old-2", "Walk dog"),
    ];
    TodoStore::new(&repo.inner).save(&saved).unwrap();
    let before = repo.inner.read_slot(DEFAULT_SLOT_KEY).unwrap();

    repo.fail_next_reads(1);
    let store = TodoStore::new(&repo);
    assert!(store.load().is_empty());
    assert!(store.needs_reload());

    let err = store
        .save(&[TodoRecord::with_id("new", "fresh")])
        .unwrap_err();
    assert!(matches!(err, StoreError::UnreadSlot { .. }));
    assert_eq!(repo.write_attempts.get(), 0);
    assert_eq!(repo.inner.read_slot(DEFAULT_SLOT_KEY).unwrap(), before);

    assert_eq!(store.load(), saved);
    assert!(!store.needs_reload());
    store.save(&[]).unwrap();
}

#[test]
fn read_error_on_absent_slot_clears_on_next_save() {
    let repo = FlakySlotRepository::new();
    repo.fail_next_reads(1);
    let store = TodoStore::new(&repo);

    assert!(store.load().is_empty());
    assert!(store.needs_reload());

    store.save(&[TodoRecord::with_id("a", "x")]).unwrap();
    assert!(!store.needs_reload());
    assert_eq!(store.load().len(), 1);
}

#[test]
fn persistent_read_error_keeps_blocking_saves() {
    let repo = FlakySlotRepository::new();
    repo.fail_next_reads(2);
    let store = TodoStore::new(&repo);

    store.load();
    let err = store.save(&[]).unwrap_err();
    assert!(matches!(err, StoreError::UnreadSlot { .. }));
    assert!(store.needs_reload());
    assert_eq!(repo.write_attempts.get(), 0);
}

//! Integration tests for [`command_engine::ListEngine`].
//!
//! Covers the add / delete / edit / lookup sequence, index validation, and concurrent appends.

use std::sync::Arc;

use command_engine::{CommandError, ListEngine};
use storage::{CommandRecord, CommandStore, InMemoryCommandStore, SqliteCommandStore};

async fn fetch(store: &dyn CommandStore) -> CommandRecord {
    store.find_command("#foo", "!quote").await.unwrap().unwrap()
}

fn args(tokens: &str) -> Vec<String> {
    tokens.split_whitespace().map(str::to_string).collect()
}

/// **Test: Sequence of list mutations followed by a lookup.**
///
/// **Setup:** `!quote` with template `$(list)` and items `["a","b","c"]`.
/// **Action:** `delete 2`, `edit 1 z`, `add q`, then lookup with no token.
/// **Expected:** Items go `["a","c"]` → `["z","c"]` → `["z","c","q"]`; lookup is `"q -> #3/3"`.
#[tokio::test]
async fn test_list_mutation_sequence() {
    let store = Arc::new(InMemoryCommandStore::new());
    store
        .insert_command(&CommandRecord::new("#foo", "!quote", "$(list)").with_items(["a", "b", "c"]))
        .await
        .unwrap();
    let engine = ListEngine::new(store.clone());

    let reply = engine
        .handle(&fetch(&*store).await, "Bob", &args("delete 2"), None)
        .await
        .unwrap();
    assert_eq!(reply, "Bob -> #2 has been deleted, 2 left!");
    assert_eq!(fetch(&*store).await.items, vec!["a", "c"]);

    let reply = engine
        .handle(&fetch(&*store).await, "Bob", &args("edit 1 z"), None)
        .await
        .unwrap();
    assert_eq!(reply, "Bob -> #1 has been updated to \"z\"!");
    assert_eq!(fetch(&*store).await.items, vec!["z", "c"]);

    let reply = engine
        .handle(&fetch(&*store).await, "Bob", &args("add q"), None)
        .await
        .unwrap();
    assert_eq!(reply, "Bob -> \"q\" has been added as #3!");
    assert_eq!(fetch(&*store).await.items, vec!["z", "c", "q"]);

    let reply = engine
        .handle(&fetch(&*store).await, "Bob", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, "q -> #3/3");
}

/// **Test: Invalid indexes are rejected and leave the list untouched.**
///
/// **Setup:** Items `["a"]`.
/// **Action:** `delete 5`, `delete x`, `edit 0 y`, `remove` with no index.
/// **Expected:** `InvalidIndex` each time; items still `["a"]`.
#[tokio::test]
async fn test_invalid_index() {
    let store = Arc::new(InMemoryCommandStore::new());
    store
        .insert_command(&CommandRecord::new("#foo", "!quote", "$(list)").with_items(["a"]))
        .await
        .unwrap();
    let engine = ListEngine::new(store.clone());
    let command = fetch(&*store).await;

    for tokens in ["delete 5", "delete x", "edit 0 y", "remove"] {
        let err = engine
            .handle(&command, "Bob", &args(tokens), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidIndex(_)), "{}", tokens);
    }
    assert_eq!(fetch(&*store).await.items, vec!["a"]);
}

/// **Test: Add and edit without text are usage errors.**
///
/// **Setup:** Items `["a"]`.
/// **Action:** `add`, `edit 1`.
/// **Expected:** `InvalidArgument`; nothing written.
#[tokio::test]
async fn test_missing_text() {
    let store = Arc::new(InMemoryCommandStore::new());
    store
        .insert_command(&CommandRecord::new("#foo", "!quote", "$(list)").with_items(["a"]))
        .await
        .unwrap();
    let engine = ListEngine::new(store.clone());
    let command = fetch(&*store).await;

    for tokens in ["add", "edit 1"] {
        let err = engine
            .handle(&command, "Bob", &args(tokens), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument(_)), "{}", tokens);
    }
    assert_eq!(fetch(&*store).await.items, vec!["a"]);
}

/// **Test: Items with apostrophes are stored escaped and shown decoded.**
///
/// **Setup:** Empty `!quote` list.
/// **Action:** `add it's fine`, then lookup `1`.
/// **Expected:** Stored as `it&apos;s fine`; lookup shows `it's fine -> #1/1`.
#[tokio::test]
async fn test_apostrophes_round_trip_through_storage() {
    let store = Arc::new(InMemoryCommandStore::new());
    store
        .insert_command(&CommandRecord::new("#foo", "!quote", "$(list)"))
        .await
        .unwrap();
    let engine = ListEngine::new(store.clone());

    engine
        .handle(&fetch(&*store).await, "Bob", &args("add it's fine"), None)
        .await
        .unwrap();
    let command = fetch(&*store).await;
    assert_eq!(command.items, vec!["it&apos;s fine"]);

    let reply = engine.handle(&command, "Bob", &args("1"), None).await.unwrap();
    assert_eq!(reply, "it's fine -> #1/1");
}

/// **Test: Concurrent appends are all kept.**
///
/// **Setup:** SQLite in-memory store, empty `!quote` list; one shared engine.
/// **Action:** 20 concurrent `add item<i>` on a command snapshot taken before any add.
/// **Expected:** 20 distinct items stored, indexes 1..=20 each handed out once.
#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let store = Arc::new(SqliteCommandStore::new("sqlite::memory:").await.unwrap());
    store
        .insert_command(&CommandRecord::new("#foo", "!quote", "$(list)"))
        .await
        .unwrap();
    let engine = Arc::new(ListEngine::new(store.clone()));
    let command = fetch(&*store).await;

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let engine = engine.clone();
            let command = command.clone();
            tokio::spawn(async move {
                engine
                    .handle(&command, "Bob", &args(&format!("add item{}", i)), None)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut indexes = Vec::new();
    for handle in handles {
        let reply = handle.await.unwrap();
        let index: usize = reply
            .rsplit('#')
            .next()
            .and_then(|s| s.trim_end_matches('!').parse().ok())
            .unwrap();
        indexes.push(index);
    }
    indexes.sort_unstable();
    assert_eq!(indexes, (1..=20).collect::<Vec<_>>());

    let mut items = fetch(&*store).await.items;
    items.sort();
    items.dedup();
    assert_eq!(items.len(), 20);
}

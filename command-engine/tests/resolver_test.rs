//! Integration tests for [`command_engine::Resolver`].
//!
//! Covers concrete commands, alias chains, cycles, the hop bound, channel aliases that point into
//! the default table, and unknown triggers.

use std::sync::Arc;

use command_engine::{
    CapabilityId, CommandError, DefaultCommandTable, Resolution, ResolvedCommand, Resolver,
};
use storage::{CommandRecord, CommandStore, InMemoryCommandStore};

async fn store_with(records: Vec<CommandRecord>) -> Arc<InMemoryCommandStore> {
    let store = Arc::new(InMemoryCommandStore::new());
    for record in records {
        store.insert_command(&record).await.unwrap();
    }
    store
}

fn resolver(store: Arc<InMemoryCommandStore>, max_hops: usize) -> Resolver {
    Resolver::new(store, DefaultCommandTable::builtin(), max_hops)
}

/// **Test: A concrete channel command resolves to itself.**
///
/// **Setup:** `!hello` in `#foo`.
/// **Action:** `resolve("#foo", "!Hello")`.
/// **Expected:** The stored record.
#[tokio::test]
async fn test_resolve_concrete_command() {
    let record = CommandRecord::new("#foo", "!hello", "Hello $(user)");
    let store = store_with(vec![record.clone()]).await;

    let resolved = resolver(store, 10).resolve("#foo", "!Hello").await.unwrap();
    assert_eq!(resolved, ResolvedCommand::Custom(record));
}

/// **Test: Alias chain A → B → C resolves to C.**
///
/// **Setup:** `!a` alias of `!b`, `!b` alias of `!c`, `!c` concrete.
/// **Action:** `resolve("#foo", "!a")`.
/// **Expected:** `!c`'s record.
#[tokio::test]
async fn test_resolve_alias_chain() {
    let store = store_with(vec![
        CommandRecord::alias("#foo", "!a", "!b"),
        CommandRecord::alias("#foo", "!b", "!c"),
        CommandRecord::new("#foo", "!c", "see"),
    ])
    .await;

    match resolver(store, 10).resolve("#foo", "!a").await.unwrap() {
        ResolvedCommand::Custom(record) => assert_eq!(record.trigger, "!c"),
        other => panic!("unexpected resolution: {:?}", other),
    }
}

/// **Test: Self-alias is rejected.**
///
/// **Setup:** `!a` alias of `!a`.
/// **Action:** `resolve("#foo", "!a")`.
/// **Expected:** `AliasCycleOrDepthExceeded`.
#[tokio::test]
async fn test_resolve_self_alias_cycle() {
    let store = store_with(vec![CommandRecord::alias("#foo", "!a", "!a")]).await;

    let err = resolver(store, 10).resolve("#foo", "!a").await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::AliasCycleOrDepthExceeded { ref trigger, .. } if trigger == "!a"
    ));
}

/// **Test: Two-step cycle is rejected.**
///
/// **Setup:** `!a` → `!b` → `!a`.
/// **Action:** `resolve("#foo", "!b")`.
/// **Expected:** `AliasCycleOrDepthExceeded`.
#[tokio::test]
async fn test_resolve_two_step_cycle() {
    let store = store_with(vec![
        CommandRecord::alias("#foo", "!a", "!b"),
        CommandRecord::alias("#foo", "!b", "!a"),
    ])
    .await;

    let err = resolver(store, 10).resolve("#foo", "!b").await.unwrap_err();
    assert!(matches!(err, CommandError::AliasCycleOrDepthExceeded { .. }));
}

/// **Test: Chains longer than the hop bound fail even without a cycle.**
///
/// **Setup:** `!a0` → `!a1` → ... → `!a4` (concrete); max hops 3.
/// **Action:** resolve `!a0`, then `!a1` (exactly 3 hops).
/// **Expected:** First fails with `AliasCycleOrDepthExceeded`, second resolves to `!a4`.
#[tokio::test]
async fn test_resolve_depth_bound() {
    let mut records: Vec<CommandRecord> = (0..4)
        .map(|i| CommandRecord::alias("#foo", format!("!a{}", i), format!("!a{}", i + 1)))
        .collect();
    records.push(CommandRecord::new("#foo", "!a4", "end"));
    let store = store_with(records).await;
    let resolver = resolver(store, 3);

    let err = resolver.resolve("#foo", "!a0").await.unwrap_err();
    assert!(matches!(err, CommandError::AliasCycleOrDepthExceeded { .. }));

    match resolver.resolve("#foo", "!a1").await.unwrap() {
        ResolvedCommand::Custom(record) => assert_eq!(record.trigger, "!a4"),
        other => panic!("unexpected resolution: {:?}", other),
    }
}

/// **Test: A channel alias may point at a default trigger, which may itself be a default alias.**
///
/// **Setup:** `#foo` alias `!req` → `!sr`; `!sr` is a built-in alias of `!songrequest`.
/// **Action:** `resolve_message("#foo", "!req never gonna")`.
/// **Expected:** Default `SongRequest` reached through `!songrequest`, args kept.
#[tokio::test]
async fn test_resolve_channel_alias_into_defaults() {
    let store = store_with(vec![CommandRecord::alias("#foo", "!req", "!sr")]).await;

    let Resolution { command, args } = resolver(store, 10)
        .resolve_message("#foo", "!req never gonna")
        .await
        .unwrap();
    assert_eq!(
        command,
        ResolvedCommand::Default {
            capability: CapabilityId::SongRequest,
            trigger: "!songrequest".to_string(),
        }
    );
    assert_eq!(args, vec!["never", "gonna"]);
}

/// **Test: Channel commands shadow defaults.**
///
/// **Setup:** `#foo` defines its own `!uptime`.
/// **Action:** resolve `!uptime` in `#foo` and in `#bar`.
/// **Expected:** Custom in `#foo`, default capability in `#bar`.
#[tokio::test]
async fn test_channel_command_shadows_default() {
    let store = store_with(vec![CommandRecord::new("#foo", "!uptime", "always")]).await;
    let resolver = resolver(store, 10);

    assert!(matches!(
        resolver.resolve("#foo", "!uptime").await.unwrap(),
        ResolvedCommand::Custom(_)
    ));
    assert!(matches!(
        resolver.resolve("#bar", "!UPTIME").await.unwrap(),
        ResolvedCommand::Default {
            capability: CapabilityId::Uptime,
            ..
        }
    ));
}

/// **Test: Unknown triggers and non-trigger messages are NotFound.**
///
/// **Setup:** Empty store.
/// **Action:** resolve `!nothing`; resolve_message on plain chat and on an empty line.
/// **Expected:** `NotFound` each time.
#[tokio::test]
async fn test_resolve_not_found() {
    let resolver = resolver(store_with(vec![]).await, 10);

    for message in ["!nothing", "hello there", "   "] {
        let err = resolver.resolve_message("#foo", message).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound(_)), "{}", message);
    }
}

/// **Test: Alias to a missing trigger is NotFound.**
///
/// **Setup:** `!a` alias of `!gone`.
/// **Action:** `resolve("#foo", "!a")`.
/// **Expected:** `NotFound`.
#[tokio::test]
async fn test_resolve_dangling_alias() {
    let store = store_with(vec![CommandRecord::alias("#foo", "!a", "!gone")]).await;

    let err = resolver(store, 10).resolve("#foo", "!a").await.unwrap_err();
    assert!(matches!(err, CommandError::NotFound(_)));
}

use dupe::Dupe;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use storage_ports_core::{
    change::StoreChange,
    defer::DeferQueue,
    listener::{log::Log, no_listener::NoListener},
    relay::Relay,
    snapshot::Snapshot,
    storage::{memory::MemoryStorage, StorageArea, StorageEvent, StorageService},
    value::WriteRequest,
};
use testresult::TestResult;

struct Tab {
    relay: Relay<MemoryStorage, Log<Value>, DeferQueue>,
    log: Log<Value>,
    queue: DeferQueue,
}

impl Tab {
    fn open(storage: MemoryStorage) -> Self {
        let log = Log::new();
        let queue = DeferQueue::new();
        Tab {
            relay: Relay::new(storage, log.dupe(), queue.dupe()),
            log,
            queue,
        }
    }
}

#[test]
fn test_theme_scenario() -> TestResult {
    test_utils::init_logging();

    let tab = Tab::open(MemoryStorage::new(StorageArea::Local));
    assert_eq!(tab.relay.snapshot()?, Snapshot::default());

    tab.relay.write(WriteRequest::store("theme", json!("dark")))?;
    assert_eq!(tab.relay.storage().get_item("theme")?.as_deref(), Some("\"dark\""));
    tab.queue.run_pending();
    assert_eq!(
        tab.log.drain(),
        vec![StoreChange::Committed {
            key: "theme".into(),
            value: Some(json!("dark"))
        }]
    );

    tab.relay.write(WriteRequest::remove("theme"))?;
    assert_eq!(tab.relay.storage().get_item("theme")?, None);
    tab.queue.run_pending();
    assert_eq!(
        tab.log.drain(),
        vec![StoreChange::Committed {
            key: "theme".into(),
            value: None
        }]
    );

    Ok(())
}

#[test]
fn test_startup_snapshot_is_passed_unmodified() -> TestResult {
    test_utils::init_logging();

    let storage = MemoryStorage::with_entries(
        StorageArea::Local,
        [("session", r#"{"user":"ada"}"#), ("theme", "\"dark\"")],
    );
    let tab = Tab::open(storage);

    let flags = tab.relay.snapshot()?;
    let expected: Snapshot = [
        ("session".to_string(), r#"{"user":"ada"}"#.to_string()),
        ("theme".to_string(), "\"dark\"".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(flags, expected);
    Ok(())
}

#[test]
fn test_writes_reach_other_tabs() -> TestResult {
    test_utils::init_logging();

    let storage = MemoryStorage::new(StorageArea::Local);
    let alice = Tab::open(storage.dupe());
    let bob = Tab::open(storage.open_tab());
    let _alice_sub = alice.relay.listen()?;
    let _bob_sub = bob.relay.listen()?;

    alice.relay.write(WriteRequest::store("count", json!(3)))?;

    // Bob hears about it straight away, as raw text
    assert_eq!(
        bob.log.changes(),
        vec![StoreChange::External {
            key: Some("count".into()),
            new_value: Some("3".into())
        }]
    );
    // Alice is not told about her own write by the platform, only by the relay
    assert!(alice.log.is_empty());
    alice.queue.run_pending();
    assert_eq!(alice.log.len(), 1);
    assert!(alice.log.changes()[0].is_committed());
    assert!(bob.queue.is_empty());

    bob.relay.write(WriteRequest::remove("count"))?;
    assert_eq!(
        alice.log.pop(),
        Some(StoreChange::External {
            key: Some("count".into()),
            new_value: None
        })
    );

    Ok(())
}

#[test]
fn test_clear_in_another_tab_is_forwarded_without_key() -> TestResult {
    test_utils::init_logging();

    let storage = MemoryStorage::with_entries(StorageArea::Local, [("a", "1")]);
    let tab = Tab::open(storage.open_tab());
    let _sub = tab.relay.listen()?;

    storage.clear();

    assert_eq!(
        tab.log.changes(),
        vec![StoreChange::External {
            key: None,
            new_value: None
        }]
    );
    Ok(())
}

#[test]
fn test_foreign_area_events_are_not_forwarded() -> TestResult {
    test_utils::init_logging();

    let storage = MemoryStorage::new(StorageArea::Local);
    let tab = Tab::open(storage.dupe());
    let _sub = tab.relay.listen()?;

    storage.dispatch(StorageEvent {
        key: Some("theme".into()),
        old_value: None,
        new_value: Some("\"dark\"".into()),
        area: Some(StorageArea::Session),
    });
    assert!(tab.log.is_empty());

    storage.dispatch(StorageEvent {
        key: Some("theme".into()),
        old_value: None,
        new_value: Some("\"dark\"".into()),
        area: Some(StorageArea::Local),
    });
    assert_eq!(tab.log.len(), 1);
    Ok(())
}

#[test]
fn test_dropping_subscription_stops_forwarding() -> TestResult {
    test_utils::init_logging();

    let storage = MemoryStorage::new(StorageArea::Local);
    let tab = Tab::open(storage.open_tab());
    let sub = tab.relay.listen()?;

    storage.set_item("a", "1")?;
    drop(sub);
    storage.set_item("b", "2")?;

    assert_eq!(tab.log.len(), 1);
    assert_eq!(storage.subscriber_count(), 0);
    Ok(())
}

#[test]
fn test_no_listener_still_writes() -> TestResult {
    let storage = MemoryStorage::new(StorageArea::Session);
    let queue = DeferQueue::new();
    let relay: Relay<_, _, _, Value> = Relay::new(storage, NoListener, queue.dupe());

    relay.write(WriteRequest::store("k", json!([1, 2])))?;
    assert_eq!(queue.run_pending(), 1);
    assert_eq!(relay.storage().get_item("k")?.as_deref(), Some("[1,2]"));
    Ok(())
}

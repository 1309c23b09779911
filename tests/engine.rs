// Copyright (c) 2026 Rust Relay Developers
// Distributed under the MIT software license

//! End-to-end scenarios against the in-memory store double.

use std::sync::Arc;
use std::time::Duration;

use relay_state::{
    DomainKind, KvStore, MemoryStore, OptionKind, RelayStateHandle, Subscription,
    SubscriptionFilter,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn new_handle() -> (RelayStateHandle, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let handle = RelayStateHandle::connect(store.clone())
        .await
        .expect("initial load against an empty store must succeed");
    (handle, store)
}

async fn await_signal(rx: &mut mpsc::Receiver<bool>) -> bool {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("observer signal did not arrive in time")
        .expect("observer channel closed unexpectedly")
}

/// S1. First boot: an empty store is fully provisioned by the first load.
#[tokio::test]
async fn s1_first_boot_provisions_defaults() {
    let (handle, store) = new_handle().await;

    assert_eq!(
        store.hash_field_get("relay:config", "block_service").await.unwrap(),
        "0"
    );
    assert_eq!(
        store
            .hash_field_get("relay:config", "manually_accept")
            .await
            .unwrap(),
        "0"
    );
    assert_eq!(
        store
            .hash_field_get("relay:config", "create_as_announce")
            .await
            .unwrap(),
        "0"
    );

    assert!(!handle.get_option(OptionKind::BlockService).await);
    assert!(handle.get_domain_set(DomainKind::Limited).await.is_empty());
    assert!(handle
        .get_subscriptions(SubscriptionFilter::Subscribe)
        .await
        .is_empty());
}

/// S2. Toggling an option round-trips through the store and the
/// invalidation channel.
#[tokio::test]
async fn s2_toggle_option_round_trips() {
    let (handle, store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    handle
        .set_option(OptionKind::ManuallyAccept, true)
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await, "refresh should succeed");

    assert!(handle.get_option(OptionKind::ManuallyAccept).await);
    assert_eq!(
        store
            .hash_field_get("relay:config", "manually_accept")
            .await
            .unwrap(),
        "1"
    );

    listener.shutdown();
    listener.join().await;
}

/// S2 (full coverage). Every option kind round-trips in both directions
/// through the store and the invalidation channel, not just one kind and
/// one direction.
#[tokio::test]
async fn s2_every_option_kind_round_trips_both_directions() {
    let (handle, store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    for kind in OptionKind::ALL {
        for value in [true, false, true] {
            handle.set_option(kind, value).await.unwrap();
            assert!(await_signal(&mut rx).await, "refresh should succeed");

            assert_eq!(handle.get_option(kind).await, value);
            assert_eq!(
                store.hash_field_get("relay:config", kind.field_name()).await.unwrap(),
                if value { "1" } else { "0" }
            );
        }
    }

    listener.shutdown();
    listener.join().await;
}

/// S3. Domain limit round-trip, including a repeated delete failing with
/// `NotFound`.
#[tokio::test]
async fn s3_domain_limit_round_trip() {
    let (handle, _store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    handle
        .set_domain(DomainKind::Limited, "a.example")
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await);
    assert!(handle
        .get_domain_set(DomainKind::Limited)
        .await
        .contains(&"a.example".to_string()));

    handle
        .delete_domain(DomainKind::Limited, "a.example")
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await);
    assert!(!handle
        .get_domain_set(DomainKind::Limited)
        .await
        .contains(&"a.example".to_string()));

    let err = handle
        .delete_domain(DomainKind::Limited, "a.example")
        .await
        .unwrap_err();
    assert!(matches!(err, relay_state::RelayStateError::NotFound(_)));

    listener.shutdown();
    listener.join().await;
}

/// S3 (full coverage). Same round-trip, for the `Blocked` set.
#[tokio::test]
async fn s3_blocked_domain_round_trip() {
    let (handle, _store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    handle
        .set_domain(DomainKind::Blocked, "b.example")
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await);
    assert!(handle
        .get_domain_set(DomainKind::Blocked)
        .await
        .contains(&"b.example".to_string()));

    handle
        .delete_domain(DomainKind::Blocked, "b.example")
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await);
    assert!(!handle
        .get_domain_set(DomainKind::Blocked)
        .await
        .contains(&"b.example".to_string()));

    let err = handle
        .delete_domain(DomainKind::Blocked, "b.example")
        .await
        .unwrap_err();
    assert!(matches!(err, relay_state::RelayStateError::NotFound(_)));

    listener.shutdown();
    listener.join().await;
}

/// S4. A pending subscription can be promoted to active.
#[tokio::test]
async fn s4_promote_pending_subscription() {
    let (handle, _store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    handle
        .set_subscription(Subscription {
            domain: "p.example".into(),
            inbox_url: "https://p.example/inbox".into(),
            activity_id: "id1".into(),
            actor_id: "actor1".into(),
            available: false,
        })
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await);

    let pending = handle.get_subscriptions(SubscriptionFilter::Pending).await;
    assert!(pending.iter().any(|s| s.domain == "p.example"));

    handle.promote_subscription("p.example").await.unwrap();
    assert!(await_signal(&mut rx).await);

    let active = handle.get_subscriptions(SubscriptionFilter::Subscribe).await;
    let promoted = active
        .iter()
        .find(|s| s.domain == "p.example")
        .expect("promoted subscription must appear under Subscribe");
    assert!(promoted.available);

    let pending = handle.get_subscriptions(SubscriptionFilter::Pending).await;
    assert!(!pending.iter().any(|s| s.domain == "p.example"));

    listener.shutdown();
    listener.join().await;
}

/// S5. An unknown option kind fails without touching the store or
/// publishing.
#[tokio::test]
async fn s5_unknown_kind_rejected_before_any_write() {
    let (_handle, store) = new_handle().await;

    let err = OptionKind::from_i64(42).unwrap_err();
    assert!(matches!(err, relay_state::RelayStateError::InvalidKind(42)));

    // relay:config is untouched beyond the provisioning defaults from S1.
    assert_eq!(
        store
            .hash_field_get("relay:config", "block_service")
            .await
            .unwrap(),
        "0"
    );
}

/// S6. Promoting a domain with no pending subscription fails with
/// `NotFound` and performs no write.
#[tokio::test]
async fn s6_promote_unknown_domain_not_found() {
    let (handle, store) = new_handle().await;

    let err = handle
        .promote_subscription("missing.example")
        .await
        .unwrap_err();
    assert!(matches!(err, relay_state::RelayStateError::NotFound(_)));
    assert!(!store
        .key_exists("relay:subscription:missing.example")
        .await
        .unwrap());
}

/// Invariant 7 (second half): promoting an already-active subscription is
/// also `NotFound`; the precondition is "pending", not "exists".
#[tokio::test]
async fn promote_on_already_active_subscription_fails() {
    let (handle, _store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    handle
        .set_subscription(Subscription {
            domain: "active.example".into(),
            inbox_url: "https://active.example/inbox".into(),
            activity_id: String::new(),
            actor_id: String::new(),
            available: true,
        })
        .await
        .unwrap();
    assert!(await_signal(&mut rx).await);

    let err = handle
        .promote_subscription("active.example")
        .await
        .unwrap_err();
    assert!(matches!(err, relay_state::RelayStateError::NotFound(_)));

    listener.shutdown();
    listener.join().await;
}

/// Invariant 9: a row with only `inbox_url` present decodes with empty
/// historical fields and `available = true`.
#[tokio::test]
async fn legacy_row_decodes_with_defaults() {
    let (handle, store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    // Only `inbox_url` is present, as a row written before the
    // `activity_id`/`actor_id`/`available` fields existed would be.
    store
        .hash_field_set(
            "relay:subscription:legacy.example",
            "inbox_url",
            "https://legacy.example/inbox",
        )
        .await
        .unwrap();
    store.publish("relay_refresh").await.unwrap();
    assert!(await_signal(&mut rx).await);

    let active = handle.get_subscriptions(SubscriptionFilter::Subscribe).await;
    let legacy = active
        .iter()
        .find(|s| s.domain == "legacy.example")
        .expect("legacy row must be visible and active");
    assert_eq!(legacy.activity_id, "");
    assert_eq!(legacy.actor_id, "");
    assert!(legacy.available);

    listener.shutdown();
    listener.join().await;
}

/// A row missing `inbox_url` entirely is not a valid subscription and is
/// skipped silently by the loader.
#[tokio::test]
async fn row_without_inbox_url_is_skipped() {
    let (handle, store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(1);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    store
        .hash_field_set("relay:subscription:broken.example", "actor_id", "actor1")
        .await
        .unwrap();
    store.publish("relay_refresh").await.unwrap();
    assert!(await_signal(&mut rx).await);

    let all = handle.get_subscriptions(SubscriptionFilter::Subscribe).await;
    assert!(!all.iter().any(|s| s.domain == "broken.example"));
    let pending = handle.get_subscriptions(SubscriptionFilter::Pending).await;
    assert!(!pending.iter().any(|s| s.domain == "broken.example"));

    listener.shutdown();
    listener.join().await;
}

/// A burst of mutations yields at least one refresh per mutation; the
/// engine tolerates (and the listener survives) back-to-back signals.
#[tokio::test]
async fn burst_of_mutations_all_deliver_signals() {
    let (handle, _store) = new_handle().await;
    let (tx, mut rx) = mpsc::channel(8);
    let listener = handle
        .start_invalidation_listener(Some(tx))
        .await
        .unwrap();

    for i in 0..5 {
        handle
            .set_domain(DomainKind::Blocked, &format!("d{i}.example"))
            .await
            .unwrap();
    }

    for _ in 0..5 {
        assert!(await_signal(&mut rx).await);
    }

    let blocked = handle.get_domain_set(DomainKind::Blocked).await;
    assert_eq!(blocked.len(), 5);

    listener.shutdown();
    listener.join().await;
}

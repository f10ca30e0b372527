// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use std::time::Duration;
use waypoint_tracker::auth::{Session, UserType};
use waypoint_tracker::error::{AppError, SyncError};
use waypoint_tracker::models::{EntityId, FlagKind};
use waypoint_tracker::services::EngagementStore;
use waypoint_tracker::sync::{InMemorySync, RemoteSync, SyncOutcome, SyncSubject};

fn signed_in() -> (EngagementStore, Arc<InMemorySync>) {
    let sync = Arc::new(InMemorySync::new());
    let store = EngagementStore::new(Arc::new(Session::with_token("token")), sync.clone());
    (store, sync)
}

#[tokio::test]
async fn test_toggle_twice_flips_true_then_false() {
    let (store, sync) = signed_in();
    let place = EntityId::place("42");

    let first = store.toggle(&place, FlagKind::Favorite).unwrap();
    assert!(*first.value());
    first.settled().await.unwrap();

    let second = store.toggle(&place, FlagKind::Favorite).unwrap();
    assert!(!*second.value());
    second.settled().await.unwrap();

    assert!(!store.get(&place, FlagKind::Favorite));
    assert!(!sync.flag(&place, FlagKind::Favorite));
}

#[tokio::test]
async fn test_failed_sync_reverts_flag() {
    let (store, sync) = signed_in();
    let place = EntityId::place("42");
    sync.fail_next(1);

    let pending = store.toggle(&place, FlagKind::Favorite).unwrap();
    assert!(*pending.value());

    let err = pending.settled().await.unwrap_err();
    assert!(err.is_sync_failure());
    assert!(!store.get(&place, FlagKind::Favorite));
}

#[tokio::test]
async fn test_failed_unfavorite_restores_true() {
    let (store, sync) = signed_in();
    let place = EntityId::place("42");
    store
        .toggle(&place, FlagKind::Favorite)
        .unwrap()
        .settled()
        .await
        .unwrap();

    sync.set_offline(true);
    let pending = store.toggle(&place, FlagKind::Favorite).unwrap();
    assert!(!*pending.value());

    let err = pending.settled().await.unwrap_err();
    assert!(matches!(err, AppError::SyncFailed(SyncError::Offline)));
    assert!(store.get(&place, FlagKind::Favorite));
}

#[tokio::test]
async fn test_rollback_is_broadcast() {
    let (store, sync) = signed_in();
    let post = EntityId::post("7");
    let mut events = store.subscribe();
    sync.fail_next(1);

    let _ = store.toggle(&post, FlagKind::Like).unwrap().settled().await;

    let event = events.recv().await.unwrap();
    assert_eq!(event.entity, post);
    assert_eq!(event.subject, SyncSubject::Flag(FlagKind::Like));
    assert!(event.is_rollback());
    assert!(matches!(event.outcome, SyncOutcome::RolledBack(SyncError::Http { status: 503, .. })));
}

#[tokio::test]
async fn test_signed_out_toggle_is_refused_without_mutation() {
    let sync = Arc::new(InMemorySync::new());
    let store = EngagementStore::new(Arc::new(Session::new()), sync.clone());
    let place = EntityId::place("42");

    let result = store.toggle(&place, FlagKind::Favorite);
    assert!(matches!(result, Err(AppError::AuthRequired)));
    assert!(!store.get(&place, FlagKind::Favorite));
    assert_eq!(sync.call_count(), 0);
}

#[tokio::test]
async fn test_guest_cannot_toggle() {
    let session = Session::new();
    session.sign_in_as_guest(UserType::Visitor);
    let store = EngagementStore::new(Arc::new(session), Arc::new(InMemorySync::new()));

    assert!(matches!(
        store.toggle(&EntityId::member("m1"), FlagKind::Follow),
        Err(AppError::AuthRequired)
    ));
}

#[tokio::test]
async fn test_flags_are_independent_per_kind_and_entity() {
    let (store, _sync) = signed_in();
    let a = EntityId::post("a");
    let b = EntityId::post("b");

    store.toggle(&a, FlagKind::Like).unwrap().settled().await.unwrap();
    store.toggle(&b, FlagKind::Bookmark).unwrap().settled().await.unwrap();

    assert!(store.get(&a, FlagKind::Like));
    assert!(!store.get(&a, FlagKind::Bookmark));
    assert!(store.get(&b, FlagKind::Bookmark));
    assert_eq!(store.flagged(FlagKind::Like).len(), 1);
    assert!(store.flagged(FlagKind::Bookmark).contains(&b));
}

#[tokio::test]
async fn test_slow_rollback_overwrites_later_toggles() {
    // Results apply in completion order, not issue order.
    let (store, sync) = signed_in();
    let place = EntityId::place("42");

    sync.set_latency(Duration::from_millis(100));
    sync.fail_next(1);
    let slow = store.toggle(&place, FlagKind::Favorite).unwrap();
    // Let the slow call start before the fast ones are issued.
    tokio::task::yield_now().await;
    sync.set_latency(Duration::ZERO);

    store.toggle(&place, FlagKind::Favorite).unwrap().settled().await.unwrap();
    let third = store.toggle(&place, FlagKind::Favorite).unwrap();
    assert!(*third.value());
    third.settled().await.unwrap();
    assert!(store.get(&place, FlagKind::Favorite));

    assert!(slow.settled().await.is_err());
    // The failed first toggle restores its own starting value.
    assert!(!store.get(&place, FlagKind::Favorite));
    assert!(sync.flag(&place, FlagKind::Favorite));
}

#[tokio::test]
async fn test_refresh_favorite_overwrites_local_value() {
    let (store, sync) = signed_in();
    let place = EntityId::place("42");
    sync.set_flag(&place, FlagKind::Favorite, true).await.unwrap();

    assert!(store.refresh_favorite(&place).await.unwrap());
    assert!(store.get(&place, FlagKind::Favorite));

    sync.set_flag(&place, FlagKind::Favorite, false).await.unwrap();
    assert!(!store.refresh_favorite(&place).await.unwrap());
    assert!(!store.get(&place, FlagKind::Favorite));
}

#[tokio::test]
async fn test_refresh_favorites_counts_favorited() {
    let (store, sync) = signed_in();
    let places: Vec<EntityId> = (0..5).map(|i| EntityId::place(i.to_string())).collect();
    sync.set_flag(&places[1], FlagKind::Favorite, true).await.unwrap();
    sync.set_flag(&places[3], FlagKind::Favorite, true).await.unwrap();

    assert_eq!(store.refresh_favorites(&places).await, 2);
    assert_eq!(store.flagged(FlagKind::Favorite).len(), 2);
}

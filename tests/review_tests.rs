// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{Duration, Utc};
use std::sync::Arc;
use waypoint_tracker::auth::Session;
use waypoint_tracker::error::AppError;
use waypoint_tracker::models::{EntityId, Rating, Review};
use waypoint_tracker::services::ReviewLedger;
use waypoint_tracker::sync::{InMemorySync, RemoteSync, SyncSubject};

fn ledger() -> (ReviewLedger, Arc<InMemorySync>) {
    let sync = Arc::new(InMemorySync::new());
    let ledger = ReviewLedger::new(Arc::new(Session::with_token("token")), sync.clone());
    (ledger, sync)
}

fn stored(id: &str, rating: u8, hours_ago: i64) -> Review {
    Review {
        id: id.to_string(),
        author_id: "someone".to_string(),
        author_name: None,
        rating: Rating::new(rating).unwrap(),
        comment: format!("review {}", id),
        created_at: Utc::now() - Duration::hours(hours_ago),
        image_urls: vec![],
    }
}

#[tokio::test]
async fn test_empty_comment_rejected_without_request() {
    let (ledger, sync) = ledger();
    let place = EntityId::place("p1");
    ledger.add_draft_text(&place, "   ");

    assert!(matches!(ledger.commit(&place), Err(AppError::EmptyComment)));
    assert!(ledger.reviews(&place).is_empty());
    assert_eq!(sync.call_count(), 0);
    // The draft is left for the user to fix.
    assert!(ledger.draft(&place).is_some());
}

#[tokio::test]
async fn test_signed_out_commit_requires_auth() {
    let sync = Arc::new(InMemorySync::new());
    let ledger = ReviewLedger::new(Arc::new(Session::new()), sync.clone());
    let place = EntityId::place("p1");
    ledger.add_draft_text(&place, "nice");

    assert!(matches!(ledger.commit(&place), Err(AppError::AuthRequired)));
    assert_eq!(ledger.draft(&place).unwrap().comment, "nice");
    assert_eq!(sync.call_count(), 0);
}

#[tokio::test]
async fn test_commit_submits_and_clears_draft() {
    let (ledger, sync) = ledger();
    let place = EntityId::place("p1");
    ledger.add_draft_text(&place, "  Beautiful at sunset  ");
    ledger.set_rating(&place, 3).unwrap();
    ledger.attach_image(&place, "https://img.test/1.jpg").unwrap();

    let pending = ledger.commit(&place).unwrap();
    assert!(ledger.draft(&place).is_none());

    let review = pending.settled().await.unwrap();
    assert_eq!(review.comment, "Beautiful at sunset");
    assert_eq!(review.rating.value(), 3);
    assert_eq!(review.image_urls, vec!["https://img.test/1.jpg"]);

    let backend = sync.list_reviews(&place).await.unwrap();
    assert_eq!(backend.len(), 1);
    assert_eq!(ledger.reviews(&place), backend);
}

#[tokio::test]
async fn test_failed_submission_rolls_back_and_restores_draft() {
    let (ledger, sync) = ledger();
    let place = EntityId::place("p1");
    let mut events = ledger.subscribe();
    sync.fail_next(1);

    ledger.add_draft_text(&place, "will fail");
    ledger.set_rating(&place, 2).unwrap();
    let pending = ledger.commit(&place).unwrap();
    assert_eq!(pending.value().len(), 1);

    assert!(pending.settled().await.is_err());
    assert!(ledger.reviews(&place).is_empty());

    let draft = ledger.draft(&place).unwrap();
    assert_eq!(draft.comment, "will fail");
    assert_eq!(draft.rating.value(), 2);

    let event = events.recv().await.unwrap();
    assert_eq!(event.subject, SyncSubject::Review);
    assert!(event.is_rollback());
}

#[tokio::test]
async fn test_rollback_keeps_newer_draft() {
    let (ledger, sync) = ledger();
    let place = EntityId::place("p1");
    sync.fail_next(1);

    ledger.add_draft_text(&place, "first attempt");
    let pending = ledger.commit(&place).unwrap();
    ledger.add_draft_text(&place, "typed meanwhile");

    assert!(pending.settled().await.is_err());
    assert_eq!(ledger.draft(&place).unwrap().comment, "typed meanwhile");
}

#[tokio::test]
async fn test_refresh_sorts_newest_first() {
    let (ledger, sync) = ledger();
    let place = EntityId::place("p1");
    sync.seed_review(&place, stored("old", 2, 48));
    sync.seed_review(&place, stored("new", 5, 1));
    sync.seed_review(&place, stored("mid", 4, 10));

    let reviews = ledger.refresh(&place).await.unwrap();
    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);

    let average = ledger.average_rating(&place).unwrap();
    assert!((average - 11.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_refresh_failure_reported() {
    let (ledger, sync) = ledger();
    sync.set_offline(true);
    let result = ledger.refresh(&EntityId::place("p1")).await;
    assert!(matches!(result, Err(AppError::SyncFailed(_))));
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process backend used offline and in tests.
//!
//! Behaves like the REST backend (favorites, reviews, course events) and can
//! be told to fail or to respond slowly, which is how rollback and
//! out-of-order completion are exercised.

use crate::error::SyncError;
use crate::models::{EntityId, FlagKind, NewReview, ProgressEvent, Rating, Review};
use crate::sync::RemoteSync;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Author id stamped on reviews created through this backend.
const LOCAL_AUTHOR_ID: &str = "local-user";

/// DashMap-backed [`RemoteSync`] with failure injection.
#[derive(Debug, Default)]
pub struct InMemorySync {
    flags: DashMap<(EntityId, FlagKind), bool>,
    reviews: DashMap<EntityId, Vec<Review>>,
    course_events: DashMap<String, Vec<ProgressEvent>>,
    fail_next: AtomicUsize,
    offline: AtomicBool,
    latency_ms: AtomicU64,
    next_review_id: AtomicU64,
    calls: AtomicUsize,
}

impl InMemorySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls fail with a 503.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// While offline every call fails with [`SyncError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay applied to calls that start after this is set.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Backend-side value of a flag.
    pub fn flag(&self, entity: &EntityId, kind: FlagKind) -> bool {
        self.flags
            .get(&(entity.clone(), kind))
            .map(|v| *v)
            .unwrap_or(false)
    }

    /// Preload a stored review.
    pub fn seed_review(&self, entity: &EntityId, review: Review) {
        self.reviews.entry(entity.clone()).or_default().push(review);
    }

    /// Course events recorded for `course_id`, in arrival order.
    pub fn course_events(&self, course_id: &str) -> Vec<ProgressEvent> {
        self.course_events
            .get(course_id)
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Common preamble: count the call and decide its fate, then wait.
    ///
    /// Failures are decided when the call starts, so a slow call that was
    /// told to fail still fails after later calls have gone through.
    async fn begin(&self) -> Result<(), SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let outcome = if self.offline.load(Ordering::SeqCst) {
            Err(SyncError::Offline)
        } else if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            Err(SyncError::Http {
                status: 503,
                body: "injected failure".to_string(),
            })
        } else {
            Ok(())
        };

        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        outcome
    }
}

#[async_trait]
impl RemoteSync for InMemorySync {
    async fn get_favorite_status(&self, entity: &EntityId) -> Result<bool, SyncError> {
        self.begin().await?;
        Ok(self.flag(entity, FlagKind::Favorite))
    }

    async fn set_flag(
        &self,
        entity: &EntityId,
        kind: FlagKind,
        value: bool,
    ) -> Result<(), SyncError> {
        self.begin().await?;
        self.flags.insert((entity.clone(), kind), value);
        Ok(())
    }

    async fn submit_review(
        &self,
        entity: &EntityId,
        review: &NewReview,
    ) -> Result<Review, SyncError> {
        self.begin().await?;

        let rating = Rating::new(review.rating).map_err(|e| SyncError::Http {
            status: 400,
            body: e.to_string(),
        })?;
        let id = self.next_review_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = Review {
            id: format!("review-{}", id),
            author_id: LOCAL_AUTHOR_ID.to_string(),
            author_name: None,
            rating,
            comment: review.comment.clone(),
            created_at: Utc::now(),
            image_urls: review.image_urls.clone(),
        };

        self.reviews
            .entry(entity.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_reviews(&self, entity: &EntityId) -> Result<Vec<Review>, SyncError> {
        self.begin().await?;
        Ok(self
            .reviews
            .get(entity)
            .map(|reviews| reviews.clone())
            .unwrap_or_default())
    }

    async fn record_course_event(&self, event: &ProgressEvent) -> Result<(), SyncError> {
        self.begin().await?;
        self.course_events
            .entry(event.course_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }
}

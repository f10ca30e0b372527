// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend-backed review ledger for places.
//!
//! Drafts behave like [`CommentLedger`](super::CommentLedger) drafts, plus a
//! star rating and up to three image references. Committing shows a
//! provisional review at the top of the list straight away and submits it;
//! the backend's copy replaces it on success, and on failure it disappears
//! again and the draft comes back.

use crate::auth::AuthContext;
use crate::error::{AppError, Result, SyncError};
use crate::models::review::MAX_REVIEW_IMAGES;
use crate::models::{EntityId, NewReview, Rating, Review, ReviewDraft};
use crate::services::ledger::DraftSlots;
use crate::sync::{
    PendingSync, RemoteSync, SyncEvent, SyncOutcome, SyncSubject, EVENT_CHANNEL_CAPACITY,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Id prefix for reviews not yet confirmed by the backend.
const PROVISIONAL_PREFIX: &str = "pending-";

type ReviewMap = DashMap<EntityId, Vec<Review>>;

pub struct ReviewLedger {
    drafts: Arc<DraftSlots<ReviewDraft>>,
    reviews: Arc<ReviewMap>,
    auth: Arc<dyn AuthContext>,
    sync: Arc<dyn RemoteSync>,
    events: broadcast::Sender<SyncEvent>,
    next_provisional: AtomicU64,
}

impl ReviewLedger {
    pub fn new(auth: Arc<dyn AuthContext>, sync: Arc<dyn RemoteSync>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            drafts: Arc::new(DraftSlots::new()),
            reviews: Arc::new(DashMap::new()),
            auth,
            sync,
            events,
            next_provisional: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Replace the draft's comment text.
    pub fn add_draft_text(&self, entity: &EntityId, text: impl Into<String>) {
        let text = text.into();
        self.drafts.update(entity, |draft| draft.comment = text);
    }

    pub fn set_rating(&self, entity: &EntityId, rating: u8) -> Result<()> {
        let rating = Rating::new(rating)?;
        self.drafts.update(entity, |draft| draft.rating = rating);
        Ok(())
    }

    /// Attach an image reference (already uploaded elsewhere).
    pub fn attach_image(&self, entity: &EntityId, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.drafts.update(entity, |draft| {
            if draft.image_urls.len() >= MAX_REVIEW_IMAGES {
                return Err(AppError::BadRequest(format!(
                    "A review can have at most {} images",
                    MAX_REVIEW_IMAGES
                )));
            }
            draft.image_urls.push(url);
            Ok(())
        })
    }

    pub fn draft(&self, entity: &EntityId) -> Option<ReviewDraft> {
        self.drafts.get(entity)
    }

    pub fn cancel(&self, entity: &EntityId) {
        self.drafts.take(entity);
    }

    /// Submit the draft for `entity`.
    ///
    /// Returns the list with the provisional review at its head. Fails
    /// without touching anything when signed out (`AuthRequired`) or when
    /// the trimmed comment is empty (`EmptyComment`).
    pub fn commit(&self, entity: &EntityId) -> Result<PendingSync<Vec<Review>, Review>> {
        if !self.auth.is_authenticated() {
            return Err(AppError::AuthRequired);
        }

        let draft = self.drafts.get(entity).unwrap_or_default();
        let submission = NewReview::from_draft(&draft)?;
        self.drafts.take(entity);

        let provisional_id = format!(
            "{}{}",
            PROVISIONAL_PREFIX,
            self.next_provisional.fetch_add(1, Ordering::Relaxed) + 1
        );
        let provisional = Review {
            id: provisional_id.clone(),
            author_id: self.auth.member_id().unwrap_or_default(),
            author_name: None,
            rating: draft.rating,
            comment: submission.comment.clone(),
            created_at: Utc::now(),
            image_urls: submission.image_urls.clone(),
        };

        let snapshot = {
            let mut list = self.reviews.entry(entity.clone()).or_default();
            list.insert(0, provisional);
            list.clone()
        };
        tracing::debug!(entity = %entity, review_id = %provisional_id, "Optimistic review");

        let remote = {
            let sync = self.sync.clone();
            let entity = entity.clone();
            async move { sync.submit_review(&entity, &submission).await }
        };

        let on_confirm = {
            let reviews = self.reviews.clone();
            let events = self.events.clone();
            let entity = entity.clone();
            let provisional_id = provisional_id.clone();
            move |stored: &Review| {
                if let Some(mut list) = reviews.get_mut(&entity) {
                    match list.iter().position(|r| r.id == provisional_id) {
                        Some(pos) => list[pos] = stored.clone(),
                        None => list.insert(0, stored.clone()),
                    }
                }
                tracing::debug!(entity = %entity, review_id = %stored.id, "Review confirmed");
                let _ = events.send(SyncEvent {
                    entity,
                    subject: SyncSubject::Review,
                    outcome: SyncOutcome::Confirmed,
                    record_id: Some(stored.id.clone()),
                });
            }
        };

        let on_rollback = {
            let reviews = self.reviews.clone();
            let drafts = self.drafts.clone();
            let events = self.events.clone();
            let entity = entity.clone();
            move |e: &SyncError| {
                if let Some(mut list) = reviews.get_mut(&entity) {
                    list.retain(|r| r.id != provisional_id);
                }
                let restored = drafts.restore(&entity, draft);
                tracing::warn!(
                    entity = %entity,
                    draft_restored = restored,
                    error = %e,
                    "Review submission failed, rolling back"
                );
                let _ = events.send(SyncEvent {
                    entity,
                    subject: SyncSubject::Review,
                    outcome: SyncOutcome::RolledBack(e.clone()),
                    record_id: None,
                });
            }
        };

        Ok(PendingSync::spawn(snapshot, remote, on_confirm, on_rollback))
    }

    /// Reload reviews from the backend, newest first.
    ///
    /// Provisional entries still awaiting confirmation stay on top.
    pub async fn refresh(&self, entity: &EntityId) -> Result<Vec<Review>> {
        let mut fetched = self
            .sync
            .list_reviews(entity)
            .await
            .map_err(AppError::SyncFailed)?;
        fetched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut list = self.reviews.entry(entity.clone()).or_default();
        let mut merged: Vec<Review> = list
            .iter()
            .filter(|r| r.id.starts_with(PROVISIONAL_PREFIX))
            .cloned()
            .collect();
        merged.extend(fetched);
        *list = merged;

        tracing::debug!(entity = %entity, count = list.len(), "Reviews loaded");
        Ok(list.clone())
    }

    /// Local reviews, newest first.
    pub fn reviews(&self, entity: &EntityId) -> Vec<Review> {
        self.reviews
            .get(entity)
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    /// Mean star rating, or `None` with no reviews.
    pub fn average_rating(&self, entity: &EntityId) -> Option<f64> {
        let list = self.reviews.get(entity)?;
        if list.is_empty() {
            return None;
        }
        let total: u32 = list.iter().map(|r| u32::from(r.rating.value())).sum();
        Some(f64::from(total) / list.len() as f64)
    }
}

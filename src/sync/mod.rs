// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote sync layer.
//!
//! [`RemoteSync`] is the contract the engagement store, the review ledger
//! and the course tracker use to read and write authoritative state.
//! Adapters map each call to one request/response and never retry; the
//! calling component owns confirm/rollback policy via [`PendingSync`].

pub mod http;
pub mod memory;
pub mod pending;

pub use http::{HttpSync, LoginResponse};
pub use memory::InMemorySync;
pub use pending::PendingSync;

use crate::error::SyncError;
use crate::models::{EntityId, FlagKind, NewReview, ProgressEvent, Review};
use async_trait::async_trait;

/// Backend operations used by the tracking core.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Whether the current user has favorited `entity`.
    async fn get_favorite_status(&self, entity: &EntityId) -> Result<bool, SyncError>;

    /// Set or clear an engagement flag.
    async fn set_flag(&self, entity: &EntityId, kind: FlagKind, value: bool)
        -> Result<(), SyncError>;

    /// Store a review and return it as the backend recorded it.
    async fn submit_review(&self, entity: &EntityId, review: &NewReview)
        -> Result<Review, SyncError>;

    /// Reviews for `entity`, in backend order.
    async fn list_reviews(&self, entity: &EntityId) -> Result<Vec<Review>, SyncError>;

    /// Persist a course progression event.
    async fn record_course_event(&self, event: &ProgressEvent) -> Result<(), SyncError>;
}

/// What a sync notification is about.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncSubject {
    Flag(FlagKind),
    Review,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Confirmed,
    /// The local change was reverted because the backend refused it.
    RolledBack(SyncError),
}

/// Broadcast after every remote confirmation or rollback, so a UI can react
/// to reverted values without holding on to the pending handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncEvent {
    pub entity: EntityId,
    pub subject: SyncSubject,
    pub outcome: SyncOutcome,
    /// Backend id of the confirmed record, when the backend assigns one.
    pub record_id: Option<String>,
}

impl SyncEvent {
    pub fn is_rollback(&self) -> bool {
        matches!(self.outcome, SyncOutcome::RolledBack(_))
    }
}

/// Capacity of the sync event broadcast channels.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

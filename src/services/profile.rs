// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keeps [`ProfileStats`] up to date from tracker and ledger broadcasts.

use crate::models::{Achievement, ProfileStats, ProgressEvent};
use crate::sync::{SyncEvent, SyncOutcome, SyncSubject};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Shared profile statistics fed by background listeners.
#[derive(Clone, Default)]
pub struct ProfileRecorder {
    stats: Arc<Mutex<ProfileStats>>,
}

impl ProfileRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every progress event received on `rx` until the sender closes.
    pub fn follow_progress(&self, mut rx: broadcast::Receiver<ProgressEvent>) -> JoinHandle<()> {
        let stats = self.stats.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if stats.lock().await.apply(&event) {
                            tracing::debug!(
                                course_id = %event.course_id,
                                event = event.kind.name(),
                                "Profile stats updated"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Profile listener lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Count confirmed reviews from a review ledger's event stream.
    pub fn follow_reviews(&self, mut rx: broadcast::Receiver<SyncEvent>) -> JoinHandle<()> {
        let stats = self.stats.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(SyncEvent {
                        entity,
                        subject: SyncSubject::Review,
                        outcome: SyncOutcome::Confirmed,
                        record_id,
                    }) => {
                        let review_id = record_id.unwrap_or_else(|| entity.to_string());
                        stats.lock().await.record_review(&review_id, Utc::now());
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Review listener lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    pub async fn record_post(&self, post_id: &str) {
        self.stats.lock().await.record_post(post_id, Utc::now());
    }

    /// Copy of the current stats.
    pub async fn snapshot(&self) -> ProfileStats {
        self.stats.lock().await.clone()
    }

    pub async fn achievements(&self) -> Vec<Achievement> {
        self.stats.lock().await.achievements()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engagement flags (favorite, follow, like, bookmark) with optimistic toggles.
//!
//! The map is sparse: a missing key means `false`. A toggle flips the local
//! value immediately and returns it; the backend write happens on a spawned
//! task and a failure restores the value the toggle started from.

use crate::auth::AuthContext;
use crate::error::{AppError, Result, SyncError};
use crate::models::{EntityId, FlagKind};
use crate::sync::{
    PendingSync, RemoteSync, SyncEvent, SyncOutcome, SyncSubject, EVENT_CHANNEL_CAPACITY,
};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

type FlagMap = DashMap<(EntityId, FlagKind), bool>;

/// Concurrent favorite queries when refreshing a whole list.
const MAX_CONCURRENT_REFRESHES: usize = 8;

/// Per-session engagement state.
pub struct EngagementStore {
    flags: Arc<FlagMap>,
    auth: Arc<dyn AuthContext>,
    sync: Arc<dyn RemoteSync>,
    events: broadcast::Sender<SyncEvent>,
}

impl EngagementStore {
    pub fn new(auth: Arc<dyn AuthContext>, sync: Arc<dyn RemoteSync>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            flags: Arc::new(DashMap::new()),
            auth,
            sync,
            events,
        }
    }

    /// Confirmation and rollback notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Current local value (default `false`).
    pub fn get(&self, entity: &EntityId, kind: FlagKind) -> bool {
        self.flags
            .get(&(entity.clone(), kind))
            .map(|v| *v)
            .unwrap_or(false)
    }

    /// Entities that currently carry `kind`.
    pub fn flagged(&self, kind: FlagKind) -> HashSet<EntityId> {
        self.flags
            .iter()
            .filter(|entry| entry.key().1 == kind && *entry.value())
            .map(|entry| entry.key().0.clone())
            .collect()
    }

    /// Flip a flag and persist it.
    ///
    /// The returned handle carries the new value right away. If the backend
    /// refuses, the flag is put back to its pre-toggle value before the
    /// handle resolves with `SyncFailed`. Overlapping toggles on the same
    /// key are not queued: each rollback restores the value its own toggle
    /// started from, in whatever order the responses arrive.
    pub fn toggle(&self, entity: &EntityId, kind: FlagKind) -> Result<PendingSync<bool>> {
        if !self.auth.is_authenticated() {
            tracing::debug!(entity = %entity, flag = %kind, "Toggle refused: not signed in");
            return Err(AppError::AuthRequired);
        }

        let key = (entity.clone(), kind);
        let new_value = {
            let mut slot = self.flags.entry(key.clone()).or_insert(false);
            *slot = !*slot;
            *slot
        };
        let previous = !new_value;
        if !new_value {
            self.flags.remove_if(&key, |_, v| !*v);
        }
        tracing::debug!(entity = %entity, flag = %kind, value = new_value, "Optimistic toggle");

        let remote = {
            let sync = self.sync.clone();
            let entity = entity.clone();
            async move { sync.set_flag(&entity, kind, new_value).await }
        };

        let on_confirm = {
            let events = self.events.clone();
            let entity = entity.clone();
            move |_: &()| {
                tracing::debug!(entity = %entity, flag = %kind, value = new_value, "Toggle confirmed");
                let _ = events.send(SyncEvent {
                    entity,
                    subject: SyncSubject::Flag(kind),
                    outcome: SyncOutcome::Confirmed,
                    record_id: None,
                });
            }
        };

        let on_rollback = {
            let events = self.events.clone();
            let flags = self.flags.clone();
            move |e: &SyncError| {
                tracing::warn!(
                    entity = %key.0,
                    flag = %kind,
                    restored = previous,
                    error = %e,
                    "Toggle failed, rolling back"
                );
                store(&flags, key.clone(), previous);
                let _ = events.send(SyncEvent {
                    entity: key.0,
                    subject: SyncSubject::Flag(kind),
                    outcome: SyncOutcome::RolledBack(e.clone()),
                    record_id: None,
                });
            }
        };

        Ok(PendingSync::spawn(new_value, remote, on_confirm, on_rollback))
    }

    /// Re-read the favorite status from the backend, replacing the local value.
    ///
    /// Signed-out users are not favoriting anything; no request is made. A
    /// failed query leaves the flag `false` and reports the failure.
    pub async fn refresh_favorite(&self, entity: &EntityId) -> Result<bool> {
        let key = (entity.clone(), FlagKind::Favorite);

        if !self.auth.is_authenticated() {
            store(&self.flags, key, false);
            return Ok(false);
        }

        match self.sync.get_favorite_status(entity).await {
            Ok(value) => {
                store(&self.flags, key, value);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(entity = %entity, error = %e, "Failed to load favorite status");
                store(&self.flags, key, false);
                Err(AppError::SyncFailed(e))
            }
        }
    }

    /// Refresh favorites for a list of entities (a feed page, search results).
    ///
    /// Individual failures are logged and leave that entity unfavorited.
    /// Returns how many entities are favorited afterwards.
    pub async fn refresh_favorites(&self, entities: &[EntityId]) -> usize {
        stream::iter(entities)
            .map(|entity| self.refresh_favorite(entity))
            .buffer_unordered(MAX_CONCURRENT_REFRESHES)
            .filter(|result| std::future::ready(matches!(result, Ok(true))))
            .count()
            .await
    }
}

/// Write a flag, keeping the map sparse.
fn store(flags: &FlagMap, key: (EntityId, FlagKind), value: bool) {
    if value {
        flags.insert(key, true);
    } else {
        flags.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::sync::InMemorySync;

    fn store_with(session: Session) -> (EngagementStore, Arc<InMemorySync>) {
        let sync = Arc::new(InMemorySync::new());
        let store = EngagementStore::new(Arc::new(session), sync.clone());
        (store, sync)
    }

    #[tokio::test]
    async fn test_toggle_is_visible_before_confirmation() {
        let (store, sync) = store_with(Session::with_token("t"));
        let place = EntityId::place("p1");

        let pending = store.toggle(&place, FlagKind::Favorite).unwrap();
        assert!(*pending.value());
        assert!(store.get(&place, FlagKind::Favorite));

        pending.settled().await.unwrap();
        assert!(sync.flag(&place, FlagKind::Favorite));
    }

    #[tokio::test]
    async fn test_unset_flags_are_not_stored() {
        let (store, _sync) = store_with(Session::with_token("t"));
        let post = EntityId::post("9");

        store.toggle(&post, FlagKind::Like).unwrap().settled().await.unwrap();
        store.toggle(&post, FlagKind::Like).unwrap().settled().await.unwrap();

        assert!(store.flags.is_empty());
        assert!(store.flagged(FlagKind::Like).is_empty());
    }

    #[tokio::test]
    async fn test_refresh_when_signed_out_makes_no_request() {
        let (store, sync) = store_with(Session::new());
        let place = EntityId::place("p1");

        assert!(!store.refresh_favorite(&place).await.unwrap());
        assert_eq!(sync.call_count(), 0);
    }
}

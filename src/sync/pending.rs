// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Two-phase handle for optimistic updates.
//!
//! Phase one happens before the handle exists: the caller has already
//! applied its change locally and hands us the optimistic value. Phase two
//! runs on a spawned task: the remote call is awaited and exactly one of the
//! confirm or rollback closures runs. The rollback always completes before
//! the handle resolves with [`AppError::SyncFailed`], so whoever observes the
//! failure sees already-corrected local state.
//!
//! In-flight calls are never cancelled. Two overlapping updates to the same
//! key settle in completion order, not issue order.

use crate::error::{AppError, Result, SyncError};
use std::future::Future;
use tokio::sync::oneshot;

/// An optimistic value plus the eventual remote outcome.
///
/// Dropping the handle does not cancel the remote call or its rollback.
#[derive(Debug)]
pub struct PendingSync<T, C = ()> {
    value: T,
    outcome: oneshot::Receiver<Result<C>>,
}

impl<T, C: Send + 'static> PendingSync<T, C> {
    /// Start the remote phase on the current Tokio runtime.
    ///
    /// Panics if called outside a runtime, like `tokio::spawn`.
    pub(crate) fn spawn<F, OnConfirm, OnRollback>(
        value: T,
        remote: F,
        on_confirm: OnConfirm,
        on_rollback: OnRollback,
    ) -> Self
    where
        F: Future<Output = std::result::Result<C, SyncError>> + Send + 'static,
        OnConfirm: FnOnce(&C) + Send + 'static,
        OnRollback: FnOnce(&SyncError) + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let result = match remote.await {
                Ok(confirmed) => {
                    on_confirm(&confirmed);
                    Ok(confirmed)
                }
                Err(e) => {
                    on_rollback(&e);
                    Err(AppError::SyncFailed(e))
                }
            };
            // Nobody listening is fine: local state is already settled.
            let _ = tx.send(result);
        });

        Self { value, outcome: rx }
    }

    /// A handle that is already confirmed (no remote round-trip needed).
    pub fn ready(value: T, confirmed: C) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(confirmed));
        Self { value, outcome: rx }
    }

    /// The optimistic value, visible immediately.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Wait for the remote phase.
    ///
    /// On `Err(SyncFailed)` the rollback has already been applied.
    pub async fn settled(self) -> Result<C> {
        self.outcome.await.map_err(|_| {
            AppError::Internal(anyhow::anyhow!("sync task ended without reporting an outcome"))
        })?
    }
}

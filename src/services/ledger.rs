// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-entity comment lists with a draft buffer.
//!
//! [`CommentLedger`] is the in-memory flavor used for inline post comments:
//! committed text is appended locally and never sent anywhere. Place reviews
//! use the same draft handling through [`ReviewLedger`](super::ReviewLedger),
//! which persists through the remote backend instead.

use crate::error::{AppError, Result};
use crate::models::EntityId;
use dashmap::DashMap;

/// One draft slot per entity. Writing replaces the previous draft.
#[derive(Debug)]
pub(crate) struct DraftSlots<D> {
    slots: DashMap<EntityId, D>,
}

impl<D: Clone + Default> DraftSlots<D> {
    pub(crate) fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    pub(crate) fn get(&self, entity: &EntityId) -> Option<D> {
        self.slots.get(entity).map(|d| d.clone())
    }

    /// Edit the draft in place, creating a default one first if needed.
    pub(crate) fn update<R>(&self, entity: &EntityId, f: impl FnOnce(&mut D) -> R) -> R {
        let mut slot = self.slots.entry(entity.clone()).or_default();
        f(&mut *slot)
    }

    pub(crate) fn take(&self, entity: &EntityId) -> Option<D> {
        self.slots.remove(entity).map(|(_, d)| d)
    }

    /// Put a draft back unless the user has started a new one meanwhile.
    pub(crate) fn restore(&self, entity: &EntityId, draft: D) -> bool {
        let mut restored = false;
        self.slots.entry(entity.clone()).or_insert_with(|| {
            restored = true;
            draft
        });
        restored
    }
}

/// Trim a comment, rejecting whitespace-only text.
pub(crate) fn normalize_comment(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyComment);
    }
    Ok(trimmed.to_string())
}

/// Local-only comment ledger.
#[derive(Debug)]
pub struct CommentLedger {
    drafts: DraftSlots<String>,
    comments: DashMap<EntityId, Vec<String>>,
}

impl Default for CommentLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentLedger {
    pub fn new() -> Self {
        Self {
            drafts: DraftSlots::new(),
            comments: DashMap::new(),
        }
    }

    /// Replace the draft for `entity`.
    pub fn add_draft_text(&self, entity: &EntityId, text: impl Into<String>) {
        let text = text.into();
        self.drafts.update(entity, |draft| *draft = text);
    }

    pub fn draft(&self, entity: &EntityId) -> Option<String> {
        self.drafts.get(entity)
    }

    /// Discard the draft without committing it.
    pub fn cancel(&self, entity: &EntityId) {
        self.drafts.take(entity);
    }

    /// Append the trimmed draft and return the updated list.
    ///
    /// An empty or whitespace-only draft (or no draft at all) is rejected
    /// with `EmptyComment`; the draft and the list are left untouched.
    pub fn commit(&self, entity: &EntityId) -> Result<Vec<String>> {
        let text = normalize_comment(&self.drafts.get(entity).unwrap_or_default())?;
        self.drafts.take(entity);

        let mut list = self.comments.entry(entity.clone()).or_default();
        list.push(text);
        tracing::debug!(entity = %entity, count = list.len(), "Comment added");
        Ok(list.clone())
    }

    /// Committed comments, oldest first.
    pub fn comments(&self, entity: &EntityId) -> Vec<String> {
        self.comments
            .get(entity)
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local community chat room.
//!
//! Messages are kept in memory, newest first, and are never sent to the
//! backend.

use crate::error::Result;
use crate::models::ChatMessage;
use crate::services::ledger::normalize_comment;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The user messages are sent as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAuthor {
    pub user_id: String,
    pub user_name: String,
}

impl ChatAuthor {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

#[derive(Debug)]
pub struct ChatLedger {
    author: ChatAuthor,
    draft: Mutex<String>,
    messages: Mutex<Vec<ChatMessage>>,
    next_seq: AtomicU64,
}

/// A panic while holding the lock leaves plain data behind; keep using it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatLedger {
    pub fn new(author: ChatAuthor) -> Self {
        Self {
            author,
            draft: Mutex::new(String::new()),
            messages: Mutex::new(Vec::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn author(&self) -> &ChatAuthor {
        &self.author
    }

    /// Replace the message being typed.
    pub fn add_draft_text(&self, text: impl Into<String>) {
        *lock(&self.draft) = text.into();
    }

    pub fn draft(&self) -> String {
        lock(&self.draft).clone()
    }

    /// Send the trimmed draft and return it.
    ///
    /// A blank draft is rejected with `EmptyComment` and kept as typed.
    pub fn send(&self) -> Result<ChatMessage> {
        let mut draft = lock(&self.draft);
        let text = normalize_comment(&draft)?;
        draft.clear();

        let sent_at = Utc::now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let message = ChatMessage {
            id: format!("{}-{}", sent_at.timestamp_millis(), seq),
            user_id: self.author.user_id.clone(),
            user_name: self.author.user_name.clone(),
            message: text,
            sent_at,
        };

        let mut messages = lock(&self.messages);
        messages.insert(0, message.clone());
        tracing::debug!(message_id = %message.id, count = messages.len(), "Chat message sent");
        Ok(message)
    }

    /// All messages, newest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).clone()
    }
}

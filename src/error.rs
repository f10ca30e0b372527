// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the engagement, ledger and progression components.
//!
//! Validation failures (`AuthRequired`, `EmptyComment`, `InvalidTransition`,
//! `BadRequest`) are returned synchronously before any local mutation.
//! `SyncFailed` is only ever delivered after the compensating rollback has
//! been applied.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Remote sync failed: {0}")]
    SyncFailed(#[source] SyncError),

    #[error("Comment is empty")]
    EmptyComment,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error came from a remote confirmation failing.
    pub fn is_sync_failure(&self) -> bool {
        matches!(self, AppError::SyncFailed(_))
    }

    /// Whether retrying the same user action could succeed without the user
    /// changing anything (network hiccups, server errors).
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::SyncFailed(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// Failures reported by a [`RemoteSync`](crate::sync::RemoteSync) adapter.
///
/// Adapters never retry; the calling component decides what to do.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend rejected credentials")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("backend unreachable (offline)")]
    Offline,
}

impl SyncError {
    /// Credential problems need a fresh login rather than a retry.
    pub fn is_auth_error(&self) -> bool {
        match self {
            SyncError::Unauthorized => true,
            SyncError::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    fn is_transient(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::Offline => true,
            SyncError::Http { status, .. } => *status == 429 || *status >= 500,
            SyncError::Unauthorized | SyncError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, AppError>;

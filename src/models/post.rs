// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Category used for neighborhood news posts.
pub const LOCAL_NEWS_CATEGORY: &str = "local_news";

/// A post in the community feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub likes: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_recommended: bool,
}

/// One message in the community chat room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community feed filtering and post reporting.

use crate::error::{AppError, Result};
use crate::models::post::LOCAL_NEWS_CATEGORY;
use crate::models::Post;
use serde::Deserialize;

/// Feed tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFilter {
    #[default]
    Recent,
    Popular,
    Recommended,
    LocalNews,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub filter: FeedFilter,
    /// Case-insensitive match against content and category.
    #[serde(default)]
    pub search: Option<String>,
}

impl FeedQuery {
    pub fn new(filter: FeedFilter) -> Self {
        Self {
            filter,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Select and order the posts for this tab.
    ///
    /// Popular is ordered by likes (ties newest first); every other tab is
    /// newest first.
    pub fn apply<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut selected: Vec<&Post> = posts
            .iter()
            .filter(|p| match self.filter {
                FeedFilter::Recent | FeedFilter::Popular => true,
                FeedFilter::Recommended => p.is_recommended,
                FeedFilter::LocalNews => p.category == LOCAL_NEWS_CATEGORY,
            })
            .filter(|p| match &needle {
                Some(needle) => {
                    p.content.to_lowercase().contains(needle)
                        || p.category.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        match self.filter {
            FeedFilter::Popular => selected.sort_by(|a, b| {
                b.likes
                    .cmp(&a.likes)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            _ => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        selected
    }
}

/// Validate a report on a post, returning the trimmed reason.
pub fn validate_report(post_id: &str, reason: &str) -> Result<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::BadRequest(
            "A reason is required to report a post".to_string(),
        ));
    }
    tracing::info!(post_id = %post_id, "Post reported");
    Ok(reason.to_string())
}

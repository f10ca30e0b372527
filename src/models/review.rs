// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Review model for places and other reviewable entities.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Most images a single review may reference.
pub const MAX_REVIEW_IMAGES: usize = 3;

/// Longest accepted review comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Star rating, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, AppError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::BadRequest(format!(
                "Rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    /// New reviews start at five stars.
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for Rating {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A submitted review. Append-only once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct Review {
    pub id: String,
    #[serde(rename = "userId")]
    pub author_id: String,
    #[serde(rename = "userName", default)]
    pub author_name: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "images", default)]
    pub image_urls: Vec<String>,
}

/// Unsaved review input for one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewDraft {
    pub rating: Rating,
    pub comment: String,
    pub image_urls: Vec<String>,
}

/// Review submission body.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
    #[validate(length(max = 3))]
    pub image_urls: Vec<String>,
}

impl NewReview {
    /// Build a submission from a draft, trimming the comment.
    pub fn from_draft(draft: &ReviewDraft) -> Result<Self, AppError> {
        let comment = draft.comment.trim();
        if comment.is_empty() {
            return Err(AppError::EmptyComment);
        }

        let review = Self {
            rating: draft.rating.value(),
            comment: comment.to_string(),
            image_urls: draft.image_urls.clone(),
        };
        review.validate()?;
        Ok(review)
    }
}

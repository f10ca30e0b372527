// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod course;
pub mod engagement;
pub mod post;
pub mod profile;
pub mod progress;
pub mod review;

pub use course::{Course, Stop, StopSpec};
pub use engagement::{EntityId, EntityKind, FlagKind};
pub use post::{ChatMessage, Post};
pub use profile::{Achievement, ProfileStats};
pub use progress::{
    Advance, CourseProgress, ProgressEvent, ProgressEventKind, ProgressStatus, ProgressView,
    StopState,
};
pub use review::{NewReview, Rating, Review, ReviewDraft};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - stateful components the screens drive.

pub mod catalog;
pub mod chat;
pub mod engagement;
pub mod feed;
pub mod ledger;
pub mod profile;
pub mod progression;
pub mod reviews;
pub mod route_metrics;

pub use catalog::{CatalogError, CourseCatalog};
pub use chat::{ChatAuthor, ChatLedger};
pub use engagement::EngagementStore;
pub use feed::{FeedFilter, FeedQuery};
pub use ledger::CommentLedger;
pub use profile::ProfileRecorder;
pub use progression::CourseTracker;
pub use reviews::ReviewLedger;
pub use route_metrics::RouteMetrics;

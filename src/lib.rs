// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waypoint-Tracker: course progression and place engagement core
//!
//! This crate holds the stateful logic behind the walking-course and
//! community screens: sequential stop completion, optimistic favorite and
//! like toggles with rollback, comment and review drafts, and the remote
//! backend those components sync with.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sync;
pub mod time_utils;

pub use error::{AppError, Result, SyncError};

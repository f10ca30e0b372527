// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance and walking-time estimates for a course.
//!
//! Flat per-stop estimate: every stop adds half a kilometre, walked at
//! 3 km/h. Stop coordinates are not used.

use crate::models::Course;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Estimated distance contributed by each stop.
pub const KM_PER_STOP: f64 = 0.5;

/// Walking pace expressed as minutes per kilometre (3 km/h).
pub const MINUTES_PER_KM: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct RouteMetrics {
    pub total_distance_km: f64,
    pub estimated_minutes: f64,
}

impl RouteMetrics {
    pub fn from_stop_count(stop_count: usize) -> Self {
        let total_distance_km = stop_count as f64 * KM_PER_STOP;
        Self {
            total_distance_km,
            estimated_minutes: total_distance_km * MINUTES_PER_KM,
        }
    }

    pub fn for_course(course: &Course) -> Self {
        Self::from_stop_count(course.stop_count())
    }

    /// Whole minutes, rounded, for display.
    pub fn rounded_minutes(&self) -> u32 {
        self.estimated_minutes.round() as u32
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use waypoint_tracker::services::route_metrics::{KM_PER_STOP, MINUTES_PER_KM};
use waypoint_tracker::services::{CourseTracker, RouteMetrics};

mod common;
use common::test_course;

#[test]
fn test_three_stop_course() {
    let metrics = RouteMetrics::for_course(&test_course("c", 3));
    assert_eq!(metrics.total_distance_km, 1.5);
    assert_eq!(metrics.estimated_minutes, 30.0);
}

#[test]
fn test_linear_in_stop_count() {
    for stops in 1..20 {
        let metrics = RouteMetrics::from_stop_count(stops);
        assert_eq!(metrics.total_distance_km, stops as f64 * KM_PER_STOP);
        assert_eq!(
            metrics.estimated_minutes,
            metrics.total_distance_km * MINUTES_PER_KM
        );
    }
}

#[test]
fn test_metrics_unaffected_by_progress() {
    let mut tracker = CourseTracker::new(test_course("c", 4));
    let before = tracker.metrics();
    tracker.start().unwrap();
    tracker.complete_stop(0).unwrap();
    assert_eq!(tracker.metrics(), before);
}

#[test]
fn test_serializes_camel_case() {
    let json = serde_json::to_value(RouteMetrics::from_stop_count(2)).unwrap();
    assert_eq!(json["totalDistanceKm"], 1.0);
    assert_eq!(json["estimatedMinutes"], 20.0);
}

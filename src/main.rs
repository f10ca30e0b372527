// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waypoint-Tracker demo walker
//!
//! Loads the course catalog, picks a course (first CLI argument, or the
//! first course in the catalog) and walks every stop in order, recording
//! progress with the configured backend.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_tracker::{
    auth::Session,
    config::Config,
    services::{CourseCatalog, CourseTracker, ProfileRecorder},
    sync::{HttpSync, InMemorySync, RemoteSync},
};

const CATALOG_PATH: &str = "data/courses.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(api = %config.api_base_url, "Starting Waypoint-Tracker");

    tracing::info!(path = CATALOG_PATH, "Loading course catalog");
    let catalog = CourseCatalog::load_from_file(CATALOG_PATH)?;

    let course = match std::env::args().nth(1) {
        Some(id) => catalog
            .get(&id)
            .ok_or_else(|| format!("Unknown course: {}", id))?,
        None => catalog
            .courses()
            .first()
            .cloned()
            .ok_or("Course catalog is empty")?,
    };

    let metrics = CourseTracker::new(course.clone()).metrics();
    tracing::info!(
        course_id = %course.id(),
        title = %course.title(),
        stops = course.stop_count(),
        distance_km = metrics.total_distance_km,
        minutes = metrics.rounded_minutes(),
        "Course selected"
    );

    let sync: Arc<dyn RemoteSync> = match &config.api_token {
        Some(token) => {
            let session = Arc::new(Session::with_token(token.as_str()));
            tracing::info!("Recording progress with the remote backend");
            Arc::new(HttpSync::new(&config, session)?)
        }
        None => {
            tracing::info!("API_TOKEN not set; recording progress in memory");
            Arc::new(InMemorySync::new())
        }
    };

    let mut tracker = CourseTracker::with_sync(course.clone(), sync);
    let profile = ProfileRecorder::new();
    let listener = profile.follow_progress(tracker.subscribe());

    tracker.start()?;
    for index in 0..course.stop_count() {
        tracker.complete_stop(index)?;
        let view = tracker.view();
        tracing::info!(
            stop_index = index,
            progress = view.progress_percent,
            status = ?view.status,
            "Walked stop"
        );
    }
    tracker.flush().await;

    // Closing the channel lets the profile listener finish.
    drop(tracker);
    listener.await?;

    for achievement in profile.achievements().await {
        tracing::info!(
            achievement = %achievement.title,
            progress = achievement.progress,
            max = achievement.max_progress,
            unlocked = achievement.is_unlocked,
            "Achievement"
        );
    }
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waypoint_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

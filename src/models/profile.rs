// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile statistics and achievements for the "my page" screen.
//!
//! Stats are accumulated from progression events and explicit review/post
//! records, and achievements are derived from them on demand.

use crate::models::progress::{ProgressEvent, ProgressEventKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Activity log entries kept per profile (oldest dropped first).
const MAX_ACTIVITY_LOG: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PlaceVisit,
    CourseComplete,
    ReviewWrite,
    PostCreate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    /// Place, course, review or post id the entry refers to
    pub subject: String,
    pub at: DateTime<Utc>,
}

/// A milestone with progress toward it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub progress: u32,
    pub max_progress: u32,
    pub is_unlocked: bool,
}

/// Running totals for one user during a session.
#[derive(Debug, Clone, Default)]
pub struct ProfileStats {
    visited_places: HashSet<String>,
    completed_courses: HashSet<String>,
    reviews_written: u32,
    posts_created: u32,
    activities: VecDeque<ActivityEntry>,
}

impl ProfileStats {
    pub fn places_visited(&self) -> u32 {
        self.visited_places.len() as u32
    }

    pub fn courses_completed(&self) -> u32 {
        self.completed_courses.len() as u32
    }

    pub fn reviews_written(&self) -> u32 {
        self.reviews_written
    }

    pub fn posts_created(&self) -> u32 {
        self.posts_created
    }

    /// Activity log, newest first.
    pub fn activities(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.activities.iter()
    }

    /// Fold a progression event into the stats.
    ///
    /// Returns `true` if the event changed a counter. Revisiting a place or
    /// re-completing a course is logged but not counted twice.
    pub fn apply(&mut self, event: &ProgressEvent) -> bool {
        match &event.kind {
            ProgressEventKind::StopCompleted { stop_id, .. } => {
                self.log(ActivityKind::PlaceVisit, stop_id, event.at);
                self.visited_places.insert(stop_id.clone())
            }
            ProgressEventKind::Completed => {
                self.log(ActivityKind::CourseComplete, &event.course_id, event.at);
                self.completed_courses.insert(event.course_id.clone())
            }
            ProgressEventKind::Started | ProgressEventKind::Restarted => false,
        }
    }

    pub fn record_review(&mut self, review_id: &str, at: DateTime<Utc>) {
        self.reviews_written += 1;
        self.log(ActivityKind::ReviewWrite, review_id, at);
    }

    pub fn record_post(&mut self, post_id: &str, at: DateTime<Utc>) {
        self.posts_created += 1;
        self.log(ActivityKind::PostCreate, post_id, at);
    }

    fn log(&mut self, kind: ActivityKind, subject: &str, at: DateTime<Utc>) {
        self.activities.push_front(ActivityEntry {
            kind,
            subject: subject.to_string(),
            at,
        });
        self.activities.truncate(MAX_ACTIVITY_LOG);
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        [
            (
                "first_visit",
                "First Visit",
                "Visit your first place",
                self.places_visited(),
                1,
            ),
            (
                "course_finisher",
                "Course Finisher",
                "Complete 5 courses",
                self.courses_completed(),
                5,
            ),
            (
                "review_master",
                "Review Master",
                "Write 10 reviews",
                self.reviews_written,
                10,
            ),
            (
                "community_booster",
                "Community Booster",
                "Create 20 posts",
                self.posts_created,
                20,
            ),
        ]
        .into_iter()
        .map(|(id, title, description, count, max)| Achievement {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            progress: count.min(max),
            max_progress: max,
            is_unlocked: count >= max,
        })
        .collect()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course tracker: drives one [`CourseProgress`] through a [`Course`].
//!
//! Local state is authoritative. Every transition is broadcast as a
//! [`ProgressEvent`] and, when a backend is attached, persisted in the
//! background. Persistence failures are logged and never undo progress.

use crate::error::Result;
use crate::models::{
    Advance, Course, CourseProgress, ProgressEvent, ProgressEventKind, ProgressStatus,
    ProgressView, Stop, StopState,
};
use crate::services::route_metrics::RouteMetrics;
use crate::sync::RemoteSync;
use chrono::Utc;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Capacity of the progress event channel.
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

pub struct CourseTracker {
    course: Arc<Course>,
    progress: CourseProgress,
    sync: Option<Arc<dyn RemoteSync>>,
    events: broadcast::Sender<ProgressEvent>,
    /// Tail of the persistence chain; each write waits for the previous one.
    last_write: Option<JoinHandle<()>>,
}

impl CourseTracker {
    /// A tracker with no backend; progress lives only in memory.
    pub fn new(course: Arc<Course>) -> Self {
        let (events, _) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);
        let progress = CourseProgress::new(course.id(), course.stop_count());
        Self {
            course,
            progress,
            sync: None,
            events,
            last_write: None,
        }
    }

    /// A tracker that also records its events with `sync`.
    pub fn with_sync(course: Arc<Course>, sync: Arc<dyn RemoteSync>) -> Self {
        Self {
            sync: Some(sync),
            ..Self::new(course)
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn progress(&self) -> &CourseProgress {
        &self.progress
    }

    pub fn start(&mut self) -> Result<()> {
        if let Err(e) = self.progress.start() {
            tracing::debug!(course_id = %self.course.id(), error = %e, "Start rejected");
            return Err(e);
        }
        tracing::debug!(course_id = %self.course.id(), "Course started");
        self.emit(ProgressEventKind::Started);
        Ok(())
    }

    /// Mark stop `index` visited.
    ///
    /// Out-of-order indices are rejected with `InvalidTransition` and change
    /// nothing.
    pub fn complete_stop(&mut self, index: usize) -> Result<Advance> {
        let advance = match self.progress.complete_stop(index) {
            Ok(advance) => advance,
            Err(e) => {
                tracing::debug!(
                    course_id = %self.course.id(),
                    stop_index = index,
                    current = self.progress.current_stop_index(),
                    "Stop completion rejected"
                );
                return Err(e);
            }
        };

        let stop_id = self
            .course
            .stop(index)
            .map(|s| s.id.clone())
            .unwrap_or_default();
        tracing::debug!(
            course_id = %self.course.id(),
            stop_index = index,
            stop_id = %stop_id,
            progress = self.progress.progress_percent(),
            "Stop completed"
        );
        self.emit(ProgressEventKind::StopCompleted { index, stop_id });

        if advance == Advance::Completed {
            tracing::info!(
                course_id = %self.course.id(),
                stops = self.course.stop_count(),
                "Course completed"
            );
            self.emit(ProgressEventKind::Completed);
        }
        Ok(advance)
    }

    /// Back to the first stop, from any state.
    pub fn restart(&mut self) {
        let from = self.progress.status();
        self.progress.restart();
        tracing::debug!(course_id = %self.course.id(), from = ?from, "Course restarted");
        self.emit(ProgressEventKind::Restarted);
    }

    pub fn view(&self) -> ProgressView {
        self.progress.view()
    }

    pub fn status(&self) -> ProgressStatus {
        self.progress.status()
    }

    /// The stop to visit next, if the course is in progress.
    pub fn current_stop(&self) -> Option<&Stop> {
        match self.progress.status() {
            ProgressStatus::InProgress => self.course.stop(self.progress.current_stop_index()),
            _ => None,
        }
    }

    pub fn stop_states(&self) -> Vec<(&Stop, StopState)> {
        self.course
            .stops()
            .iter()
            .map(|stop| (stop, self.progress.stop_state(stop.ordinal())))
            .collect()
    }

    pub fn metrics(&self) -> RouteMetrics {
        RouteMetrics::for_course(&self.course)
    }

    /// Wait until every queued backend write has finished.
    pub async fn flush(&mut self) {
        if let Some(handle) = self.last_write.take() {
            if let Err(e) = handle.await {
                tracing::warn!(course_id = %self.course.id(), error = %e, "Course event task failed");
            }
        }
    }

    fn emit(&mut self, kind: ProgressEventKind) {
        let event = ProgressEvent {
            course_id: self.course.id().to_string(),
            kind,
            at: Utc::now(),
        };
        self.persist(&event);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Queue a best-effort backend write behind any earlier ones.
    fn persist(&mut self, event: &ProgressEvent) {
        let Some(sync) = self.sync.clone() else {
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                course_id = %event.course_id,
                event = event.kind.name(),
                "No async runtime; course event not recorded"
            );
            return;
        };

        let previous = self.last_write.take();
        let event = event.clone();
        self.last_write = Some(runtime.spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            if let Err(e) = sync.record_course_event(&event).await {
                tracing::warn!(
                    course_id = %event.course_id,
                    event = event.kind.name(),
                    error = %e,
                    "Failed to record course event"
                );
            }
        }));
    }
}

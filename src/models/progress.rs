// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course progression state machine.
//!
//! ```text
//! NotStarted --start--> InProgress --complete_stop(current)--> InProgress
//!                           |                                      |
//!                           +--complete_stop(last)--> Completed <--+
//! InProgress | Completed --restart--> InProgress (index 0)
//! ```
//!
//! Stops must be completed strictly in order. Any other request is
//! rejected with [`AppError::InvalidTransition`] and leaves the state as it
//! was.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lifecycle of one course run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// How a stop should be shown relative to the walker's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub enum StopState {
    Completed,
    Current,
    Upcoming,
}

/// Result of a successful `complete_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on; holds the new current stop index.
    Next(usize),
    /// The last stop was completed.
    Completed,
}

/// Per-session progress through one course.
///
/// Invariant: `0 <= current_stop_index <= stop_count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct CourseProgress {
    course_id: String,
    stop_count: usize,
    current_stop_index: usize,
    status: ProgressStatus,
}

impl CourseProgress {
    pub fn new(course_id: impl Into<String>, stop_count: usize) -> Self {
        Self {
            course_id: course_id.into(),
            stop_count,
            current_stop_index: 0,
            status: ProgressStatus::NotStarted,
        }
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    /// Index of the next stop to complete (equals `stop_count` once completed).
    pub fn current_stop_index(&self) -> usize {
        self.current_stop_index
    }

    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    pub fn completed_count(&self) -> usize {
        match self.status {
            ProgressStatus::NotStarted => 0,
            ProgressStatus::InProgress => self.current_stop_index,
            ProgressStatus::Completed => self.stop_count,
        }
    }

    /// Completion percentage, always derived from the index.
    pub fn progress_percent(&self) -> f64 {
        if self.stop_count == 0 {
            return 0.0;
        }
        self.current_stop_index as f64 / self.stop_count as f64 * 100.0
    }

    pub fn start(&mut self) -> Result<(), AppError> {
        if self.status != ProgressStatus::NotStarted {
            return Err(AppError::InvalidTransition(format!(
                "course {} already {:?}; use restart",
                self.course_id, self.status
            )));
        }
        self.status = ProgressStatus::InProgress;
        self.current_stop_index = 0;
        Ok(())
    }

    /// Mark stop `index` visited. Only the current stop is accepted.
    pub fn complete_stop(&mut self, index: usize) -> Result<Advance, AppError> {
        if self.status != ProgressStatus::InProgress {
            return Err(AppError::InvalidTransition(format!(
                "cannot complete stop {} of course {} while {:?}",
                index, self.course_id, self.status
            )));
        }
        if index != self.current_stop_index || index >= self.stop_count {
            return Err(AppError::InvalidTransition(format!(
                "stop {} is not the current stop {} of course {}",
                index, self.current_stop_index, self.course_id
            )));
        }

        if self.current_stop_index + 1 == self.stop_count {
            self.current_stop_index = self.stop_count;
            self.status = ProgressStatus::Completed;
            Ok(Advance::Completed)
        } else {
            self.current_stop_index += 1;
            Ok(Advance::Next(self.current_stop_index))
        }
    }

    /// Reset to the first stop. Allowed from any state.
    pub fn restart(&mut self) {
        self.status = ProgressStatus::InProgress;
        self.current_stop_index = 0;
    }

    /// Display state for stop `index`.
    pub fn stop_state(&self, index: usize) -> StopState {
        if self.status == ProgressStatus::Completed || index < self.current_stop_index {
            StopState::Completed
        } else if index == self.current_stop_index && self.status == ProgressStatus::InProgress {
            StopState::Current
        } else {
            StopState::Upcoming
        }
    }

    pub fn view(&self) -> ProgressView {
        ProgressView {
            course_id: self.course_id.clone(),
            status: self.status,
            current_stop_index: self.current_stop_index,
            completed_count: self.completed_count(),
            stop_count: self.stop_count,
            progress_percent: self.progress_percent(),
        }
    }
}

/// Snapshot of progress for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct ProgressView {
    pub course_id: String,
    pub status: ProgressStatus,
    pub current_stop_index: usize,
    pub completed_count: usize,
    pub stop_count: usize,
    pub progress_percent: f64,
}

/// Something that happened to a course run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub course_id: String,
    pub kind: ProgressEventKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEventKind {
    Started,
    StopCompleted { index: usize, stop_id: String },
    Completed,
    Restarted,
}

impl ProgressEventKind {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ProgressEventKind::Started => "started",
            ProgressEventKind::StopCompleted { .. } => "stop_completed",
            ProgressEventKind::Completed => "completed",
            ProgressEventKind::Restarted => "restarted",
        }
    }

    pub fn stop_index(&self) -> Option<usize> {
        match self {
            ProgressEventKind::StopCompleted { index, .. } => Some(*index),
            _ => None,
        }
    }
}

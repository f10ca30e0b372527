// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course catalog loading.

use crate::models::{Course, StopSpec};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Read-only set of courses available to walk.
#[derive(Debug, Default, Clone)]
pub struct CourseCatalog {
    courses: Vec<Arc<Course>>,
}

#[derive(Deserialize)]
struct CatalogFile {
    courses: Vec<CourseEntry>,
}

#[derive(Deserialize)]
struct CourseEntry {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    stops: Vec<StopSpec>,
}

impl CourseCatalog {
    /// Load courses from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load courses from a JSON string of the form `{"courses": [...]}`.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut courses = Vec::with_capacity(file.courses.len());

        for entry in file.courses {
            if !seen.insert(entry.id.clone()) {
                return Err(CatalogError::DuplicateCourse(entry.id));
            }
            let course = Course::new(entry.id.as_str(), entry.title, entry.description, entry.stops)
                .map_err(|e| CatalogError::InvalidCourse(entry.id.clone(), e.to_string()))?;
            courses.push(Arc::new(course));
        }

        tracing::info!(count = courses.len(), "Loaded courses");
        Ok(Self { courses })
    }

    pub fn courses(&self) -> &[Arc<Course>] {
        &self.courses
    }

    pub fn get(&self, id: &str) -> Option<Arc<Course>> {
        self.courses.iter().find(|c| c.id() == id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse course JSON: {0}")]
    ParseError(String),

    #[error("Invalid course {0}: {1}")]
    InvalidCourse(String, String),

    #[error("Duplicate course id: {0}")]
    DuplicateCourse(String),
}

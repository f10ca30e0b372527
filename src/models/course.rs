// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Walking course model.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// One location within a course.
///
/// The ordinal is assigned from the stop's position when the course is
/// built and cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub address: String,
    ordinal: usize,
}

impl Stop {
    /// 0-based visit position within the owning course.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Stop data as supplied by a catalog, before ordinals are assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct StopSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// An ordered itinerary of stops. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    id: String,
    title: String,
    description: String,
    stops: Vec<Stop>,
}

impl Course {
    /// Build a course, numbering stops in the order given.
    ///
    /// A course must have at least one stop; otherwise there is nothing to
    /// progress through.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        stops: Vec<StopSpec>,
    ) -> Result<Self, AppError> {
        let id = id.into();
        if stops.is_empty() {
            return Err(AppError::BadRequest(format!("Course {} has no stops", id)));
        }

        let stops = stops
            .into_iter()
            .enumerate()
            .map(|(ordinal, s)| Stop {
                id: s.id,
                name: s.name,
                address: s.address,
                ordinal,
            })
            .collect();

        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            stops,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stops in visit order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn stop(&self, index: usize) -> Option<&Stop> {
        self.stops.get(index)
    }
}

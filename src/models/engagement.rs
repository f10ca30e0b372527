// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keys for per-entity engagement flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What sort of thing an entity id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Place,
    Course,
    Post,
    Member,
}

impl EntityKind {
    /// REST collection name for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Place => "places",
            EntityKind::Course => "courses",
            EntityKind::Post => "posts",
            EntityKind::Member => "members",
        }
    }
}

/// Identifier of a place, course, post or member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityId {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn place(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Place, id)
    }

    pub fn course(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Course, id)
    }

    pub fn post(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Post, id)
    }

    pub fn member(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Member, id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.collection(), self.id)
    }
}

/// Boolean marker a user can set on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Favorite,
    Follow,
    Like,
    Bookmark,
}

impl FlagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKind::Favorite => "favorite",
            FlagKind::Follow => "follow",
            FlagKind::Like => "like",
            FlagKind::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Airdrop task records and their integer identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a task.
///
/// Small integers assigned by the catalog: one greater than the highest
/// existing id, starting at 1. Stable for the lifetime of the task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw integer id.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A task users can complete to earn points.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Unique identifier (immutable once created).
    pub id: TaskId,
    /// Short display title; doubles as the audit reason on completion credits.
    pub title: String,
    /// Longer instructions shown to the user.
    pub description: String,
    /// Points credited on completion.
    pub points: u32,
    /// Optional URL the task points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Task fields without an id, as submitted by an admin.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TaskDraft {
    /// Short display title.
    pub title: String,
    /// Longer instructions shown to the user.
    pub description: String,
    /// Points credited on completion.
    pub points: u32,
    /// Optional URL the task points at.
    #[serde(default)]
    pub link: Option<String>,
}

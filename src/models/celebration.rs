// SPDX-License-Identifier: MIT

//! Milestone celebration model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Milestone;

/// An ephemeral record of a milestone just reached, awaiting display.
///
/// At most one pending celebration is tracked per streak; it is consumed
/// once the UI confirms display via `mark_celebration_as_shown`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakCelebration {
    /// Celebration identifier (UUID v4)
    pub id: String,
    /// Threshold of the milestone being celebrated
    pub milestone_threshold: u32,
    /// Display name of the milestone
    pub milestone_name: String,
    /// Bonus points awarded alongside this celebration
    pub bonus_points: u32,
    /// When the milestone was crossed
    pub created_at: DateTime<Utc>,
    /// Whether the UI has displayed this celebration
    pub shown: bool,
    /// When it was displayed, if it has been
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown_at: Option<DateTime<Utc>>,
}

impl StreakCelebration {
    /// Create a fresh (unshown) celebration for a crossed milestone.
    pub fn for_milestone(milestone: &Milestone, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            milestone_threshold: milestone.threshold,
            milestone_name: milestone.name.to_string(),
            bonus_points: milestone.bonus_points,
            created_at: now,
            shown: false,
            shown_at: None,
        }
    }

    /// Mark this celebration as displayed.
    pub fn mark_shown(&mut self, now: DateTime<Utc>) {
        self.shown = true;
        self.shown_at = Some(now);
    }
}

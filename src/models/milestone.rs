// SPDX-License-Identifier: MIT

//! Streak milestone thresholds and crossing detection.
//!
//! The threshold list is data, not code: tuning milestones means editing
//! this table only.

use serde::Serialize;

/// A named streak-length threshold with its bonus award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    /// Consecutive-day threshold
    pub threshold: u32,
    /// Display name shown in celebrations
    pub name: &'static str,
    /// Bonus points forwarded to the momentum ledger
    pub bonus_points: u32,
}

/// Fixed milestone table, strictly increasing by threshold.
pub const MILESTONES: [Milestone; 8] = [
    Milestone {
        threshold: 3,
        name: "Getting Started",
        bonus_points: 25,
    },
    Milestone {
        threshold: 7,
        name: "One Week Strong",
        bonus_points: 50,
    },
    Milestone {
        threshold: 14,
        name: "Two Week Momentum",
        bonus_points: 75,
    },
    Milestone {
        threshold: 30,
        name: "Monthly Habit",
        bonus_points: 100,
    },
    Milestone {
        threshold: 60,
        name: "Sixty Day Streak",
        bonus_points: 150,
    },
    Milestone {
        threshold: 100,
        name: "Century Club",
        bonus_points: 250,
    },
    Milestone {
        threshold: 180,
        name: "Half Year Hero",
        bonus_points: 300,
    },
    Milestone {
        threshold: 365,
        name: "Full Year Legend",
        bonus_points: 500,
    },
];

/// Milestones newly crossed by a streak update, ascending by threshold.
///
/// A milestone is crossed exactly when the streak moves from strictly below
/// its threshold to at or above it. A multi-day jump (e.g. offline catch-up
/// sync) reports every intervening milestone; the dispatcher decides which
/// one to surface.
pub fn detect_new_milestones(before: u32, after: u32) -> Vec<Milestone> {
    MILESTONES
        .iter()
        .filter(|m| before < m.threshold && m.threshold <= after)
        .copied()
        .collect()
}

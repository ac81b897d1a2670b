// SPDX-License-Identifier: MIT

//! Engagement streak summary and the consecutive-day computations.
//!
//! The pure functions here are the algorithmic core: given the set of
//! engaged days (from the append-only `daily_engagements` table) they
//! produce the current and longest consecutive-day runs. The service layer
//! only adds I/O and caching around them.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::StreakCelebration;

/// Rolling summary of a user's consecutive engaged days.
///
/// Stored as one row per user in `engagement_streaks`, but treated as a
/// derived aggregate: the day set is the source of truth and the summary is
/// recomputed from it, so last-write-wins on this row cannot lose a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementStreak {
    pub user_id: String,
    /// Length of the consecutive run ending at the most recent engaged day
    pub current_streak: u32,
    /// Longest run ever observed; monotonically non-decreasing
    pub longest_streak: u32,
    /// Most recent engaged day
    pub last_engaged_date: Option<NaiveDate>,
    /// Whether today has already been counted
    pub active_today: bool,
    /// Celebration awaiting display, if any.
    ///
    /// Serialized as an explicit `null` when empty: the summary row is
    /// written with a merge upsert, and an omitted key would leave a
    /// consumed celebration in the stored column.
    #[serde(default)]
    pub pending_celebration: Option<StreakCelebration>,
}

impl EngagementStreak {
    /// Empty streak, also the conservative fallback when computation fails.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            current_streak: 0,
            longest_streak: 0,
            last_engaged_date: None,
            active_today: false,
            pending_celebration: None,
        }
    }

    /// Incremental update for a newly counted engagement on `day`.
    ///
    /// Same day: no-op (the gate already counted it). Day after the last
    /// engaged day: extends the run. Anything else: the run restarts at 1.
    pub fn apply_engagement(&self, day: NaiveDate) -> Self {
        let current = match self.last_engaged_date {
            Some(last) if last == day => self.current_streak,
            Some(last) if day - last == Duration::days(1) => self.current_streak + 1,
            _ => 1,
        };

        Self {
            user_id: self.user_id.clone(),
            current_streak: current,
            longest_streak: self.longest_streak.max(current),
            last_engaged_date: Some(day),
            active_today: true,
            pending_celebration: self.pending_celebration.clone(),
        }
    }

    /// Missed-day reset: current streak drops to 0, longest is preserved.
    pub fn apply_break(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            current_streak: 0,
            longest_streak: self.longest_streak,
            last_engaged_date: self.last_engaged_date,
            active_today: false,
            pending_celebration: self.pending_celebration.clone(),
        }
    }
}

/// Result of walking the engaged-day set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWalk {
    pub current: u32,
    pub longest: u32,
    pub last_engaged: Option<NaiveDate>,
}

/// Compute current and longest consecutive runs from a set of engaged days.
///
/// The current streak is anchored at `today`, or at yesterday when today has
/// not yet engaged; a gap of a full day or more means the streak is broken
/// and the current count is 0. The longest run is taken over the whole day
/// set, not just the most recent run. Duplicate and unsorted input days are
/// tolerated.
pub fn walk_days(days: &[NaiveDate], today: NaiveDate) -> DayWalk {
    let set: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let last_engaged = set.iter().next_back().copied();

    let yesterday = today - Duration::days(1);
    let anchor = if set.contains(&today) {
        Some(today)
    } else if set.contains(&yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut current = 0u32;
    if let Some(start) = anchor {
        let mut cursor = start;
        while set.contains(&cursor) {
            current += 1;
            cursor -= Duration::days(1);
        }
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &day in &set {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    DayWalk {
        current,
        longest,
        last_engaged,
    }
}

// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod celebration;
pub mod engagement;
pub mod event;
pub mod milestone;
pub mod streak;

pub use celebration::StreakCelebration;
pub use engagement::{DailyEngagementRecord, EngagementStatus, RecordOutcome};
pub use event::EngagementEvent;
pub use milestone::{detect_new_milestones, Milestone, MILESTONES};
pub use streak::EngagementStreak;

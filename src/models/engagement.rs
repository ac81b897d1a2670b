// SPDX-License-Identifier: MIT

//! Daily engagement qualification models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The at-most-one-per-day qualification marker.
///
/// For a given (user, day) pair at most one record exists with
/// `momentum_eligible = true`; the gate enforces this, backed by a unique
/// constraint on the `daily_engagements` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEngagementRecord {
    /// Opaque user identifier
    pub user_id: String,
    /// UTC calendar day this record qualifies
    pub engagement_date: NaiveDate,
    /// Timestamp of the first qualifying event of the day
    pub first_event_at: DateTime<Utc>,
    /// Whether this day counts toward momentum
    pub momentum_eligible: bool,
}

/// Result of a gate status check.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementStatus {
    pub has_engaged_today: bool,
    pub is_eligible: bool,
    pub last_engagement_time: Option<DateTime<Utc>>,
}

impl EngagementStatus {
    /// Conservative status returned when the backend cannot be reached.
    ///
    /// Claims the user already engaged so a retry cannot double-award.
    pub fn fail_closed() -> Self {
        Self {
            has_engaged_today: true,
            is_eligible: false,
            last_engagement_time: None,
        }
    }
}

/// Outcome of recording an engagement through the gate.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    /// The event was accepted (stored or recognized as a duplicate)
    pub accepted: bool,
    /// The event counts toward momentum (first of its day)
    pub eligible: bool,
    /// Human-readable explanation for ineligible outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecordOutcome {
    pub fn counted() -> Self {
        Self {
            accepted: true,
            eligible: true,
            reason: None,
        }
    }

    pub fn duplicate() -> Self {
        Self {
            accepted: true,
            eligible: false,
            reason: Some("Already counted today".to_string()),
        }
    }
}

// SPDX-License-Identifier: MIT

//! Qualifying engagement event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One qualifying user interaction with content.
///
/// Append-only: created at interaction time, never updated or deleted by
/// this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementEvent {
    /// Opaque user identifier
    pub user_id: String,
    /// Content that was interacted with
    pub content_id: String,
    /// When the interaction happened (UTC)
    pub event_timestamp: DateTime<Utc>,
    /// Session duration in seconds, if known
    pub session_duration_secs: Option<u32>,
    /// Free-form source metadata (e.g. surface, experiment arm)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl EngagementEvent {
    /// UTC calendar day this event falls on.
    pub fn event_date(&self) -> chrono::NaiveDate {
        self.event_timestamp.date_naive()
    }
}

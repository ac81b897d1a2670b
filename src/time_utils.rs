// SPDX-License-Identifier: MIT

//! Shared helpers for UTC calendar-day handling.
//!
//! All day arithmetic in this crate uses the UTC calendar day so the gate
//! and the streak calculator agree on day boundaries.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Current UTC calendar day.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

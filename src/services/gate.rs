// SPDX-License-Identifier: MIT

//! Daily engagement gate.
//!
//! Decides, for a given user and UTC calendar day, whether a qualifying
//! interaction has already been counted, and records the first one of the
//! day. Enforces "at most one counted engagement per user per day"; the
//! unique constraint on `daily_engagements` is the second line of defense
//! against a concurrent double-submission.

use chrono::NaiveDate;

use crate::config::ENGAGEMENT_CACHE_TTL_SECS;
use crate::db::SupabaseDb;
use crate::error::AppError;
use crate::models::{DailyEngagementRecord, EngagementEvent, EngagementStatus, RecordOutcome};
use crate::services::cache::TtlCache;
use crate::time_utils::utc_today;

/// The daily engagement gate.
pub struct EngagementGate {
    db: SupabaseDb,
    /// Positive qualification results keyed by (user, day).
    ///
    /// Only engaged days are cached: a cached negative could hide a record
    /// written by another device for the cache lifetime, while a cached
    /// positive can never cause a double award.
    cache: TtlCache<(String, NaiveDate), DailyEngagementRecord>,
}

impl EngagementGate {
    pub fn new(db: SupabaseDb) -> Self {
        Self {
            db,
            cache: TtlCache::new(),
        }
    }

    /// Check whether the user has already engaged today.
    ///
    /// Backend failures fail closed: the status claims the user already
    /// engaged so a retry cannot double-award. Logged distinctly so
    /// operators can tell this apart from a genuine engaged state.
    pub async fn check_status(&self, user_id: &str) -> EngagementStatus {
        let today = utc_today();
        let key = (user_id.to_string(), today);

        if let Some(record) = self.cache.get(&key) {
            return engaged_status(&record);
        }

        match self.db.get_daily_engagement(user_id, today).await {
            Ok(Some(record)) => {
                self.cache
                    .insert(key, record.clone(), ENGAGEMENT_CACHE_TTL_SECS);
                engaged_status(&record)
            }
            Ok(None) => EngagementStatus {
                has_engaged_today: false,
                is_eligible: true,
                last_engagement_time: None,
            },
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "Engagement status check failed; failing closed (not a real engaged state)"
                );
                EngagementStatus::fail_closed()
            }
        }
    }

    /// Record a qualifying engagement for the event's user.
    ///
    /// The marker is keyed on the event's own calendar day, not on the day
    /// the record call happens; a replayed offline event from two days ago
    /// must count for that day. Check-then-act: if the day is already
    /// counted the outcome is the duplicate no-op (`accepted = true,
    /// eligible = false`). A backend failure is reported as a failed
    /// operation; the gate state is unchanged because the qualification
    /// marker write is what commits the decision.
    pub async fn record_engagement(
        &self,
        user_id: &str,
        event: &EngagementEvent,
    ) -> Result<RecordOutcome, AppError> {
        let day = event.event_date();
        let key = (user_id.to_string(), day);

        if self.cache.get(&key).is_some() {
            return Ok(RecordOutcome::duplicate());
        }

        if let Some(existing) = self.db.get_daily_engagement(user_id, day).await? {
            self.cache.insert(key, existing, ENGAGEMENT_CACHE_TTL_SECS);
            return Ok(RecordOutcome::duplicate());
        }

        // Append the raw event first; it is an audit row, not gate state,
        // so an orphan here is harmless if the marker write below fails.
        self.db.insert_engagement_event(event).await?;

        let record = DailyEngagementRecord {
            user_id: user_id.to_string(),
            engagement_date: day,
            first_event_at: event.event_timestamp,
            momentum_eligible: true,
        };

        let created = self.db.insert_daily_engagement(&record).await?;
        self.cache.insert(key, record, ENGAGEMENT_CACHE_TTL_SECS);

        if created {
            tracing::info!(user_id, day = %day, "Daily engagement counted");
            Ok(RecordOutcome::counted())
        } else {
            // Lost the race to the unique constraint: duplicate, not error.
            Ok(RecordOutcome::duplicate())
        }
    }

    /// Seed today's cache entry (tests only).
    #[cfg(test)]
    fn seed_today(&self, record: DailyEngagementRecord) {
        let key = (record.user_id.clone(), record.engagement_date);
        self.cache.insert(key, record, ENGAGEMENT_CACHE_TTL_SECS);
    }
}

fn engaged_status(record: &DailyEngagementRecord) -> EngagementStatus {
    EngagementStatus {
        has_engaged_today: true,
        is_eligible: false,
        last_engagement_time: Some(record.first_event_at),
    }
}

// SPDX-License-Identifier: MIT

//! Streak calculation service and the engagement update pipeline.
//!
//! Handles the core workflow:
//! 1. Gate checks/records the day's qualification
//! 2. Recompute the streak (incremental over the stored summary)
//! 3. Diff before/after against the milestone table
//! 4. Dispatch celebration and bonus awards
//! 5. Commit the new summary and cache it; queue for sync if the backend
//!    is unreachable

use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;

use crate::config::{STREAK_CACHE_TTL_SECS, STREAK_LOOKBACK_DAYS};
use crate::db::SupabaseDb;
use crate::error::AppError;
use crate::models::streak::walk_days;
use crate::models::{
    detect_new_milestones, EngagementEvent, EngagementStreak, Milestone, StreakCelebration,
};
use crate::services::cache::TtlCache;
use crate::services::dispatcher::CelebrationDispatcher;
use crate::services::gate::EngagementGate;
use crate::services::sync::{PendingSyncOperation, SyncQueue};
use crate::time_utils::utc_today;

/// Neutral, non-alarming message for recoverable failures.
const RETRY_MESSAGE: &str = "Couldn't update your streak right now. It will retry automatically.";

/// Terminal result of an engagement update, consumed by the UI collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct StreakUpdateResult {
    pub success: bool,
    pub streak: EngagementStreak,
    pub new_milestones: Vec<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub celebration: Option<StreakCelebration>,
    pub message: String,
}

/// Streak bookkeeping service.
///
/// Collaborators are injected so tests can substitute the offline mock
/// store and a recording ledger.
pub struct StreakService {
    db: SupabaseDb,
    gate: Arc<EngagementGate>,
    dispatcher: CelebrationDispatcher,
    sync: Arc<SyncQueue>,
    cache: TtlCache<String, EngagementStreak>,
}

impl StreakService {
    pub fn new(
        db: SupabaseDb,
        gate: Arc<EngagementGate>,
        dispatcher: CelebrationDispatcher,
        sync: Arc<SyncQueue>,
    ) -> Self {
        Self {
            db,
            gate,
            dispatcher,
            sync,
            cache: TtlCache::new(),
        }
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Current streak for a user, from cache when fresh.
    ///
    /// Never fails: any computation error yields the empty streak so the
    /// UI always has something to render. The fallback is logged distinctly
    /// and never cached, so it cannot pin a wrong zero.
    pub async fn get_current_streak(&self, user_id: &str) -> EngagementStreak {
        if let Some(streak) = self.cache.get(&user_id.to_string()) {
            return streak;
        }

        match self.calculate_current_streak(user_id).await {
            Ok(streak) => {
                self.cache
                    .insert(user_id.to_string(), streak.clone(), STREAK_CACHE_TTL_SECS);
                streak
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "Streak computation failed; returning empty streak (not a real zero)"
                );
                EngagementStreak::empty(user_id)
            }
        }
    }

    /// Recompute the streak from the engaged-day set.
    ///
    /// The day set is the source of truth; the stored summary only floors
    /// the longest streak (runs older than the lookback window) and carries
    /// the pending celebration.
    pub async fn calculate_current_streak(
        &self,
        user_id: &str,
    ) -> Result<EngagementStreak, AppError> {
        let today = utc_today();
        let since = today - Duration::days(STREAK_LOOKBACK_DAYS);

        let days = self.db.list_engagement_days(user_id, since).await?;
        let stored = self.db.get_streak(user_id).await?;

        let walk = walk_days(&days, today);
        let longest_floor = stored.as_ref().map(|s| s.longest_streak).unwrap_or(0);
        let last_engaged = walk
            .last_engaged
            .or_else(|| stored.as_ref().and_then(|s| s.last_engaged_date));
        let pending = stored
            .and_then(|s| s.pending_celebration)
            .filter(|c| !c.shown);

        Ok(EngagementStreak {
            user_id: user_id.to_string(),
            current_streak: walk.current,
            longest_streak: walk.longest.max(longest_floor),
            last_engaged_date: last_engaged,
            active_today: days.contains(&today),
            pending_celebration: pending,
        })
    }

    /// Incremental update over a previous summary.
    ///
    /// `active_today` reflects the actual UTC day, not the engaged day: a
    /// replayed offline event counts for its own past day without claiming
    /// today has already engaged.
    pub fn calculate_updated_streak(
        &self,
        previous: &EngagementStreak,
        is_new_engagement: bool,
        is_break: bool,
        day: chrono::NaiveDate,
    ) -> EngagementStreak {
        if is_break {
            previous.apply_break()
        } else if is_new_engagement {
            let mut updated = previous.apply_engagement(day);
            updated.active_today = day == utc_today();
            updated
        } else {
            previous.clone()
        }
    }

    // ─── Update Pipeline ─────────────────────────────────────────

    /// Run the full engagement update pipeline.
    ///
    /// Always returns a terminal result: a recoverable backend failure
    /// queues the update for offline sync and reports a neutral retry
    /// message instead of an error.
    pub async fn update_streak_on_engagement(
        &self,
        user_id: &str,
        event: EngagementEvent,
    ) -> StreakUpdateResult {
        match self.process_engagement(user_id, &event).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Streak update failed; queueing for sync");
                self.sync
                    .enqueue(PendingSyncOperation::new(user_id, event))
                    .await;

                StreakUpdateResult {
                    success: false,
                    streak: self.get_current_streak(user_id).await,
                    new_milestones: Vec::new(),
                    celebration: None,
                    message: RETRY_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Replay a queued offline update.
    ///
    /// Errors propagate so the queue can manage the retry budget; this path
    /// must never enqueue (the queue lock is held during replay).
    pub async fn replay_pending(&self, op: &PendingSyncOperation) -> Result<(), AppError> {
        self.process_engagement(&op.user_id, &op.event).await?;
        Ok(())
    }

    async fn process_engagement(
        &self,
        user_id: &str,
        event: &EngagementEvent,
    ) -> Result<StreakUpdateResult, AppError> {
        // Capture "before" first so the milestone diff sees the streak
        // without the day this event is about to add.
        let previous = match self.cache.get(&user_id.to_string()) {
            Some(streak) => streak,
            None => self.calculate_current_streak(user_id).await?,
        };

        let outcome = self.gate.record_engagement(user_id, event).await?;
        if !outcome.eligible {
            return self.settle_counted_day(user_id, event, outcome.reason).await;
        }

        // Offline replays carry their original timestamps, so the event's
        // own day is the qualifying day, not the replay day.
        let day = event.event_date();
        let mut updated = self.calculate_updated_streak(&previous, true, false, day);

        let crossed = detect_new_milestones(previous.current_streak, updated.current_streak);
        let celebration = self
            .dispatcher
            .dispatch(user_id, &crossed, day, chrono::Utc::now())
            .await;
        if celebration.is_some() {
            // A new celebration replaces any unshown older one; at most one
            // pending celebration is tracked at a time.
            updated.pending_celebration = celebration.clone();
        }

        self.db.upsert_streak(&updated).await?;
        self.cache
            .insert(user_id.to_string(), updated.clone(), STREAK_CACHE_TTL_SECS);

        tracing::info!(
            user_id,
            current = updated.current_streak,
            longest = updated.longest_streak,
            milestones = crossed.len(),
            "Streak updated"
        );

        let message = match &celebration {
            Some(c) => format!("{}! {} day streak", c.milestone_name, updated.current_streak),
            None => format!("{} day streak", updated.current_streak),
        };

        Ok(StreakUpdateResult {
            success: true,
            streak: updated,
            new_milestones: crossed,
            celebration,
            message,
        })
    }

    /// Settle an update whose day the gate reports as already counted.
    ///
    /// Usually a plain duplicate, but the qualification marker may have
    /// been committed by an earlier attempt whose summary upsert failed
    /// and was queued for replay. The stored summary then lags the day
    /// set; finish that commit here, diffing milestones against the
    /// stored row so the crossing is not lost. The deterministic
    /// idempotency key makes a redispatched bonus safe ledger-side.
    async fn settle_counted_day(
        &self,
        user_id: &str,
        event: &EngagementEvent,
        reason: Option<String>,
    ) -> Result<StreakUpdateResult, AppError> {
        let stored_current = self
            .db
            .get_streak(user_id)
            .await?
            .map(|s| s.current_streak)
            .unwrap_or(0);
        let mut current = self.calculate_current_streak(user_id).await?;
        let message = reason.unwrap_or_else(|| "Already counted today".to_string());

        if current.current_streak == stored_current {
            self.cache
                .insert(user_id.to_string(), current.clone(), STREAK_CACHE_TTL_SECS);
            return Ok(StreakUpdateResult {
                success: true,
                streak: current,
                new_milestones: Vec::new(),
                celebration: None,
                message,
            });
        }

        let crossed = detect_new_milestones(stored_current, current.current_streak);
        let celebration = self
            .dispatcher
            .dispatch(user_id, &crossed, event.event_date(), chrono::Utc::now())
            .await;
        if celebration.is_some() {
            current.pending_celebration = celebration.clone();
        }

        self.db.upsert_streak(&current).await?;
        self.cache
            .insert(user_id.to_string(), current.clone(), STREAK_CACHE_TTL_SECS);

        tracing::info!(
            user_id,
            stored = stored_current,
            current = current.current_streak,
            milestones = crossed.len(),
            "Settled lagging summary for an already counted day"
        );

        Ok(StreakUpdateResult {
            success: true,
            streak: current,
            new_milestones: crossed,
            celebration,
            message,
        })
    }

    // ─── Celebration Lifecycle ───────────────────────────────────

    /// Mark the pending celebration as displayed and persist the change.
    pub async fn mark_celebration_as_shown(
        &self,
        user_id: &str,
        celebration_id: &str,
    ) -> Result<(), AppError> {
        let mut streak = match self.cache.get(&user_id.to_string()) {
            Some(streak) => streak,
            None => self.calculate_current_streak(user_id).await?,
        };

        match streak.pending_celebration.as_mut() {
            Some(c) if c.id == celebration_id => c.mark_shown(chrono::Utc::now()),
            _ => {
                return Err(AppError::NotFound(format!(
                    "Pending celebration {} for user {}",
                    celebration_id, user_id
                )))
            }
        }

        // Shown celebrations are consumed: drop from the pending slot.
        streak.pending_celebration = None;
        self.db.upsert_streak(&streak).await?;
        self.cache
            .insert(user_id.to_string(), streak, STREAK_CACHE_TTL_SECS);

        tracing::debug!(user_id, celebration_id, "Celebration marked shown");
        Ok(())
    }

    // ─── Break Detection ─────────────────────────────────────────

    /// Scheduled missed-day check.
    ///
    /// If the user engaged neither yesterday nor today, the current streak
    /// resets to 0 (longest preserved) and the reset is persisted.
    pub async fn check_streak_break(&self, user_id: &str) -> Result<EngagementStreak, AppError> {
        let today = utc_today();
        let yesterday = today - Duration::days(1);

        let (today_record, yesterday_record) = futures_util::future::try_join(
            self.db.get_daily_engagement(user_id, today),
            self.db.get_daily_engagement(user_id, yesterday),
        )
        .await?;
        if today_record.is_some() || yesterday_record.is_some() {
            return self.calculate_current_streak(user_id).await;
        }

        // The day-set recomputation already reports 0 here, but the stored
        // summary row still carries the broken run until it is rewritten.
        let stored_current = self
            .db
            .get_streak(user_id)
            .await?
            .map(|s| s.current_streak)
            .unwrap_or(0);
        let current = self.calculate_current_streak(user_id).await?;
        if stored_current == 0 && current.current_streak == 0 {
            return Ok(current);
        }

        let updated = self.calculate_updated_streak(&current, false, true, today);
        self.db.upsert_streak(&updated).await?;
        self.cache
            .insert(user_id.to_string(), updated.clone(), STREAK_CACHE_TTL_SECS);

        tracing::info!(
            user_id,
            stored = stored_current,
            longest = updated.longest_streak,
            "Streak break detected; current streak reset"
        );
        Ok(updated)
    }
}

// SPDX-License-Identifier: MIT

//! Celebration and bonus dispatch for newly-crossed milestones.
//!
//! Policy: every crossed milestone triggers its bonus award, but only the
//! highest one in a given update produces a visible celebration. Lower
//! milestones skipped in a multi-day jump are logged only.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Milestone, StreakCelebration};
use crate::services::ledger::{BonusAward, LedgerClient};

/// Dispatches milestone side effects.
#[derive(Clone)]
pub struct CelebrationDispatcher {
    ledger: LedgerClient,
}

impl CelebrationDispatcher {
    pub fn new(ledger: LedgerClient) -> Self {
        Self { ledger }
    }

    /// Award bonuses for every crossed milestone and build at most one
    /// celebration, for the highest threshold.
    ///
    /// Ledger failures are logged and swallowed; the award carries an
    /// idempotency key, so the ledger can recover the points later.
    pub async fn dispatch(
        &self,
        user_id: &str,
        crossed: &[Milestone],
        crossing_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<StreakCelebration> {
        // Detector reports ascending order; the last entry is the highest.
        let (highest, skipped) = crossed.split_last()?;

        for milestone in crossed {
            let award = BonusAward::for_milestone(user_id, milestone, crossing_date);
            if let Err(e) = self.ledger.award_points(&award).await {
                tracing::warn!(
                    user_id,
                    threshold = milestone.threshold,
                    key = %award.idempotency_key,
                    error = %e,
                    "Failed to forward milestone bonus to ledger"
                );
            }
        }

        for lower in skipped {
            tracing::info!(
                user_id,
                threshold = lower.threshold,
                "Milestone crossed in multi-day jump; bonus awarded, celebration not surfaced"
            );
        }

        tracing::info!(
            user_id,
            threshold = highest.threshold,
            name = highest.name,
            "Milestone celebration created"
        );

        Some(StreakCelebration::for_milestone(highest, now))
    }
}

// SPDX-License-Identifier: MIT

//! Momentum ledger client for bonus-point awards.
//!
//! The ledger is an external point-accounting system; the contract is
//! "award N points to user U for reason R". Every award carries a
//! deterministic idempotency key so the ledger can deduplicate
//! at-least-once delivery (a failed streak write after dispatch may cause
//! a redispatch of the same crossing).

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::AppError;
use crate::models::Milestone;

/// A single bonus-point award request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BonusAward {
    pub user_id: String,
    pub points: u32,
    pub reason: String,
    /// Deterministic key: `user:threshold:crossing_date`
    pub idempotency_key: String,
}

impl BonusAward {
    /// Build the award for a milestone crossing on a given day.
    pub fn for_milestone(user_id: &str, milestone: &Milestone, crossing_date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            points: milestone.bonus_points,
            reason: format!("streak_milestone:{}", milestone.threshold),
            idempotency_key: format!("{}:{}:{}", user_id, milestone.threshold, crossing_date),
        }
    }
}

#[derive(Clone)]
enum Mode {
    Http {
        http: reqwest::Client,
        base_url: String,
    },
    /// Records awards instead of sending them (tests, offline).
    Mock(Arc<Mutex<Vec<BonusAward>>>),
}

/// Momentum ledger client.
#[derive(Clone)]
pub struct LedgerClient {
    mode: Mode,
}

impl LedgerClient {
    /// Create a ledger client with a bounded request timeout.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Ledger(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            mode: Mode::Http {
                http,
                base_url: base_url.to_string(),
            },
        })
    }

    /// Create a recording mock client for tests.
    pub fn new_mock() -> Self {
        Self {
            mode: Mode::Mock(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Awards recorded by a mock client (empty for HTTP clients).
    pub fn recorded_awards(&self) -> Vec<BonusAward> {
        match &self.mode {
            Mode::Mock(recorded) => recorded.lock().unwrap().clone(),
            Mode::Http { .. } => Vec::new(),
        }
    }

    /// Forward a bonus award to the ledger.
    pub async fn award_points(&self, award: &BonusAward) -> Result<(), AppError> {
        match &self.mode {
            Mode::Mock(recorded) => {
                recorded.lock().unwrap().push(award.clone());
                Ok(())
            }
            Mode::Http { http, base_url } => {
                let response = http
                    .post(base_url)
                    .json(award)
                    .send()
                    .await
                    .map_err(|e| AppError::Ledger(e.to_string()))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::Ledger(format!("HTTP {}: {}", status, body)));
                }

                tracing::debug!(
                    user_id = %award.user_id,
                    points = award.points,
                    key = %award.idempotency_key,
                    "Bonus award forwarded to ledger"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MILESTONES;

    #[test]
    fn test_idempotency_key_is_deterministic() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let award = BonusAward::for_milestone("user-1", &MILESTONES[1], day);

        assert_eq!(award.idempotency_key, "user-1:7:2024-06-15");
        assert_eq!(award.points, 50);
        assert_eq!(award.reason, "streak_milestone:7");

        let again = BonusAward::for_milestone("user-1", &MILESTONES[1], day);
        assert_eq!(award, again);
    }

    #[tokio::test]
    async fn test_mock_records_awards() {
        let ledger = LedgerClient::new_mock();
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let award = BonusAward::for_milestone("user-1", &MILESTONES[0], day);
        ledger.award_points(&award).await.unwrap();

        assert_eq!(ledger.recorded_awards(), vec![award]);
    }
}

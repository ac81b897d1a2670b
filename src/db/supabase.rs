// SPDX-License-Identifier: MIT

//! Supabase (PostgREST) client wrapper with typed operations.
//!
//! Provides high-level row operations for:
//! - Engagement events (append-only)
//! - Daily engagement qualification markers (unique per user+day)
//! - Streak summaries (one row per user, upserted)
//!
//! The core only needs filtered selects, inserts, and an upsert; all of
//! them go through PostgREST's standard row API.

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{Config, HTTP_TIMEOUT_SECS};
use crate::db::tables;
use crate::error::AppError;
use crate::models::{DailyEngagementRecord, EngagementEvent, EngagementStreak};

/// Supabase database client.
#[derive(Clone)]
pub struct SupabaseDb {
    client: Option<RestClient>,
}

/// Low-level PostgREST HTTP client.
#[derive(Clone)]
struct RestClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseDb {
    /// Create a new Supabase client with a bounded request timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(url = %config.supabase_url, "Supabase client initialized");

        Ok(Self {
            client: Some(RestClient {
                http,
                base_url: format!("{}/rest/v1", config.supabase_url),
                service_key: config.supabase_service_key.clone(),
            }),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&RestClient, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Engagement Events ───────────────────────────────────────

    /// Append a qualifying engagement event.
    pub async fn insert_engagement_event(&self, event: &EngagementEvent) -> Result<(), AppError> {
        self.get_client()?
            .insert(tables::ENGAGEMENT_EVENTS, event)
            .await?;
        Ok(())
    }

    // ─── Daily Engagement Qualification ──────────────────────────

    /// Get the qualification marker for a given user and UTC day.
    pub async fn get_daily_engagement(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyEngagementRecord>, AppError> {
        let rows: Vec<DailyEngagementRecord> = self
            .get_client()?
            .select(
                tables::DAILY_ENGAGEMENTS,
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("engagement_date", format!("eq.{}", day)),
                    ("momentum_eligible", "eq.true".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a qualification marker for its day.
    ///
    /// Returns `true` if the row was created, `false` if the unique
    /// (user, day) constraint rejected it. The duplicate case is not an
    /// error.
    pub async fn insert_daily_engagement(
        &self,
        record: &DailyEngagementRecord,
    ) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let response = client
            .post(tables::DAILY_ENGAGEMENTS, &[])
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(
                user_id = %record.user_id,
                day = %record.engagement_date,
                "Daily engagement already recorded (constraint duplicate)"
            );
            return Ok(false);
        }

        RestClient::check_response(response).await?;
        Ok(true)
    }

    /// Distinct engaged days for a user since `since` (inclusive),
    /// most recent first.
    pub async fn list_engagement_days(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AppError> {
        #[derive(Deserialize)]
        struct DayRow {
            engagement_date: NaiveDate,
        }

        let rows: Vec<DayRow> = self
            .get_client()?
            .select(
                tables::DAILY_ENGAGEMENTS,
                &[
                    ("select", "engagement_date".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("momentum_eligible", "eq.true".to_string()),
                    ("engagement_date", format!("gte.{}", since)),
                    ("order", "engagement_date.desc".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.engagement_date).collect())
    }

    // ─── Streak Summaries ────────────────────────────────────────

    /// Get the stored streak summary for a user.
    pub async fn get_streak(&self, user_id: &str) -> Result<Option<EngagementStreak>, AppError> {
        let rows: Vec<EngagementStreak> = self
            .get_client()?
            .select(
                tables::ENGAGEMENT_STREAKS,
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Upsert the streak summary row for a user (last-write-wins).
    pub async fn upsert_streak(&self, streak: &EngagementStreak) -> Result<(), AppError> {
        let client = self.get_client()?;
        let response = client
            .post(tables::ENGAGEMENT_STREAKS, &[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(streak)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RestClient::check_response(response).await?;
        Ok(())
    }
}

impl RestClient {
    /// Filtered select returning deserialized rows.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let url = format!("{}/{}", self.base_url, table);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))
    }

    /// Plain insert with no conflict handling.
    async fn insert<T: Serialize>(&self, table: &str, row: &T) -> Result<(), AppError> {
        let response = self
            .post(table, &[])
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Build an authenticated POST request for a table.
    fn post(&self, table: &str, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        self.http
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(query)
    }

    /// Check response status and return error if not successful.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Database(format!("HTTP {}: {}", status, body)))
    }
}

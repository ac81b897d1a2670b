// SPDX-License-Identifier: MIT

//! API routes consumed by the mobile UI collaborator.

use crate::error::{AppError, Result};
use crate::models::{EngagementEvent, EngagementStatus, EngagementStreak};
use crate::services::StreakUpdateResult;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/engagement/status", get(get_engagement_status))
        .route("/api/engagement", post(record_engagement))
        .route("/api/streak", get(get_streak))
        .route(
            "/api/celebrations/{celebration_id}/shown",
            post(mark_celebration_shown),
        )
}

// ─── Engagement Gate ─────────────────────────────────────────

#[derive(Deserialize)]
struct UserQuery {
    user_id: String,
}

/// Check whether the user has already engaged today.
async fn get_engagement_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<EngagementStatus>> {
    require_user_id(&params.user_id)?;
    let status = state.gate.check_status(&params.user_id).await;
    Ok(Json(status))
}

/// Body for recording a qualifying engagement.
#[derive(Deserialize, Validate)]
pub struct RecordEngagementRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(min = 1, max = 256))]
    pub content_id: String,
    /// Session duration in seconds
    #[validate(range(max = 86_400))]
    pub session_duration_secs: Option<u32>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Record an engagement and run the full streak update pipeline.
///
/// Always returns a terminal `StreakUpdateResult`; recoverable backend
/// failures come back as `success = false` with a retry message, never as
/// an error status.
async fn record_engagement(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordEngagementRequest>,
) -> Result<Json<StreakUpdateResult>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let event = EngagementEvent {
        user_id: payload.user_id.clone(),
        content_id: payload.content_id,
        event_timestamp: chrono::Utc::now(),
        session_duration_secs: payload.session_duration_secs,
        metadata: payload.metadata,
    };

    let result = state
        .streak_service
        .update_streak_on_engagement(&payload.user_id, event)
        .await;

    Ok(Json(result))
}

// ─── Streak ──────────────────────────────────────────────────

/// Get the user's current streak summary.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserQuery>,
) -> Result<Json<EngagementStreak>> {
    require_user_id(&params.user_id)?;
    let streak = state.streak_service.get_current_streak(&params.user_id).await;
    Ok(Json(streak))
}

// ─── Celebrations ────────────────────────────────────────────

#[derive(Deserialize)]
struct MarkShownRequest {
    user_id: String,
}

#[derive(Serialize)]
pub struct MarkShownResponse {
    pub success: bool,
}

/// Confirm that a pending celebration has been displayed.
async fn mark_celebration_shown(
    State(state): State<Arc<AppState>>,
    Path(celebration_id): Path<String>,
    Json(payload): Json<MarkShownRequest>,
) -> Result<Json<MarkShownResponse>> {
    require_user_id(&payload.user_id)?;
    state
        .streak_service
        .mark_celebration_as_shown(&payload.user_id, &celebration_id)
        .await?;
    Ok(Json(MarkShownResponse { success: true }))
}

fn require_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id must not be empty".to_string()));
    }
    Ok(())
}

// SPDX-License-Identifier: MIT

//! Internal task triggers.
//!
//! These endpoints are called by the scheduler and the connectivity
//! collaborator, not by end users:
//! - Missed-day streak-break checks (scheduled daily)
//! - Connectivity signal changes (drive the offline sync queue)
//! - Manual sync drain (operational escape hatch)

use crate::error::Result;
use crate::models::EngagementStreak;
use crate::services::{ConnectivityState, SyncReport};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/check-streak-break", post(check_streak_break))
        .route("/tasks/connectivity", post(set_connectivity))
        .route("/tasks/sync-pending", post(sync_pending))
}

// ─── Streak Break Check ──────────────────────────────────────

#[derive(Deserialize)]
struct CheckBreakPayload {
    user_id: String,
}

/// Run the missed-day check for one user.
async fn check_streak_break(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckBreakPayload>,
) -> Result<Json<EngagementStreak>> {
    tracing::debug!(user_id = %payload.user_id, "Scheduled streak-break check");
    let streak = state
        .streak_service
        .check_streak_break(&payload.user_id)
        .await?;
    Ok(Json(streak))
}

// ─── Connectivity Signal ─────────────────────────────────────

#[derive(Deserialize)]
struct ConnectivityPayload {
    online: bool,
}

#[derive(Serialize)]
pub struct ConnectivityResponse {
    pub success: bool,
    pub pending: usize,
}

/// Feed the online/offline signal.
///
/// Transitions to online wake the sync worker, which replays the pending
/// queue in enqueue order.
async fn set_connectivity(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConnectivityPayload>,
) -> Result<Json<ConnectivityResponse>> {
    let next = if payload.online {
        ConnectivityState::Online
    } else {
        ConnectivityState::Offline
    };
    tracing::info!(online = payload.online, "Connectivity state changed");

    // Send only fails if the worker is gone; pending items then wait for
    // the manual drain endpoint.
    if state.connectivity.send(next).is_err() {
        tracing::warn!("Sync worker not running; connectivity signal dropped");
    }

    Ok(Json(ConnectivityResponse {
        success: true,
        pending: state.sync_queue.len().await,
    }))
}

// ─── Manual Sync Drain ───────────────────────────────────────

/// Replay the pending queue immediately.
async fn sync_pending(State(state): State<Arc<AppState>>) -> Result<Json<SyncReport>> {
    let streak_service = state.streak_service.clone();
    let report = state
        .sync_queue
        .sync_pending_updates(|op| {
            let streak_service = streak_service.clone();
            async move { streak_service.replay_pending(&op).await }
        })
        .await;
    Ok(Json(report))
}

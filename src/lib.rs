// SPDX-License-Identifier: MIT

//! Momentum-Tracker: engagement streak and momentum bookkeeping.
//!
//! This crate implements the daily engagement gate, consecutive-day streak
//! calculation, milestone detection, celebration/bonus dispatch, and the
//! offline sync queue behind a small HTTP API consumed by the mobile app.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;
use tokio::sync::watch;

use config::Config;
use services::{ConnectivityState, EngagementGate, StreakService, SyncQueue};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gate: Arc<EngagementGate>,
    pub streak_service: Arc<StreakService>,
    pub sync_queue: Arc<SyncQueue>,
    /// Connectivity signal feeding the sync worker.
    pub connectivity: watch::Sender<ConnectivityState>,
}

// SPDX-License-Identifier: MIT

use momentum_tracker::config::Config;
use momentum_tracker::db::SupabaseDb;
use momentum_tracker::models::EngagementEvent;
use momentum_tracker::routes::create_router;
use momentum_tracker::services::{
    CelebrationDispatcher, ConnectivityState, EngagementGate, LedgerClient, StreakService,
    SyncQueue,
};
use momentum_tracker::AppState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Check if a Supabase test instance is available via environment variable.
#[allow(dead_code)]
pub fn supabase_available() -> bool {
    std::env::var("SUPABASE_URL").is_ok()
}

/// Skip test with message if no Supabase test instance is configured.
#[macro_export]
macro_rules! require_supabase {
    () => {
        if !crate::common::supabase_available() {
            eprintln!("⚠️  Skipping: SUPABASE_URL not set");
            return;
        }
    };
}

/// Create a test database connection from the environment.
#[allow(dead_code)]
pub fn test_db() -> SupabaseDb {
    let config = Config::from_env().expect("SUPABASE_URL / SUPABASE_SERVICE_KEY must be set");
    SupabaseDb::new(&config).expect("Failed to initialize Supabase client")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> SupabaseDb {
    SupabaseDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db_offline();

    let gate = Arc::new(EngagementGate::new(db.clone()));
    let sync_queue = Arc::new(SyncQueue::new());
    let streak_service = Arc::new(StreakService::new(
        db,
        gate.clone(),
        CelebrationDispatcher::new(LedgerClient::new_mock()),
        sync_queue.clone(),
    ));

    let (connectivity, _rx) = tokio::sync::watch::channel(ConnectivityState::Online);

    let state = Arc::new(AppState {
        config,
        gate,
        streak_service,
        sync_queue,
        connectivity,
    });

    (create_router(state.clone()), state)
}

/// Build a qualifying engagement event at a given instant.
#[allow(dead_code)]
pub fn test_event(user_id: &str, content_id: &str, at: DateTime<Utc>) -> EngagementEvent {
    EngagementEvent {
        user_id: user_id.to_string(),
        content_id: content_id.to_string(),
        event_timestamp: at,
        session_duration_secs: Some(120),
        metadata: HashMap::new(),
    }
}

// SPDX-License-Identifier: MIT

//! Momentum-Tracker API Server
//!
//! Tracks daily engagement streaks and momentum milestones for the mobile
//! app, backed by Supabase and the external momentum ledger.

use momentum_tracker::{
    config::Config,
    db::SupabaseDb,
    services::{
        sync::run_sync_worker, CelebrationDispatcher, ConnectivityState, EngagementGate,
        LedgerClient, StreakService, SyncQueue,
    },
    AppState,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Momentum-Tracker API");

    // Initialize the Supabase row-store client
    let db = SupabaseDb::new(&config).expect("Failed to initialize Supabase client");

    // Initialize the momentum ledger client
    let ledger = LedgerClient::new(&config.ledger_url).expect("Failed to initialize ledger client");
    tracing::info!(url = %config.ledger_url, "Momentum ledger client initialized");

    // Wire the services
    let gate = Arc::new(EngagementGate::new(db.clone()));
    let sync_queue = Arc::new(SyncQueue::new());
    let streak_service = Arc::new(StreakService::new(
        db,
        gate.clone(),
        CelebrationDispatcher::new(ledger),
        sync_queue.clone(),
    ));

    // Connectivity signal and offline sync worker.
    // init() is idempotent; only the first caller spawns the worker.
    let (connectivity_tx, connectivity_rx) = watch::channel(ConnectivityState::Online);
    if sync_queue.init() {
        let worker_queue = sync_queue.clone();
        let worker_streaks = streak_service.clone();
        tokio::spawn(async move {
            run_sync_worker(worker_queue, connectivity_rx, move |op| {
                let streaks = worker_streaks.clone();
                async move { streaks.replay_pending(&op).await }
            })
            .await;
        });
        tracing::info!("Offline sync worker started");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        gate,
        streak_service,
        sync_queue,
        connectivity: connectivity_tx,
    });

    // Build router
    let app = momentum_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("momentum_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

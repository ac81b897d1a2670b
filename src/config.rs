//! Application configuration loaded from environment variables.
//!
//! Tuning values that govern streak bookkeeping (cache lifetimes, lookback
//! window, sync retry budget) are named constants here rather than scattered
//! through the services.

use std::env;

/// TTL for cached daily-engagement gate results (2 hours).
pub const ENGAGEMENT_CACHE_TTL_SECS: i64 = 2 * 60 * 60;

/// TTL for cached streak summaries (30 minutes).
pub const STREAK_CACHE_TTL_SECS: i64 = 30 * 60;

/// How far back the streak calculator fetches engaged days.
/// Long enough to cover any realistic streak-break detection.
pub const STREAK_LOOKBACK_DAYS: i64 = 60;

/// How many times a queued offline update is replayed before being dropped.
pub const MAX_SYNC_RETRIES: u32 = 3;

/// Timeout for backend and ledger HTTP calls.
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL (PostgREST lives under `/rest/v1`)
    pub supabase_url: String,
    /// Supabase service-role key
    pub supabase_service_key: String,
    /// Momentum ledger endpoint (bonus-point awards)
    pub ledger_url: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test_service_key".to_string(),
            ledger_url: "http://localhost:54321/functions/v1/momentum-ledger".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            ledger_url: env::var("LEDGER_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("LEDGER_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

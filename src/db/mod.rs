//! Database layer (Supabase/PostgREST).

pub mod supabase;

pub use supabase::SupabaseDb;

/// Table names as constants.
pub mod tables {
    /// Append-only qualifying interactions
    pub const ENGAGEMENT_EVENTS: &str = "engagement_events";
    /// One qualification marker per user per day (unique constraint)
    pub const DAILY_ENGAGEMENTS: &str = "daily_engagements";
    /// Derived streak summaries (one row per user, upserted)
    pub const ENGAGEMENT_STREAKS: &str = "engagement_streaks";
}

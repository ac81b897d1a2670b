// SPDX-License-Identifier: MIT

//! Integration tests against a real Supabase instance.
//!
//! These run only when `SUPABASE_URL` (and `SUPABASE_SERVICE_KEY`) point at
//! a test project; otherwise they skip.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use momentum_tracker::db::SupabaseDb;
use momentum_tracker::models::{
    DailyEngagementRecord, EngagementStreak, StreakCelebration, MILESTONES,
};
use momentum_tracker::services::{
    CelebrationDispatcher, EngagementGate, LedgerClient, StreakService, SyncQueue,
};
use momentum_tracker::time_utils::utc_today;
use uuid::Uuid;

mod common;
use common::test_db;

fn test_user_id() -> String {
    format!("it-{}", Uuid::new_v4())
}

fn live_service(db: SupabaseDb) -> StreakService {
    let gate = Arc::new(EngagementGate::new(db.clone()));
    StreakService::new(
        db,
        gate,
        CelebrationDispatcher::new(LedgerClient::new_mock()),
        Arc::new(SyncQueue::new()),
    )
}

async fn mark_engaged(db: &SupabaseDb, user_id: &str, day: NaiveDate) {
    let record = DailyEngagementRecord {
        user_id: user_id.to_string(),
        engagement_date: day,
        first_event_at: Utc::now(),
        momentum_eligible: true,
    };
    db.insert_daily_engagement(&record)
        .await
        .expect("marker insert failed");
}

#[tokio::test]
async fn test_daily_engagement_insert_is_idempotent() {
    require_supabase!();

    let db = test_db();
    let user_id = test_user_id();
    let record = DailyEngagementRecord {
        user_id: user_id.clone(),
        engagement_date: utc_today(),
        first_event_at: Utc::now(),
        momentum_eligible: true,
    };

    let first = db
        .insert_daily_engagement(&record)
        .await
        .expect("first insert failed");
    assert!(first, "first insert for the day should count");

    let second = db
        .insert_daily_engagement(&record)
        .await
        .expect("second insert errored instead of reporting a duplicate");
    assert!(!second, "second insert for the same day must be a duplicate");

    let stored = db
        .get_daily_engagement(&user_id, utc_today())
        .await
        .expect("read back failed")
        .expect("record not found after insert");
    assert_eq!(stored.user_id, user_id);
    assert!(stored.momentum_eligible);
}

#[tokio::test]
async fn test_engagement_days_are_listed_within_lookback() {
    require_supabase!();

    let db = test_db();
    let user_id = test_user_id();
    let today = utc_today();

    for days_ago in [0i64, 1, 2, 70] {
        mark_engaged(&db, &user_id, today - Duration::days(days_ago)).await;
    }

    let since = today - Duration::days(60);
    let days = db
        .list_engagement_days(&user_id, since)
        .await
        .expect("list failed");

    // The 70-day-old row falls outside the window.
    assert_eq!(days.len(), 3);
    assert!(days.contains(&today));
    assert!(!days.contains(&(today - Duration::days(70))));
}

#[tokio::test]
async fn test_streak_upsert_round_trip() {
    require_supabase!();

    let db = test_db();
    let user_id = test_user_id();

    assert!(db
        .get_streak(&user_id)
        .await
        .expect("get failed")
        .is_none());

    let mut streak = EngagementStreak::empty(&user_id);
    streak = streak.apply_engagement(utc_today());
    db.upsert_streak(&streak).await.expect("upsert failed");

    let stored = db
        .get_streak(&user_id)
        .await
        .expect("get failed")
        .expect("streak missing after upsert");
    assert_eq!(stored.current_streak, 1);

    // Second upsert for the same user updates in place.
    let streak = stored.apply_engagement(utc_today() + Duration::days(1));
    db.upsert_streak(&streak).await.expect("second upsert failed");

    let stored = db
        .get_streak(&user_id)
        .await
        .expect("get failed")
        .expect("streak missing");
    assert_eq!(stored.current_streak, 2);
    assert_eq!(stored.longest_streak, 2);
}

#[tokio::test]
async fn test_counted_day_with_lagging_summary_is_settled() {
    require_supabase!();

    let db = test_db();
    let user_id = test_user_id();
    let today = utc_today();

    // Three consecutive engaged days, but the stored summary only reflects
    // two of them, as if the summary write for today failed mid-update and
    // the operation was queued for replay.
    for days_ago in 0..3 {
        mark_engaged(&db, &user_id, today - Duration::days(days_ago)).await;
    }
    let mut stale = EngagementStreak::empty(&user_id);
    stale = stale.apply_engagement(today - Duration::days(2));
    stale = stale.apply_engagement(today - Duration::days(1));
    db.upsert_streak(&stale).await.expect("seed upsert failed");

    let service = live_service(db.clone());
    let result = service
        .update_streak_on_engagement(&user_id, common::test_event(&user_id, "article-1", Utc::now()))
        .await;

    // The gate reports the day as already counted, but the lagging summary
    // is finished: row brought to 3 and the 3-day crossing is celebrated.
    assert!(result.success);
    assert_eq!(result.streak.current_streak, 3);
    assert_eq!(result.new_milestones.len(), 1);
    assert_eq!(result.new_milestones[0].threshold, 3);
    let celebration = result.celebration.expect("crossing must be celebrated");
    assert_eq!(celebration.milestone_threshold, 3);

    let stored = db
        .get_streak(&user_id)
        .await
        .expect("get failed")
        .expect("streak missing");
    assert_eq!(stored.current_streak, 3);
    assert!(stored.pending_celebration.is_some());
}

#[tokio::test]
async fn test_shown_celebration_does_not_resurface() {
    require_supabase!();

    let db = test_db();
    let user_id = test_user_id();
    let today = utc_today();

    mark_engaged(&db, &user_id, today).await;
    let mut streak = EngagementStreak::empty(&user_id).apply_engagement(today);
    let celebration = StreakCelebration::for_milestone(&MILESTONES[0], Utc::now());
    let celebration_id = celebration.id.clone();
    streak.pending_celebration = Some(celebration);
    db.upsert_streak(&streak).await.expect("seed upsert failed");

    let service = live_service(db.clone());
    service
        .mark_celebration_as_shown(&user_id, &celebration_id)
        .await
        .expect("mark shown failed");

    // A fresh recomputation from the store must not re-attach it.
    let recomputed = service
        .calculate_current_streak(&user_id)
        .await
        .expect("recompute failed");
    assert!(recomputed.pending_celebration.is_none());

    let stored = db
        .get_streak(&user_id)
        .await
        .expect("get failed")
        .expect("streak missing");
    assert!(stored.pending_celebration.is_none());
}

#[tokio::test]
async fn test_streak_break_resets_stale_stored_summary() {
    require_supabase!();

    let db = test_db();
    let user_id = test_user_id();
    let today = utc_today();

    // Last engagement three days ago; the stored summary still carries the
    // old two-day run.
    mark_engaged(&db, &user_id, today - Duration::days(4)).await;
    mark_engaged(&db, &user_id, today - Duration::days(3)).await;
    let mut stale = EngagementStreak::empty(&user_id);
    stale = stale.apply_engagement(today - Duration::days(4));
    stale = stale.apply_engagement(today - Duration::days(3));
    db.upsert_streak(&stale).await.expect("seed upsert failed");

    let service = live_service(db.clone());
    let updated = service
        .check_streak_break(&user_id)
        .await
        .expect("break check failed");
    assert_eq!(updated.current_streak, 0);
    assert_eq!(updated.longest_streak, 2);

    let stored = db
        .get_streak(&user_id)
        .await
        .expect("get failed")
        .expect("streak missing");
    assert_eq!(stored.current_streak, 0);
    assert_eq!(stored.longest_streak, 2);
}

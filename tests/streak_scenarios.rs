// SPDX-License-Identifier: MIT

//! End-to-end scenarios over the streak core.
//!
//! These drive the pure computation path (day walk, incremental update,
//! milestone diff, celebration dispatch) through the same sequences a real
//! user would produce, without a backend.

use chrono::{Duration, NaiveDate, Utc};
use momentum_tracker::models::streak::walk_days;
use momentum_tracker::models::{detect_new_milestones, EngagementStreak};
use momentum_tracker::services::{CelebrationDispatcher, LedgerClient};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn first_ever_engagement_starts_streak_without_milestone() {
    let streak = EngagementStreak::empty("user-1");
    let updated = streak.apply_engagement(d("2024-06-15"));

    assert_eq!(updated.current_streak, 1);
    assert_eq!(updated.longest_streak, 1);
    assert!(updated.active_today);

    // First threshold is 3; nothing crossed yet.
    let crossed = detect_new_milestones(streak.current_streak, updated.current_streak);
    assert!(crossed.is_empty());
}

#[tokio::test]
async fn third_consecutive_day_crosses_first_milestone() {
    let mut streak = EngagementStreak::empty("user-1");
    streak = streak.apply_engagement(d("2024-06-13"));
    streak = streak.apply_engagement(d("2024-06-14"));

    let before = streak.current_streak;
    let updated = streak.apply_engagement(d("2024-06-15"));
    assert_eq!(updated.current_streak, 3);

    let crossed = detect_new_milestones(before, updated.current_streak);
    assert_eq!(crossed.len(), 1);
    assert_eq!(crossed[0].threshold, 3);

    let dispatcher = CelebrationDispatcher::new(LedgerClient::new_mock());
    let celebration = dispatcher
        .dispatch("user-1", &crossed, d("2024-06-15"), Utc::now())
        .await
        .expect("3-day celebration");
    assert_eq!(celebration.milestone_threshold, 3);
    assert_eq!(celebration.bonus_points, 25);
}

#[test]
fn missed_day_resets_current_but_not_longest() {
    // Engaged on day D, nothing on D+1, status checked on D+2.
    let engaged = [d("2024-06-10")];
    let walk = walk_days(&engaged, d("2024-06-12"));

    assert_eq!(walk.current, 0);
    assert_eq!(walk.longest, 1);
    assert_eq!(walk.last_engaged, Some(d("2024-06-10")));
}

#[test]
fn same_day_duplicate_leaves_streak_unchanged() {
    let mut streak = EngagementStreak::empty("user-1");
    streak = streak.apply_engagement(d("2024-06-14"));
    streak = streak.apply_engagement(d("2024-06-15"));

    let duplicate = streak.apply_engagement(d("2024-06-15"));
    assert_eq!(duplicate.current_streak, streak.current_streak);
    assert_eq!(duplicate.longest_streak, streak.longest_streak);
    assert!(detect_new_milestones(streak.current_streak, duplicate.current_streak).is_empty());
}

#[test]
fn milestone_diff_matches_threshold_table() {
    // 6 → 8 crosses exactly the 7-day milestone.
    let crossed = detect_new_milestones(6, 8);
    assert_eq!(
        crossed.iter().map(|m| m.threshold).collect::<Vec<_>>(),
        vec![7]
    );

    // 2 → 9 crosses 3 and 7 in ascending order.
    let crossed = detect_new_milestones(2, 9);
    assert_eq!(
        crossed.iter().map(|m| m.threshold).collect::<Vec<_>>(),
        vec![3, 7]
    );
}

#[tokio::test]
async fn multi_jump_awards_every_bonus_but_surfaces_one_celebration() {
    let dispatcher = CelebrationDispatcher::new(LedgerClient::new_mock());
    let crossed = detect_new_milestones(2, 9);

    let celebration = dispatcher
        .dispatch("user-1", &crossed, d("2024-06-15"), Utc::now())
        .await
        .expect("one celebration for the jump");

    assert_eq!(celebration.milestone_threshold, 7);
}

#[test]
fn break_then_rebuild_recrosses_milestone() {
    let mut streak = EngagementStreak::empty("user-1");
    for offset in 0..4 {
        streak = streak.apply_engagement(d("2024-06-01") + Duration::days(offset));
    }
    assert_eq!(streak.current_streak, 4);

    streak = streak.apply_break();
    assert_eq!(streak.current_streak, 0);
    assert_eq!(streak.longest_streak, 4);

    // Rebuilding to 3 crosses the 3-day milestone again.
    let mut before;
    let mut crossed_again = Vec::new();
    for offset in 0..3 {
        before = streak.current_streak;
        streak = streak.apply_engagement(d("2024-06-10") + Duration::days(offset));
        crossed_again.extend(detect_new_milestones(before, streak.current_streak));
    }

    assert_eq!(crossed_again.len(), 1);
    assert_eq!(crossed_again[0].threshold, 3);
    assert_eq!(streak.longest_streak, 4); // still monotone
}

#[test]
fn lookback_walk_agrees_with_incremental_updates() {
    // The derived summary and the day-set recomputation must agree.
    let days = [
        d("2024-06-10"),
        d("2024-06-11"),
        d("2024-06-12"),
        d("2024-06-14"),
        d("2024-06-15"),
    ];

    let mut incremental = EngagementStreak::empty("user-1");
    for &day in &days {
        incremental = incremental.apply_engagement(day);
    }

    let walk = walk_days(&days, d("2024-06-15"));
    assert_eq!(walk.current, incremental.current_streak);
    assert_eq!(walk.longest, incremental.longest_streak);
    assert_eq!(walk.last_engaged, incremental.last_engaged_date);
}

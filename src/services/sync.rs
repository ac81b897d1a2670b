// SPDX-License-Identifier: MIT

//! Offline queue for streak updates that could not reach the backend.
//!
//! Streak correctness depends on processing days in chronological order, so
//! the queue is strict FIFO: replay walks from the oldest operation and a
//! failure halts the drain at that item rather than skipping ahead. Each
//! item has a bounded retry budget; once exhausted it is dropped and logged
//! as a permanent failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::config::MAX_SYNC_RETRIES;
use crate::error::AppError;
use crate::models::EngagementEvent;

/// Online/offline status from the connectivity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

/// A queued streak-affecting update made while offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSyncOperation {
    pub user_id: String,
    pub event: EngagementEvent,
    pub queued_at: DateTime<Utc>,
    pub retry_count: u32,
}

impl PendingSyncOperation {
    pub fn new(user_id: &str, event: EngagementEvent) -> Self {
        Self {
            user_id: user_id.to_string(),
            event,
            queued_at: Utc::now(),
            retry_count: 0,
        }
    }
}

/// Result of one replay pass over the queue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Operations successfully replayed.
    pub replayed: u32,
    /// Operations discarded after exhausting their retry budget.
    pub dropped: u32,
    /// Operations still queued when the pass ended.
    pub remaining: u32,
}

impl SyncReport {
    /// True if the pass left the queue empty.
    pub fn is_drained(&self) -> bool {
        self.remaining == 0
    }
}

/// Process-wide FIFO of pending offline updates.
///
/// Scoped to the app's lifetime; `init` is idempotent because multiple
/// collaborators may request initialization independently.
pub struct SyncQueue {
    queue: Mutex<VecDeque<PendingSyncOperation>>,
    initialized: AtomicBool,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Idempotent initialization; returns `true` only for the first call.
    pub fn init(&self) -> bool {
        let first = self
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            tracing::info!("Sync queue initialized");
        }
        first
    }

    /// Append an operation to the back of the queue.
    pub async fn enqueue(&self, op: PendingSyncOperation) {
        let mut queue = self.queue.lock().await;
        tracing::info!(
            user_id = %op.user_id,
            queued = queue.len() + 1,
            "Streak update queued for later sync"
        );
        queue.push_back(op);
    }

    /// Number of operations currently queued.
    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Replay queued operations strictly in enqueue order.
    ///
    /// A failed replay puts the operation back at the front with an
    /// incremented retry count and halts the pass; the next connectivity
    /// event retries from there. An operation whose budget is exhausted is
    /// dropped and logged as a permanent failure, and the pass also halts
    /// (the failure usually means the backend is still unreachable).
    pub async fn sync_pending_updates<F, Fut>(&self, mut replay: F) -> SyncReport
    where
        F: FnMut(PendingSyncOperation) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let mut report = SyncReport::default();
        let mut queue = self.queue.lock().await;

        while let Some(op) = queue.pop_front() {
            let attempt = op.clone();
            match replay(attempt).await {
                Ok(()) => {
                    report.replayed += 1;
                }
                Err(e) => {
                    let mut op = op;
                    op.retry_count += 1;
                    if op.retry_count >= MAX_SYNC_RETRIES {
                        tracing::error!(
                            user_id = %op.user_id,
                            queued_at = %op.queued_at,
                            retries = op.retry_count,
                            error = %e,
                            "Dropping queued streak update after exhausting retries"
                        );
                        report.dropped += 1;
                    } else {
                        tracing::warn!(
                            user_id = %op.user_id,
                            retries = op.retry_count,
                            error = %e,
                            "Queued streak update failed; will retry on next connectivity event"
                        );
                        queue.push_front(op);
                    }
                    break;
                }
            }
        }

        report.remaining = queue.len() as u32;
        tracing::info!(
            replayed = report.replayed,
            dropped = report.dropped,
            remaining = report.remaining,
            "Offline sync pass complete"
        );
        report
    }
}

impl Default for SyncQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive replay from the connectivity signal.
///
/// Runs until the sender side of the watch channel is dropped; every
/// transition to `Online` triggers a full replay pass through `replay`.
pub async fn run_sync_worker<F, Fut>(
    queue: Arc<SyncQueue>,
    mut connectivity: watch::Receiver<ConnectivityState>,
    mut replay: F,
) where
    F: FnMut(PendingSyncOperation) -> Fut,
    Fut: Future<Output = Result<(), AppError>>,
{
    while connectivity.changed().await.is_ok() {
        let state = *connectivity.borrow_and_update();
        if state == ConnectivityState::Online {
            tracing::info!("Connectivity restored; replaying pending updates");
            queue.sync_pending_updates(&mut replay).await;
        }
    }
}

// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod cache;
pub mod dispatcher;
pub mod gate;
pub mod ledger;
pub mod streak;
pub mod sync;

pub use cache::TtlCache;
pub use dispatcher::CelebrationDispatcher;
pub use gate::EngagementGate;
pub use ledger::{BonusAward, LedgerClient};
pub use streak::{StreakService, StreakUpdateResult};
pub use sync::{ConnectivityState, PendingSyncOperation, SyncQueue, SyncReport};

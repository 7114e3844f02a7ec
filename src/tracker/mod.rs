//! Reading-session tracking.
//!
//! ```text
//! lifecycle signal → TransitionDetector → SessionClock → RolloverPolicy → StatsStore
//! ```
//!
//! [`ReadingTracker`] is the single entry point screens and commands share:
//! it hands out detectors for live sessions and serves snapshots, goal changes
//! and resume requests through the same rollover rules.

pub mod background;
pub mod clock;
pub mod detector;
pub mod rollover;

use std::sync::Arc;

use tracing::info;

pub use background::{spawn_tracker, TrackerHandle, TrackerMessage, TrackerStatus};
pub use clock::{Clock, SessionClock, SystemClock};
pub use detector::{AppState, LifecycleSignal, Transition, TransitionDetector};
pub use rollover::{RolloverOutcome, RolloverPolicy};

use crate::app::Result;
use crate::domain::{parse_goal, BookRef, ReadingStats, StatsSnapshot, UserId};
use crate::store::{StatsPatch, StatsStore};

pub struct ReadingTracker {
    store: Arc<dyn StatsStore>,
    clock: Arc<dyn Clock>,
    policy: Arc<RolloverPolicy>,
}

impl ReadingTracker {
    pub fn new(store: Arc<dyn StatsStore>, clock: Arc<dyn Clock>, default_goal_minutes: u32) -> Self {
        let policy = Arc::new(RolloverPolicy::new(store.clone(), default_goal_minutes));
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Today's stats for rendering. Creates the record on first use.
    pub async fn snapshot(&self, user: &UserId) -> Result<StatsSnapshot> {
        let today = self.clock.today();
        let stats = self.policy.resolve(user, today).await?;
        Ok(StatsSnapshot::from_stats(&stats, today))
    }

    /// Validate and store a new daily goal, returning the stored minutes.
    ///
    /// Invalid input is rejected before any store access.
    pub async fn adjust_goal(&self, user: &UserId, input: &str) -> Result<u32> {
        let minutes = parse_goal(input)?;

        match self.store.get(user).await? {
            None => {
                let stats = ReadingStats::new(self.clock.today(), minutes);
                self.store.set(user, &stats).await?;
            }
            Some(_) => {
                let patch = StatsPatch {
                    reading_goal_minutes: Some(minutes),
                    ..Default::default()
                };
                self.store.update(user, &patch).await?;
            }
        }

        info!(user = %user, minutes, "Reading goal updated");
        Ok(minutes)
    }

    /// The book to reopen, or `None` when nothing has been read yet.
    pub async fn resume_last_book(&self, user: &UserId) -> Result<Option<BookRef>> {
        Ok(self
            .store
            .get(user)
            .await?
            .and_then(|stats| stats.last_opened_book))
    }

    /// Persist a finished session measured elsewhere.
    pub async fn record_session(
        &self,
        user: &UserId,
        elapsed_secs: u64,
        book: Option<&BookRef>,
    ) -> Result<Option<RolloverOutcome>> {
        self.policy
            .apply(user, elapsed_secs, self.clock.today(), book)
            .await
    }

    /// A detector for a live reading session of `book`.
    pub fn detector(&self, user: UserId, book: Option<BookRef>) -> TransitionDetector {
        TransitionDetector::new(self.policy.clone(), self.clock.clone(), user, book)
    }
}

use std::sync::Arc;

use tracing::debug;

use crate::app::{KitabakError, Result};
use crate::domain::{BookRef, ReadingDay, ReadingStats, UserId};
use crate::store::{Counter, StatsPatch, StatsStore};

/// What a finished session did to the daily bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// First session for this user; the record was created.
    Created { seconds: u64 },
    /// Same day: seconds were added to the bucket.
    Accumulated { added: u64 },
    /// New day: the stale bucket was replaced.
    RolledOver {
        previous_day: ReadingDay,
        discarded: u64,
        seconds: u64,
    },
}

/// Decides which daily bucket reading time belongs to and persists it.
pub struct RolloverPolicy {
    store: Arc<dyn StatsStore>,
    default_goal_minutes: u32,
}

impl RolloverPolicy {
    pub fn new(store: Arc<dyn StatsStore>, default_goal_minutes: u32) -> Self {
        Self {
            store,
            default_goal_minutes,
        }
    }

    /// Attribute `elapsed_secs` of reading to `today`.
    ///
    /// A zero-length session writes nothing and returns `None`. The open
    /// book, when given, always replaces the last-opened reference.
    pub async fn apply(
        &self,
        user: &UserId,
        elapsed_secs: u64,
        today: ReadingDay,
        book: Option<&BookRef>,
    ) -> Result<Option<RolloverOutcome>> {
        if elapsed_secs == 0 {
            return Ok(None);
        }

        let outcome = match self.store.get(user).await? {
            None => {
                let mut stats = ReadingStats::new(today, self.default_goal_minutes);
                stats.today_reading_time = elapsed_secs;
                stats.last_opened_book = book.cloned();
                self.store.set(user, &stats).await?;
                RolloverOutcome::Created {
                    seconds: elapsed_secs,
                }
            }
            Some(existing) if existing.is_current(today) => {
                let patch = StatsPatch {
                    today_reading_time: Some(Counter::Increment(elapsed_secs)),
                    last_opened_book: book.cloned(),
                    ..Default::default()
                };
                self.store.update(user, &patch).await?;
                RolloverOutcome::Accumulated {
                    added: elapsed_secs,
                }
            }
            Some(existing) => {
                let patch = StatsPatch {
                    last_reading_date: Some(today),
                    today_reading_time: Some(Counter::Set(elapsed_secs)),
                    last_opened_book: book.cloned(),
                    ..Default::default()
                };
                self.store.update(user, &patch).await?;
                RolloverOutcome::RolledOver {
                    previous_day: existing.last_reading_date,
                    discarded: existing.today_reading_time,
                    seconds: elapsed_secs,
                }
            }
        };

        Ok(Some(outcome))
    }

    /// Load the record for display, creating it or resetting a stale day.
    pub async fn resolve(&self, user: &UserId, today: ReadingDay) -> Result<ReadingStats> {
        match self.store.get(user).await? {
            None => {
                let stats = ReadingStats::new(today, self.default_goal_minutes);
                self.store.set(user, &stats).await?;
                debug!(user = %user, "Created reading stats with defaults");
                Ok(stats)
            }
            Some(stats) if stats.is_current(today) => Ok(stats),
            Some(mut stats) => {
                let previous_day = stats.last_reading_date;
                if self.store.reset_day(user, previous_day, today).await? {
                    debug!(user = %user, %previous_day, "Reset daily reading bucket");
                    stats.last_reading_date = today;
                    stats.today_reading_time = 0;
                    return Ok(stats);
                }

                // A session for the new day landed first; keep what it wrote.
                let mut current = self
                    .store
                    .get(user)
                    .await?
                    .ok_or_else(|| KitabakError::RecordNotFound(user.to_string()))?;
                if !current.is_current(today) {
                    current.last_reading_date = today;
                    current.today_reading_time = 0;
                }
                Ok(current)
            }
        }
    }
}

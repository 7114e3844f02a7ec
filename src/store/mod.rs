pub mod sqlite;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{BookRef, ReadingDay, ReadingStats, UserId};

pub use sqlite::SqliteStore;

/// Write operation for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Set(u64),
    /// Applied by the store itself so concurrent writers do not lose updates.
    Increment(u64),
}

/// Partial record for merge updates. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsPatch {
    pub last_reading_date: Option<ReadingDay>,
    pub today_reading_time: Option<Counter>,
    pub reading_goal_minutes: Option<u32>,
    pub last_opened_book: Option<BookRef>,
}

/// Per-user reading stats document store.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn get(&self, user: &UserId) -> Result<Option<ReadingStats>>;

    /// Create or fully overwrite the record.
    async fn set(&self, user: &UserId, stats: &ReadingStats) -> Result<()>;

    /// Merge `patch` into an existing record.
    ///
    /// Fails with `RecordNotFound` if the user has no record yet.
    async fn update(&self, user: &UserId, patch: &StatsPatch) -> Result<()>;

    /// Move a record still dated `stale` to `today` with an empty bucket.
    ///
    /// Returns `false` and changes nothing when the record is absent or no
    /// longer dated `stale`.
    async fn reset_day(&self, user: &UserId, stale: ReadingDay, today: ReadingDay)
        -> Result<bool>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Semaphore;

    use super::*;
    use crate::app::KitabakError;

    /// Store whose backend is unreachable.
    pub struct FailingStore;

    #[async_trait]
    impl StatsStore for FailingStore {
        async fn get(&self, _user: &UserId) -> Result<Option<ReadingStats>> {
            Err(KitabakError::Other("store unreachable".into()))
        }

        async fn set(&self, _user: &UserId, _stats: &ReadingStats) -> Result<()> {
            Err(KitabakError::Other("store unreachable".into()))
        }

        async fn update(&self, _user: &UserId, _patch: &StatsPatch) -> Result<()> {
            Err(KitabakError::Other("store unreachable".into()))
        }

        async fn reset_day(
            &self,
            _user: &UserId,
            _stale: ReadingDay,
            _today: ReadingDay,
        ) -> Result<bool> {
            Err(KitabakError::Other("store unreachable".into()))
        }
    }

    /// SQLite store whose writes block until the gate is opened.
    pub struct GatedStore {
        pub inner: Arc<SqliteStore>,
        gate: Semaphore,
        writes: AtomicUsize,
    }

    impl GatedStore {
        pub fn closed() -> Self {
            Self {
                inner: Arc::new(SqliteStore::in_memory().unwrap()),
                gate: Semaphore::new(0),
                writes: AtomicUsize::new(0),
            }
        }

        pub fn open(&self) {
            self.gate.add_permits(1);
        }

        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatsStore for GatedStore {
        async fn get(&self, user: &UserId) -> Result<Option<ReadingStats>> {
            self.inner.get(user).await
        }

        async fn set(&self, user: &UserId, stats: &ReadingStats) -> Result<()> {
            let _permit = self.gate.acquire().await.unwrap();
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(user, stats).await
        }

        async fn update(&self, user: &UserId, patch: &StatsPatch) -> Result<()> {
            let _permit = self.gate.acquire().await.unwrap();
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update(user, patch).await
        }

        async fn reset_day(
            &self,
            user: &UserId,
            stale: ReadingDay,
            today: ReadingDay,
        ) -> Result<bool> {
            let _permit = self.gate.acquire().await.unwrap();
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.reset_day(user, stale, today).await
        }
    }
}

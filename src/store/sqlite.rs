use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use rusqlite_migration::{Migrations, M};

use crate::app::{KitabakError, Result};
use crate::domain::{BookRef, ReadingDay, ReadingStats, UserId, DEFAULT_GOAL_MINUTES};
use crate::store::{Counter, StatsPatch, StatsStore};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            KitabakError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn to_sql_secs(secs: u64) -> Result<i64> {
        i64::try_from(secs)
            .map_err(|_| KitabakError::Other(format!("Reading time out of range: {}", secs)))
    }
}

#[async_trait]
impl StatsStore for SqliteStore {
    async fn get(&self, user: &UserId) -> Result<Option<ReadingStats>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT last_reading_date, today_reading_time, reading_goal_minutes,
                        last_opened_book_url, last_opened_book_title
                 FROM reading_stats WHERE user_id = ?1",
                params![user.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((date, time, goal, book_url, book_title)) = row else {
            return Ok(None);
        };

        let last_reading_date: ReadingDay = date.parse().map_err(KitabakError::Other)?;

        Ok(Some(ReadingStats {
            last_reading_date,
            today_reading_time: u64::try_from(time).unwrap_or(0),
            reading_goal_minutes: u32::try_from(goal)
                .ok()
                .filter(|g| *g > 0)
                .unwrap_or(DEFAULT_GOAL_MINUTES),
            last_opened_book: BookRef::from_parts(book_url, book_title),
        }))
    }

    async fn set(&self, user: &UserId, stats: &ReadingStats) -> Result<()> {
        if stats.reading_goal_minutes == 0 {
            return Err(KitabakError::InvalidGoal(
                "Goal must be greater than zero".to_string(),
            ));
        }

        let conn = self.conn()?;
        let (book_url, book_title) = match &stats.last_opened_book {
            Some(book) => (Some(book.url.as_str()), Some(book.title.as_str())),
            None => (None, None),
        };

        conn.execute(
            "INSERT INTO reading_stats (user_id, last_reading_date, today_reading_time,
                                        reading_goal_minutes, last_opened_book_url,
                                        last_opened_book_title)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                last_reading_date = ?2,
                today_reading_time = ?3,
                reading_goal_minutes = ?4,
                last_opened_book_url = ?5,
                last_opened_book_title = ?6",
            params![
                user.as_str(),
                stats.last_reading_date.to_string(),
                Self::to_sql_secs(stats.today_reading_time)?,
                stats.reading_goal_minutes,
                book_url,
                book_title
            ],
        )?;

        Ok(())
    }

    async fn update(&self, user: &UserId, patch: &StatsPatch) -> Result<()> {
        if patch.reading_goal_minutes == Some(0) {
            return Err(KitabakError::InvalidGoal(
                "Goal must be greater than zero".to_string(),
            ));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM reading_stats WHERE user_id = ?1",
            params![user.as_str()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(KitabakError::RecordNotFound(user.to_string()));
        }

        if let Some(ref date) = patch.last_reading_date {
            tx.execute(
                "UPDATE reading_stats SET last_reading_date = ?1 WHERE user_id = ?2",
                params![date.to_string(), user.as_str()],
            )?;
        }
        match patch.today_reading_time {
            Some(Counter::Set(secs)) => {
                tx.execute(
                    "UPDATE reading_stats SET today_reading_time = ?1 WHERE user_id = ?2",
                    params![Self::to_sql_secs(secs)?, user.as_str()],
                )?;
            }
            Some(Counter::Increment(secs)) => {
                tx.execute(
                    "UPDATE reading_stats SET today_reading_time = today_reading_time + ?1
                     WHERE user_id = ?2",
                    params![Self::to_sql_secs(secs)?, user.as_str()],
                )?;
            }
            None => {}
        }
        if let Some(goal) = patch.reading_goal_minutes {
            tx.execute(
                "UPDATE reading_stats SET reading_goal_minutes = ?1 WHERE user_id = ?2",
                params![goal, user.as_str()],
            )?;
        }
        if let Some(ref book) = patch.last_opened_book {
            tx.execute(
                "UPDATE reading_stats SET last_opened_book_url = ?1, last_opened_book_title = ?2
                 WHERE user_id = ?3",
                params![book.url, book.title, user.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    async fn reset_day(&self, user: &UserId, stale: ReadingDay, today: ReadingDay) -> Result<bool> {
        let mut conn = self.conn()?;
        // Immediate, so another process cannot write between the check and the reset.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<String> = tx
            .query_row(
                "SELECT last_reading_date FROM reading_stats WHERE user_id = ?1",
                params![user.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let still_stale = match current {
            Some(date) => date.parse::<ReadingDay>().map_err(KitabakError::Other)? == stale,
            None => false,
        };
        if !still_stale {
            return Ok(false);
        }

        tx.execute(
            "UPDATE reading_stats SET last_reading_date = ?1, today_reading_time = 0
             WHERE user_id = ?2",
            params![today.to_string(), user.as_str()],
        )?;
        tx.commit()?;
        Ok(true)
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{percent_complete, BookRef};

/// Persisted day format, matching JavaScript's `Date.prototype.toDateString`.
const DAY_FORMAT: &str = "%a %b %d %Y";
const ISO_DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar day that a daily reading bucket is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReadingDay(NaiveDate);

impl ReadingDay {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<NaiveDate> for ReadingDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for ReadingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for ReadingDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(s, ISO_DAY_FORMAT))
            .map(Self)
            .map_err(|_| format!("Invalid reading date: {}", s))
    }
}

impl Serialize for ReadingDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReadingDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Per-user reading statistics record.
///
/// `today_reading_time` is only meaningful for `last_reading_date`; a record
/// whose date is not today holds a stale bucket that must be reset before any
/// further accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingStats {
    pub last_reading_date: ReadingDay,
    /// Seconds read on `last_reading_date`.
    pub today_reading_time: u64,
    pub reading_goal_minutes: u32,
    pub last_opened_book: Option<BookRef>,
}

impl ReadingStats {
    pub fn new(day: ReadingDay, reading_goal_minutes: u32) -> Self {
        Self {
            last_reading_date: day,
            today_reading_time: 0,
            reading_goal_minutes,
            last_opened_book: None,
        }
    }

    pub fn is_current(&self, today: ReadingDay) -> bool {
        self.last_reading_date == today
    }

    /// Seconds attributable to `today`, treating a stale bucket as empty.
    pub fn time_on(&self, today: ReadingDay) -> u64 {
        if self.is_current(today) {
            self.today_reading_time
        } else {
            0
        }
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub day: ReadingDay,
    pub today_reading_time_secs: u64,
    pub goal_minutes: u32,
    pub percent_complete: f64,
    pub last_opened_book: Option<BookRef>,
}

impl StatsSnapshot {
    pub fn from_stats(stats: &ReadingStats, today: ReadingDay) -> Self {
        let secs = stats.time_on(today);
        Self {
            day: today,
            today_reading_time_secs: secs,
            goal_minutes: stats.reading_goal_minutes,
            percent_complete: percent_complete(secs, stats.reading_goal_minutes),
            last_opened_book: stats.last_opened_book.clone(),
        }
    }

    /// Progress including seconds from a session that has not been persisted yet.
    pub fn percent_with(&self, unsaved_secs: u64) -> f64 {
        percent_complete(
            self.today_reading_time_secs.saturating_add(unsaved_secs),
            self.goal_minutes,
        )
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_minutes > 0 && self.percent_complete >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> ReadingDay {
        ReadingDay::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_reading_day_uses_date_string_format() {
        assert_eq!(day(2026, 10, 15).to_string(), "Thu Oct 15 2026");
        assert_eq!(day(2024, 3, 5).to_string(), "Tue Mar 05 2024");
    }

    #[test]
    fn test_reading_day_parses_both_formats() {
        let expected = day(2026, 10, 15);
        assert_eq!("Thu Oct 15 2026".parse::<ReadingDay>().unwrap(), expected);
        assert_eq!("2026-10-15".parse::<ReadingDay>().unwrap(), expected);
        assert!("yesterday".parse::<ReadingDay>().is_err());
    }

    #[test]
    fn test_reading_day_serde_as_string() {
        let json = serde_json::to_string(&day(2026, 10, 15)).unwrap();
        assert_eq!(json, "\"Thu Oct 15 2026\"");
        let back: ReadingDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day(2026, 10, 15));
    }

    #[test]
    fn test_time_on_ignores_stale_bucket() {
        let mut stats = ReadingStats::new(day(2026, 10, 14), 5);
        stats.today_reading_time = 300;

        assert_eq!(stats.time_on(day(2026, 10, 14)), 300);
        assert_eq!(stats.time_on(day(2026, 10, 15)), 0);
    }

    #[test]
    fn test_snapshot_from_stats() {
        let mut stats = ReadingStats::new(day(2026, 10, 15), 10);
        stats.today_reading_time = 300;

        let snapshot = StatsSnapshot::from_stats(&stats, day(2026, 10, 15));
        assert_eq!(snapshot.today_reading_time_secs, 300);
        assert_eq!(snapshot.goal_minutes, 10);
        assert!((snapshot.percent_complete - 0.5).abs() < f64::EPSILON);
        assert!(!snapshot.goal_reached());
        assert!((snapshot.percent_with(300) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_goal_reached() {
        let mut stats = ReadingStats::new(day(2026, 10, 15), 1);
        stats.today_reading_time = 90;

        let snapshot = StatsSnapshot::from_stats(&stats, day(2026, 10, 15));
        assert!(snapshot.goal_reached());
        assert_eq!(snapshot.percent_complete, 1.0);
    }
}

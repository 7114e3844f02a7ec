use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::domain::ReadingDay;

/// Wall-clock time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> ReadingDay {
        ReadingDay::new(self.now().date_naive())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Measures one contiguous foreground interval.
pub struct SessionClock {
    clock: Arc<dyn Clock>,
    started_at: Option<DateTime<Local>>,
}

impl SessionClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            started_at: None,
        }
    }

    /// Start a session. Does nothing if one is already running.
    pub fn begin(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Finish the session and return its length in whole seconds.
    ///
    /// Returns 0 if no session was running. A clock that moved backwards
    /// also yields 0.
    pub fn end(&mut self) -> u64 {
        let Some(start) = self.started_at.take() else {
            return 0;
        };
        let elapsed_ms = self.clock.now().signed_duration_since(start).num_milliseconds();
        u64::try_from(elapsed_ms / 1000).unwrap_or(0)
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};

    use super::*;

    /// Clock that only moves when told to.
    pub struct ManualClock {
        now: Mutex<DateTime<Local>>,
    }

    impl ManualClock {
        pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Arc<Self> {
            let now = Local
                .with_ymd_and_hms(y, m, d, h, min, 0)
                .single()
                .expect("unambiguous local time");
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        pub fn advance_ms(&self, ms: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::milliseconds(ms);
        }

        pub fn advance_secs(&self, secs: i64) {
            self.advance_ms(secs * 1000);
        }

        pub fn advance_days(&self, days: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::days(days);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    #[test]
    fn test_end_without_begin_is_zero() {
        let clock = ManualClock::at(2026, 10, 15, 9, 0);
        let mut session = SessionClock::new(clock.clone());
        clock.advance_secs(30);
        assert_eq!(session.end(), 0);
    }

    #[test]
    fn test_elapsed_is_floored_to_seconds() {
        let clock = ManualClock::at(2026, 10, 15, 9, 0);
        let mut session = SessionClock::new(clock.clone());
        session.begin();
        clock.advance_ms(125_999);
        assert_eq!(session.end(), 125);
    }

    #[test]
    fn test_begin_is_idempotent() {
        let clock = ManualClock::at(2026, 10, 15, 9, 0);
        let mut session = SessionClock::new(clock.clone());
        session.begin();
        clock.advance_secs(10);
        session.begin();
        clock.advance_secs(5);
        assert_eq!(session.end(), 15);
    }

    #[test]
    fn test_end_clears_start() {
        let clock = ManualClock::at(2026, 10, 15, 9, 0);
        let mut session = SessionClock::new(clock.clone());
        session.begin();
        assert!(session.is_running());
        clock.advance_secs(3);
        assert_eq!(session.end(), 3);
        assert!(!session.is_running());
        assert_eq!(session.end(), 0);
    }

    #[test]
    fn test_clock_going_backwards_yields_zero() {
        let clock = ManualClock::at(2026, 10, 15, 9, 0);
        let mut session = SessionClock::new(clock.clone());
        session.begin();
        clock.advance_secs(-60);
        assert_eq!(session.end(), 0);
    }

    #[test]
    fn test_today_follows_local_date() {
        let clock = ManualClock::at(2026, 10, 15, 23, 59);
        assert_eq!(clock.today().to_string(), "Thu Oct 15 2026");
        clock.advance_secs(120);
        assert_eq!(clock.today().to_string(), "Fri Oct 16 2026");
    }
}

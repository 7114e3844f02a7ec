use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{BookRef, UserId};
use crate::tracker::clock::{Clock, SessionClock};
use crate::tracker::rollover::RolloverPolicy;

/// Raw application lifecycle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Active,
    Inactive,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    /// Covers both inactive and background.
    Inactive,
}

impl From<LifecycleSignal> for AppState {
    fn from(signal: LifecycleSignal) -> Self {
        match signal {
            LifecycleSignal::Active => AppState::Active,
            LifecycleSignal::Inactive | LifecycleSignal::Background => AppState::Inactive,
        }
    }
}

/// Result of feeding one signal to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Began,
    Ended { elapsed_secs: u64, submitted: bool },
}

/// Persists finished sessions, one write at a time.
struct SessionWriter {
    policy: Arc<RolloverPolicy>,
    clock: Arc<dyn Clock>,
    user: UserId,
    book: Option<BookRef>,
    in_flight: Arc<AtomicBool>,
    completed: Arc<AtomicU64>,
}

/// Clears the in-flight flag however the write task ends.
struct InFlightGuard {
    in_flight: Arc<AtomicBool>,
    completed: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl SessionWriter {
    /// Spawn the write for a finished session.
    ///
    /// Returns `None` without writing when another write from this detector is
    /// still running, or when there is no runtime to run it on.
    fn submit(&self, elapsed_secs: u64) -> Option<JoinHandle<()>> {
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    user = %self.user,
                    elapsed_secs,
                    "No async runtime available; reading session lost"
                );
                return None;
            }
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(
                user = %self.user,
                elapsed_secs,
                "Reading session write already in flight; dropping session"
            );
            return None;
        }

        let guard = InFlightGuard {
            in_flight: self.in_flight.clone(),
            completed: self.completed.clone(),
        };
        let policy = self.policy.clone();
        let user = self.user.clone();
        let book = self.book.clone();
        let today = self.clock.today();

        Some(runtime.spawn(async move {
            let _guard = guard;
            match policy.apply(&user, elapsed_secs, today, book.as_ref()).await {
                Ok(Some(outcome)) => {
                    info!(user = %user, ?outcome, "Recorded reading session");
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(user = %user, elapsed_secs, "Failed to record reading session: {}", e);
                }
            }
        }))
    }
}

/// Turns lifecycle signals into reading sessions for one user and book.
///
/// Starts inactive. Dropping the detector while active still submits the open
/// session, but only [`close`](Self::close) waits for it to be stored.
pub struct TransitionDetector {
    state: AppState,
    session: SessionClock,
    writer: SessionWriter,
    pending: Option<JoinHandle<()>>,
}

impl TransitionDetector {
    pub fn new(
        policy: Arc<RolloverPolicy>,
        clock: Arc<dyn Clock>,
        user: UserId,
        book: Option<BookRef>,
    ) -> Self {
        Self {
            state: AppState::Inactive,
            session: SessionClock::new(clock.clone()),
            writer: SessionWriter {
                policy,
                clock,
                user,
                book,
                in_flight: Arc::new(AtomicBool::new(false)),
                completed: Arc::new(AtomicU64::new(0)),
            },
            pending: None,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn user(&self) -> &UserId {
        &self.writer.user
    }

    pub fn book(&self) -> Option<&BookRef> {
        self.writer.book.as_ref()
    }

    pub fn session_started_at(&self) -> Option<DateTime<Local>> {
        self.session.started_at()
    }

    pub fn is_writing(&self) -> bool {
        self.writer.in_flight.load(Ordering::SeqCst)
    }

    /// Counter of finished writes, successful or not.
    pub fn completed_writes(&self) -> Arc<AtomicU64> {
        self.writer.completed.clone()
    }

    pub fn handle(&mut self, signal: LifecycleSignal) -> Transition {
        let next = AppState::from(signal);
        if next == self.state {
            return Transition::Unchanged;
        }
        self.state = next;

        match next {
            AppState::Active => {
                self.session.begin();
                debug!(user = %self.writer.user, "Reading session started");
                Transition::Began
            }
            AppState::Inactive => {
                let elapsed_secs = self.session.end();
                let submitted = self.submit(elapsed_secs);
                Transition::Ended {
                    elapsed_secs,
                    submitted,
                }
            }
        }
    }

    /// Wait for the write currently in flight, if any.
    pub async fn wait_for_write(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Err(e) = pending.await {
                error!("Reading session write task failed: {}", e);
            }
        }
    }

    /// Tear down: end an open session and wait until it is stored.
    pub async fn close(mut self) {
        let elapsed_secs = if self.state == AppState::Active {
            self.state = AppState::Inactive;
            self.session.end()
        } else {
            0
        };

        // The final session must not be dropped by the in-flight guard.
        self.wait_for_write().await;
        self.submit(elapsed_secs);
        self.wait_for_write().await;
    }

    fn submit(&mut self, elapsed_secs: u64) -> bool {
        if elapsed_secs == 0 {
            debug!(user = %self.writer.user, "Discarding empty reading session");
            return false;
        }
        match self.writer.submit(elapsed_secs) {
            Some(handle) => {
                self.pending = Some(handle);
                true
            }
            None => false,
        }
    }
}

impl Drop for TransitionDetector {
    fn drop(&mut self) {
        if self.state == AppState::Active {
            self.state = AppState::Inactive;
            let elapsed_secs = self.session.end();
            self.submit(elapsed_secs);
        }
    }
}

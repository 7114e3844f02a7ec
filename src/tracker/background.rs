use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::UserId;
use crate::tracker::detector::{AppState, LifecycleSignal, TransitionDetector};

/// Message type for the background tracker
#[derive(Debug)]
pub enum TrackerMessage {
    Lifecycle(LifecycleSignal),
    Shutdown,
}

/// Latest state published by the tracker task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStatus {
    pub state: AppState,
    pub session_started_at: Option<DateTime<Local>>,
    pub completed_writes: u64,
}

impl TrackerStatus {
    /// Whole seconds of the open session at `now`, not yet persisted.
    pub fn unsaved_secs(&self, now: DateTime<Local>) -> u64 {
        self.session_started_at
            .map(|start| {
                let secs = now.signed_duration_since(start).num_seconds();
                u64::try_from(secs).unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

/// Handle to feed lifecycle signals to a running tracker.
///
/// Dropping the handle closes the channel, which the task treats like
/// [`shutdown`](Self::shutdown) without waiting for the final write.
pub struct TrackerHandle {
    tx: mpsc::Sender<TrackerMessage>,
    status: watch::Receiver<TrackerStatus>,
    completed: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    pub async fn signal(&self, signal: LifecycleSignal) {
        if let Err(e) = self.tx.send(TrackerMessage::Lifecycle(signal)).await {
            warn!("Reading tracker is not running: {}", e);
        }
    }

    pub fn status(&self) -> TrackerStatus {
        let mut status = self.status.borrow().clone();
        status.completed_writes = self.completed.load(Ordering::SeqCst);
        status
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop tracking and wait until the final session is stored.
    pub async fn shutdown(self) {
        let _ = self.tx.send(TrackerMessage::Shutdown).await;
        if let Err(e) = self.task.await {
            error!("Reading tracker task failed: {}", e);
        }
    }
}

/// Run `detector` on its own task until shutdown or until its user signs out.
pub fn spawn_tracker(
    detector: TransitionDetector,
    identity: watch::Receiver<Option<UserId>>,
) -> TrackerHandle {
    let (tx, rx) = mpsc::channel(32);
    let completed = detector.completed_writes();
    let (status_tx, status) = watch::channel(status_of(&detector));

    let task = tokio::spawn(async move {
        run(detector, rx, identity, status_tx).await;
    });

    TrackerHandle {
        tx,
        status,
        completed,
        task,
    }
}

async fn run(
    mut detector: TransitionDetector,
    mut rx: mpsc::Receiver<TrackerMessage>,
    mut identity: watch::Receiver<Option<UserId>>,
    status_tx: watch::Sender<TrackerStatus>,
) {
    info!(user = %detector.user(), "Reading tracker started");
    let mut watching_identity = true;

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(TrackerMessage::Lifecycle(signal)) => {
                    let transition = detector.handle(signal);
                    debug!(?signal, ?transition, "Lifecycle transition");
                    status_tx.send_replace(status_of(&detector));
                }
                Some(TrackerMessage::Shutdown) | None => break,
            },
            changed = identity.changed(), if watching_identity => {
                if changed.is_err() {
                    // Auth source is gone; keep tracking the current user.
                    watching_identity = false;
                    continue;
                }
                let current = identity.borrow_and_update().clone();
                if current.as_ref() != Some(detector.user()) {
                    info!(user = %detector.user(), "User signed out; ending reading session");
                    break;
                }
            }
        }
    }

    detector.close().await;
    status_tx.send_replace(TrackerStatus {
        state: AppState::Inactive,
        session_started_at: None,
        completed_writes: 0,
    });
    info!("Reading tracker stopped");
}

fn status_of(detector: &TransitionDetector) -> TrackerStatus {
    TrackerStatus {
        state: detector.state(),
        session_started_at: detector.session_started_at(),
        completed_writes: 0,
    }
}

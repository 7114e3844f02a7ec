//! Signed-in user tracking.
//!
//! Stands in for the external auth provider: whoever owns the sign-in flow
//! pushes the current user here, and long-lived consumers (the background
//! tracker) subscribe to changes.

use tokio::sync::watch;

use crate::app::{KitabakError, Result};
use crate::domain::UserId;

#[derive(Debug)]
pub struct Identity {
    tx: watch::Sender<Option<UserId>>,
}

impl Identity {
    pub fn signed_out() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn signed_in(user: UserId) -> Self {
        let (tx, _rx) = watch::channel(Some(user));
        Self { tx }
    }

    pub fn current(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    /// The signed-in user, or `NotSignedIn`.
    pub fn require(&self) -> Result<UserId> {
        self.current().ok_or(KitabakError::NotSignedIn)
    }

    pub fn sign_in(&self, user: UserId) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}

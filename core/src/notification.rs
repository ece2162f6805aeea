//! Transient user feedback with timed expiry.
//!
//! # Design
//! At most one notification is visible. Showing a new one replaces the
//! current one, aborts the pending expiry task and schedules a fresh one, so
//! every notification lives for the full TTL measured from when it was shown.
//! Each expiry task also carries the generation it was scheduled for and only
//! clears the slot if that generation is still current; an abort that loses
//! the race with a wake-up can therefore never clear a newer notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Default lifetime of a notification.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Danger,
        }
    }
}

/// Single-slot notification holder with cancellable expiry.
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    slot: Arc<watch::Sender<Option<Notification>>>,
    generation: Arc<AtomicU64>,
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            ttl,
            slot: Arc::new(slot),
            generation: Arc::new(AtomicU64::new(0)),
            expiry: Mutex::new(None),
        }
    }

    /// Show `notification`, replacing whatever is visible.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the expiry is a
    /// spawned task.
    pub fn show(&self, notification: Notification) {
        let mut pending = self.expiry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, kind = ?notification.kind, message = %notification.message, "showing notification");
        self.slot.send_replace(Some(notification));

        let slot = Arc::clone(&self.slot);
        let latest = Arc::clone(&self.generation);
        let deadline = Instant::now() + self.ttl;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if latest.load(Ordering::SeqCst) == generation {
                debug!(generation, "notification expired");
                slot.send_replace(None);
            }
        }));
    }

    /// Clear the visible notification ahead of its expiry.
    pub fn dismiss(&self) {
        let mut pending = self.expiry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.slot.send_replace(None);
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.slot.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        let pending = self.expiry.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

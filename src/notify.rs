//! Transient "success" banner. One notification is visible at a time; a new one
//! replaces the current one and cancels its dismissal timer.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
}

struct Pending {
    notification: Notification,
    timer: JoinHandle<()>,
}

#[derive(Clone)]
pub struct Notifier {
    ttl: Duration,
    slot: Arc<Mutex<Option<Pending>>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Shows `message`, superseding whatever is on screen. Must be called
    /// from within a tokio runtime.
    pub fn notify(&self, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
        };

        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.take() {
            previous.timer.abort();
            debug!(superseded = %previous.notification.id, "notification replaced");
        }

        let timer = {
            let slot = Arc::clone(&self.slot);
            let id = notification.id;
            let ttl = self.ttl;
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                let mut slot = lock(&slot);
                // only dismiss the notification this timer was armed for
                if slot.as_ref().is_some_and(|p| p.notification.id == id) {
                    *slot = None;
                    debug!(%id, "notification expired");
                }
            })
        };

        *slot = Some(Pending {
            notification: notification.clone(),
            timer,
        });
        notification
    }

    pub fn current(&self) -> Option<Notification> {
        lock(&self.slot).as_ref().map(|p| p.notification.clone())
    }

    pub fn dismiss(&self) {
        if let Some(previous) = lock(&self.slot).take() {
            previous.timer.abort();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

fn lock(slot: &Mutex<Option<Pending>>) -> MutexGuard<'_, Option<Pending>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

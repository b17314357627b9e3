//! Event-to-notification routing.
//!
//! [`NotificationHub`] subscribes to the event bus and forwards lifecycle
//! and countdown events to the outward notification channel (structured
//! logs here; a real shell attaches its own subscriber). It owns the two
//! pieces of notification-only state: the per-item dismissed set and the
//! `notifications_enabled` gate. Dismissal suppresses surfacing only —
//! countdowns keep being computed and deletion proceeds regardless.

use std::collections::HashSet;
use std::sync::Mutex;

use snapsweep_core::config::SharedSettings;
use snapsweep_core::types::DbId;
use snapsweep_events::MediaEvent;
use tokio::sync::broadcast;

/// Gates and routes outward notifications.
pub struct NotificationHub {
    settings: SharedSettings,
    dismissed: Mutex<HashSet<DbId>>,
}

impl NotificationHub {
    pub fn new(settings: SharedSettings) -> Self {
        Self {
            settings,
            dismissed: Mutex::new(HashSet::new()),
        }
    }

    /// Suppress further notifications for `id`. No store change.
    pub fn dismiss(&self, id: DbId) {
        self.dismissed.lock().unwrap().insert(id);
        tracing::debug!(id, "Notifications dismissed for item");
    }

    /// Whether notifications for `id` are currently suppressed.
    pub fn is_dismissed(&self, id: DbId) -> bool {
        self.dismissed.lock().unwrap().contains(&id)
    }

    /// Forget the dismissal entry for a retired item.
    fn clear(&self, id: DbId) {
        self.dismissed.lock().unwrap().remove(&id);
    }

    fn enabled(&self) -> bool {
        self.settings.read().unwrap().notifications_enabled
    }

    /// Run the routing loop until the event bus closes.
    pub async fn run(&self, mut receiver: broadcast::Receiver<MediaEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification hub lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification hub shutting down");
                    break;
                }
            }
        }
    }

    fn route(&self, event: MediaEvent) {
        match event {
            MediaEvent::ItemAdded { item } => {
                if self.enabled() {
                    tracing::info!(
                        id = item.id,
                        path = %item.file_path,
                        "notify: new media tracked"
                    );
                }
            }
            MediaEvent::ItemUpdated {
                item,
                remaining_ms: Some(remaining_ms),
            } => {
                if self.enabled() && !self.is_dismissed(item.id) {
                    tracing::info!(
                        id = item.id,
                        remaining_ms,
                        "notify: deletion countdown"
                    );
                }
            }
            MediaEvent::ItemDeleted { id } => {
                // Retirement cancels the item's notification surface.
                self.clear(id);
                if self.enabled() {
                    tracing::info!(id, "notify: item deleted");
                }
            }
            MediaEvent::LibraryRescanned { added } => {
                if self.enabled() && added > 0 {
                    tracing::info!(added, "notify: library rescanned");
                }
            }
            MediaEvent::ItemDetected { .. } | MediaEvent::ItemUpdated { .. } => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is designed to be shared via `Arc<EventBus>` across the
//! application. Publishing with no subscribers is valid and drops the
//! event silently.

use serde::Serialize;
use snapsweep_core::types::DbId;
use snapsweep_db::models::MediaItem;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// MediaEvent
// ---------------------------------------------------------------------------

/// A lifecycle event for a tracked media item.
///
/// The consumer set is closed (UI, notifications, tests), so the taxonomy
/// is a plain enum rather than a stringly-typed envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    /// A change signal passed classification; the item is about to be
    /// persisted.
    ItemDetected { path: String },
    /// The item was persisted and is now tracked.
    ItemAdded { item: MediaItem },
    /// The item's state changed, including periodic countdown refreshes
    /// (`remaining_ms` is set while a deletion timer is running).
    ItemUpdated {
        item: MediaItem,
        remaining_ms: Option<i64>,
    },
    /// The item was retired; its record no longer exists.
    ItemDeleted { id: DbId },
    /// A full rescan completed. One aggregate event, never one per file.
    LibraryRescanned { added: u64 },
}

impl MediaEvent {
    /// The item id this event concerns, if any.
    pub fn item_id(&self) -> Option<DbId> {
        match self {
            MediaEvent::ItemAdded { item } | MediaEvent::ItemUpdated { item, .. } => Some(item.id),
            MediaEvent::ItemDeleted { id } => Some(*id),
            MediaEvent::ItemDetected { .. } | MediaEvent::LibraryRescanned { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`MediaEvent`].
pub struct EventBus {
    sender: broadcast::Sender<MediaEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: MediaEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The `media_items` row model.

use serde::{Deserialize, Serialize};
use snapsweep_core::item::{self, LifecycleState};
use snapsweep_core::types::{DbId, UnixMillis};

/// One tracked media file.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MediaItem {
    pub id: DbId,
    /// Unique key; an insert for an already-tracked path is a no-op.
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    /// Detection time, epoch millis.
    pub created_at: UnixMillis,
    /// Absolute deadline, epoch millis. `None` = not scheduled / kept.
    pub deletion_timestamp: Option<UnixMillis>,
    pub is_kept: bool,
    /// Platform handle, preferred over `file_path` for deletion.
    pub content_uri: Option<String>,
    pub thumbnail_path: Option<String>,
    /// Opaque handle correlating to an external scheduling mechanism.
    pub deletion_work_id: Option<String>,
}

impl MediaItem {
    /// Derive the live lifecycle state from the persisted fields.
    pub fn lifecycle_state(&self) -> LifecycleState {
        item::lifecycle_state(self.is_kept, self.deletion_timestamp)
    }

    /// Eligible for immediate deletion at `now`?
    pub fn is_expired(&self, now: UnixMillis) -> bool {
        item::is_expired(self.is_kept, self.deletion_timestamp, now)
    }
}

/// Insert DTO. New items always start unmarked and not kept.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMediaItem {
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub created_at: UnixMillis,
    pub content_uri: Option<String>,
    pub thumbnail_path: Option<String>,
}

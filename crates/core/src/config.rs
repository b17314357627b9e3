//! Runtime watch settings.
//!
//! Owned by the preferences store; the copy held here is the in-memory
//! working view shared between the ingestion pipeline, the scheduler, and
//! the command surface. Commands update the persisted row first, then this
//! shared copy.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Default deletion delay: 60 seconds.
pub const DEFAULT_DELETION_DELAY_MS: i64 = 60_000;

/// Runtime configuration for detection and deletion scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchSettings {
    /// Delay between marking and deletion, in milliseconds.
    pub deletion_delay_ms: i64,
    /// When `true`, new detections wait for an explicit user decision
    /// instead of being scheduled automatically.
    pub manual_mode: bool,
    /// Folders whose media files are tracked.
    pub watched_folders: Vec<PathBuf>,
    /// Gates whether countdown events are surfaced to the user. Countdown
    /// computation itself is not affected.
    pub notifications_enabled: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            deletion_delay_ms: DEFAULT_DELETION_DELAY_MS,
            manual_mode: true,
            watched_folders: Vec::new(),
            notifications_enabled: true,
        }
    }
}

/// Shared handle to the current settings.
///
/// Reads take a snapshot (`.read().clone()`); writers replace whole fields.
/// No await point ever holds the lock.
pub type SharedSettings = Arc<RwLock<WatchSettings>>;

/// Wrap settings in a shared handle.
pub fn shared(settings: WatchSettings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let s = WatchSettings::default();
        assert_eq!(s.deletion_delay_ms, 60_000);
        assert!(s.manual_mode);
        assert!(s.notifications_enabled);
        assert!(s.watched_folders.is_empty());
    }

    #[test]
    fn shared_handle_round_trips() {
        let handle = shared(WatchSettings::default());
        handle.write().unwrap().manual_mode = false;
        assert!(!handle.read().unwrap().manual_mode);
    }
}

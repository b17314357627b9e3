//! Detection deduplication.
//!
//! The platform change listener frequently fires several times for the same
//! file in quick succession (create, then one or more content flushes). The
//! [`Deduplicator`] suppresses repeats of the same key inside a fixed window.
//!
//! State is in-memory only. After a restart one redundant detection may slip
//! through; the store's unique path index absorbs it as a no-op insert.

use std::collections::HashMap;

use crate::types::UnixMillis;

/// Window inside which repeated detections of the same key are suppressed.
pub const DEDUP_WINDOW_MS: i64 = 5_000;

/// Suppresses repeated detection signals for the same key.
#[derive(Debug)]
pub struct Deduplicator {
    window_ms: i64,
    last_seen: HashMap<String, UnixMillis>,
}

impl Deduplicator {
    /// Create a deduplicator with the default window.
    pub fn new() -> Self {
        Self::with_window(DEDUP_WINDOW_MS)
    }

    /// Create a deduplicator with a custom window (tests).
    pub fn with_window(window_ms: i64) -> Self {
        Self {
            window_ms,
            last_seen: HashMap::new(),
        }
    }

    /// Returns `true` (and records `now`) if the key has not been seen
    /// inside the window; `false` if this detection should be suppressed.
    pub fn should_process(&mut self, key: &str, now: UnixMillis) -> bool {
        match self.last_seen.get(key) {
            Some(&seen) if now - seen < self.window_ms => false,
            _ => {
                self.last_seen.insert(key.to_string(), now);
                true
            }
        }
    }

    /// Drop entries older than the window to bound memory.
    pub fn prune(&mut self, now: UnixMillis) {
        let window = self.window_ms;
        self.last_seen.retain(|_, &mut seen| now - seen < window);
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_detection_passes() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.should_process("/a.png", 1_000));
    }

    #[test]
    fn repeat_inside_window_is_suppressed() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.should_process("/a.png", 1_000));
        assert!(!dedup.should_process("/a.png", 1_000 + DEDUP_WINDOW_MS - 1));
    }

    #[test]
    fn repeat_after_window_passes() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.should_process("/a.png", 1_000));
        assert!(dedup.should_process("/a.png", 1_000 + DEDUP_WINDOW_MS));
    }

    #[test]
    fn distinct_keys_are_independent() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.should_process("/a.png", 1_000));
        assert!(dedup.should_process("/b.png", 1_001));
    }

    #[test]
    fn suppressed_repeat_does_not_extend_window() {
        let mut dedup = Deduplicator::with_window(100);
        assert!(dedup.should_process("/a.png", 0));
        // A suppressed hit at t=50 must not push the window past t=100.
        assert!(!dedup.should_process("/a.png", 50));
        assert!(dedup.should_process("/a.png", 100));
    }

    #[test]
    fn prune_drops_expired_entries() {
        let mut dedup = Deduplicator::with_window(100);
        dedup.should_process("/a.png", 0);
        dedup.should_process("/b.png", 90);
        dedup.prune(120);
        assert_eq!(dedup.len(), 1);
        // "/b.png" at t=90 is still inside the window at t=120.
        assert!(!dedup.should_process("/b.png", 130));
    }
}

//! Item lifecycle helpers.
//!
//! A tracked item is in exactly one of three live states, derived from its
//! persisted fields. The terminal Deleted state has no representation here:
//! deletion removes the row.

use crate::types::UnixMillis;

/// Live lifecycle state of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Persisted, no deadline, not kept. Awaiting a decision.
    Unmarked,
    /// Deadline set; a deletion countdown is (or should be) running.
    Marked,
    /// Explicitly protected by the user; never scheduled.
    Kept,
}

/// Derive the lifecycle state from the persisted fields.
///
/// `is_kept` wins over any stale deadline value: a kept item is Kept even
/// if a writer raced and left a deadline behind.
pub fn lifecycle_state(is_kept: bool, deletion_timestamp: Option<UnixMillis>) -> LifecycleState {
    if is_kept {
        LifecycleState::Kept
    } else if deletion_timestamp.is_some() {
        LifecycleState::Marked
    } else {
        LifecycleState::Unmarked
    }
}

/// Returns `true` if the item is eligible for immediate deletion:
/// marked, not kept, and its deadline is in the past.
pub fn is_expired(
    is_kept: bool,
    deletion_timestamp: Option<UnixMillis>,
    now: UnixMillis,
) -> bool {
    !is_kept && matches!(deletion_timestamp, Some(deadline) if deadline <= now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmarked_when_no_deadline_and_not_kept() {
        assert_eq!(lifecycle_state(false, None), LifecycleState::Unmarked);
    }

    #[test]
    fn marked_when_deadline_set() {
        assert_eq!(lifecycle_state(false, Some(1)), LifecycleState::Marked);
    }

    #[test]
    fn kept_wins_over_stale_deadline() {
        assert_eq!(lifecycle_state(true, Some(1)), LifecycleState::Kept);
    }

    #[test]
    fn expired_when_deadline_passed() {
        assert!(is_expired(false, Some(999), 1_000));
        assert!(is_expired(false, Some(1_000), 1_000));
    }

    #[test]
    fn not_expired_before_deadline() {
        assert!(!is_expired(false, Some(1_001), 1_000));
    }

    #[test]
    fn kept_item_never_expires() {
        assert!(!is_expired(true, Some(1), 1_000));
    }

    #[test]
    fn unscheduled_item_never_expires() {
        assert!(!is_expired(false, None, i64::MAX));
    }
}

//! Reconciliation sweep.
//!
//! A fixed-interval background loop that keeps the scheduler honest against
//! the store:
//!
//! 1. retires every item whose persisted deadline has passed — the
//!    crash-recovery backstop that makes deletion latency independent of
//!    in-memory timer survival;
//! 2. disarms any in-memory timer whose item is no longer marked — covers
//!    keep/unmark operations performed out of band (e.g. another process
//!    writing the same store).

use std::collections::HashSet;
use std::time::Duration;

use snapsweep_core::types::now_ms;
use snapsweep_db::repositories::MediaItemRepo;
use tokio_util::sync::CancellationToken;

use crate::DeletionScheduler;

/// Default sweep cadence.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Run the sweep loop until `cancel` is triggered.
///
/// `interval` is injectable so tests can run tight cycles; production
/// callers pass [`SWEEP_INTERVAL`].
pub async fn run(scheduler: DeletionScheduler, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Sweep loop started");
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sweep loop stopping");
                break;
            }
            _ = ticker.tick() => {
                sweep_once(&scheduler).await;
            }
        }
    }
}

/// One reconciliation pass. Per-item failures are logged and never stop
/// the pass; one item's persistence failure must not halt the rest.
pub async fn sweep_once(scheduler: &DeletionScheduler) {
    // (a) Retire everything past its persisted deadline.
    match MediaItemRepo::query_expired(scheduler.pool(), now_ms()).await {
        Ok(expired) => {
            for item in expired {
                match scheduler.retire_expired(item.id).await {
                    Ok(true) => tracing::debug!(id = item.id, "Sweep retired expired item"),
                    // Lost the race to a live timer or explicit delete.
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!(id = item.id, error = %e, "Sweep failed to retire item");
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Sweep expired-items query failed");
        }
    }

    // (b) Disarm timers whose items are no longer marked.
    match MediaItemRepo::query_marked(scheduler.pool()).await {
        Ok(marked) => {
            let marked_ids: HashSet<_> = marked.iter().map(|m| m.id).collect();
            for id in scheduler.armed_ids() {
                if !marked_ids.contains(&id) {
                    scheduler.disarm(id);
                    tracing::debug!(id, "Sweep disarmed stale timer");
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Sweep marked-items query failed");
        }
    }
}

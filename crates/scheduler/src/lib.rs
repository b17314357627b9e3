//! Deletion scheduling: one cancellable countdown per marked item, a
//! periodic reconciliation sweep, and an idempotent delete-and-retire
//! operation.
//!
//! The store is the single source of truth. In-memory timers are transient
//! acceleration: they give low-latency deletion while the process lives,
//! and the [`sweep`] loop guarantees bounded-latency eventual deletion from
//! persisted deadlines alone after a crash. Retirement races (timer vs
//! sweep vs explicit delete) are linearized by the store's
//! compare-and-delete: whichever caller removes the row publishes the one
//! `ItemDeleted` event, every other caller no-ops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use snapsweep_core::types::{now_ms, DbId, UnixMillis};
use snapsweep_db::models::MediaItem;
use snapsweep_db::repositories::MediaItemRepo;
use snapsweep_db::DbPool;
use snapsweep_events::{EventBus, MediaEvent};
use tokio_util::sync::CancellationToken;

pub mod retire;
pub mod sweep;

/// Cadence of countdown refresh events while a deletion timer runs.
const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// One armed item: a token cancelling both its deletion timer and its
/// countdown publisher, plus the generation that spawned them.
struct ArmedEntry {
    generation: u64,
    cancel: CancellationToken,
}

struct SchedulerInner {
    pool: DbPool,
    bus: Arc<EventBus>,
    /// id → armed tasks. `arm`/`disarm` are the only mutators; no await
    /// point ever holds the lock.
    timers: Mutex<HashMap<DbId, ArmedEntry>>,
    /// Distinguishes a task's own map entry from a replacement after
    /// re-arming, so a finished timer never tears down its successor.
    generation: AtomicU64,
}

/// Owns the per-item deletion timers. Cheaply cloneable.
#[derive(Clone)]
pub struct DeletionScheduler {
    inner: Arc<SchedulerInner>,
}

impl DeletionScheduler {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                pool,
                bus,
                timers: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.inner.pool
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.inner.bus
    }

    // ── Arm / disarm ──────────────────────────────────────────────────

    /// Start (or restart) the deletion countdown for `id`.
    ///
    /// Cancels any previously armed tasks for the same id, then spawns a
    /// deletion timer that sleeps until `deadline` and retires the item,
    /// and a countdown publisher that emits an `ItemUpdated` with the
    /// remaining time every second until the timer resolves. A deadline
    /// already in the past retires immediately.
    pub fn arm(&self, id: DbId, deadline: UnixMillis) {
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();

        {
            let mut timers = self.inner.timers.lock().unwrap();
            if let Some(previous) = timers.insert(
                id,
                ArmedEntry {
                    generation,
                    cancel: cancel.clone(),
                },
            ) {
                previous.cancel.cancel();
            }
        }

        tracing::debug!(id, deadline, "Armed deletion timer");

        // Deletion timer.
        let scheduler = self.clone();
        let timer_token = cancel.clone();
        tokio::spawn(async move {
            let wait_ms = deadline.saturating_sub(now_ms()).max(0) as u64;
            tokio::select! {
                _ = timer_token.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_millis(wait_ms)) => {}
            }
            if let Err(e) = scheduler.retire_expired(id).await {
                tracing::error!(id, error = %e, "Deletion timer failed to retire item");
            }
            scheduler.release(id, generation);
        });

        // Countdown publisher.
        let scheduler = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(COUNTDOWN_TICK);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        match MediaItemRepo::find_by_id(scheduler.pool(), id).await {
                            Ok(Some(item)) => {
                                let remaining = deadline.saturating_sub(now_ms()).max(0);
                                scheduler.inner.bus.publish(MediaEvent::ItemUpdated {
                                    item,
                                    remaining_ms: Some(remaining),
                                });
                            }
                            // Row gone: the item was retired or kept away
                            // out of band.
                            Ok(None) => break,
                            // A single failed tick must not stop the
                            // countdown.
                            Err(e) => {
                                tracing::warn!(id, error = %e, "Countdown tick failed");
                            }
                        }
                    }
                }
            }
        });
    }

    /// Cancel both tasks for `id` if armed. Returns `true` if a timer
    /// existed.
    pub fn disarm(&self, id: DbId) -> bool {
        let entry = self.inner.timers.lock().unwrap().remove(&id);
        match entry {
            Some(entry) => {
                entry.cancel.cancel();
                tracing::debug!(id, "Disarmed deletion timer");
                true
            }
            None => false,
        }
    }

    /// Remove the map entry for a finished timer, unless a re-arm already
    /// replaced it with a newer generation.
    fn release(&self, id: DbId, generation: u64) {
        let mut timers = self.inner.timers.lock().unwrap();
        if let Some(entry) = timers.get(&id) {
            if entry.generation == generation {
                entry.cancel.cancel();
                timers.remove(&id);
            }
        }
    }

    /// Whether an in-memory timer is currently armed for `id`.
    pub fn has_timer(&self, id: DbId) -> bool {
        self.inner.timers.lock().unwrap().contains_key(&id)
    }

    /// Ids with armed in-memory timers.
    pub fn armed_ids(&self) -> Vec<DbId> {
        self.inner.timers.lock().unwrap().keys().copied().collect()
    }

    // ── Retirement ────────────────────────────────────────────────────

    /// Delete-and-retire for an expired item, invoked by a fired timer or
    /// by the sweep.
    ///
    /// The record removal is the claim: a compare-and-delete conditioned
    /// on the item still being expired and not kept. Of any number of
    /// concurrent invocations exactly one wins; the rest — and any
    /// invocation racing a keep/unmark — observe zero rows affected and
    /// return `Ok(false)`. Only the winner attempts the physical deletion
    /// and publishes `ItemDeleted`, so neither is ever duplicated.
    pub async fn retire_expired(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let item = match MediaItemRepo::find_by_id(self.pool(), id).await? {
            Some(item) => item,
            None => return Ok(false),
        };

        if !MediaItemRepo::delete_expired(self.pool(), id, now_ms()).await? {
            return Ok(false);
        }
        self.finish_retirement(item).await;
        Ok(true)
    }

    /// Immediate, unconditional retirement: the DeleteNow command.
    ///
    /// Disarms any running countdown first, then claims the row without
    /// the expiry condition. Returns `Ok(false)` if the record no longer
    /// exists.
    pub async fn delete_now(&self, id: DbId) -> Result<bool, sqlx::Error> {
        self.disarm(id);
        let item = match MediaItemRepo::find_by_id(self.pool(), id).await? {
            Some(item) => item,
            None => return Ok(false),
        };

        if !MediaItemRepo::delete_by_id(self.pool(), id).await? {
            return Ok(false);
        }
        self.finish_retirement(item).await;
        Ok(true)
    }

    /// Post-claim half of retirement: best-effort physical deletion, task
    /// teardown, and the single `ItemDeleted` event.
    ///
    /// A failed physical deletion never resurrects the record — a missing
    /// or undeletable file must not leave a permanently tracked item.
    async fn finish_retirement(&self, item: MediaItem) {
        if let Err(e) = retire::delete_media_file(&item).await {
            tracing::warn!(
                id = item.id,
                path = %item.file_path,
                error = %e,
                "Physical deletion failed; record already retired"
            );
        }
        // Tear down armed tasks so no further countdown events are
        // published for a retired item.
        self.disarm(item.id);
        self.inner.bus.publish(MediaEvent::ItemDeleted { id: item.id });
        tracing::info!(id = item.id, path = %item.file_path, "Item retired");
    }

    // ── Restart recovery ──────────────────────────────────────────────

    /// Re-arm timers for every marked item in the store.
    ///
    /// Called once at startup: persisted deadlines survive a restart,
    /// in-memory timers do not. Expired items retire on their immediate
    /// timer fire.
    pub async fn rearm_marked(&self) -> Result<usize, sqlx::Error> {
        let marked = MediaItemRepo::query_marked(self.pool()).await?;
        let count = marked.len();
        for item in marked {
            if let Some(deadline) = item.deletion_timestamp {
                self.arm(item.id, deadline);
            }
        }
        Ok(count)
    }
}

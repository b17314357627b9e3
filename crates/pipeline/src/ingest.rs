//! The ingestion pipeline: single consumer of platform change signals.
//!
//! Per signal: classify → deduplicate → resolve metadata → readability
//! check → insert → publish events → (automatic mode) hand off to the
//! deletion scheduler. Failures affect only the signal being processed;
//! the loop itself never stops on a bad item.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use snapsweep_core::classify::{classify, Classification};
use snapsweep_core::config::SharedSettings;
use snapsweep_core::dedup::Deduplicator;
use snapsweep_core::types::now_ms;
use snapsweep_db::models::NewMediaItem;
use snapsweep_db::repositories::MediaItemRepo;
use snapsweep_db::DbPool;
use snapsweep_events::{EventBus, MediaEvent};
use snapsweep_scheduler::DeletionScheduler;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One wait-and-retry for files the OS has not finished writing.
const NOT_READY_RETRY: Duration = Duration::from_millis(500);

/// A platform change notification for a single path.
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    pub path: PathBuf,
}

/// Consumes change signals and turns in-scope files into tracked items.
pub struct IngestionPipeline {
    pool: DbPool,
    bus: Arc<EventBus>,
    scheduler: DeletionScheduler,
    settings: SharedSettings,
    dedup: Deduplicator,
}

impl IngestionPipeline {
    pub fn new(
        pool: DbPool,
        bus: Arc<EventBus>,
        scheduler: DeletionScheduler,
        settings: SharedSettings,
    ) -> Self {
        Self {
            pool,
            bus,
            scheduler,
            settings,
            dedup: Deduplicator::new(),
        }
    }

    /// Run until `cancel` fires or the signal channel closes.
    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<ChangeSignal>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Ingestion pipeline started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Ingestion pipeline stopping");
                    break;
                }
                signal = rx.recv() => match signal {
                    Some(signal) => {
                        if let Err(e) = self.process(signal.path).await {
                            tracing::error!(error = %e, "Failed to process change signal");
                        }
                    }
                    None => {
                        tracing::info!("Change channel closed, ingestion pipeline stopping");
                        break;
                    }
                }
            }
        }
    }

    /// Handle one change signal end to end.
    pub async fn process(&mut self, path: PathBuf) -> Result<(), sqlx::Error> {
        let folders = self.settings.read().unwrap().watched_folders.clone();

        let mut classification = classify(&path, &folders);
        if classification == Classification::NotReady {
            // The OS is still flushing; re-query once, then drop silently.
            tokio::time::sleep(NOT_READY_RETRY).await;
            classification = classify(&path, &folders);
        }
        match classification {
            Classification::Accepted(_) => {}
            Classification::NotReady => {
                tracing::debug!(path = %path.display(), "Still pending after retry, dropping");
                return Ok(());
            }
            Classification::Rejected(reason) => {
                tracing::trace!(path = %path.display(), ?reason, "Out of scope");
                return Ok(());
            }
        }

        let key = path.to_string_lossy().into_owned();
        let now = now_ms();
        if !self.dedup.should_process(&key, now) {
            tracing::debug!(path = %key, "Duplicate detection suppressed");
            return Ok(());
        }
        self.dedup.prune(now);

        // Guard against notifications that fire before content is flushed:
        // require a non-empty readable file, waiting once before giving up.
        // A dropped file is picked up by the next full rescan.
        let file_size = match self.readable_size(&path).await {
            Some(size) => size,
            None => {
                tracing::warn!(path = %key, "File unreadable after retry, dropping");
                return Ok(());
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.clone());
        let new_item = NewMediaItem {
            file_path: key.clone(),
            file_name,
            file_size,
            created_at: now_ms(),
            content_uri: None,
            thumbnail_path: None,
        };

        let id = match MediaItemRepo::insert(&self.pool, &new_item).await? {
            Some(id) => id,
            None => {
                tracing::debug!(path = %key, "Path already tracked");
                return Ok(());
            }
        };

        self.bus.publish(MediaEvent::ItemDetected { path: key.clone() });
        if let Some(item) = MediaItemRepo::find_by_id(&self.pool, id).await? {
            self.bus.publish(MediaEvent::ItemAdded { item });
        }
        tracing::info!(id, path = %key, "New media item tracked");

        let (manual_mode, notifications_enabled, delay_ms) = {
            let s = self.settings.read().unwrap();
            (s.manual_mode, s.notifications_enabled, s.deletion_delay_ms)
        };

        // Manual mode hands the decision to the user — but only when a
        // decision surface exists. With notifications off the item would
        // sit untracked forever, so fall back to an automatic schedule.
        let schedule_now = !manual_mode || !notifications_enabled;
        if schedule_now {
            let deadline = now_ms() + delay_ms;
            if MediaItemRepo::schedule_deletion(&self.pool, id, deadline, None).await? {
                self.scheduler.arm(id, deadline);
                tracing::debug!(id, deadline, "Automatic deletion scheduled");
            }
        }

        Ok(())
    }

    /// Size of the file if it is readable and non-empty, retrying once.
    async fn readable_size(&self, path: &std::path::Path) -> Option<i64> {
        for attempt in 0..2 {
            if attempt > 0 {
                tokio::time::sleep(NOT_READY_RETRY).await;
            }
            match tokio::fs::metadata(path).await {
                Ok(meta) if meta.len() > 0 => return Some(meta.len() as i64),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Metadata read failed");
                }
            }
        }
        None
    }
}

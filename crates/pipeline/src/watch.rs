//! Filesystem change watcher.
//!
//! Wraps a `notify::RecommendedWatcher` whose callback does nothing but
//! forward created/modified paths into the ingest channel. Replacing the
//! folder set swaps the whole watcher; dropping the old one unregisters
//! its watches.

use std::path::PathBuf;
use std::sync::Mutex;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::ingest::ChangeSignal;

/// Watches the configured folders and feeds the ingestion pipeline.
pub struct FolderWatcher {
    tx: mpsc::UnboundedSender<ChangeSignal>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FolderWatcher {
    pub fn new(tx: mpsc::UnboundedSender<ChangeSignal>) -> Self {
        Self {
            tx,
            watcher: Mutex::new(None),
        }
    }

    /// Watch `folders`, replacing any previous registration.
    ///
    /// A folder that cannot be watched is logged and skipped — partial
    /// watching is permitted, and the periodic rescan covers the gap.
    /// Only watcher construction itself is fatal.
    pub fn watch(&self, folders: &[PathBuf]) -> notify::Result<()> {
        let tx = self.tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        for path in event.paths {
                            // Err only means the pipeline is shutting down.
                            let _ = tx.send(ChangeSignal { path });
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Filesystem watch error");
                }
            },
            Config::default(),
        )?;

        for folder in folders {
            match watcher.watch(folder, RecursiveMode::Recursive) {
                Ok(()) => tracing::info!(folder = %folder.display(), "Watching folder"),
                Err(e) => {
                    tracing::error!(
                        folder = %folder.display(),
                        error = %e,
                        "Cannot watch folder; relying on rescan"
                    );
                }
            }
        }

        // The previous watcher (if any) drops here, unwatching its folders.
        *self.watcher.lock().unwrap() = Some(watcher);
        Ok(())
    }

    /// Stop watching everything.
    pub fn stop(&self) {
        *self.watcher.lock().unwrap() = None;
    }
}

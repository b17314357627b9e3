//! Full library rescan.
//!
//! Enumerates all in-scope media under the watched folders, diffs against
//! the tracked paths, and inserts whatever is missing. Runs at startup,
//! when the watched-folder set changes, and on explicit request. Emits one
//! aggregate `LibraryRescanned` event — never one event per discovered
//! file.

use std::collections::HashSet;
use std::path::PathBuf;

use snapsweep_core::classify::{classify, Classification};
use snapsweep_core::config::SharedSettings;
use snapsweep_core::types::now_ms;
use snapsweep_db::models::NewMediaItem;
use snapsweep_db::repositories::MediaItemRepo;
use snapsweep_db::DbPool;
use snapsweep_events::{EventBus, MediaEvent};
use walkdir::WalkDir;

/// Run one full rescan. Returns the number of newly tracked items.
///
/// Already-tracked paths are skipped by the diff and, should a detection
/// race past it, absorbed by the idempotent insert.
pub async fn run_rescan(
    pool: &DbPool,
    bus: &EventBus,
    settings: &SharedSettings,
) -> Result<u64, sqlx::Error> {
    let folders = settings.read().unwrap().watched_folders.clone();

    let discovered = match tokio::task::spawn_blocking(move || enumerate_media(&folders)).await {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!(error = %e, "Rescan enumeration task failed");
            Vec::new()
        }
    };

    let existing: HashSet<String> = MediaItemRepo::all_paths(pool).await?.into_iter().collect();

    let mut added = 0u64;
    for path in discovered {
        let key = path.to_string_lossy().into_owned();
        if existing.contains(&key) {
            continue;
        }
        // Skip entries that vanished or are still empty; a later rescan
        // or change signal picks them up once readable.
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > 0 => meta,
            _ => continue,
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.clone());
        let inserted = MediaItemRepo::insert(
            pool,
            &NewMediaItem {
                file_path: key,
                file_name,
                file_size: meta.len() as i64,
                created_at: now_ms(),
                content_uri: None,
                thumbnail_path: None,
            },
        )
        .await?;
        if inserted.is_some() {
            added += 1;
        }
    }

    bus.publish(MediaEvent::LibraryRescanned { added });
    tracing::info!(added, "Library rescan complete");
    Ok(added)
}

/// Walk the watched folders and collect every in-scope media file.
fn enumerate_media(folders: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for folder in folders {
        for entry in WalkDir::new(folder)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if matches!(classify(entry.path(), folders), Classification::Accepted(_)) {
                out.push(entry.into_path());
            }
        }
    }
    out
}

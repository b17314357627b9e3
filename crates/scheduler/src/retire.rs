//! Best-effort physical deletion of a tracked media file.

use std::io;
use std::path::Path;

use snapsweep_db::models::MediaItem;

/// Delete the file behind `item`.
///
/// The platform content handle is preferred over the raw path (it stays
/// valid under scoped-storage style restrictions); the raw path is the
/// fallback. A file that no longer exists counts as already deleted.
pub async fn delete_media_file(item: &MediaItem) -> io::Result<()> {
    if let Some(uri) = &item.content_uri {
        let target = uri.strip_prefix("file://").unwrap_or(uri);
        match remove_if_exists(Path::new(target)).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::debug!(
                    id = item.id,
                    uri = %uri,
                    error = %e,
                    "Content handle deletion failed, falling back to path"
                );
            }
        }
    }
    remove_if_exists(Path::new(&item.file_path)).await
}

/// Remove `path`, treating an already-missing file as success.
async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Repository for `media_items`.
//!
//! All lifecycle transitions are single UPDATE/DELETE statements whose
//! `rows_affected` tells the caller whether it won a race. The row DELETE
//! in [`MediaItemRepo::delete_by_id`] is the linearization point for
//! retirement: of any number of concurrent retire attempts, exactly one
//! observes `rows_affected == 1`.

use sqlx::SqlitePool;
use snapsweep_core::types::{DbId, UnixMillis};

use crate::models::{MediaItem, NewMediaItem};

/// Provides CRUD and lifecycle operations for tracked media items.
pub struct MediaItemRepo;

impl MediaItemRepo {
    // ── Insert ────────────────────────────────────────────────────────

    /// Insert a newly detected item, starting unmarked and not kept.
    ///
    /// Idempotent on `file_path`: if the path is already tracked the insert
    /// is a no-op and `None` is returned. Rediscovery never resets
    /// `is_kept` or `deletion_timestamp`; a metadata refresh is the
    /// explicit [`MediaItemRepo::refresh_metadata`] update.
    pub async fn insert(pool: &SqlitePool, item: &NewMediaItem) -> Result<Option<DbId>, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO media_items \
             (file_path, file_name, file_size, created_at, content_uri, thumbnail_path) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(file_path) DO NOTHING",
        )
        .bind(&item.file_path)
        .bind(&item.file_name)
        .bind(item.file_size)
        .bind(item.created_at)
        .bind(&item.content_uri)
        .bind(&item.thumbnail_path)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(result.last_insert_rowid()))
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────

    /// Point lookup by id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<MediaItem>, sqlx::Error> {
        sqlx::query_as::<_, MediaItem>("SELECT * FROM media_items WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Point lookup by path.
    pub async fn find_by_path(
        pool: &SqlitePool,
        file_path: &str,
    ) -> Result<Option<MediaItem>, sqlx::Error> {
        sqlx::query_as::<_, MediaItem>("SELECT * FROM media_items WHERE file_path = ?1")
            .bind(file_path)
            .fetch_optional(pool)
            .await
    }

    /// All tracked items, newest detection first.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<MediaItem>, sqlx::Error> {
        sqlx::query_as::<_, MediaItem>("SELECT * FROM media_items ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    /// Every tracked path. Used by the rescan diff.
    pub async fn all_paths(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT file_path FROM media_items")
            .fetch_all(pool)
            .await
    }

    /// Items whose deadline has passed and which are not kept.
    ///
    /// This is the sweep's crash-recovery query: deadlines persist across
    /// restarts even though in-memory timers do not.
    pub async fn query_expired(
        pool: &SqlitePool,
        now: UnixMillis,
    ) -> Result<Vec<MediaItem>, sqlx::Error> {
        sqlx::query_as::<_, MediaItem>(
            "SELECT * FROM media_items \
             WHERE deletion_timestamp IS NOT NULL \
               AND deletion_timestamp <= ?1 \
               AND is_kept = 0 \
             ORDER BY deletion_timestamp",
        )
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// All currently marked items (deadline set, not kept).
    pub async fn query_marked(pool: &SqlitePool) -> Result<Vec<MediaItem>, sqlx::Error> {
        sqlx::query_as::<_, MediaItem>(
            "SELECT * FROM media_items \
             WHERE deletion_timestamp IS NOT NULL AND is_kept = 0 \
             ORDER BY deletion_timestamp",
        )
        .fetch_all(pool)
        .await
    }

    // ── Lifecycle transitions ─────────────────────────────────────────

    /// Mark the item for deletion at `deadline`.
    ///
    /// The `is_kept = 0` guard enforces the invariant that a kept item is
    /// never scheduled. Returns `false` if the row is missing or kept.
    pub async fn schedule_deletion(
        pool: &SqlitePool,
        id: DbId,
        deadline: UnixMillis,
        work_id: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_items \
             SET deletion_timestamp = ?2, deletion_work_id = ?3 \
             WHERE id = ?1 AND is_kept = 0",
        )
        .bind(id)
        .bind(deadline)
        .bind(work_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the deadline without keeping (explicit unmark).
    pub async fn clear_schedule(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_items \
             SET deletion_timestamp = NULL, deletion_work_id = NULL \
             WHERE id = ?1 AND is_kept = 0",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Protect the item: sets `is_kept` and clears any deadline in one
    /// statement so the two fields can never disagree.
    pub async fn keep(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_items \
             SET is_kept = 1, deletion_timestamp = NULL, deletion_work_id = NULL \
             WHERE id = ?1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop protection, returning the item to the unmarked state.
    ///
    /// Returns `false` if the row is missing or was not kept.
    pub async fn unkeep(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_items \
             SET is_kept = 0, deletion_timestamp = NULL \
             WHERE id = ?1 AND is_kept = 1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Explicit metadata refresh for a rediscovered path.
    pub async fn refresh_metadata(
        pool: &SqlitePool,
        id: DbId,
        file_size: i64,
        thumbnail_path: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE media_items \
             SET file_size = ?2, thumbnail_path = COALESCE(?3, thumbnail_path) \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(file_size)
        .bind(thumbnail_path)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Retirement ────────────────────────────────────────────────────

    /// Compare-and-delete: remove the row if it still exists.
    ///
    /// Returns `true` only for the single caller whose DELETE removed the
    /// row; concurrent retire attempts observe `false` and must no-op.
    pub async fn delete_by_id(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-delete for timer/sweep retirement: the row is removed
    /// only if it is still expired (deadline passed, not kept) at `now`.
    ///
    /// A keep or re-mark that lands between a timer firing and this call
    /// makes the DELETE affect zero rows, so the retirement becomes a
    /// no-op instead of destroying a protected item.
    pub async fn delete_expired(
        pool: &SqlitePool,
        id: DbId,
        now: UnixMillis,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM media_items \
             WHERE id = ?1 \
               AND is_kept = 0 \
               AND deletion_timestamp IS NOT NULL \
               AND deletion_timestamp <= ?2",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Repository for the single-row `settings` table.

use sqlx::SqlitePool;
use snapsweep_core::config::WatchSettings;

use crate::models::SettingsRow;

/// Loads and persists runtime watch settings.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Load the settings row (seeded by migration, id = 1).
    pub async fn get(pool: &SqlitePool) -> Result<WatchSettings, sqlx::Error> {
        let row = sqlx::query_as::<_, SettingsRow>("SELECT * FROM settings WHERE id = 1")
            .fetch_one(pool)
            .await?;
        Ok(row.to_watch_settings())
    }

    /// Persist the full settings struct.
    pub async fn update(pool: &SqlitePool, settings: &WatchSettings) -> Result<(), sqlx::Error> {
        let folders = serde_json::to_string(&settings.watched_folders)
            .unwrap_or_else(|_| "[]".to_string());
        sqlx::query(
            "UPDATE settings \
             SET deletion_delay_ms = ?1, manual_mode = ?2, \
                 watched_folders = ?3, notifications_enabled = ?4 \
             WHERE id = 1",
        )
        .bind(settings.deletion_delay_ms)
        .bind(settings.manual_mode)
        .bind(&folders)
        .bind(settings.notifications_enabled)
        .execute(pool)
        .await?;
        Ok(())
    }
}

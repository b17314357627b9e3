//! The single-row `settings` model.

use std::path::PathBuf;

use serde::Serialize;
use snapsweep_core::config::WatchSettings;

/// Raw settings row. `watched_folders` is a JSON array of absolute paths.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SettingsRow {
    pub id: i64,
    pub deletion_delay_ms: i64,
    pub manual_mode: bool,
    pub watched_folders: String,
    pub notifications_enabled: bool,
}

impl SettingsRow {
    /// Decode into the domain settings struct.
    ///
    /// A malformed folder list is treated as empty rather than failing the
    /// whole settings load; the next settings write repairs the column.
    pub fn to_watch_settings(&self) -> WatchSettings {
        let watched_folders: Vec<PathBuf> = serde_json::from_str(&self.watched_folders)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Malformed watched_folders column, treating as empty");
                Vec::new()
            });
        WatchSettings {
            deletion_delay_ms: self.deletion_delay_ms,
            manual_mode: self.manual_mode,
            watched_folders,
            notifications_enabled: self.notifications_enabled,
        }
    }
}

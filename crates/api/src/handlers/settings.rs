//! Handlers for `/settings` and `/rescan`.

use std::path::PathBuf;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use snapsweep_core::config::WatchSettings;
use snapsweep_db::repositories::SettingsRepo;

use crate::error::{AppError, AppResult};
use crate::state::{AppState, RescanRequest};

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub deletion_delay_ms: Option<i64>,
    pub manual_mode: Option<bool>,
    pub watched_folders: Option<Vec<PathBuf>>,
    pub notifications_enabled: Option<bool>,
}

/// GET /api/v1/settings
pub async fn get(State(state): State<AppState>) -> Json<WatchSettings> {
    let settings = state.settings.read().unwrap().clone();
    Json(settings)
}

/// PUT /api/v1/settings
///
/// Persists the merged settings, updates the shared in-memory copy, and
/// triggers a rescan (plus watcher re-registration) when the folder set
/// changed.
pub async fn update(
    State(state): State<AppState>,
    Json(input): Json<UpdateSettingsRequest>,
) -> AppResult<Json<WatchSettings>> {
    if let Some(delay_ms) = input.deletion_delay_ms {
        if delay_ms <= 0 {
            return Err(AppError::BadRequest(
                "deletion_delay_ms must be positive".to_string(),
            ));
        }
    }
    if let Some(folders) = &input.watched_folders {
        if let Some(relative) = folders.iter().find(|f| !f.is_absolute()) {
            return Err(AppError::BadRequest(format!(
                "Watched folders must be absolute paths: {}",
                relative.display()
            )));
        }
    }

    let mut updated = state.settings.read().unwrap().clone();
    let mut folders_changed = false;
    if let Some(delay_ms) = input.deletion_delay_ms {
        updated.deletion_delay_ms = delay_ms;
    }
    if let Some(manual_mode) = input.manual_mode {
        updated.manual_mode = manual_mode;
    }
    if let Some(folders) = input.watched_folders {
        folders_changed = folders != updated.watched_folders;
        updated.watched_folders = folders;
    }
    if let Some(notifications_enabled) = input.notifications_enabled {
        updated.notifications_enabled = notifications_enabled;
    }

    SettingsRepo::update(&state.pool, &updated).await?;
    *state.settings.write().unwrap() = updated.clone();
    tracing::info!(folders_changed, "Settings updated");

    if folders_changed {
        // Err only means the rescan task is gone (shutdown in progress).
        let _ = state.rescan_tx.send(RescanRequest);
    }

    Ok(Json(updated))
}

/// POST /api/v1/rescan — request a full library rescan.
pub async fn rescan(State(state): State<AppState>) -> StatusCode {
    let _ = state.rescan_tx.send(RescanRequest);
    StatusCode::ACCEPTED
}

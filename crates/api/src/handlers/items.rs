//! Handlers for the `/items` resource: the item command surface.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use snapsweep_core::error::CoreError;
use snapsweep_core::types::{now_ms, DbId};
use snapsweep_db::models::MediaItem;
use snapsweep_db::repositories::MediaItemRepo;
use snapsweep_events::MediaEvent;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "MediaItem",
        id,
    })
}

/// GET /api/v1/items
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<MediaItem>>> {
    let items = MediaItemRepo::list_all(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/v1/items/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MediaItem>> {
    let item = MediaItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// Body for the mark command. Without a delay the configured one applies.
#[derive(Debug, Default, Deserialize)]
pub struct MarkRequest {
    pub delay_ms: Option<i64>,
}

/// POST /api/v1/items/{id}/mark — schedule deletion after a delay.
pub async fn mark(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<MarkRequest>>,
) -> AppResult<Json<MediaItem>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();

    let item = MediaItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if item.is_kept {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot mark a kept item for deletion".to_string(),
        )));
    }

    let delay_ms = input
        .delay_ms
        .unwrap_or_else(|| state.settings.read().unwrap().deletion_delay_ms);
    if delay_ms <= 0 {
        return Err(AppError::BadRequest(
            "delay_ms must be positive".to_string(),
        ));
    }

    let deadline = now_ms() + delay_ms;
    let scheduled =
        MediaItemRepo::schedule_deletion(&state.pool, id, deadline, None).await?;
    if !scheduled {
        // The record was kept or retired between the lookup and the update.
        return Err(AppError::Core(CoreError::Conflict(
            "Item changed concurrently and cannot be marked".to_string(),
        )));
    }
    state.scheduler.arm(id, deadline);

    let item = MediaItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /api/v1/items/{id}/keep — protect the item from deletion.
pub async fn keep(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MediaItem>> {
    // Persist first: the store is the source of truth the timer race is
    // decided against. Disarming second is safe either way.
    if !MediaItemRepo::keep(&state.pool, id).await? {
        return Err(not_found(id));
    }
    state.scheduler.disarm(id);

    let item = MediaItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.event_bus.publish(MediaEvent::ItemUpdated {
        item: item.clone(),
        remaining_ms: None,
    });
    Ok(Json(item))
}

/// POST /api/v1/items/{id}/unkeep — drop protection, back to unmarked.
pub async fn unkeep(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MediaItem>> {
    if !MediaItemRepo::unkeep(&state.pool, id).await? {
        // Distinguish a missing record from one that simply is not kept.
        return match MediaItemRepo::find_by_id(&state.pool, id).await? {
            Some(_) => Err(AppError::Core(CoreError::Conflict(
                "Item is not kept".to_string(),
            ))),
            None => Err(not_found(id)),
        };
    }

    let item = MediaItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.event_bus.publish(MediaEvent::ItemUpdated {
        item: item.clone(),
        remaining_ms: None,
    });
    Ok(Json(item))
}

/// DELETE /api/v1/items/{id} — delete immediately.
pub async fn delete_now(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if state.scheduler.delete_now(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/items/{id}/dismiss — suppress notifications for the item.
pub async fn dismiss(State(state): State<AppState>, Path(id): Path<DbId>) -> StatusCode {
    state.notifications.dismiss(id);
    StatusCode::NO_CONTENT
}

//! Route definitions for the `/items` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

/// Routes mounted at `/items`.
///
/// ```text
/// GET    /               -> list
/// GET    /{id}           -> get_by_id
/// DELETE /{id}           -> delete_now
/// POST   /{id}/mark      -> mark
/// POST   /{id}/keep      -> keep
/// POST   /{id}/unkeep    -> unkeep
/// POST   /{id}/dismiss   -> dismiss
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(items::list))
        .route("/{id}", get(items::get_by_id).delete(items::delete_now))
        .route("/{id}/mark", post(items::mark))
        .route("/{id}/keep", post(items::keep))
        .route("/{id}/unkeep", post(items::unkeep))
        .route("/{id}/dismiss", post(items::dismiss))
}

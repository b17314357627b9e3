pub mod health;
pub mod items;
pub mod settings;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /items                      GET list
/// /items/{id}                 GET get, DELETE delete-now
/// /items/{id}/mark            POST schedule deletion
/// /items/{id}/keep            POST protect
/// /items/{id}/unkeep          POST drop protection
/// /items/{id}/dismiss         POST suppress notifications
///
/// /settings                   GET, PUT
/// /rescan                     POST trigger full rescan
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/items", items::router())
        .nest("/settings", settings::router())
        .route("/rescan", post(handlers::settings::rescan))
}

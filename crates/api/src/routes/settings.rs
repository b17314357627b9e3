//! Route definitions for the `/settings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET /    -> get
/// PUT /    -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(settings::get).put(settings::update))
}

//! Shared helpers for API integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use snapsweep_api::config::ServerConfig;
use snapsweep_api::notifications::NotificationHub;
use snapsweep_api::routes;
use snapsweep_api::state::{AppState, RescanRequest};
use snapsweep_core::config as watch_config;
use snapsweep_db::repositories::SettingsRepo;
use snapsweep_events::EventBus;
use snapsweep_scheduler::DeletionScheduler;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        watch_dirs: Vec::new(),
    }
}

/// A fully wired test application.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    /// Receiver side of the rescan trigger; kept alive so handler sends
    /// succeed and tests can assert on them.
    pub rescan_rx: mpsc::UnboundedReceiver<RescanRequest>,
}

/// Build the application router with the full middleware stack over the
/// given pool, mirroring the construction in `main.rs`.
pub async fn build_test_app(pool: SqlitePool) -> TestApp {
    let config = test_config();
    let watch_settings = SettingsRepo::get(&pool)
        .await
        .expect("settings row must exist after migrations");
    let settings = watch_config::shared(watch_settings);

    let event_bus = Arc::new(EventBus::default());
    let scheduler = DeletionScheduler::new(pool.clone(), Arc::clone(&event_bus));
    let notifications = Arc::new(NotificationHub::new(Arc::clone(&settings)));
    let (rescan_tx, rescan_rx) = mpsc::unbounded_channel();

    let state = AppState {
        pool,
        config: Arc::new(config),
        settings,
        event_bus,
        scheduler,
        notifications,
        rescan_tx,
    };

    let request_id_header = HeaderName::from_static("x-request-id");
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(["http://localhost:5173".parse().unwrap()])
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([CONTENT_TYPE]),
        )
        .with_state(state.clone());

    TestApp {
        app,
        state,
        rescan_rx,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post(app: Router, uri: &str, body: Option<serde_json::Value>) -> Response {
    let request = match body {
        Some(json) => Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn put(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body must be JSON")
}

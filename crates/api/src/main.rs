use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapsweep_api::config::ServerConfig;
use snapsweep_api::notifications::NotificationHub;
use snapsweep_api::state::{AppState, RescanRequest};
use snapsweep_api::routes;
use snapsweep_core::config as watch_config;
use snapsweep_db::repositories::SettingsRepo;
use snapsweep_events::EventBus;
use snapsweep_pipeline::{rescan, FolderWatcher, IngestionPipeline};
use snapsweep_scheduler::{sweep, DeletionScheduler};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "snapsweep_api=debug,snapsweep_scheduler=debug,snapsweep_pipeline=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = snapsweep_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    snapsweep_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    snapsweep_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Settings ---
    let mut watch_settings = SettingsRepo::get(&pool)
        .await
        .expect("Failed to load settings");
    if watch_settings.watched_folders.is_empty() && !config.watch_dirs.is_empty() {
        watch_settings.watched_folders = config.watch_dirs.clone();
        SettingsRepo::update(&pool, &watch_settings)
            .await
            .expect("Failed to seed watched folders");
        tracing::info!(folders = ?watch_settings.watched_folders, "Seeded watched folders");
    }
    let settings = watch_config::shared(watch_settings);

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- Scheduler + restart recovery ---
    let scheduler = DeletionScheduler::new(pool.clone(), Arc::clone(&event_bus));
    match scheduler.rearm_marked().await {
        Ok(rearmed) => tracing::info!(rearmed, "Re-armed persisted deletion timers"),
        Err(e) => tracing::error!(error = %e, "Failed to re-arm persisted timers"),
    }

    let shutdown = CancellationToken::new();

    // --- Notification hub ---
    let notifications = Arc::new(NotificationHub::new(Arc::clone(&settings)));
    let hub = Arc::clone(&notifications);
    let hub_rx = event_bus.subscribe();
    let hub_handle = tokio::spawn(async move { hub.run(hub_rx).await });

    // --- Reconciliation sweep ---
    let sweep_handle = tokio::spawn(sweep::run(
        scheduler.clone(),
        sweep::SWEEP_INTERVAL,
        shutdown.clone(),
    ));

    // --- Ingestion: watcher feeding the pipeline ---
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let watcher = Arc::new(FolderWatcher::new(signal_tx));
    {
        let folders = settings.read().unwrap().watched_folders.clone();
        if let Err(e) = watcher.watch(&folders) {
            tracing::error!(error = %e, "Failed to start folder watcher; relying on rescan");
        }
    }
    let pipeline = IngestionPipeline::new(
        pool.clone(),
        Arc::clone(&event_bus),
        scheduler.clone(),
        Arc::clone(&settings),
    );
    let pipeline_handle = tokio::spawn(pipeline.run(signal_rx, shutdown.clone()));

    // --- Startup rescan ---
    if let Err(e) = rescan::run_rescan(&pool, &event_bus, &settings).await {
        tracing::error!(error = %e, "Startup rescan failed");
    }

    // --- Rescan trigger task ---
    let (rescan_tx, mut rescan_rx) = mpsc::unbounded_channel::<RescanRequest>();
    let rescan_pool = pool.clone();
    let rescan_bus = Arc::clone(&event_bus);
    let rescan_settings = Arc::clone(&settings);
    let rescan_watcher = Arc::clone(&watcher);
    let rescan_shutdown = shutdown.clone();
    let rescan_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = rescan_shutdown.cancelled() => break,
                request = rescan_rx.recv() => match request {
                    Some(RescanRequest) => {
                        let folders = rescan_settings.read().unwrap().watched_folders.clone();
                        if let Err(e) = rescan_watcher.watch(&folders) {
                            tracing::error!(error = %e, "Failed to re-register folder watcher");
                        }
                        if let Err(e) =
                            rescan::run_rescan(&rescan_pool, &rescan_bus, &rescan_settings).await
                        {
                            tracing::error!(error = %e, "Rescan failed");
                        }
                    }
                    None => break,
                }
            }
        }
    });

    tracing::info!("Background services started (sweep, ingestion, notifications, rescan)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        settings,
        event_bus: Arc::clone(&event_bus),
        scheduler,
        notifications,
        rescan_tx,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(build_cors_layer(&config))
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    watcher.stop();
    shutdown.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), pipeline_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), rescan_handle).await;
    tracing::info!("Background services stopped");

    // Drop the event bus sender to close the broadcast channel; this
    // signals the notification hub to shut down.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), hub_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the daemon shuts
/// down cleanly whether stopped interactively or by a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

use std::sync::Arc;

use snapsweep_core::config::SharedSettings;
use snapsweep_events::EventBus;
use snapsweep_scheduler::DeletionScheduler;
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::notifications::NotificationHub;

/// Request to re-run the full library scan (and re-register folder
/// watches). Carried over a channel so handlers never block on I/O-heavy
/// scans.
#[derive(Debug, Clone, Copy)]
pub struct RescanRequest;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: snapsweep_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Shared runtime watch settings.
    pub settings: SharedSettings,
    /// Centralized event bus for lifecycle events.
    pub event_bus: Arc<EventBus>,
    /// Per-item deletion timers.
    pub scheduler: DeletionScheduler,
    /// Outward notification gate (dismissals, enable flag).
    pub notifications: Arc<NotificationHub>,
    /// Trigger for the background rescan task.
    pub rescan_tx: mpsc::UnboundedSender<RescanRequest>,
}

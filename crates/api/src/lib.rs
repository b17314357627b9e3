//! HTTP command surface for snapsweep.
//!
//! Exposes the item command set (mark, keep, unkeep, delete-now, dismiss),
//! settings, rescan, and health over a small axum router, plus the
//! notification hub that consumes the event bus on behalf of external
//! notification collaborators.

pub mod config;
pub mod error;
pub mod handlers;
pub mod notifications;
pub mod routes;
pub mod state;

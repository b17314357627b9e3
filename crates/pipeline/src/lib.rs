//! Media ingestion: filesystem change watching, the single-consumer ingest
//! loop, and the full rescan.
//!
//! The platform watcher only pushes `ChangeSignal`s onto a channel; all
//! classification, deduplication, and persistence happens in the one
//! consumer task, which keeps reasoning about concurrent detections simple.

pub mod ingest;
pub mod rescan;
pub mod watch;

pub use ingest::{ChangeSignal, IngestionPipeline};
pub use watch::FolderWatcher;

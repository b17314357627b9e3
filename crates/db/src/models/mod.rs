//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs the repositories accept.

pub mod media_item;
pub mod settings;

pub use media_item::{MediaItem, NewMediaItem};
pub use settings::SettingsRow;

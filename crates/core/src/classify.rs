//! Media classification: decide whether a changed file is in scope.
//!
//! A file is in scope when it resides under one of the configured watched
//! folders and carries a known image or video extension. Files the OS is
//! still flushing (pending-style markers) classify as [`Classification::NotReady`]
//! so the ingestion pipeline can re-query once after a short delay instead
//! of rejecting them outright.

use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Extension sets
// ---------------------------------------------------------------------------

/// Image extensions considered in scope (lowercase, without the dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "heic"];

/// Video extensions considered in scope (lowercase, without the dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "3gp", "avi"];

/// Marker extensions the OS uses while a file is still being written.
const PENDING_EXTENSIONS: &[&str] = &["tmp", "part", "crdownload"];

/// File-name prefix used by the media index for not-yet-published entries.
const PENDING_PREFIX: &str = ".pending";

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// Broad media category of an accepted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Why a file was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The path is not under any watched folder.
    OutsideWatchedFolders,
    /// The extension is in neither the image nor the video set.
    UnsupportedExtension,
}

/// Outcome of classifying a detected path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// In scope; track this file.
    Accepted(MediaKind),
    /// Still being written by the OS; re-query after a short delay.
    NotReady,
    /// Out of scope; drop the detection.
    Rejected(RejectReason),
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Classify `path` against the currently watched folders.
///
/// Checks, in order: watched-folder containment (component-wise prefix
/// match), pending-write markers, then extension membership.
pub fn classify(path: &Path, watched_folders: &[PathBuf]) -> Classification {
    if !is_under_watched_folder(path, watched_folders) {
        return Classification::Rejected(RejectReason::OutsideWatchedFolders);
    }
    if is_pending(path) {
        return Classification::NotReady;
    }
    match media_kind(path) {
        Some(kind) => Classification::Accepted(kind),
        None => Classification::Rejected(RejectReason::UnsupportedExtension),
    }
}

/// Returns `true` if `path` is under any of `watched_folders`.
pub fn is_under_watched_folder(path: &Path, watched_folders: &[PathBuf]) -> bool {
    watched_folders.iter().any(|folder| path.starts_with(folder))
}

/// Returns `true` if the file carries a pending-write marker: a
/// `.pending`-prefixed name, a transient extension, or a trailing `~`.
pub fn is_pending(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    if name.starts_with(PENDING_PREFIX) || name.ends_with('~') {
        return true;
    }
    matches!(
        extension_lowercase(path),
        Some(ext) if PENDING_EXTENSIONS.contains(&ext.as_str())
    )
}

/// Map the file extension to a [`MediaKind`], or `None` if unsupported.
pub fn media_kind(path: &Path) -> Option<MediaKind> {
    let ext = extension_lowercase(path)?;
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Storage layout for camera snapshots.
//!
//! Each camera keeps one rolling image at `cameras/blink-{slug}-latest.jpg`.
//! The camera a site designates as primary is also copied to
//! [`PRIMARY_SNAPSHOT_PATH`], which the cameras page shows first.

use crate::error::CoreError;

pub const PRIMARY_SNAPSHOT_PATH: &str = "cameras/blink-latest.jpg";

/// Snapshots are replaced every poll, so caches must not hold them long.
pub const SNAPSHOT_CACHE_CONTROL: &str = "max-age=30";

pub const SNAPSHOT_CONTENT_TYPE: &str = "image/jpeg";

/// Anything smaller is a placeholder, not a thumbnail.
pub const MIN_SNAPSHOT_BYTES: usize = 100;

pub const MAX_SNAPSHOT_BYTES: usize = 5 * 1024 * 1024;

const MAX_CAMERA_NAME_LENGTH: usize = 80;

/// Slug used in a camera's snapshot path: lowercase, with spaces and
/// slashes turned into hyphens.
pub fn camera_slug(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_CAMERA_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Camera name must be 1 to {MAX_CAMERA_NAME_LENGTH} characters"
        )));
    }
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '-' } else { c })
        .collect();
    if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(CoreError::Validation(format!(
            "Camera name '{name}' may only contain letters, digits, spaces, hyphens and slashes"
        )));
    }
    Ok(slug)
}

pub fn snapshot_path(slug: &str) -> String {
    format!("cameras/blink-{slug}-latest.jpg")
}

/// Check a snapshot is a plausibly sized JPEG.
pub fn validate_snapshot(content_type: &str, bytes: &[u8]) -> Result<(), CoreError> {
    if content_type != SNAPSHOT_CONTENT_TYPE {
        return Err(CoreError::Validation(format!(
            "Snapshots must be {SNAPSHOT_CONTENT_TYPE}, got '{content_type}'"
        )));
    }
    if bytes.len() < MIN_SNAPSHOT_BYTES {
        return Err(CoreError::Validation(format!(
            "Snapshot of {} bytes is too small to be an image",
            bytes.len()
        )));
    }
    if bytes.len() > MAX_SNAPSHOT_BYTES {
        return Err(CoreError::Validation(format!(
            "Snapshot exceeds the {MAX_SNAPSHOT_BYTES} byte limit"
        )));
    }
    // JPEG start-of-image marker.
    if !bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Err(CoreError::Validation("Snapshot is not a JPEG image".into()));
    }
    Ok(())
}

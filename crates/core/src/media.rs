//! Media upload validation, tag normalisation and per-space ordering.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "application/pdf",
];

/// Maximum upload size (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 40;

/// Maximum number of tags on one media item.
pub const MAX_TAGS: usize = 30;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid tag regex"));

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "spaces";

/// Categories double as the first storage path segment, so they follow the tag rules.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if category.len() <= MAX_TAG_LENGTH && TAG_PATTERN.is_match(category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid category '{category}'. Use lowercase letters, digits and hyphens"
        )))
    }
}

/// Validate the declared content type and size of an upload.
pub fn validate_upload(content_type: &str, size_bytes: usize) -> Result<(), CoreError> {
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported content type '{content_type}'. Allowed: {}",
            ALLOWED_CONTENT_TYPES.join(", ")
        )));
    }
    if size_bytes == 0 {
        return Err(CoreError::Validation("Upload is empty".into()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "Upload of {size_bytes} bytes exceeds the {MAX_UPLOAD_BYTES} byte limit"
        )));
    }
    Ok(())
}

/// Normalise free-form tags: trim, lowercase, spaces to hyphens, dedupe.
///
/// Order of first appearance is preserved. Fails on any tag that is still
/// invalid after normalisation.
pub fn normalize_tags(raw: &[String]) -> Result<Vec<String>, CoreError> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for tag in raw {
        let normalized = tag
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        if normalized.is_empty() {
            continue;
        }
        if normalized.len() > MAX_TAG_LENGTH {
            return Err(CoreError::Validation(format!(
                "Tag '{normalized}' exceeds maximum length of {MAX_TAG_LENGTH}"
            )));
        }
        if !TAG_PATTERN.is_match(&normalized) {
            return Err(CoreError::Validation(format!(
                "Tag '{normalized}' may only contain lowercase letters, digits and hyphens"
            )));
        }
        if seen.insert(normalized.clone()) {
            tags.push(normalized);
        }
    }
    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "Too many tags: {} (max {MAX_TAGS})",
            tags.len()
        )));
    }
    Ok(tags)
}

/// File extension for an allowed content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Object-storage path for a new upload: `{category}/{unix_millis}-{stem}.{ext}`.
///
/// The stem is derived from the original filename, reduced to `[a-z0-9-]`.
pub fn storage_path(category: &str, original_name: &str, content_type: &str, now: Timestamp) -> String {
    let stem = original_name
        .rsplit_once('.')
        .map_or(original_name, |(stem, _)| stem)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>();
    let stem = stem
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };
    format!(
        "{category}/{}-{stem}.{}",
        now.timestamp_millis(),
        extension_for(content_type)
    )
}

/// Validate that `requested` is a permutation of the media currently linked to a space.
pub fn validate_reorder(linked: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let linked_set: HashSet<DbId> = linked.iter().copied().collect();
    let requested_set: HashSet<DbId> = requested.iter().copied().collect();

    if requested_set.len() != requested.len() {
        return Err(CoreError::Validation(
            "Media order contains duplicate ids".into(),
        ));
    }
    if linked_set != requested_set {
        return Err(CoreError::Validation(format!(
            "Media order must list exactly the {} media linked to this space",
            linked.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn categories_are_path_safe() {
        assert!(validate_category("spaces").is_ok());
        assert!(validate_category("move-in-inspections").is_ok());
        assert!(validate_category("../etc").is_err());
        assert!(validate_category("Spaces").is_err());
        assert!(validate_category("").is_err());
    }

    #[test]
    fn upload_validation() {
        assert!(validate_upload("image/jpeg", 1024).is_ok());
        assert_matches!(validate_upload("video/mp4", 1024), Err(CoreError::Validation(_)));
        assert!(validate_upload("image/png", 0).is_err());
        assert!(validate_upload("image/png", MAX_UPLOAD_BYTES + 1).is_err());
    }

    #[test]
    fn tags_are_normalized_and_deduplicated() {
        let raw = vec![
            " Kitchen ".to_string(),
            "garden view".to_string(),
            "kitchen".to_string(),
            "".to_string(),
        ];
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags, vec!["kitchen", "garden-view"]);
    }

    #[test]
    fn tags_with_symbols_rejected() {
        let err = normalize_tags(&["hot-tub!".to_string()]).unwrap_err();
        assert!(err.to_string().contains("hot-tub!"));
    }

    #[test]
    fn storage_path_slugifies_filename() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let path = storage_path("spaces", "Front Porch (1).JPG", "image/jpeg", now);
        assert_eq!(path, format!("spaces/{}-front-porch-1.jpg", now.timestamp_millis()));
    }

    #[test]
    fn storage_path_falls_back_for_symbol_names() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let path = storage_path("misc", "???.png", "image/png", now);
        assert!(path.ends_with("-upload.png"));
    }

    #[test]
    fn reorder_requires_exact_permutation() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_reorder(&[1, 2, 3], &[1, 2]).is_err());
        assert!(validate_reorder(&[1, 2, 3], &[1, 2, 2, 3]).is_err());
        assert!(validate_reorder(&[1, 2], &[1, 9]).is_err());
    }
}

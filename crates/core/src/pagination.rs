//! Limit/offset clamping for list endpoints.

/// Default page size for message and media listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Clamp a user-provided limit into `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(clamp_limit(None, 50, 500), 50);
        assert_eq!(clamp_limit(Some(0), 50, 500), 1);
        assert_eq!(clamp_limit(Some(10_000), 50, 500), 500);
    }

    #[test]
    fn negative_offset_becomes_zero() {
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}

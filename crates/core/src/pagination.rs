//! Limit/offset bounds shared by every list endpoint.

/// Page size used when the client does not pass `limit`.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a user-provided limit to `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

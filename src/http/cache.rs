//! HTTP cache control module
//!
//! Provides `ETag` generation and conditional request handling.

use sha2::{Digest, Sha256};

/// Hex digits of the SHA-256 digest kept in the `ETag`
const ETAG_HASH_LEN: usize = 32;

/// Generate a weak `ETag` from rendered content
///
/// # Returns
/// Weak `ETag` string, e.g., `W/"1f3a...-12"`
pub fn generate_etag(content: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(content));
    format!(
        "W/\"{}-{:x}\"",
        &digest[..ETAG_HASH_LEN],
        content.len()
    )
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Uses weak comparison, so `W/"a"` and `"a"` are equal.
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", W/"def456"`
/// - Wildcard: `*`
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let ours = opaque_tag(etag);
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').map(str::trim).any(|e| e == "*" || opaque_tag(e) == ours)
    })
}

fn opaque_tag(etag: &str) -> &str {
    etag.strip_prefix("W/").unwrap_or(etag)
}

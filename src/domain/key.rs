//! Deterministic content keys for records imported without an id.

use sha2::{Digest, Sha256};

/// Stable key over an ordered list of canonical field values.
///
/// Each part is length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
/// The SHA-256 digest is truncated to 128 bits and hex-encoded.
pub fn content_key(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u32).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    let hash = hasher.finalize();
    format!("{}:{}", prefix, hex::encode(&hash[..16]))
}

//! Deterministic element ids.

use sha2::{Digest, Sha256};

/// First eight hex digits of the SHA-256 of `parts` joined with `:`.
///
/// The same document and ordinal always give the same id, across builds.
pub(crate) fn short_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join(":").as_bytes());
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(8);
    hex
}

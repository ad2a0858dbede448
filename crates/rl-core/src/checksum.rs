//! SHA-256 content hashing for cache keys.

use crate::activity::Activity;
use crate::error::CoreResult;
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
const CONTENT_HASH_LEN: usize = 16;

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Order-independent fingerprint of an activity set.
///
/// Each activity is serialized to JSON with its predecessor and successor
/// lists sorted; the serialized activities are sorted and joined with `|`.
/// Any change to any field of any activity changes the hash, while
/// reordering activities or their dependency lists does not.
pub fn content_hash(activities: &[Activity]) -> CoreResult<String> {
    let mut canonical = activities
        .iter()
        .map(|activity| {
            let mut normalized = activity.clone();
            normalized.predecessors.sort();
            normalized.successors.sort();
            serde_json::to_string(&normalized)
        })
        .collect::<Result<Vec<_>, _>>()?;
    canonical.sort();

    let mut digest = compute_checksum(&canonical.join("|"));
    digest.truncate(CONTENT_HASH_LEN);
    Ok(digest)
}

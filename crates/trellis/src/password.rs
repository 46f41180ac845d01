//! Salted, stretched password digests.
//!
//! The digest is SHA-512 over `password{salt}` (just `password` when the
//! salt is empty), re-hashed until 1000 rounds have run, rendered as
//! lower-case hex.

use std::fmt::Write;

use sha2::{Digest, Sha512};

/// Number of SHA-512 rounds.
pub const ITERATIONS: usize = 1000;

/// Encodes `raw` with `salt`.
///
/// ```rust
/// use trellis::password;
///
/// let stored = password::encode("hunter2", "ada");
/// assert_eq!(stored.len(), 128);
/// assert!(password::is_valid(&stored, "hunter2", "ada"));
/// ```
#[must_use]
pub fn encode(raw: &str, salt: &str) -> String {
    let merged = merge(raw, salt);
    let mut digest = Sha512::digest(merged.as_bytes());
    for _ in 1..ITERATIONS {
        digest = Sha512::digest(digest);
    }

    digest.iter().fold(String::with_capacity(128), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

/// Returns true if `encoded` is the digest of `raw` with `salt`.
///
/// The comparison takes the same time wherever the first difference is.
#[must_use]
pub fn is_valid(encoded: &str, raw: &str, salt: &str) -> bool {
    constant_time_eq(encoded.as_bytes(), encode(raw, salt).as_bytes())
}

fn merge(raw: &str, salt: &str) -> String {
    if salt.is_empty() {
        raw.to_string()
    } else {
        format!("{raw}{{{salt}}}")
    }
}

fn constant_time_eq(expected: &[u8], actual: &[u8]) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    expected
        .iter()
        .zip(actual)
        .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

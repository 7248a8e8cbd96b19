//! Observability for the auth service: metrics and log-safe identifiers.
//!
//! # Privacy by Default
//!
//! Instrumented functions use `#[instrument(skip_all)]` and log only
//! allow-listed fields:
//! - **SAFE**: outcomes, error categories, counts
//! - **HASHED**: subjects/emails, via [`hash_for_correlation`]
//! - **NEVER**: bearer tokens, passwords, the signing secret

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated: enough to follow one subject across log lines, not
/// enough to recover it. Not a substitute for secret hashing.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

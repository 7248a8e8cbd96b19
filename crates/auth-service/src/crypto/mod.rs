//! Cryptographic operations: session token signing/verification and user
//! secret comparison.
//!
//! Session tokens are HS256 JWTs keyed by the process-wide signing secret
//! (see [`TokenCodec`]). User secrets are compared either verbatim through
//! [`SecretComparator`] or against a bcrypt hash, depending on
//! [`SecretPolicy`](crate::config::SecretPolicy).

mod token_codec;

pub use token_codec::{IdentityClaims, IssuedToken, TokenCodec, TokenError};

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AuthError;
use ring::hmac;
use ring::rand::SystemRandom;
use tracing::instrument;

/// Compares submitted secrets against stored plaintext secrets.
///
/// Both sides are bound to a process-local HMAC-SHA256 key: the stored secret
/// is signed and the submitted one is checked with `hmac::verify`, whose tag
/// comparison is constant-time.
#[derive(Debug)]
pub struct SecretComparator {
    key: hmac::Key,
}

impl SecretComparator {
    /// Create a comparator with a freshly generated random key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Crypto` if the system RNG fails.
    pub fn new() -> Result<Self, AuthError> {
        let rng = SystemRandom::new();
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng)
            .map_err(|_| AuthError::Crypto("Failed to generate comparison key".to_string()))?;
        Ok(Self { key })
    }

    /// Exact byte equality of `supplied` and `stored`.
    #[instrument(skip_all)]
    pub fn matches(&self, supplied: &str, stored: &str) -> bool {
        let tag = hmac::sign(&self.key, stored.as_bytes());
        hmac::verify(&self.key, supplied.as_bytes(), tag.as_ref()).is_ok()
    }
}

/// Hash a user secret with bcrypt.
///
/// # Errors
///
/// Returns `AuthError::Crypto` if the cost is outside
/// `MIN_BCRYPT_COST..=MAX_BCRYPT_COST` or hashing fails.
#[instrument(skip_all)]
pub fn hash_secret(secret: &str, cost: u32) -> Result<String, AuthError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(secret, cost)
        .map_err(|e| AuthError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a user secret against a bcrypt hash.
#[instrument(skip_all)]
pub fn verify_hashed_secret(secret: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(secret, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {}", e)))
}

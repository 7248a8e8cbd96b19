//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for session tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

fn decode_segment(token: &str, index: usize) -> Vec<u8> {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no segment {}", index));
    URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

fn decode_claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&decode_segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for session tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("alice@example.com")
///     .assert_expires_in(86_400);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed HS256 JWT with the identity claims
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that `exp - iat` equals the specified number of seconds
    fn assert_expires_in(&self, seconds: u64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header: JwtHeader = serde_json::from_slice(&decode_segment(self, 0))
            .expect("Failed to parse JWT header JSON");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = decode_claims(self);
        assert!(!claims.sub.is_empty(), "JWT subject must not be empty");
        assert!(claims.exp > claims.iat, "JWT must expire after it is issued");

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = decode_claims(self);
        assert_eq!(
            claims.sub, subject,
            "Token subject mismatch. Expected '{}', got '{}'",
            subject, claims.sub
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = decode_claims(self);
        let lifetime = claims.exp - claims.iat;
        assert_eq!(
            lifetime.unsigned_abs(),
            seconds,
            "Token lifetime mismatch. Expected {}s, got {}s",
            seconds,
            lifetime
        );

        self
    }
}

//! Builder patterns for test data construction
//!
//! Provides a fluent API for minting tokens with arbitrary claims, signing
//! keys and algorithms, for exercising the rejection paths of the guard.

use crate::fixtures::TEST_SIGNING_SECRET;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for test session tokens
///
/// # Example
/// ```rust,ignore
/// let forged = TestTokenBuilder::new()
///     .for_user("alice@example.com")
///     .expires_in(3600)
///     .sign_with_secret(b"not-the-server-secret");
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    algorithm: Algorithm,
    now: i64,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults (valid for one hour, HS256)
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("test-subject@example.com"));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now + 3600));

        Self {
            claims,
            algorithm: Algorithm::HS256,
            now,
        }
    }

    /// Set the subject
    pub fn for_user(mut self, subject: &str) -> Self {
        self.claims.insert("sub".to_string(), json!(subject));
        self
    }

    /// Set expiration in seconds from the builder's creation time (negative
    /// for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims
            .insert("exp".to_string(), json!(self.now + seconds));
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.claims.insert("iat".to_string(), json!(timestamp));
        self
    }

    /// Remove a claim entirely
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Sign with a different HMAC algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }

    /// Sign with the test servers' secret
    pub fn sign(self) -> String {
        self.sign_with_secret(TEST_SIGNING_SECRET.as_bytes())
    }

    /// Sign with an arbitrary HMAC secret
    pub fn sign_with_secret(self, secret: &[u8]) -> String {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        encode(
            &header,
            &Value::Object(self.claims),
            &EncodingKey::from_secret(secret),
        )
        .expect("HMAC signing of test claims cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

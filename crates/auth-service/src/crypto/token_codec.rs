//! Signed, expiring session tokens.
//!
//! A token is a compact HS256 JWT carrying `{sub, iat, exp}`. Signing prevents
//! forgery; the claims hold nothing confidential so they are not encrypted.
//! Tokens are not stored anywhere: validity is decided entirely by the
//! signature and `exp`, so the only way to invalidate outstanding tokens
//! early is to rotate the signing secret.

use crate::errors::AuthError;
use crate::observability::metrics::record_token_validation;
use chrono::Utc;
use common::jwt::{check_token_shape, JwtShapeError};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// Token issuance and validation failures.
///
/// `Malformed`, `InvalidSignature` and `Expired` are reported to clients as a
/// single unauthenticated outcome; the split exists for logs and metrics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("invalid token configuration: {0}")]
    InvalidConfiguration(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Bounded label for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::EmptySubject => "empty_subject",
            TokenError::InvalidConfiguration(_) => "configuration",
            TokenError::Signing(_) => "signing",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::Expired => {
                AuthError::Unauthenticated
            }
            TokenError::EmptySubject
            | TokenError::InvalidConfiguration(_)
            | TokenError::Signing(_) => AuthError::Crypto(err.to_string()),
        }
    }
}

/// Identity claim embedded in every session token.
///
/// `sub` is the user's email, which is PII; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (canonical user identifier)
    pub sub: String,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds. Invariant: `exp = iat + ttl`.
    pub exp: i64,
}

impl fmt::Debug for IdentityClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityClaims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// A freshly signed token plus its lifetime, as returned to clients.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: IdentityClaims,
    pub expires_in: u64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Issues and validates session tokens with a fixed shared secret and TTL.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("keys", &"[REDACTED]")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the signing secret and token lifetime.
    ///
    /// # Errors
    ///
    /// `TokenError::InvalidConfiguration` if the secret is empty or the TTL is
    /// zero or does not fit in an `i64` number of seconds.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidConfiguration(
                "signing secret must not be empty".to_string(),
            ));
        }

        let ttl_seconds = i64::try_from(ttl.as_secs())
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                TokenError::InvalidConfiguration(format!(
                    "token TTL must be a positive number of seconds, got {:?}",
                    ttl
                ))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    #[instrument(skip_all)]
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let exp = now
            .checked_add(self.ttl_seconds)
            .ok_or_else(|| TokenError::Signing("expiry timestamp overflows".to_string()))?;

        let claims = IdentityClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(format!("JWT signing operation failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            claims,
            expires_in: self.ttl_seconds.unsigned_abs(),
        })
    }

    /// Validate `token` against the current time.
    pub fn validate(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate `token` as if the current time were `now` (Unix seconds).
    ///
    /// Checks, in order: size and segment shape, signature, claim structure,
    /// non-empty subject, then `now < exp`. There is no leeway: a token is
    /// expired from the second its `exp` is reached.
    #[instrument(skip_all)]
    pub fn validate_at(&self, token: &str, now: i64) -> Result<IdentityClaims, TokenError> {
        let result = self.validate_inner(token, now);

        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(e) => {
                tracing::debug!(
                    target: "auth.crypto",
                    reason = e.category(),
                    "Token validation failed"
                );
                record_token_validation("error", Some(e.category()));
            }
        }

        result
    }

    fn validate_inner(&self, token: &str, now: i64) -> Result<IdentityClaims, TokenError> {
        check_token_shape(token).map_err(|e| match e {
            JwtShapeError::TokenTooLarge | JwtShapeError::MalformedToken => TokenError::Malformed,
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now` with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let token_data =
            decode::<IdentityClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(target: "auth.crypto", error = %e, "JWT decode failed");
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                }
            })?;

        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed);
        }

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

//! Bearer token helpers shared by the service and its test utilities.
//!
//! - Size limit for denial-of-service prevention
//! - `Authorization: Bearer <token>` header parsing
//! - Structural pre-check of a compact JWT before any cryptography
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Error messages are generic; detail is logged at debug level only
//! - Token contents are never logged

use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// A session token here is ~200 bytes (HS256 signature, three claims). Larger
/// inputs are rejected before base64 decoding or HMAC computation.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Authorization scheme for bearer tokens (RFC 6750).
pub const BEARER_SCHEME: &str = "Bearer";

// =============================================================================
// Error Types
// =============================================================================

/// Reasons an `Authorization` header does not carry a usable bearer token.
///
/// Callers collapse every variant into one unauthenticated response.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    /// Header absent, not valid visible ASCII, or only whitespace.
    #[error("Authentication required")]
    Missing,

    /// Header present but not of the form `Bearer <token>`.
    #[error("Authentication required")]
    InvalidFormat,
}

/// Structural problems with a compact JWT string.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtShapeError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not three non-empty dot-separated segments.
    #[error("The access token is invalid or expired")]
    MalformedToken,
}

// =============================================================================
// Functions
// =============================================================================

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored. The returned slice borrows from `header`.
///
/// # Errors
///
/// - `BearerError::Missing` - `header` is `None`, empty, or only whitespace
/// - `BearerError::InvalidFormat` - scheme is not `Bearer` or the credential is empty
///
/// # Example
///
/// ```rust
/// use common::jwt::{extract_bearer_token, BearerError};
///
/// assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
/// assert_eq!(extract_bearer_token(Some("   ")), Err(BearerError::Missing));
/// assert_eq!(extract_bearer_token(Some("Basic dXNlcg==")), Err(BearerError::InvalidFormat));
/// ```
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, BearerError> {
    let value = header.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(BearerError::Missing);
    }

    let (scheme, credential) = value
        .split_once(char::is_whitespace)
        .ok_or(BearerError::InvalidFormat)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        tracing::debug!(target: "common.jwt", "Authorization header uses a non-bearer scheme");
        return Err(BearerError::InvalidFormat);
    }

    let token = credential.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(BearerError::InvalidFormat);
    }

    Ok(token)
}

/// Check size and segment structure of a compact JWT without decoding it.
///
/// # Errors
///
/// - `JwtShapeError::TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `JwtShapeError::MalformedToken` - not exactly three non-empty segments
pub fn check_token_shape(token: &str) -> Result<(), JwtShapeError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtShapeError::TokenTooLarge);
    }

    let mut segments = 0usize;
    for part in token.split('.') {
        if part.is_empty() {
            return Err(JwtShapeError::MalformedToken);
        }
        segments += 1;
    }

    if segments != 3 {
        tracing::debug!(
            target: "common.jwt",
            segments = segments,
            "Token rejected: invalid JWT format"
        );
        return Err(JwtShapeError::MalformedToken);
    }

    Ok(())
}

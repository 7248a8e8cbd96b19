//! Access guard for protected routes.
//!
//! [`AccessGuard::check`] turns an `Authorization` header into an
//! [`AuthDecision`]; [`require_auth`] applies that decision to a request,
//! either rejecting it with a uniform 401 or attaching the
//! [`AuthenticatedUser`] to the request extensions for handlers to read via
//! `Extension<AuthenticatedUser>`.

use crate::crypto::{TokenCodec, TokenError};
use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use common::jwt::{extract_bearer_token, BearerError};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Identity of the caller, established from a valid session token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub subject: String,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("subject", &"[REDACTED]")
            .finish()
    }
}

/// Why a request was not authenticated. Logged and tested, never returned to
/// clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    MalformedHeader,
    MalformedToken,
    InvalidSignature,
    Expired,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingToken => "missing_token",
            RejectReason::MalformedHeader => "malformed_header",
            RejectReason::MalformedToken => "malformed_token",
            RejectReason::InvalidSignature => "invalid_signature",
            RejectReason::Expired => "expired",
        }
    }
}

impl From<BearerError> for RejectReason {
    fn from(err: BearerError) -> Self {
        match err {
            BearerError::Missing => RejectReason::MissingToken,
            BearerError::InvalidFormat => RejectReason::MalformedHeader,
        }
    }
}

impl From<TokenError> for RejectReason {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => RejectReason::InvalidSignature,
            TokenError::Expired => RejectReason::Expired,
            TokenError::Malformed
            | TokenError::EmptySubject
            | TokenError::InvalidConfiguration(_)
            | TokenError::Signing(_) => RejectReason::MalformedToken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Authenticated(AuthenticatedUser),
    Rejected(RejectReason),
}

/// Decides whether a request carries a valid session token.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    codec: Arc<TokenCodec>,
}

impl AccessGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Evaluate the `Authorization` header against the current time.
    pub fn check(&self, authorization: Option<&HeaderValue>) -> AuthDecision {
        self.check_at(authorization, Utc::now().timestamp())
    }

    /// Evaluate the `Authorization` header as if the current time were `now`.
    ///
    /// A header that is not visible ASCII is treated as absent.
    pub fn check_at(&self, authorization: Option<&HeaderValue>, now: i64) -> AuthDecision {
        let header = authorization.and_then(|value| value.to_str().ok());

        let token = match extract_bearer_token(header) {
            Ok(token) => token,
            Err(e) => return AuthDecision::Rejected(e.into()),
        };

        match self.codec.validate_at(token, now) {
            Ok(claims) => AuthDecision::Authenticated(AuthenticatedUser {
                subject: claims.sub,
            }),
            Err(e) => AuthDecision::Rejected(e.into()),
        }
    }
}

/// Middleware for routes that require a session token.
///
/// # Response
///
/// - 401 `UNAUTHENTICATED` for every rejection reason
/// - Otherwise continues with `AuthenticatedUser` in the request extensions
#[instrument(skip_all, name = "auth.middleware.require_auth")]
pub async fn require_auth(
    State(guard): State<Arc<AccessGuard>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    match guard.check(req.headers().get(AUTHORIZATION)) {
        AuthDecision::Authenticated(user) => {
            tracing::debug!(
                target: "auth.middleware",
                subject_hash = %hash_for_correlation(&user.subject),
                "Request authenticated"
            );
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        AuthDecision::Rejected(reason) => {
            tracing::debug!(
                target: "auth.middleware",
                reason = reason.as_str(),
                "Request rejected"
            );
            Err(AuthError::Unauthenticated)
        }
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Service-level error.
///
/// The `String` payloads carry internal detail for logs only; responses use
/// fixed messages so clients cannot tell which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No, invalid, or expired bearer token.
    #[error("Authentication required")]
    Unauthenticated,

    /// Well-formed sign-in with a wrong identifier or secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Malformed(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Database(_) | AuthError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            AuthError::Unauthenticated => {
                ("UNAUTHENTICATED", "Authentication required".to_string())
            }
            AuthError::InvalidCredentials => {
                ("INVALID_CREDENTIALS", "Invalid email or password".to_string())
            }
            AuthError::Malformed(reason) => ("MALFORMED_REQUEST", reason.clone()),
            AuthError::Conflict(reason) => ("CONFLICT", reason.clone()),
            AuthError::Database(_) => {
                ("DATABASE_ERROR", "An internal database error occurred".to_string())
            }
            AuthError::Crypto(_) => {
                ("CRYPTO_ERROR", "An internal cryptographic error occurred".to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(target: "auth.errors", error = %self, "Request failed");
        }

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

//! HTTP request handlers.

pub mod auth_handler;
pub mod health;
pub mod metrics;
pub mod user_handler;

pub use auth_handler::{handle_sign_in, handle_sign_up};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use user_handler::{create_user, list_users};

use crate::errors::AuthError;
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Unwrap a JSON body, turning extractor failures into `AuthError::Malformed`.
///
/// The rejection text can quote the submitted body, so it is logged at debug
/// level and replaced with a fixed message.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(
                target: "auth.handlers",
                status = %rejection.status(),
                "Rejected request body"
            );
            Err(AuthError::Malformed("Invalid JSON request body".to_string()))
        }
    }
}

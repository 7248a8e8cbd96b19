//! User endpoints. Both require a session token.

use crate::errors::AuthError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateUserRequest, UserResponse};
use crate::observability::hash_for_correlation;
use crate::routes::AppState;
use crate::services::user_service;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::json_body;

/// Handler for GET /users
#[instrument(skip_all, name = "auth.handlers.list_users")]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    tracing::debug!(
        target: "auth.handlers",
        caller_hash = %hash_for_correlation(&caller.subject),
        "Listing users"
    );

    let users = user_service::list_users(state.store.as_ref()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Handler for POST /users
#[instrument(skip_all, name = "auth.handlers.create_user")]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let request = json_body(payload)?;

    tracing::debug!(
        target: "auth.handlers",
        caller_hash = %hash_for_correlation(&caller.subject),
        "Creating user"
    );

    let user = user_service::create_user(
        state.store.as_ref(),
        state.secret_policy,
        state.bcrypt_cost,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

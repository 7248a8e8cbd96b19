use crate::errors::AuthError;
use crate::models::{CreateUserRequest, SignInRequest, TokenResponse, UserResponse};
use crate::routes::AppState;
use crate::services::user_service;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::instrument;

use super::json_body;

/// Handle sign-up
///
/// POST /auth/signup
#[instrument(skip_all, name = "auth.handlers.sign_up")]
pub async fn handle_sign_up(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let request = json_body(payload)?;

    let user = user_service::create_user(
        state.store.as_ref(),
        state.secret_policy,
        state.bcrypt_cost,
        request,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Handle sign-in
///
/// POST /auth/signin
///
/// Any credential failure returns the same 401 `INVALID_CREDENTIALS` body.
#[instrument(skip_all, name = "auth.handlers.sign_in")]
pub async fn handle_sign_in(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AuthError> {
    let request = json_body(payload)?;

    let token = state
        .session_issuer
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(token))
}

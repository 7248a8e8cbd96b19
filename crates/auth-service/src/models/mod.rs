use crate::repositories::users::User;
use chrono::{DateTime, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: SecretString,
}

/// Body for `POST /auth/signup` and `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Successful sign-in response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Outward view of a user. Never carries the stored secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

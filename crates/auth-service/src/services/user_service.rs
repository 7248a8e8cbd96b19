//! User account creation and listing.

use crate::config::SecretPolicy;
use crate::crypto;
use crate::errors::AuthError;
use crate::models::CreateUserRequest;
use crate::observability::hash_for_correlation;
use crate::repositories::users::{NewUserRecord, User, UserStore};
use common::secret::ExposeSecret;
use tracing::instrument;

/// Create a user account.
///
/// Validates the request, stores the secret in the form dictated by `policy`
/// and inserts the record. A taken email yields `AuthError::Conflict`.
#[instrument(skip_all)]
pub async fn create_user(
    store: &dyn UserStore,
    policy: SecretPolicy,
    bcrypt_cost: u32,
    request: CreateUserRequest,
) -> Result<User, AuthError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AuthError::Malformed("Name cannot be empty".to_string()));
    }

    let email = request.email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::Malformed("Invalid email format".to_string()));
    }

    let secret = request.password.expose_secret();
    if secret.is_empty() {
        return Err(AuthError::Malformed("Password cannot be empty".to_string()));
    }

    let stored = match policy {
        SecretPolicy::Plaintext => secret.to_string(),
        SecretPolicy::Bcrypt => crypto::hash_secret(secret, bcrypt_cost)?,
    };

    let user = store
        .create(NewUserRecord {
            name: name.to_string(),
            email: email.to_string(),
            password: stored,
        })
        .await?;

    tracing::info!(
        target: "auth.users",
        user_id = user.user_id,
        subject_hash = %hash_for_correlation(&user.email),
        "User created"
    );

    Ok(user)
}

/// All users, ordered by id.
#[instrument(skip_all)]
pub async fn list_users(store: &dyn UserStore) -> Result<Vec<User>, AuthError> {
    Ok(store.list().await?)
}

/// Basic shape check: one `@`, non-empty local part, dotted domain with no
/// empty labels, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

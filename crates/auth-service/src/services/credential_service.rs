//! Credential verification against the user store.

use crate::config::SecretPolicy;
use crate::crypto::{self, SecretComparator};
use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use crate::repositories::users::{StoreError, User, UserStore};
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Secret run through bcrypt when the identifier is unknown, so both failure
/// paths do the same amount of work.
const DUMMY_SECRET: &str = "dummy-secret-for-unknown-identifiers";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No user with the supplied identifier")]
    NotFound,

    #[error("Supplied secret does not match")]
    SecretMismatch,

    #[error("User store failure: {0}")]
    Store(#[from] StoreError),
}

impl CredentialError {
    /// True for the failures a client must see as "invalid credentials".
    pub fn is_rejection(&self) -> bool {
        matches!(self, CredentialError::NotFound | CredentialError::SecretMismatch)
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NotFound | CredentialError::SecretMismatch => {
                AuthError::InvalidCredentials
            }
            CredentialError::Store(e) => e.into(),
        }
    }
}

/// Checks an identifier/secret pair against stored user records.
pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    policy: SecretPolicy,
    comparator: SecretComparator,
    dummy_hash: Option<String>,
}

impl CredentialVerifier {
    /// Build a verifier for the given policy.
    ///
    /// Under `SecretPolicy::Bcrypt` a dummy hash is computed up front at
    /// `bcrypt_cost`, matching the cost of real stored hashes.
    pub fn new(
        store: Arc<dyn UserStore>,
        policy: SecretPolicy,
        bcrypt_cost: u32,
    ) -> Result<Self, AuthError> {
        let dummy_hash = match policy {
            SecretPolicy::Bcrypt => Some(crypto::hash_secret(DUMMY_SECRET, bcrypt_cost)?),
            SecretPolicy::Plaintext => None,
        };

        Ok(Self {
            store,
            policy,
            comparator: SecretComparator::new()?,
            dummy_hash,
        })
    }

    /// Verify `secret` for `identifier` (an email address).
    ///
    /// Returns the record's canonical email as the subject on success.
    #[instrument(skip_all)]
    pub async fn verify(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<String, CredentialError> {
        let user = self.store.find_by_email(identifier).await?;
        let supplied = secret.expose_secret();

        let matches = match self.policy {
            SecretPolicy::Plaintext => user
                .as_ref()
                .is_some_and(|u| self.comparator.matches(supplied, &u.password)),
            SecretPolicy::Bcrypt => self.bcrypt_matches(identifier, user.as_ref(), supplied),
        };

        let Some(user) = user else {
            tracing::debug!(
                target: "auth.credentials",
                subject_hash = %hash_for_correlation(identifier),
                "Unknown identifier"
            );
            return Err(CredentialError::NotFound);
        };

        if !matches {
            tracing::debug!(
                target: "auth.credentials",
                subject_hash = %hash_for_correlation(identifier),
                "Secret mismatch"
            );
            return Err(CredentialError::SecretMismatch);
        }

        Ok(user.email)
    }

    /// Check `supplied` against the user's bcrypt hash, or against the dummy
    /// hash when there is no user. A stored value that is not a usable hash
    /// counts as a mismatch and still costs one dummy verification.
    fn bcrypt_matches(&self, identifier: &str, user: Option<&User>, supplied: &str) -> bool {
        let Some(dummy) = self.dummy_hash.as_deref() else {
            return false;
        };

        let Some(user) = user else {
            let _ = crypto::verify_hashed_secret(supplied, dummy);
            return false;
        };

        match crypto::verify_hashed_secret(supplied, &user.password) {
            Ok(valid) => valid,
            Err(_) => {
                // The error text can echo the stored value.
                tracing::warn!(
                    target: "auth.credentials",
                    subject_hash = %hash_for_correlation(identifier),
                    "Stored secret is not a valid bcrypt hash"
                );
                let _ = crypto::verify_hashed_secret(supplied, dummy);
                false
            }
        }
    }
}

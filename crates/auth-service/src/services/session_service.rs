//! Sign-in: credential verification followed by token issuance.

use crate::crypto::TokenCodec;
use crate::errors::AuthError;
use crate::models::TokenResponse;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{record_sign_in, record_token_issuance};
use crate::services::credential_service::CredentialVerifier;
use common::secret::SecretString;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub struct SessionIssuer {
    verifier: CredentialVerifier,
    codec: Arc<TokenCodec>,
}

impl SessionIssuer {
    pub fn new(verifier: CredentialVerifier, codec: Arc<TokenCodec>) -> Self {
        Self { verifier, codec }
    }

    /// Exchange credentials for a session token.
    ///
    /// Unknown identifier and wrong secret both yield
    /// `AuthError::InvalidCredentials`. Nothing is retried.
    #[instrument(skip_all)]
    pub async fn sign_in(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<TokenResponse, AuthError> {
        let start = Instant::now();

        let subject = match self.verifier.verify(identifier, secret).await {
            Ok(subject) => subject,
            Err(e) => {
                let outcome = if e.is_rejection() {
                    "invalid_credentials"
                } else {
                    "error"
                };
                record_sign_in(outcome, start.elapsed());
                if !e.is_rejection() {
                    tracing::warn!(
                        target: "auth.session",
                        error = %e,
                        "Sign-in could not be completed"
                    );
                }
                return Err(e.into());
            }
        };

        let issued = match self.codec.issue(&subject) {
            Ok(issued) => issued,
            Err(e) => {
                record_token_issuance("error");
                record_sign_in("error", start.elapsed());
                return Err(AuthError::Crypto(e.to_string()));
            }
        };

        record_token_issuance("success");
        record_sign_in("success", start.elapsed());

        tracing::info!(
            target: "auth.session",
            subject_hash = %hash_for_correlation(&subject),
            expires_in = issued.expires_in,
            "Session token issued"
        );

        Ok(TokenResponse {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
        })
    }
}

//! HTTP routes for the auth service.
//!
//! Defines the Axum router and application state.

use crate::config::{Config, SecretPolicy};
use crate::crypto::TokenCodec;
use crate::errors::AuthError;
use crate::handlers;
use crate::middleware::auth::{require_auth, AccessGuard};
use crate::repositories::users::UserStore;
use crate::services::credential_service::CredentialVerifier;
use crate::services::session_service::SessionIssuer;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub session_issuer: Arc<SessionIssuer>,
    pub access_guard: Arc<AccessGuard>,
    pub secret_policy: SecretPolicy,
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl AppState {
    /// Wire the token codec, credential verifier and access guard from
    /// configuration.
    ///
    /// # Errors
    ///
    /// `AuthError::Crypto` if the signing secret or TTL is unusable, or the
    /// bcrypt dummy hash cannot be computed.
    pub fn new(config: &Config, store: Arc<dyn UserStore>) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(
            config.signing_secret_bytes(),
            config.token_ttl,
        )?);

        let verifier =
            CredentialVerifier::new(store.clone(), config.secret_policy, config.bcrypt_cost)?;

        Ok(Self {
            store,
            session_issuer: Arc::new(SessionIssuer::new(verifier, codec.clone())),
            access_guard: Arc::new(AccessGuard::new(codec)),
            secret_policy: config.secret_policy,
            bcrypt_cost: config.bcrypt_cost,
            cors_allowed_origins: config.cors_allowed_origins.clone(),
        })
    }
}

/// Build the application routes.
///
/// - `POST /auth/signup`, `POST /auth/signin`, `GET /health` - public
/// - `GET /metrics` - Prometheus scrape endpoint, public
/// - `GET /users`, `POST /users` - require a bearer session token
/// - CORS for the configured origins, request tracing, 30 second timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let cors = cors_layer(&state.cors_allowed_origins);

    let public_routes = Router::new()
        .route("/auth/signup", post(handlers::handle_sign_up))
        .route("/auth/signin", post(handlers::handle_sign_in))
        .route("/health", get(handlers::health_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.access_guard.clone(),
            require_auth,
        ))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer (outermost) - answers preflight before auth runs
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // Credentialed CORS cannot use a wildcard origin.
            Ok(value) if origin != "*" => Some(value),
            _ => {
                tracing::warn!(
                    target: "auth.routes",
                    origin = %origin,
                    "Ignoring invalid CORS origin"
                );
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT, AUTHORIZATION])
        .expose_headers([CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

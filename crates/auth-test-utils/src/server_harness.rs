//! Test server harness for E2E testing
//!
//! Provides `TestAuthServer` for spawning real auth service instances in tests.

use crate::fixtures::{TEST_SIGNING_SECRET, TEST_TOKEN_TTL_SECONDS};
use auth_service::config::{Config, SecretPolicy, MIN_BCRYPT_COST};
use auth_service::crypto::TokenCodec;
use auth_service::models::CreateUserRequest;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::repositories::users::{SqliteUserStore, User, UserStore};
use auth_service::routes::{self, AppState};
use auth_service::services::user_service;
use chrono::Utc;
use common::secret::SecretString;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth service in E2E tests
///
/// Each instance owns a fresh in-memory SQLite database.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_sign_in_e2e() -> Result<(), anyhow::Error> {
///     let server = TestAuthServer::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/auth/signin", server.url()))
///         .json(&serde_json::json!({"email": "alice@example.com", "password": "pw123"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 401);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    store: Arc<SqliteUserStore>,
    codec: TokenCodec,
    secret_policy: SecretPolicy,
    _handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn a server using the default (plaintext) secret policy.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_policy(SecretPolicy::Plaintext).await
    }

    /// Spawn a server with the given secret policy
    ///
    /// The server will:
    /// - Open a migrated in-memory SQLite database
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with_policy(policy: SecretPolicy) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            (
                "AUTH_SIGNING_SECRET".to_string(),
                TEST_SIGNING_SECRET.to_string(),
            ),
            (
                "AUTH_TOKEN_TTL_SECONDS".to_string(),
                TEST_TOKEN_TTL_SECONDS.to_string(),
            ),
            (
                "AUTH_SECRET_POLICY".to_string(),
                policy.as_str().to_string(),
            ),
            ("BCRYPT_COST".to_string(), MIN_BCRYPT_COST.to_string()),
            ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);
        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to build test config: {}", e))?;

        let store = Arc::new(
            SqliteUserStore::connect(&config.database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open test database: {}", e))?,
        );

        let state = Arc::new(
            AppState::new(&config, store.clone())
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = init_metrics_recorder()
            .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle());

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind(config.bind_address.as_str())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        let codec = TokenCodec::new(config.signing_secret_bytes(), config.token_ttl)
            .map_err(|e| anyhow::anyhow!("Failed to build token codec: {}", e))?;

        Ok(Self {
            addr,
            store,
            codec,
            secret_policy: policy,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Insert a user directly, bypassing HTTP. The secret is stored according
    /// to the server's secret policy.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, anyhow::Error> {
        let request = CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: SecretString::from(password.to_string()),
        };

        user_service::create_user(
            self.store.as_ref(),
            self.secret_policy,
            MIN_BCRYPT_COST,
            request,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))
    }

    /// Issue a session token the server will accept, without signing in.
    pub fn create_token(&self, subject: &str) -> Result<String, anyhow::Error> {
        Ok(self.codec.issue(subject)?.token)
    }

    /// Create a correctly signed token that expired `expired_seconds_ago`.
    pub fn create_expired_token(
        &self,
        subject: &str,
        expired_seconds_ago: i64,
    ) -> Result<String, anyhow::Error> {
        let ttl = i64::try_from(TEST_TOKEN_TTL_SECONDS)?;
        let issued_at = Utc::now().timestamp() - ttl - expired_seconds_ago;
        Ok(self.codec.issue_at(subject, issued_at)?.token)
    }

    /// Number of users currently stored.
    pub async fn user_count(&self) -> Result<usize, anyhow::Error> {
        Ok(self.store.list().await?.len())
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port and database are released
        // when the test completes.
        self._handle.abort();
    }
}

/// Request timeout for harness clients.
pub const TEST_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// A `reqwest` client with a bounded timeout.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(TEST_CLIENT_TIMEOUT)
        .build()
        .unwrap_or_default()
}

//! User Auth Service
//!
//! Entry point: loads configuration, opens the user store and serves the
//! HTTP API until SIGINT/SIGTERM.

use auth_service::config::{Config, SecretPolicy};
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::repositories::users::SqliteUserStore;
use auth_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Auth Service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        database_url = %config.database_url,
        secret_policy = config.secret_policy.as_str(),
        token_ttl_seconds = config.token_ttl.as_secs(),
        "Configuration loaded successfully"
    );

    if config.secret_policy == SecretPolicy::Plaintext {
        warn!(
            "User secrets are stored and compared as plaintext; \
             set AUTH_SECRET_POLICY=bcrypt to store bcrypt hashes instead"
        );
    }

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let store = SqliteUserStore::connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to open user store: {}", e);
            e
        })?;
    info!("Database connection established");

    let state = Arc::new(AppState::new(&config, Arc::new(store)).map_err(|e| {
        error!("Failed to initialize application state: {}", e);
        e
    })?);

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Auth Service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth Service shutdown complete");
    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

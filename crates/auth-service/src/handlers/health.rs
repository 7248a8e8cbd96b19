//! Health check handler.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /health
///
/// Pings the user store. Always answers 200 so probes can read the body:
///
/// ```json
/// { "status": "healthy", "database": "healthy" }
/// ```
#[instrument(skip_all, name = "auth.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, database) = match state.store.ping().await {
        Ok(()) => ("healthy", "healthy"),
        Err(e) => {
            tracing::warn!(target: "auth.health", error = %e, "Database health check failed");
            ("unhealthy", "unhealthy")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
    })
}

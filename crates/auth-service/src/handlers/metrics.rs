//! Prometheus metrics endpoint handler.
//!
//! Unauthenticated so Prometheus can scrape it. Labels are bounded and carry
//! no subjects or secrets.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
#[tracing::instrument(skip_all, name = "auth.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

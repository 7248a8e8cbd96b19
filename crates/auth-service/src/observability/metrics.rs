//! Metrics definitions for the auth service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `status`: success, error
//! - `error_category`: none, malformed, invalid_signature, expired, empty_subject,
//!   configuration, signing
//! - `outcome`: success, invalid_credentials, error

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return a handle for `/metrics`.
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Sign-in is dominated by the store lookup (and bcrypt when enabled)
        .set_buckets_for_metric(
            Matcher::Prefix("auth_sign_in".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set sign-in buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance outcome
///
/// Metric: `auth_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str) {
    counter!("auth_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Sign-in Metrics
// ============================================================================

/// Record a sign-in attempt
///
/// Metrics: `auth_sign_in_total`, `auth_sign_in_duration_seconds`
/// Labels: `outcome`
pub fn record_sign_in(outcome: &str, duration: Duration) {
    histogram!("auth_sign_in_duration_seconds", "outcome" => outcome.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_sign_in_total", "outcome" => outcome.to_string()).increment(1);
}

//! Prometheus metrics for Trellis.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `trellis_bind_requests_total` | Counter | `bean`, `outcome` | Bind-and-validate calls |
//! | `trellis_binding_errors_total` | Counter | `bean` | Property errors raised by binding |
//! | `trellis_validation_errors_total` | Counter | `bean` | Constraint violations |
//!
//! No HTTP listener is started; serve [`render_metrics`] from your own
//! endpoint.

use std::sync::OnceLock;

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Counter of bind-and-validate calls.
pub const BIND_REQUESTS_TOTAL: &str = "trellis_bind_requests_total";

/// Counter of binding errors.
pub const BINDING_ERRORS_TOTAL: &str = "trellis_binding_errors_total";

/// Counter of validation errors.
pub const VALIDATION_ERRORS_TOTAL: &str = "trellis_validation_errors_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Installs the Prometheus recorder and registers metric descriptions.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a global recorder is already set.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        BIND_REQUESTS_TOTAL,
        "Total number of bind-and-validate calls by outcome"
    );
    describe_counter!(
        BINDING_ERRORS_TOTAL,
        "Total number of property errors raised while binding parameters"
    );
    describe_counter!(
        VALIDATION_ERRORS_TOTAL,
        "Total number of constraint violations raised by validation"
    );
}

/// Records the errors produced by one binding call.
pub fn record_binding(bean: &str, error_count: usize) {
    if error_count > 0 {
        counter!(BINDING_ERRORS_TOTAL, "bean" => bean.to_string()).increment(error_count as u64);
    }
}

/// Records the errors produced by one validation call.
pub fn record_validation(bean: &str, error_count: usize) {
    if error_count > 0 {
        counter!(VALIDATION_ERRORS_TOTAL, "bean" => bean.to_string())
            .increment(error_count as u64);
    }
}

/// Records one bind-and-validate call; `valid` is false when any error remained.
pub fn record_bind_request(bean: &str, valid: bool) {
    let outcome = if valid { "valid" } else { "invalid" };
    counter!(
        BIND_REQUESTS_TOTAL,
        "bean" => bean.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

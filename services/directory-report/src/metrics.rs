//! Prometheus metrics exposition
//!
//! - `report_refresh_total` (counter): label `result` (`success` / `error`)
//! - `report_refresh_duration_seconds` (histogram)

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const REFRESH_DURATION: &str = "report_refresh_duration_seconds";

/// A refresh walks every group of every organization, so buckets reach
/// into minutes.
const REFRESH_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REFRESH_DURATION.to_string()), REFRESH_BUCKETS)
}

/// Install the global Prometheus recorder and return a handle for `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Record one report refresh attempt.
pub fn record_refresh(success: bool, duration_secs: f64) {
    let result = if success { "success" } else { "error" };
    metrics::counter!("report_refresh_total", "result" => result).increment(1);
    metrics::histogram!(REFRESH_DURATION).record(duration_secs);
}

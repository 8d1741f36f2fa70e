//! Prometheus exposition

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use domain_customer::telemetry::CUSTOMER_AGE;

const EXPONENTIAL_SECONDS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

const AGE_BUCKETS: &[f64] = &[10.0, 18.0, 25.0, 35.0, 45.0, 55.0, 65.0, 75.0, 85.0, 100.0];

/// Installs the global Prometheus recorder
///
/// Can succeed only once per process.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets(EXPONENTIAL_SECONDS)?
        .set_buckets_for_metric(Matcher::Full(CUSTOMER_AGE.to_string()), AGE_BUCKETS)?
        .install_recorder()
}

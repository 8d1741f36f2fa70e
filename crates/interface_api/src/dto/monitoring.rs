//! Monitoring DTOs

use serde::{Deserialize, Serialize};

use core_kernel::HealthCheckResult;
use domain_customer::CustomerMetrics;
use infra_messaging::BrokerStats;

/// Operational snapshot for administrators
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSummary {
    pub version: String,
    pub uptime_seconds: u64,
    pub total_customers: u64,
    pub customer_metrics: CustomerMetrics,
    /// Present when the in-process broker is in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<BrokerStats>,
    pub components: Vec<HealthCheckResult>,
}

/// Response of `/health/ready`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheckResult>,
}

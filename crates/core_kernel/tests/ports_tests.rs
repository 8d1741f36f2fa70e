//! Tests for port infrastructure types

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable, PortError};

struct AlwaysDown;

#[async_trait::async_trait]
impl HealthCheckable for AlwaysDown {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::unhealthy("always-down", 0, "connection refused")
    }
}

#[test]
fn test_internal_error_display() {
    let error = PortError::internal("disk full");
    assert_eq!(error.to_string(), "Internal error: disk full");
    assert!(!error.is_not_found());
}

#[test]
fn test_connection_error_is_transient() {
    assert!(PortError::connection("refused").is_transient());
    assert!(PortError::ServiceUnavailable { service: "broker".to_string() }.is_transient());
}

#[test]
fn test_health_status_serializes_snake_case() {
    let json = serde_json::to_string(&AdapterHealth::Unhealthy).unwrap();
    assert_eq!(json, "\"unhealthy\"");
}

#[tokio::test]
async fn test_health_checkable_reports_message() {
    let result = AlwaysDown.health_check().await;
    assert_eq!(result.status, AdapterHealth::Unhealthy);
    assert_eq!(result.message.as_deref(), Some("connection refused"));
    assert!(!result.is_operational());
}

//! Monitoring handlers

use axum::{extract::State, Extension, Json};
use tracing::info;

use crate::auth::{require_role, roles, Claims};
use crate::dto::monitoring::MonitoringSummary;
use crate::handlers::health::component_health;
use crate::{error::ApiError, AppState};

/// Operational summary; admin only
pub async fn summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MonitoringSummary>, ApiError> {
    require_role(&claims, roles::ADMIN)?;
    info!(user = %claims.sub, "Generating monitoring summary");

    let customer_metrics = state.service.compute_metrics().await?;

    Ok(Json(MonitoringSummary {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        total_customers: customer_metrics.total_customers,
        customer_metrics,
        broker: state.broker.as_ref().map(|b| b.stats()),
        components: component_health(&state).await,
    }))
}

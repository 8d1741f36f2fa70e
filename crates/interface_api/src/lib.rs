//! HTTP API Layer
//!
//! This crate provides the REST API for the customer service using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for customers, auth, health, monitoring
//! - **Middleware**: Authentication, audit logging, HTTP metrics
//! - **DTOs**: Login and monitoring bodies; customers use the domain views
//! - **Error Handling**: Consistent `{error, message, details?}` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(service, config, users);
//! let app = create_router(state, Some(prometheus_handle));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod prometheus;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_customer::CustomerService;
use infra_messaging::InProcessBroker;

use crate::auth::UserStore;
use crate::config::ApiConfig;
use crate::handlers::{auth as login, customers, health, monitoring};
use crate::middleware::{audit_middleware, auth_middleware, track_metrics};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CustomerService,
    pub config: ApiConfig,
    pub users: Arc<UserStore>,
    /// Components checked by readiness besides the customer store
    pub health_checks: Vec<Arc<dyn HealthCheckable>>,
    pub broker: Option<Arc<InProcessBroker>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: CustomerService, config: ApiConfig, users: UserStore) -> Self {
        Self {
            service,
            config,
            users: Arc::new(users),
            health_checks: Vec::new(),
            broker: None,
            started_at: Instant::now(),
        }
    }

    /// Adds a component to the readiness check
    pub fn with_health_check(mut self, component: Arc<dyn HealthCheckable>) -> Self {
        self.health_checks.push(component);
        self
    }

    /// Registers the in-process broker for health and monitoring
    pub fn with_broker(mut self, broker: Arc<InProcessBroker>) -> Self {
        self.health_checks.push(broker.clone());
        self.broker = Some(broker);
        self
    }
}

/// Creates the main API router
///
/// `/metrics` is only mounted when a Prometheus handle is given.
pub fn create_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    // Public routes (no auth required)
    let mut public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/auth/login", post(login::login));

    if let Some(handle) = prometheus {
        public_routes = public_routes.route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        );
    }

    let customer_routes = Router::new()
        .route("/", post(customers::create_customer).get(customers::list_customers))
        .route("/metrics", get(customers::customer_metrics))
        .route(
            "/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        );

    // Protected API routes
    let api_routes = Router::new()
        .nest("/customers", customer_routes)
        .route("/monitoring/summary", get(monitoring::summary))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(axum_middleware::from_fn(track_metrics)),
        )
        .with_state(state)
}

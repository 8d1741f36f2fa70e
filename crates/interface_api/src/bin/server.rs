//! Customer Service - API Server Binary
//!
//! Starts the HTTP API server for customer records.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin customer-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin customer-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level or filter directive (default: info)
//! * `API_LOG_FORMAT` - `text` or `json` (default: text)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 86400)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_METRICS_SOURCE` - `in_process` or `storage` (default: in_process)
//! * `API_NOTIFICATION_QUEUE_CAPACITY` - In-process queue size (default: 1024)
//! * `API_KAFKA_BROKERS`, `API_KAFKA_TOPIC` - Kafka publishing (feature `kafka`)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_customer::{CustomerNotifier, CustomerService};
use infra_db::{create_pool, run_migrations, PostgresCustomerStore};
use infra_messaging::InProcessBroker;
use interface_api::{
    auth::UserStore, config::ApiConfig, create_router, prometheus::setup_metrics_recorder, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let (config, config_error) = match ApiConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => (ApiConfig::default(), Some(e)),
    };

    init_tracing(&config);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Invalid configuration, falling back to defaults");
    }

    tracing::info!(
        host = %config.host,
        port = %config.port,
        metrics_source = ?config.metrics_source,
        "Starting Customer Service API Server"
    );

    let prometheus = setup_metrics_recorder().context("failed to install Prometheus recorder")?;

    let pool = create_pool(config.database_config()).await?;
    run_migrations(&pool).await?;
    let store = Arc::new(PostgresCustomerStore::new(pool));

    let users = UserStore::with_default_users(config.bcrypt_cost)?;

    let (notifier, broker) = build_notifier(&config)?;
    let service = CustomerService::new(store, notifier, Arc::new(SystemClock))
        .with_metrics_source(config.metrics_source);

    let mut state = AppState::new(service, config.clone(), users);
    if let Some(broker) = &broker {
        state = state.with_broker(Arc::clone(broker));
    }

    let app = create_router(state, Some(prometheus));

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(broker) = broker {
        broker.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Picks Kafka when brokers are configured and the feature is on, otherwise
/// the in-process broker
fn build_notifier(
    config: &ApiConfig,
) -> anyhow::Result<(Arc<dyn CustomerNotifier>, Option<Arc<InProcessBroker>>)> {
    #[cfg(feature = "kafka")]
    {
        if let Some(brokers) = &config.kafka_brokers {
            let kafka_config =
                infra_messaging::KafkaConfig::new(brokers.as_str(), config.kafka_topic.as_str());
            let kafka: Arc<dyn CustomerNotifier> =
                Arc::new(infra_messaging::KafkaCustomerNotifier::new(&kafka_config)?);
            return Ok((kafka, None));
        }
    }

    #[cfg(not(feature = "kafka"))]
    {
        if config.kafka_brokers.is_some() {
            tracing::warn!(
                "API_KAFKA_BROKERS is set but the kafka feature is disabled; using the in-process broker"
            );
        }
    }

    let broker = Arc::new(InProcessBroker::start(config.notification_queue_capacity));
    let notifier: Arc<dyn CustomerNotifier> = broker.clone();
    Ok((notifier, Some(broker)))
}

/// Initializes the tracing subscriber; `API_LOG_FORMAT=json` switches to
/// JSON lines
fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

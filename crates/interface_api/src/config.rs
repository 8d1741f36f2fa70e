//! API configuration

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

use domain_customer::MetricsSource;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every key is optional; missing keys take the values from `Default`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// bcrypt cost for the built-in user store
    pub bcrypt_cost: u32,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    /// Where customer metrics take mean and deviation from
    pub metrics_source: MetricsSource,
    /// Capacity of the in-process notification queue
    pub notification_queue_capacity: usize,
    /// Kafka bootstrap servers; the in-process broker is used when unset
    pub kafka_brokers: Option<String>,
    pub kafka_topic: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 86_400,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            database_url: "postgres://localhost/customers".to_string(),
            db_max_connections: 10,
            metrics_source: MetricsSource::InProcess,
            notification_queue_capacity: 1024,
            kafka_brokers: None,
            kafka_topic: "customer.created".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(
            config::Config::builder()
                .add_source(config::Environment::with_prefix("API").try_parsing(true)),
        )
    }

    /// Builds configuration from an arbitrary set of sources
    pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url).max_connections(self.db_max_connections)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

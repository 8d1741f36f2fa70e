//! Kafka publisher for customer notifications
//!
//! Messages are JSON-encoded `CustomerView`s keyed by customer id, so all
//! messages for one customer land on the same partition. Delivery reports
//! are awaited on a spawned task and only logged; the publisher never waits
//! for them.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use tracing::{debug, error, info};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_customer::{CustomerNotifier, CustomerView};

use crate::error::MessagingError;

const ADAPTER_ID: &str = "kafka-customer-notifier";

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub linger_ms: u32,
    pub message_timeout_ms: u32,
}

impl KafkaConfig {
    pub fn new(brokers: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            topic: topic.into(),
            linger_ms: 20,
            message_timeout_ms: 20_000,
        }
    }
}

/// Kafka implementation of the CustomerNotifier port
#[derive(Clone)]
pub struct KafkaCustomerNotifier {
    producer: FutureProducer,
    topic: String,
}

impl KafkaCustomerNotifier {
    /// Creates the producer; does not contact the brokers
    pub fn new(config: &KafkaConfig) -> Result<Self, MessagingError> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.brokers)
            .set("linger.ms", config.linger_ms.to_string())
            .set("message.timeout.ms", config.message_timeout_ms.to_string());

        debug!("rdkafka configuration: {:?}", client_config);
        let producer: FutureProducer = client_config.create()?;

        info!(brokers = %config.brokers, topic = %config.topic, "Kafka producer created");
        Ok(Self {
            producer,
            topic: config.topic.clone(),
        })
    }

    fn enqueue(&self, key: &str, payload: &[u8]) -> Result<(), KafkaError> {
        let record = FutureRecord::to(&self.topic).key(key).payload(payload);

        let delivery = self.producer.send_result(record).map_err(|(e, _)| e)?;

        tokio::spawn(async move {
            match delivery.await {
                Ok(Ok(_)) => debug!("Customer message delivered"),
                Ok(Err((e, _))) => error!(error = %e, "Failed to deliver customer message"),
                Err(_) => error!("Customer message delivery canceled"),
            }
        });
        Ok(())
    }
}

impl DomainPort for KafkaCustomerNotifier {}

#[async_trait]
impl CustomerNotifier for KafkaCustomerNotifier {
    async fn publish_customer_created(&self, customer: &CustomerView) -> Result<(), PortError> {
        info!(customer_id = %customer.id, topic = %self.topic, "Sending customer creation message");

        let (key, payload) = encode(customer)?;
        self.enqueue(&key, &payload).map_err(MessagingError::from)?;

        Ok(())
    }
}

/// Message key and JSON payload for one customer
fn encode(customer: &CustomerView) -> Result<(String, Vec<u8>), MessagingError> {
    let payload = serde_json::to_vec(customer)?;
    Ok((customer.id.to_string(), payload))
}

#[async_trait]
impl HealthCheckable for KafkaCustomerNotifier {
    /// Fetches topic metadata from the brokers
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let producer = self.producer.clone();
        let topic = self.topic.clone();

        let result = tokio::task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(Some(&topic), Duration::from_secs(5))
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .await
        .unwrap_or_else(|e| Err(e.to_string()));

        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(message) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::CustomerId;

    fn view() -> CustomerView {
        CustomerView {
            id: CustomerId::new(42),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            age: 30,
            date_of_birth: NaiveDate::from_ymd_opt(1993, 5, 15).unwrap(),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = KafkaConfig::new("localhost:9092", "customer.created");

        assert_eq!(config.brokers, "localhost:9092");
        assert_eq!(config.topic, "customer.created");
        assert_eq!(config.linger_ms, 20);
        assert_eq!(config.message_timeout_ms, 20_000);
    }

    #[test]
    fn test_encode_keys_by_customer_id() {
        let (key, payload) = encode(&view()).unwrap();

        assert_eq!(key, "42");
        let decoded: CustomerView = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, view());

        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["dateOfBirth"], "1993-05-15");
    }

    #[tokio::test]
    async fn test_producer_is_created_without_a_reachable_broker() {
        // Nothing listens on port 1; creation must not connect
        let config = KafkaConfig::new("localhost:1", "customer.created");

        let notifier = KafkaCustomerNotifier::new(&config).unwrap();

        assert_eq!(notifier.topic, "customer.created");
    }

    #[tokio::test]
    async fn test_publish_enqueues_without_a_reachable_broker() {
        let config = KafkaConfig::new("localhost:1", "customer.created");
        let notifier = KafkaCustomerNotifier::new(&config).unwrap();

        notifier.publish_customer_created(&view()).await.unwrap();
    }

    #[test]
    fn test_invalid_client_setting_is_rejected() {
        let mut config = KafkaConfig::new("localhost:1", "customer.created");
        config.linger_ms = 10_000_000;

        let result = KafkaCustomerNotifier::new(&config);

        assert!(matches!(result, Err(MessagingError::Kafka(_))));
    }
}

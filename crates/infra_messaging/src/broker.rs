//! In-process message broker
//!
//! A single topic exchange with one bound queue. Publishing routes the
//! message by key into a bounded channel; a consumer task spawned on the
//! tokio runtime drains the queue and hands each message to a
//! [`MessageHandler`].
//!
//! ```text
//! publish ──▶ customer.exchange ──(customer.created)──▶ customer.created.queue ──▶ consumer
//! ```
//!
//! Publishing never waits for the consumer. A full queue is reported to the
//! publisher as an error; a failing handler is logged and counted, and the
//! message is dropped.
//!
//! The queue lives in memory only. [`InProcessBroker::shutdown`] closes it to
//! new messages and waits until the consumer has handled everything already
//! queued. Dropping the broker closes the queue the same way but does not
//! wait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_customer::{CustomerNotifier, CustomerView};

use crate::error::MessagingError;
use crate::handler::{CustomerCreatedHandler, MessageHandler};

pub const CUSTOMER_EXCHANGE: &str = "customer.exchange";
pub const CUSTOMER_CREATED_QUEUE: &str = "customer.created.queue";
pub const CUSTOMER_CREATED_ROUTING_KEY: &str = "customer.created";

const ADAPTER_ID: &str = "in-process-broker";
const MESSAGES_PUBLISHED: &str = "messages_published_total";
const MESSAGES_CONSUMED: &str = "messages_consumed_total";
const MESSAGES_FAILED: &str = "messages_failed_total";

/// A routed message as it sits in the queue
#[derive(Debug, Clone)]
pub struct Envelope {
    pub exchange: &'static str,
    pub routing_key: &'static str,
    /// JSON-encoded body
    pub payload: Vec<u8>,
    pub published_at: DateTime<Utc>,
}

/// Point-in-time counters for the broker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerStats {
    pub published: u64,
    pub consumed: u64,
    pub failed: u64,
    /// Messages waiting in the queue
    pub queued: u64,
}

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    consumed: AtomicU64,
    failed: AtomicU64,
}

/// In-process implementation of the CustomerNotifier port
///
/// Must be started inside a tokio runtime.
pub struct InProcessBroker {
    sender: mpsc::Sender<Envelope>,
    capacity: usize,
    counters: Arc<Counters>,
    closing: Arc<Notify>,
    /// Taken by `shutdown`
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl InProcessBroker {
    /// Starts a broker with the default customer-created handler
    pub fn start(capacity: usize) -> Self {
        Self::with_handler(capacity, Arc::new(CustomerCreatedHandler))
    }

    /// Starts a broker whose consumer delivers to `handler`
    ///
    /// A capacity of zero is raised to one.
    pub fn with_handler(capacity: usize, handler: Arc<dyn MessageHandler>) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let counters = Arc::new(Counters::default());

        info!(
            exchange = CUSTOMER_EXCHANGE,
            queue = CUSTOMER_CREATED_QUEUE,
            routing_key = CUSTOMER_CREATED_ROUTING_KEY,
            capacity,
            "Starting in-process broker"
        );

        let closing = Arc::new(Notify::new());
        let consumer = tokio::spawn(consume(
            receiver,
            handler,
            Arc::clone(&counters),
            Arc::clone(&closing),
        ));

        Self {
            sender,
            capacity,
            counters,
            closing,
            consumer: Mutex::new(Some(consumer)),
        }
    }

    /// Stops accepting messages and waits for the queue to drain
    ///
    /// Publishing afterwards fails with `MessagingError::Closed`. Calling it
    /// again is a no-op.
    pub async fn shutdown(&self) {
        self.closing.notify_one();

        let consumer = match self.consumer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(consumer) = consumer {
            if let Err(e) = consumer.await {
                error!(error = %e, "Consumer task ended abnormally");
            }
            let stats = self.stats();
            info!(
                consumed = stats.consumed,
                failed = stats.failed,
                "In-process broker drained"
            );
        }
    }

    /// Routes an encoded message through the exchange
    ///
    /// Only the customer-created routing key has a bound queue; anything
    /// else is dropped, as a topic exchange with no matching binding would.
    pub fn publish(&self, routing_key: &'static str, payload: Vec<u8>) -> Result<(), MessagingError> {
        if routing_key != CUSTOMER_CREATED_ROUTING_KEY {
            warn!(routing_key, "No queue bound for routing key; message dropped");
            return Ok(());
        }

        let envelope = Envelope {
            exchange: CUSTOMER_EXCHANGE,
            routing_key,
            payload,
            published_at: Utc::now(),
        };

        match self.sender.try_send(envelope) {
            Ok(()) => {
                self.counters.published.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(MESSAGES_PUBLISHED, "queue" => CUSTOMER_CREATED_QUEUE).increment(1);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(MessagingError::QueueFull {
                queue: CUSTOMER_CREATED_QUEUE,
            }),
            Err(TrySendError::Closed(_)) => Err(MessagingError::Closed {
                queue: CUSTOMER_CREATED_QUEUE,
            }),
        }
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            published: self.counters.published.load(Ordering::Relaxed),
            consumed: self.counters.consumed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            queued: self.queued() as u64,
        }
    }

    fn queued(&self) -> usize {
        self.capacity.saturating_sub(self.sender.capacity())
    }

    /// Returns true while the consumer task is running and accepting messages
    pub fn is_running(&self) -> bool {
        let consumer_alive = match self.consumer.lock() {
            Ok(guard) => guard.as_ref().is_some_and(|handle| !handle.is_finished()),
            Err(_) => false,
        };
        consumer_alive && !self.sender.is_closed()
    }
}

impl Drop for InProcessBroker {
    /// Closes the queue; the consumer finishes what is already queued
    fn drop(&mut self) {
        self.closing.notify_one();
    }
}

async fn consume(
    mut receiver: mpsc::Receiver<Envelope>,
    handler: Arc<dyn MessageHandler>,
    counters: Arc<Counters>,
    closing: Arc<Notify>,
) {
    let mut draining = false;

    loop {
        let next = if draining {
            receiver.recv().await
        } else {
            tokio::select! {
                _ = closing.notified() => {
                    debug!(queue = CUSTOMER_CREATED_QUEUE, "Closing queue, draining remaining messages");
                    receiver.close();
                    draining = true;
                    continue;
                }
                next = receiver.recv() => next,
            }
        };

        let Some(envelope) = next else {
            break;
        };

        debug!(
            exchange = envelope.exchange,
            routing_key = envelope.routing_key,
            "Received message"
        );

        let result = match serde_json::from_slice::<CustomerView>(&envelope.payload) {
            Ok(customer) => handler.handle(&customer).await,
            Err(e) => Err(MessagingError::from(e)),
        };

        match result {
            Ok(()) => {
                counters.consumed.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(MESSAGES_CONSUMED, "queue" => CUSTOMER_CREATED_QUEUE).increment(1);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(MESSAGES_FAILED, "queue" => CUSTOMER_CREATED_QUEUE).increment(1);
                error!(error = %e, "Error processing customer creation message");
            }
        }
    }

    info!(queue = CUSTOMER_CREATED_QUEUE, "Consumer stopped");
}

impl DomainPort for InProcessBroker {}

#[async_trait]
impl CustomerNotifier for InProcessBroker {
    async fn publish_customer_created(&self, customer: &CustomerView) -> Result<(), PortError> {
        info!(customer_id = %customer.id, "Sending customer creation message");

        let payload = serde_json::to_vec(customer).map_err(MessagingError::from)?;
        self.publish(CUSTOMER_CREATED_ROUTING_KEY, payload)?;

        info!(customer_id = %customer.id, "Customer creation message sent successfully");
        Ok(())
    }
}

#[async_trait]
impl HealthCheckable for InProcessBroker {
    /// Unhealthy once the consumer has stopped, degraded when the queue is
    /// at least 90% full
    async fn health_check(&self) -> HealthCheckResult {
        if !self.is_running() {
            return HealthCheckResult::unhealthy(ADAPTER_ID, 0, "consumer is not running");
        }

        let queued = self.queued();
        let mut result = HealthCheckResult::healthy(ADAPTER_ID, 0);
        if queued * 10 >= self.capacity * 9 {
            result.status = AdapterHealth::Degraded;
            result.message = Some(format!("{} of {} queue slots in use", queued, self.capacity));
        }
        result
    }
}

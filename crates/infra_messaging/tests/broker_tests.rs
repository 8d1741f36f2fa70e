//! In-process broker tests
//!
//! Handlers report deliveries over channels so tests can wait for the
//! consumer without sleeping.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;

use core_kernel::{AdapterHealth, CustomerId, HealthCheckable, PortError};
use domain_customer::{CustomerNotifier, CustomerView};
use infra_messaging::{InProcessBroker, MessageHandler, MessagingError, CUSTOMER_CREATED_ROUTING_KEY};

fn view(id: i64, first_name: &str) -> CustomerView {
    CustomerView {
        id: CustomerId::new(id),
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        age: 30,
        date_of_birth: NaiveDate::from_ymd_opt(1993, 1, 1).unwrap(),
    }
}

/// Forwards every delivered view to a channel
struct Forwarding(mpsc::UnboundedSender<CustomerView>);

#[async_trait]
impl MessageHandler for Forwarding {
    async fn handle(&self, customer: &CustomerView) -> Result<(), MessagingError> {
        let _ = self.0.send(customer.clone());
        Ok(())
    }
}

/// Signals each delivery, then waits for a permit before finishing
struct Gated {
    started: mpsc::UnboundedSender<CustomerId>,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl MessageHandler for Gated {
    async fn handle(&self, customer: &CustomerView) -> Result<(), MessagingError> {
        let _ = self.started.send(customer.id);
        let permit = self.gate.acquire().await.map_err(|e| MessagingError::Handler(e.to_string()))?;
        permit.forget();
        Ok(())
    }
}

/// Fails every delivery, reporting after each attempt
struct Failing(mpsc::UnboundedSender<()>);

#[async_trait]
impl MessageHandler for Failing {
    async fn handle(&self, _customer: &CustomerView) -> Result<(), MessagingError> {
        let _ = self.0.send(());
        Err(MessagingError::Handler("welcome email rejected".into()))
    }
}

async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("consumer timed out")
        .expect("handler dropped")
}

#[tokio::test]
async fn test_published_view_reaches_consumer() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let broker = InProcessBroker::with_handler(8, Arc::new(Forwarding(tx)));

    broker.publish_customer_created(&view(1, "John")).await.unwrap();
    broker.publish_customer_created(&view(2, "Jane")).await.unwrap();

    assert_eq!(next(&mut rx).await, view(1, "John"));
    assert_eq!(next(&mut rx).await, view(2, "Jane"));
    assert_eq!(broker.stats().published, 2);
}

#[tokio::test]
async fn test_full_queue_rejects_publish() {
    let (started_tx, mut started) = mpsc::unbounded_channel();
    let gate = Arc::new(Semaphore::new(0));
    let broker = InProcessBroker::with_handler(
        1,
        Arc::new(Gated {
            started: started_tx,
            gate: Arc::clone(&gate),
        }),
    );

    // First message is taken by the consumer and parked in the handler
    broker.publish_customer_created(&view(1, "A")).await.unwrap();
    assert_eq!(next(&mut started).await, CustomerId::new(1));

    // Second fills the only slot
    broker.publish_customer_created(&view(2, "B")).await.unwrap();
    assert_eq!(broker.stats().queued, 1);

    let health = broker.health_check().await;
    assert_eq!(health.status, AdapterHealth::Degraded);

    let error = broker.publish_customer_created(&view(3, "C")).await.unwrap_err();
    assert!(matches!(error, PortError::ServiceUnavailable { .. }));

    gate.add_permits(2);
    assert_eq!(next(&mut started).await, CustomerId::new(2));
}

#[tokio::test]
async fn test_handler_failures_are_counted() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let broker = InProcessBroker::with_handler(4, Arc::new(Failing(tx)));

    broker.publish_customer_created(&view(1, "John")).await.unwrap();
    next(&mut rx).await;

    // The failure counter is bumped after the handler returns
    timeout(Duration::from_secs(5), async {
        while broker.stats().failed == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("failure was never counted");

    assert_eq!(broker.stats().consumed, 0);
    assert!(broker.is_running());
}

#[tokio::test]
async fn test_undecodable_payload_is_counted_as_failure() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let broker = InProcessBroker::with_handler(4, Arc::new(Forwarding(tx)));

    broker.publish(CUSTOMER_CREATED_ROUTING_KEY, b"not json".to_vec()).unwrap();

    timeout(Duration::from_secs(5), async {
        while broker.stats().failed == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("failure was never counted");
}

#[tokio::test]
async fn test_running_broker_is_healthy() {
    let broker = InProcessBroker::start(16);

    let health = broker.health_check().await;

    assert_eq!(health.status, AdapterHealth::Healthy);
    assert!(health.is_operational());
}

#[tokio::test]
async fn test_shutdown_drains_queued_messages() {
    let (started_tx, mut started) = mpsc::unbounded_channel();
    let gate = Arc::new(Semaphore::new(0));
    let broker = InProcessBroker::with_handler(
        8,
        Arc::new(Gated {
            started: started_tx,
            gate: Arc::clone(&gate),
        }),
    );

    for id in 1..=3 {
        broker.publish_customer_created(&view(id, "Queued")).await.unwrap();
    }
    assert_eq!(next(&mut started).await, CustomerId::new(1));

    gate.add_permits(3);
    timeout(Duration::from_secs(5), broker.shutdown())
        .await
        .expect("shutdown never finished draining");

    assert_eq!(broker.stats().consumed, 3);
    assert_eq!(started.try_recv().unwrap(), CustomerId::new(2));
    assert_eq!(started.try_recv().unwrap(), CustomerId::new(3));
    assert!(!broker.is_running());

    let error = broker.publish_customer_created(&view(4, "Late")).await.unwrap_err();
    assert!(matches!(error, PortError::ServiceUnavailable { .. }));

    // Second call has nothing left to wait for
    broker.shutdown().await;
}

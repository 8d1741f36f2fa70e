//! Customer Domain Ports
//!
//! Port interfaces the customer service needs from the outside world:
//!
//! - [`CustomerStore`] / [`CustomerTransaction`]: persistence, always used
//!   through an explicit unit of work
//! - [`CustomerNotifier`]: publishes "customer created" notifications
//!
//! # Units of work
//!
//! Every storage call goes through a transaction opened with
//! [`CustomerStore::begin`]. A transaction is committed explicitly; dropping
//! it without committing discards its writes, so an early `?` return rolls
//! back automatically. [`CustomerStore::begin_snapshot`] opens a read-only
//! unit of work whose reads all see the same committed state.
//!
//! ```rust,ignore
//! let mut tx = store.begin().await?;
//! let customer = tx.find_by_id(id).await?.ok_or(CustomerError::NotFound(id))?;
//! tx.save(&customer).await?;
//! tx.commit().await?;
//! ```

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, HealthCheckable, PortError};

use crate::customer::{Customer, CustomerView, NewCustomer};

/// Source of customer units of work
#[async_trait]
pub trait CustomerStore: DomainPort + HealthCheckable {
    /// Opens a new unit of work
    async fn begin(&self) -> Result<Box<dyn CustomerTransaction>, PortError>;

    /// Opens a read-only unit of work over one consistent snapshot
    ///
    /// Every read in it observes the same committed state, so counts taken
    /// from `find_all` agree with `average_age` and `age_standard_deviation`.
    async fn begin_snapshot(&self) -> Result<Box<dyn CustomerTransaction>, PortError>;
}

/// A unit of work over customer records
///
/// Reads observe this transaction's own uncommitted writes.
#[async_trait]
pub trait CustomerTransaction: Send {
    /// Persists a new record, assigning its identifier and creation timestamp
    async fn insert(&mut self, customer: NewCustomer) -> Result<Customer, PortError>;

    /// Persists the mutable fields of an existing record
    ///
    /// Returns `PortError::NotFound` if the record no longer exists.
    async fn save(&mut self, customer: &Customer) -> Result<Customer, PortError>;

    /// Fetches a record by identifier
    async fn find_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>, PortError>;

    /// Fetches every record in ascending identifier order
    async fn find_all(&mut self) -> Result<Vec<Customer>, PortError>;

    /// Checks whether a record exists
    async fn exists_by_id(&mut self, id: CustomerId) -> Result<bool, PortError>;

    /// Physically deletes a record
    async fn delete_by_id(&mut self, id: CustomerId) -> Result<(), PortError>;

    /// Mean age across all records, `None` when there are none
    async fn average_age(&mut self) -> Result<Option<f64>, PortError>;

    /// Sample standard deviation of ages, `None` with fewer than two records
    async fn age_standard_deviation(&mut self) -> Result<Option<f64>, PortError>;

    /// Makes this transaction's writes durable
    async fn commit(self: Box<Self>) -> Result<(), PortError>;

    /// Discards this transaction's writes
    async fn rollback(self: Box<Self>) -> Result<(), PortError>;
}

/// Publishes customer lifecycle notifications
///
/// Publishing hands the message to the broker and returns; it does not wait
/// for consumers.
#[async_trait]
pub trait CustomerNotifier: DomainPort {
    /// Announces a newly created customer
    async fn publish_customer_created(&self, customer: &CustomerView) -> Result<(), PortError>;
}

/// In-memory adapters for testing
///
/// Useful for unit and HTTP tests that should not need PostgreSQL or a
/// broker.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, RwLock};
    use chrono::Utc;

    use core_kernel::HealthCheckResult;

    use crate::statistics::mean_and_sample_stddev;

    /// A call made against the in-memory store, in order
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StoreCall {
        Begin,
        BeginSnapshot,
        Insert,
        Save(CustomerId),
        FindById(CustomerId),
        FindAll,
        ExistsById(CustomerId),
        DeleteById(CustomerId),
        AverageAge,
        AgeStandardDeviation,
        Commit,
        Rollback,
    }

    impl StoreCall {
        /// True for calls that change stored data
        pub fn is_write(&self) -> bool {
            matches!(self, StoreCall::Insert | StoreCall::Save(_) | StoreCall::DeleteById(_))
        }
    }

    #[derive(Debug, Default)]
    struct Shared {
        customers: RwLock<BTreeMap<CustomerId, Customer>>,
        next_id: AtomicI64,
        calls: Mutex<Vec<StoreCall>>,
        fail_writes: AtomicBool,
    }

    impl Shared {
        async fn record(&self, call: StoreCall) {
            self.calls.lock().await.push(call);
        }

        fn check_writable(&self) -> Result<(), PortError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(PortError::connection("simulated write failure"))
            } else {
                Ok(())
            }
        }
    }

    /// In-memory implementation of CustomerStore
    ///
    /// Transactions stage their writes and apply them on commit. Identifiers
    /// come from a sequence that, like a database sequence, is not rolled
    /// back.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryCustomerStore {
        shared: Arc<Shared>,
    }

    impl InMemoryCustomerStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store, keeping the given identifiers
        pub async fn with_customers(customers: Vec<Customer>) -> Self {
            let store = Self::new();
            {
                let mut map = store.shared.customers.write().await;
                for customer in customers {
                    store
                        .shared
                        .next_id
                        .fetch_max(customer.id.value(), Ordering::SeqCst);
                    map.insert(customer.id, customer);
                }
            }
            store
        }

        /// Makes every subsequent insert, save, and delete fail
        pub fn fail_writes(&self, fail: bool) {
            self.shared.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Calls made so far, in order
        pub async fn calls(&self) -> Vec<StoreCall> {
            self.shared.calls.lock().await.clone()
        }

        /// Committed records in identifier order
        pub async fn snapshot(&self) -> Vec<Customer> {
            self.shared.customers.read().await.values().cloned().collect()
        }
    }

    impl DomainPort for InMemoryCustomerStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryCustomerStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("in-memory-customer-store", 0)
        }
    }

    #[async_trait]
    impl CustomerStore for InMemoryCustomerStore {
        async fn begin(&self) -> Result<Box<dyn CustomerTransaction>, PortError> {
            self.shared.record(StoreCall::Begin).await;
            Ok(Box::new(InMemoryTransaction {
                shared: Arc::clone(&self.shared),
                snapshot: None,
                staged: BTreeMap::new(),
            }))
        }

        async fn begin_snapshot(&self) -> Result<Box<dyn CustomerTransaction>, PortError> {
            self.shared.record(StoreCall::BeginSnapshot).await;
            let snapshot = self.shared.customers.read().await.clone();
            Ok(Box::new(InMemoryTransaction {
                shared: Arc::clone(&self.shared),
                snapshot: Some(snapshot),
                staged: BTreeMap::new(),
            }))
        }
    }

    /// Staged writes: `Some` is an upsert, `None` a delete
    ///
    /// A snapshot transaction reads the committed state captured at begin
    /// instead of re-reading it on every call.
    struct InMemoryTransaction {
        shared: Arc<Shared>,
        snapshot: Option<BTreeMap<CustomerId, Customer>>,
        staged: BTreeMap<CustomerId, Option<Customer>>,
    }

    impl InMemoryTransaction {
        async fn visible(&self) -> BTreeMap<CustomerId, Customer> {
            let mut view = match &self.snapshot {
                Some(snapshot) => snapshot.clone(),
                None => self.shared.customers.read().await.clone(),
            };
            for (id, change) in &self.staged {
                match change {
                    Some(customer) => {
                        view.insert(*id, customer.clone());
                    }
                    None => {
                        view.remove(id);
                    }
                }
            }
            view
        }

        fn check_read_write(&self) -> Result<(), PortError> {
            if self.snapshot.is_some() {
                return Err(PortError::internal("write attempted in a read-only snapshot"));
            }
            self.shared.check_writable()
        }

        async fn ages(&self) -> Vec<i32> {
            self.visible().await.values().map(|c| c.age).collect()
        }
    }

    #[async_trait]
    impl CustomerTransaction for InMemoryTransaction {
        async fn insert(&mut self, customer: NewCustomer) -> Result<Customer, PortError> {
            self.shared.record(StoreCall::Insert).await;
            self.check_read_write()?;

            let id = CustomerId::new(self.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let customer = customer.into_customer(id, Utc::now());
            self.staged.insert(id, Some(customer.clone()));
            Ok(customer)
        }

        async fn save(&mut self, customer: &Customer) -> Result<Customer, PortError> {
            self.shared.record(StoreCall::Save(customer.id)).await;
            self.check_read_write()?;

            let existing = self
                .visible()
                .await
                .remove(&customer.id)
                .ok_or_else(|| PortError::not_found("Customer", customer.id))?;

            let mut updated = customer.clone();
            updated.created_at = existing.created_at;
            self.staged.insert(customer.id, Some(updated.clone()));
            Ok(updated)
        }

        async fn find_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>, PortError> {
            self.shared.record(StoreCall::FindById(id)).await;
            Ok(self.visible().await.remove(&id))
        }

        async fn find_all(&mut self) -> Result<Vec<Customer>, PortError> {
            self.shared.record(StoreCall::FindAll).await;
            Ok(self.visible().await.into_values().collect())
        }

        async fn exists_by_id(&mut self, id: CustomerId) -> Result<bool, PortError> {
            self.shared.record(StoreCall::ExistsById(id)).await;
            Ok(self.visible().await.contains_key(&id))
        }

        async fn delete_by_id(&mut self, id: CustomerId) -> Result<(), PortError> {
            self.shared.record(StoreCall::DeleteById(id)).await;
            self.check_read_write()?;
            self.staged.insert(id, None);
            Ok(())
        }

        async fn average_age(&mut self) -> Result<Option<f64>, PortError> {
            self.shared.record(StoreCall::AverageAge).await;
            let ages = self.ages().await;
            Ok((!ages.is_empty()).then(|| mean_and_sample_stddev(&ages).0))
        }

        async fn age_standard_deviation(&mut self) -> Result<Option<f64>, PortError> {
            self.shared.record(StoreCall::AgeStandardDeviation).await;
            let ages = self.ages().await;
            Ok((ages.len() > 1).then(|| mean_and_sample_stddev(&ages).1))
        }

        async fn commit(self: Box<Self>) -> Result<(), PortError> {
            let InMemoryTransaction { shared, staged, .. } = *self;
            shared.record(StoreCall::Commit).await;
            let mut customers = shared.customers.write().await;
            for (id, change) in staged {
                match change {
                    Some(customer) => {
                        customers.insert(id, customer);
                    }
                    None => {
                        customers.remove(&id);
                    }
                }
            }
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), PortError> {
            self.shared.record(StoreCall::Rollback).await;
            Ok(())
        }
    }

    /// Notifier that keeps every published view in memory
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNotifier {
        published: Arc<Mutex<Vec<CustomerView>>>,
        failing: Arc<AtomicBool>,
    }

    impl RecordingNotifier {
        /// Creates a notifier that accepts every message
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a notifier whose publishes always fail
        pub fn failing() -> Self {
            let notifier = Self::default();
            notifier.failing.store(true, Ordering::SeqCst);
            notifier
        }

        /// Views published so far, in order
        pub async fn published(&self) -> Vec<CustomerView> {
            self.published.lock().await.clone()
        }
    }

    impl DomainPort for RecordingNotifier {}

    #[async_trait]
    impl CustomerNotifier for RecordingNotifier {
        async fn publish_customer_created(&self, customer: &CustomerView) -> Result<(), PortError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "recording-notifier".to_string(),
                });
            }
            self.published.lock().await.push(customer.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::{InMemoryCustomerStore, StoreCall};
    use chrono::NaiveDate;

    fn new_customer(first_name: &str, age: i32) -> NewCustomer {
        NewCustomer {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            age,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryCustomerStore::new();
        let mut tx = store.begin().await.unwrap();

        let first = tx.insert(new_customer("A", 20)).await.unwrap();
        let second = tx.insert(new_customer("B", 30)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.id, CustomerId::new(1));
        assert_eq!(second.id, CustomerId::new(2));
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded_on_drop() {
        let store = InMemoryCustomerStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert(new_customer("A", 20)).await.unwrap();
            assert_eq!(tx.find_all().await.unwrap().len(), 1);
        }

        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_discards_delete() {
        let store = InMemoryCustomerStore::new();
        let mut tx = store.begin().await.unwrap();
        let customer = tx.insert(new_customer("A", 20)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.delete_by_id(customer.id).await.unwrap();
        assert!(!tx.exists_by_id(customer.id).await.unwrap());
        tx.rollback().await.unwrap();

        assert_eq!(store.snapshot().await, vec![customer]);
        assert!(store.calls().await.contains(&StoreCall::Rollback));
    }

    #[tokio::test]
    async fn test_aggregates_follow_storage_semantics() {
        let store = InMemoryCustomerStore::new();
        let mut tx = store.begin().await.unwrap();

        assert_eq!(tx.average_age().await.unwrap(), None);
        assert_eq!(tx.age_standard_deviation().await.unwrap(), None);

        tx.insert(new_customer("A", 40)).await.unwrap();
        assert_eq!(tx.average_age().await.unwrap(), Some(40.0));
        assert_eq!(tx.age_standard_deviation().await.unwrap(), None);

        tx.insert(new_customer("B", 20)).await.unwrap();
        assert_eq!(tx.average_age().await.unwrap(), Some(30.0));
        assert!(tx.age_standard_deviation().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_snapshot_ignores_later_commits() {
        let store = InMemoryCustomerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert(new_customer("A", 40)).await.unwrap();
        tx.commit().await.unwrap();

        let mut snapshot = store.begin_snapshot().await.unwrap();
        assert_eq!(snapshot.find_all().await.unwrap().len(), 1);

        let mut writer = store.begin().await.unwrap();
        writer.insert(new_customer("B", 20)).await.unwrap();
        writer.commit().await.unwrap();

        assert_eq!(snapshot.find_all().await.unwrap().len(), 1);
        assert_eq!(snapshot.average_age().await.unwrap(), Some(40.0));
        assert_eq!(snapshot.age_standard_deviation().await.unwrap(), None);
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_rejects_writes() {
        let store = InMemoryCustomerStore::new();
        let mut snapshot = store.begin_snapshot().await.unwrap();

        assert!(snapshot.insert(new_customer("A", 40)).await.is_err());
        assert_eq!(store.calls().await[0], StoreCall::BeginSnapshot);
    }

    #[tokio::test]
    async fn test_save_missing_record_is_not_found() {
        let store = InMemoryCustomerStore::new();
        let mut tx = store.begin().await.unwrap();
        let ghost = new_customer("Ghost", 50).into_customer(CustomerId::new(77), chrono::Utc::now());

        let error = tx.save(&ghost).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = InMemoryCustomerStore::new();
        store.fail_writes(true);

        let mut tx = store.begin().await.unwrap();
        let error = tx.insert(new_customer("A", 20)).await.unwrap_err();
        assert!(error.is_transient());
    }
}

//! Consumers of customer messages

use async_trait::async_trait;
use tracing::info;

use domain_customer::CustomerView;

use crate::error::MessagingError;

/// Processes one delivered customer-created message
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, customer: &CustomerView) -> Result<(), MessagingError>;
}

/// Default follow-up work for a new customer
///
/// Stands in for the welcome email, the analytics update and the downstream
/// integrations; each step is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerCreatedHandler;

#[async_trait]
impl MessageHandler for CustomerCreatedHandler {
    async fn handle(&self, customer: &CustomerView) -> Result<(), MessagingError> {
        info!(customer_id = %customer.id, "Processing customer creation message");

        info!(
            first_name = %customer.first_name,
            last_name = %customer.last_name,
            "Sending welcome email"
        );
        info!("Updating analytics with new customer information");
        info!("Notifying other systems about new customer");

        info!(customer_id = %customer.id, "Customer created message processed successfully");
        Ok(())
    }
}

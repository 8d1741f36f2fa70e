//! Customer handlers
//!
//! Thin adapters over `CustomerService`; every domain error becomes an
//! `ApiError` through `From`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use core_kernel::CustomerId;
use domain_customer::{CustomerDetailView, CustomerInput, CustomerMetrics, CustomerView};

use crate::{error::ApiError, AppState};

/// Creates a new customer
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerView>), ApiError> {
    let Json(input) = payload?;
    info!("Received request to create customer");

    let customer = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Lists customers with their life-expectancy estimates
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerDetailView>>, ApiError> {
    info!("Received request to get all customers");
    Ok(Json(state.service.list_all_with_life_expectancy().await?))
}

/// Aggregate age statistics
pub async fn customer_metrics(
    State(state): State<AppState>,
) -> Result<Json<CustomerMetrics>, ApiError> {
    info!("Received request to get customer metrics");
    Ok(Json(state.service.compute_metrics().await?))
}

/// Gets a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    id: Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<CustomerView>, ApiError> {
    let Path(id) = id?;
    info!(customer_id = %id, "Received request to get customer");

    Ok(Json(state.service.get_by_id(id).await?))
}

/// Updates a customer
pub async fn update_customer(
    State(state): State<AppState>,
    id: Result<Path<CustomerId>, PathRejection>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<CustomerView>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    info!(customer_id = %id, "Received request to update customer");

    Ok(Json(state.service.update(id, input).await?))
}

/// Deletes a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    id: Result<Path<CustomerId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    info!(customer_id = %id, "Received request to delete customer");

    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

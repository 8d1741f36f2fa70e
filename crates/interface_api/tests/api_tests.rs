//! HTTP API Tests
//!
//! Drives the full router (auth, handlers, error mapping) over the
//! in-memory store with a clock frozen on 2024-01-01.
//!
//! # Test Organization
//!
//! - `auth_tests` - login and bearer-token enforcement
//! - `customer_tests` - create, read, list, update, delete
//! - `metrics_tests` - aggregate age statistics
//! - `health_tests` - liveness, readiness, monitoring summary

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use core_kernel::{HealthCheckResult, HealthCheckable};
use domain_customer::{
    CustomerDetailView, CustomerMetrics, CustomerService, CustomerView, InMemoryCustomerStore,
    RecordingNotifier,
};
use interface_api::{
    auth::UserStore, config::ApiConfig, create_router, dto::auth::LoginResponse, AppState,
};
use test_utils::{CustomerBuilder, CustomerFixtures, DateFixtures};

const JWT_SECRET: &str = "api-test-secret";

struct TestApp {
    server: TestServer,
    store: InMemoryCustomerStore,
    notifier: RecordingNotifier,
}

fn config() -> ApiConfig {
    ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..ApiConfig::default()
    }
}

fn state_over(store: &InMemoryCustomerStore, notifier: &RecordingNotifier) -> AppState {
    let service = CustomerService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        Arc::new(DateFixtures::clock()),
    );
    let users = UserStore::with_default_users(4).unwrap();
    AppState::new(service, config(), users)
}

async fn app_with(store: InMemoryCustomerStore) -> TestApp {
    let notifier = RecordingNotifier::new();
    let state = state_over(&store, &notifier);
    let server = TestServer::new(create_router(state, None)).unwrap();
    TestApp { server, store, notifier }
}

async fn app() -> TestApp {
    app_with(InMemoryCustomerStore::new()).await
}

impl TestApp {
    async fn token(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<LoginResponse>().token
    }

    async fn user_token(&self) -> String {
        self.token("user", "user").await
    }

    async fn admin_token(&self) -> String {
        self.token("admin", "admin").await
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_returns_bearer_token() {
        let app = app().await;

        let response = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": "admin", "password": "admin" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<LoginResponse>();
        assert_eq!(body.token_type, "Bearer");
        assert_eq!(body.expires_in, 86400);
        assert!(!body.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let app = app().await;

        let response = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": "user", "password": "nope" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_login_empty_username_is_bad_request() {
        let app = app().await;

        let response = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": "", "password": "user" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_customers_require_token() {
        let app = app().await;

        let response = app.server.get("/api/customers").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let app = app().await;

        let response = app
            .server
            .get("/api/customers")
            .authorization_bearer("not-a-jwt")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod customer_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_customer() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .post("/api/customers")
            .authorization_bearer(&token)
            .json(&CustomerFixtures::john_doe_input())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["firstName"], "John");
        assert_eq!(body["lastName"], "Doe");
        assert_eq!(body["age"], 30);
        assert_eq!(body["dateOfBirth"], "1994-01-01");
        assert!(body["id"].as_i64().is_some());

        assert_eq!(app.store.snapshot().await.len(), 1);
        assert_eq!(app.notifier.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_ignores_client_id() {
        let app = app().await;
        let token = app.user_token().await;

        let mut payload = serde_json::to_value(CustomerFixtures::john_doe_input()).unwrap();
        payload["id"] = json!(999);

        let created = app
            .server
            .post("/api/customers")
            .authorization_bearer(&token)
            .json(&payload)
            .await
            .json::<CustomerView>();

        assert_ne!(created.id.value(), 999);
    }

    #[tokio::test]
    async fn test_create_missing_fields_reports_each() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .post("/api/customers")
            .authorization_bearer(&token)
            .json(&json!({ "firstName": "John" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "validation_error");
        let details = body["details"].as_object().unwrap();
        assert!(details.contains_key("lastName"));
        assert!(details.contains_key("age"));
        assert!(details.contains_key("dateOfBirth"));
        assert!(!details.contains_key("firstName"));

        assert!(app.store.snapshot().await.is_empty());
        assert!(app.notifier.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_negative_age_rejected() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .post("/api/customers")
            .authorization_bearer(&token)
            .json(&json!({
                "firstName": "John",
                "lastName": "Doe",
                "age": -1,
                "dateOfBirth": "1994-01-01"
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["details"]["age"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .post("/api/customers")
            .authorization_bearer(&token)
            .bytes(Bytes::from_static(b"{ not json"))
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_get_customer() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(vec![CustomerFixtures::john_doe(7)]).await,
        )
        .await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/customers/7")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let customer = response.json::<CustomerView>();
        assert_eq!(customer.id.value(), 7);
        assert_eq!(customer.first_name, "John");
    }

    #[tokio::test]
    async fn test_get_missing_customer_is_not_found() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/customers/42")
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Customer not found with ID: 42");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/customers/abc")
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_includes_life_expectancy() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(vec![
                CustomerFixtures::john_doe(1),
                CustomerFixtures::elderly(2),
            ])
            .await,
        )
        .await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/customers")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let customers = response.json::<Vec<CustomerDetailView>>();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].estimated_life_expectancy, DateFixtures::ymd(2074, 1, 1));
        assert_eq!(customers[1].estimated_life_expectancy, DateFixtures::ymd(2025, 1, 1));
        assert_eq!(customers[0].created_at, DateFixtures::created_at());
    }

    #[tokio::test]
    async fn test_list_empty() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/customers")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!([]));
    }

    #[tokio::test]
    async fn test_update_customer() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(vec![CustomerFixtures::john_doe(3)]).await,
        )
        .await;
        let token = app.user_token().await;

        let response = app
            .server
            .put("/api/customers/3")
            .authorization_bearer(&token)
            .json(&CustomerFixtures::jane_smith_input())
            .await;

        response.assert_status_ok();
        let updated = response.json::<CustomerView>();
        assert_eq!(updated.id.value(), 3);
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.age, 25);

        let stored = app.store.snapshot().await;
        assert_eq!(stored[0].last_name, "Smith");
        assert_eq!(stored[0].created_at, DateFixtures::created_at());
    }

    #[tokio::test]
    async fn test_update_missing_customer_is_not_found() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .put("/api/customers/9")
            .authorization_bearer(&token)
            .json(&CustomerFixtures::jane_smith_input())
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(app.store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_invalid_payload() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(vec![CustomerFixtures::john_doe(3)]).await,
        )
        .await;
        let token = app.user_token().await;

        let response = app
            .server
            .put("/api/customers/3")
            .authorization_bearer(&token)
            .json(&CustomerFixtures::empty_input())
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.store.snapshot().await[0].first_name, "John");
    }

    #[tokio::test]
    async fn test_delete_customer() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(vec![CustomerFixtures::john_doe(4)]).await,
        )
        .await;
        let token = app.user_token().await;

        let response = app
            .server
            .delete("/api/customers/4")
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert!(app.store.snapshot().await.is_empty());

        let again = app
            .server
            .delete("/api/customers/4")
            .authorization_bearer(&token)
            .await;
        again.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let app = app().await;
        app.store.fail_writes(true);
        let token = app.user_token().await;

        let response = app
            .server
            .post("/api/customers")
            .authorization_bearer(&token)
            .json(&CustomerFixtures::john_doe_input())
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "storage_error");
        assert!(!body["message"].as_str().unwrap().contains("simulated"));
        assert!(app.notifier.published().await.is_empty());
    }
}

mod metrics_tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_over_two_customers() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(CustomerBuilder::with_ages(&[30, 25])).await,
        )
        .await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/customers/metrics")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["totalCustomers"], 2);
        assert_eq!(body["youngestCustomerAge"], 25);
        assert_eq!(body["oldestCustomerAge"], 30);

        let metrics = response.json::<CustomerMetrics>();
        test_utils::assert_approx_eq(metrics.average_age, 27.5, 1e-9);
        test_utils::assert_approx_eq(metrics.age_standard_deviation, 3.5355339059327378, 1e-9);
    }

    #[tokio::test]
    async fn test_metrics_empty_store_is_all_zero() {
        let app = app().await;
        let token = app.user_token().await;

        let metrics = app
            .server
            .get("/api/customers/metrics")
            .authorization_bearer(&token)
            .await
            .json::<CustomerMetrics>();

        test_utils::assert_metrics_empty(&metrics);
    }
}

mod health_tests {
    use super::*;

    struct DownComponent;

    #[async_trait]
    impl HealthCheckable for DownComponent {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::unhealthy("down-component", 0, "connection refused")
        }
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;

        let response = app.server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_with_healthy_store() {
        let app = app().await;

        let response = app.server.get("/health/ready").await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_not_ready_when_component_down() {
        let store = InMemoryCustomerStore::new();
        let notifier = RecordingNotifier::new();
        let state = state_over(&store, &notifier).with_health_check(Arc::new(DownComponent));
        let server = TestServer::new(create_router(state, None)).unwrap();

        let response = server.get("/health/ready").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>()["status"], "not_ready");
    }

    #[tokio::test]
    async fn test_prometheus_route_absent_without_handle() {
        let app = app().await;

        app.server.get("/metrics").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_monitoring_summary_requires_admin() {
        let app = app().await;
        let token = app.user_token().await;

        let response = app
            .server
            .get("/api/monitoring/summary")
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_monitoring_summary_for_admin() {
        let app = app_with(
            InMemoryCustomerStore::with_customers(CustomerBuilder::with_ages(&[20, 40, 60])).await,
        )
        .await;
        let token = app.admin_token().await;

        let response = app
            .server
            .get("/api/monitoring/summary")
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["totalCustomers"], 3);
        assert_eq!(body["customerMetrics"]["averageAge"], 40.0);
        assert!(body.get("broker").is_none() || body["broker"].is_null());
        assert_eq!(body["components"].as_array().unwrap().len(), 1);
    }
}

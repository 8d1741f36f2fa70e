//! Login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::{create_token, AuthError};
use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::{error::ApiError, AppState};

/// Exchanges a username and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // bcrypt verification is CPU-bound
    let users = state.users.clone();
    let username = request.username.clone();
    let roles = tokio::task::spawn_blocking(move || users.authenticate(&username, &request.password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            warn!(username = %request.username, "Authentication failed: {}", e);
            ApiError::from(e)
        })?;

    let expires_in = state.config.jwt_expiration_secs;
    let token = create_token(&request.username, roles, &state.config.jwt_secret, expires_in)
        .map_err(|_: AuthError| ApiError::Internal("failed to sign token".to_string()))?;

    info!(username = %request.username, "User logged in");
    Ok(Json(LoginResponse::bearer(token, expires_in)))
}

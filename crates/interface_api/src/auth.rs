//! Authentication and authorization
//!
//! Bearer tokens are HS256 JWTs. Credentials live in a [`UserStore`] holding
//! bcrypt hashes; the default store has an `admin` and a `user` account.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role names
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - Username placed in `sub`
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role; admins have every role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims
        .roles
        .iter()
        .any(|r| r == required_role || r == roles::ADMIN)
}

/// Fails with `MissingPermission` unless `claims` carry `required_role`
pub fn require_role(claims: &Claims, required_role: &str) -> Result<(), AuthError> {
    if has_role(claims, required_role) {
        Ok(())
    } else {
        Err(AuthError::MissingPermission(required_role.to_string()))
    }
}

#[derive(Debug, Clone)]
struct UserRecord {
    password_hash: String,
    roles: Vec<String>,
}

/// In-memory credential store with bcrypt-hashed passwords
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, UserRecord>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `admin/admin` (admin, user) and `user/user` (user)
    pub fn with_default_users(cost: u32) -> Result<Self, AuthError> {
        let mut store = Self::new();
        store.add_user("admin", "admin", &[roles::ADMIN, roles::USER], cost)?;
        store.add_user("user", "user", &[roles::USER], cost)?;
        Ok(store)
    }

    /// Adds or replaces a user
    pub fn add_user(
        &mut self,
        username: &str,
        password: &str,
        roles: &[&str],
        cost: u32,
    ) -> Result<(), AuthError> {
        let password_hash =
            bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))?;

        self.users.insert(
            username.to_string(),
            UserRecord {
                password_hash,
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
        Ok(())
    }

    /// Checks a username and password, returning the user's roles
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Vec<String>, AuthError> {
        let user = self.users.get(username).ok_or(AuthError::InvalidCredentials)?;

        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => Ok(user.roles.clone()),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        }
    }
}

//! User model - local accounts reconciled from provider identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Provenance tag recording how an account was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationMethod {
    Google,
}

impl RegistrationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationMethod::Google => "google",
        }
    }
}

/// User entity. `username` and `email` are unique across all records;
/// profile fields are written once at creation and never refreshed by
/// later logins.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub registration_method: String,
    pub created_utc: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        first_name: String,
        last_name: String,
        method: RegistrationMethod,
    ) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            username,
            email,
            first_name,
            last_name,
            registration_method: method.as_str().to_string(),
            created_utc: Utc::now(),
        }
    }

    /// Convert to the public response view.
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User view returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub registration_method: String,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            registration_method: u.registration_method,
            created_utc: u.created_utc,
        }
    }
}

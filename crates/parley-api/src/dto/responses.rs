//! Response DTOs
//!
//! Snowflake IDs serialize as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use parley_core::{Contact, User, UserId};
use serde::Serialize;

/// Token plus the user it was issued for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(token: String, expires_in: i64, user: CurrentUserResponse) -> Self {
        Self {
            token,
            token_type: "Bearer",
            expires_in,
            user,
        }
    }
}

/// The authenticated user, with presence derived from the registry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub online: bool,
    pub created_at: DateTime<Utc>,
}

impl CurrentUserResponse {
    pub fn new(user: User, online: bool) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            online,
            created_at: user.created_at,
        }
    }
}

/// One entry of the contact list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub online: bool,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            online: contact.online,
        }
    }
}

/// Liveness probe body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

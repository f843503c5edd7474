//! Router errors
//!
//! Every request a session or REST handler makes through the router fails
//! with one of these. None of them closes the connection.

use parley_common::VerificationError;
use parley_core::DomainError;
use thiserror::Error;

use crate::events::RequestRejectedEvent;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Authentication failed: {0}")]
    AuthFailure(#[from] VerificationError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Session is not authenticated")]
    NotAuthenticated,
}

impl RouterError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AuthFailure(_) => "AUTH_FAILURE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
        }
    }

    /// Whether the same request may succeed if sent again unchanged
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    pub fn to_rejection(&self, nonce: Option<String>) -> RequestRejectedEvent {
        RequestRejectedEvent {
            nonce,
            code: self.code().to_string(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

impl From<DomainError> for RouterError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UserNotFound(_) | DomainError::MessageNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            DomainError::ValidationError(_) | DomainError::ContentTooLong { .. } => {
                Self::InvalidRequest(err.to_string())
            }
            DomainError::NotMessageReceiver => Self::Forbidden(err.to_string()),
            DomainError::EmailAlreadyExists => Self::InvalidRequest(err.to_string()),
            DomainError::StoreUnavailable(msg) | DomainError::InternalError(msg) => {
                Self::StoreUnavailable(msg)
            }
        }
    }
}

//! Handler error types

use thiserror::Error;

use crate::protocol::CloseCode;

/// Failures that end the connection
///
/// Rejected requests are not handler errors; they are answered with
/// REQUEST_REJECTED and the connection stays open.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Op code {0} is not accepted from clients")]
    UnknownOpcode(u8),

    #[error("Not authenticated")]
    NotAuthenticated,

    /// The outbound queue is gone, so nothing more can be said to the client
    #[error("Connection closed")]
    ConnectionClosed,
}

impl HandlerError {
    pub const fn to_close_code(&self) -> CloseCode {
        match self {
            Self::UnknownOpcode(_) => CloseCode::UnknownOpcode,
            Self::NotAuthenticated => CloseCode::NotAuthenticated,
            Self::ConnectionClosed => CloseCode::UnknownError,
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

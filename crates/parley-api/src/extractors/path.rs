//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use parley_core::MessageId;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Deserialize)]
struct RawMessageId {
    message_id: String,
}

/// `/messages/:message_id/...`
#[derive(Debug, Clone, Copy)]
pub struct MessageIdPath(pub MessageId);

#[async_trait]
impl<S> FromRequestParts<S> for MessageIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RawMessageId>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        raw.message_id
            .parse::<MessageId>()
            .ok()
            .filter(|id| !id.is_zero())
            .map(Self)
            .ok_or_else(|| ApiError::invalid_path("Invalid message_id format"))
    }
}

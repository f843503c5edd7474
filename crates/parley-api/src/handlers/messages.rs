//! Message handlers
//!
//! Sends and read receipts go through the same event router as the gateway,
//! so a REST send reaches an online receiver's socket as `MESSAGE_CREATE`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use parley_gateway::MessagePayload;

use crate::dto::{HistoryQuery, SendMessageRequest};
use crate::extractors::{json_rejection, AuthUser, MessageIdPath};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /messages?with=<userId>
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<MessagePayload>>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;

    let messages = state
        .router()
        .list_messages_between(auth.user_id, query.with)
        .await?;

    Ok(Json(messages.into_iter().map(MessagePayload::from).collect()))
}

/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Created<Json<MessagePayload>>> {
    let Json(request) = body.map_err(json_rejection)?;

    let message = state
        .router()
        .send_message(auth.user_id, request.into())
        .await?;

    Ok(Created(Json(MessagePayload::from(message))))
}

/// PUT /messages/:message_id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    MessageIdPath(message_id): MessageIdPath,
) -> ApiResult<NoContent> {
    state.router().mark_read(auth.user_id, message_id).await?;
    Ok(NoContent)
}

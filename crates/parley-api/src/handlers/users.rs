//! User handlers

use axum::{extract::State, Json};

use crate::dto::{ContactResponse, CurrentUserResponse};
use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::services::UserService;
use crate::state::AppState;

/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let response = UserService::new(&state).current_user(auth.user_id).await?;
    Ok(Json(response))
}

/// GET /users
///
/// Everyone but the caller, each with live presence.
pub async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ContactResponse>>> {
    let contacts = UserService::new(&state).contacts(auth.user_id).await?;
    Ok(Json(contacts))
}

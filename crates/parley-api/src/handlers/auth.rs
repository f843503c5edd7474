//! Authentication handlers

use axum::{extract::State, Json};

use crate::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::extractors::ValidatedJson;
use crate::response::{ApiResult, Created};
use crate::services::AuthService;
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<AuthResponse>>> {
    let response = AuthService::new(&state).register(request).await?;
    Ok(Created(Json(response)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(&state).login(request).await?;
    Ok(Json(response))
}

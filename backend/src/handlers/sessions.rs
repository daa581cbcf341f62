use axum::{extract::State, Json};
use shared::api::{CreateSessionRequest, Session};
use shared::UserId;
use validator::Validate;

use crate::auth::jwt;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Start an anonymous session: mint a fresh user id and a token for it.
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> ApiResult<Json<Session>> {
    payload.validate()?;

    let display_name = payload
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    let uid = uuid::Uuid::new_v4().to_string();

    let (token, expires_at) = jwt::create_token(&state.auth_config, &uid, display_name.clone())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))?;

    tracing::info!(%uid, "Issued session");

    Ok(Json(Session {
        uid: UserId::new(uid),
        display_name,
        token,
        expires_at,
    }))
}

//! Request extractor that resolves the caller's session.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderMap},
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

use super::jwt;

/// Caller whose token validated. `uid` is the token subject.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub name: Option<String>,
}

impl AuthUser {
    /// Only the owner may touch `users/{uid}/...`.
    pub fn ensure_owner(&self, uid: &str) -> Result<(), ApiError> {
        if self.uid == uid {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Session does not own events of user {}",
                uid
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

// EventSource cannot send headers, so streams pass the token in the query.
fn extract_token_from_query(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token_from_header(&parts.headers)
            .or_else(|| extract_token_from_query(parts))
            .ok_or_else(|| ApiError::unauthorized("Missing authentication"))?;

        let claims = jwt::validate_token(&state.auth_config, &token).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            uid: claims.sub,
            name: claims.name,
        })
    }
}

//! Browser-side identity: the session issued by the backend, kept in local
//! storage so it survives reloads.

use chrono::Utc;
use gloo::storage::{LocalStorage, Storage};
use gloo_net::http::Request;
use shared::api::{CreateSessionRequest, Session};
use shared::store::IdentityProvider;
use shared::UserId;

use super::api::{error_message, API_BASE_URL};

const SESSION_KEY: &str = "daybook.session";

/// Stored session, unless none exists or it has expired.
pub fn load_session() -> Option<Session> {
    LocalStorage::get::<Session>(SESSION_KEY)
        .ok()
        .filter(|session| !session.is_expired(Utc::now()))
}

pub fn save_session(session: &Session) {
    if let Err(e) = LocalStorage::set(SESSION_KEY, session) {
        tracing::error!("Failed to store session: {:?}", e);
    }
}

pub fn clear_session() {
    LocalStorage::delete(SESSION_KEY);
}

/// Identity provider backed by the stored session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionIdentity;

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserId> {
        load_session().map(|session| session.uid)
    }
}

/// Ask the backend for a fresh anonymous session and store it.
pub async fn sign_in(display_name: Option<String>) -> Result<Session, String> {
    let url = format!("{}/auth/session", API_BASE_URL);
    let request = CreateSessionRequest { display_name };

    let response = Request::post(&url)
        .json(&request)
        .map_err(|e| format!("Failed to serialize request: {:?}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {:?}", e))?;

    if !response.ok() {
        return Err(error_message(&response).await);
    }

    let session: Session = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {:?}", e))?;
    save_session(&session);
    Ok(session)
}

//! Auth-related types and configuration.

use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Display name chosen at sign-in
    pub name: Option<String>,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Token settings loaded from the app configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration_days: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_duration_days: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_duration_days,
        }
    }
}

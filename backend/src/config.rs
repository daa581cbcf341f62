use anyhow::{Context, Result};
use std::env;

const DEV_JWT_SECRET: &str = "development-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string. Without one, events live in memory and
    /// are lost on restart.
    pub database_url: Option<String>,
    pub port: u16,
    pub jwt_secret: String,
    pub token_duration_days: i64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub frontend_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret,
            token_duration_days: env::var("TOKEN_DURATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("TOKEN_DURATION_DAYS must be a valid number")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok().map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            }),
            frontend_dir: env::var("FRONTEND_DIR")
                .unwrap_or_else(|_| "frontend/dist".to_string()),
        })
    }
}

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod hub;
mod models;
mod repository;
mod routes;
mod schema;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::AuthConfig;
use crate::config::AppConfig;
use crate::db::PgEventRepository;
use crate::hub::SnapshotHub;
use crate::repository::{EventRepository, MemoryEventRepository};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn EventRepository>,
    pub hub: Arc<SnapshotHub>,
    pub auth_config: Arc<AuthConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;

    tracing::info!("Starting Daybook event store");

    let repo: Arc<dyn EventRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = db::establish_connection_pool(database_url)?;
            tracing::info!("Database connection pool initialized");
            Arc::new(PgEventRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory only");
            Arc::new(MemoryEventRepository::new())
        }
    };

    let state = AppState {
        repo,
        hub: Arc::new(SnapshotHub::new()),
        auth_config: Arc::new(AuthConfig::new(
            config.jwt_secret.clone(),
            config.token_duration_days,
        )),
    };

    let app = create_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    let app = routes::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config.cors_allowed_origins.as_deref()));

    // Serve static frontend files if the directory exists
    if std::path::Path::new(&config.frontend_dir).exists() {
        tracing::info!("Serving frontend from {}", config.frontend_dir);
        let index_path = format!("{}/index.html", config.frontend_dir);
        let serve_dir =
            ServeDir::new(&config.frontend_dir).not_found_service(ServeFile::new(index_path));
        app.fallback_service(serve_dir)
    } else {
        tracing::info!(
            "Frontend directory not found at {}, serving API only",
            config.frontend_dir
        );
        app
    }
}

/// Build CORS layer based on configuration.
///
/// With an origin list only those origins are allowed; without one CORS is
/// permissive (for development only).
fn build_cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub mod handlers;

use std::env;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:5173", "https://gita-gpt-xi.vercel.app"];

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|val| val.parse().ok())
                .unwrap_or(8000),
            allowed_origins: default_origins(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: default_origins(),
        }
    }
}

fn default_origins() -> Vec<String> {
    DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect()
}

pub fn build_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/chat", post(handlers::chat))
        .route("/api/verse/:chapter/:verse", get(handlers::verse))
        .route("/api/chapter/:chapter_num", get(handlers::chapter))
        .with_state(state)
        .layer(build_cors_layer(&server.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin: {}", err);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Serves until Ctrl-C, then releases the store.
pub async fn serve(state: Arc<AppState>, server: ServerConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("{} {} listening on {}", rag::PROJECT_NAME, rag::VERSION, addr);

    let app = build_router(state.clone(), &server);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("shutting down");
    state.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origins_are_the_known_frontends() {
        assert_eq!(
            ServerConfig::default().allowed_origins,
            vec!["http://localhost:5173", "https://gita-gpt-xi.vercel.app"]
        );
    }

    #[test]
    fn origins_are_not_read_from_the_environment() {
        assert_eq!(ServerConfig::from_env().allowed_origins, default_origins());
    }
}

//! Axum server setup and configuration.
//!
//! Routes, optional CORS, request tracing and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ServerError;
use crate::handlers::{
    api_dashboard, api_symbols, api_theme, api_theme_toggle, health_check, index_page,
    serve_styles,
};
use crate::state::AppState;

/// Dashboard server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allow cross-origin API calls
    pub enable_cors: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8050,
            enable_cors: false,
        }
    }
}

impl DashboardConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("LIQUISCOPE_HOST")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.host),
            port: std::env::var("LIQUISCOPE_PORT")
                .ok()
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: std::env::var("LIQUISCOPE_CORS")
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.enable_cors),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|source| ServerError::InvalidAddress { address, source })
    }
}

/// Build the router with all routes.
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(index_page))
        .route("/styles.css", get(serve_styles))
        .route("/health", get(health_check))
        .route("/api/symbols", get(api_symbols))
        .route("/api/dashboard", get(api_dashboard))
        .route("/api/theme", get(api_theme))
        .route("/api/theme/toggle", post(api_theme_toggle))
        .with_state(state);

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Dashboard server
pub struct DashboardServer {
    state: Arc<AppState>,
    config: DashboardConfig,
}

impl DashboardServer {
    pub fn new(state: Arc<AppState>, config: DashboardConfig) -> Self {
        Self { state, config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state), self.config.enable_cors)
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(symbols = self.state.catalog.len(), "dashboard ready at http://{addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("dashboard server shut down");
        Ok(())
    }
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_listens_on_8050_without_cors() {
        let config = DashboardConfig::default();
        assert_eq!(config.port, 8050);
        assert_eq!(config.host, "0.0.0.0");
        assert!(!config.enable_cors);
        assert!(config.socket_addr().is_ok());
    }

    #[test]
    fn bad_host_is_reported() {
        let config = DashboardConfig {
            host: String::from("not a host"),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ServerError::InvalidAddress { .. })
        ));
    }
}

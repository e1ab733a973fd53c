//! Sheetbridge API Server implementation
//!
//! HTTP server using Axum. Uploads arrive as multipart forms; results are
//! returned as file downloads or JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;

/// Default upload ceiling per request
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5678,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the application router
pub fn build_router(config: &ApiConfig) -> Router {
    let state = Arc::new(AppState::default());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Transformation endpoints
        .route("/process-xml", post(handlers::process_xml))
        .route("/process-yaml", post(handlers::process_yaml))
        .route("/get-excel-headers", post(handlers::get_excel_headers))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sheetbridge_server=info,knx_sheetbridge=info,tower_http=info".into()
            }),
        )
        .init();

    let app = build_router(&config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🔗 Sheetbridge API Server starting on http://{}", addr);
    info!("   Endpoints: /process-xml, /process-yaml, /get-excel-headers");
    info!(
        "   Health: /health, Version: /version, upload limit {} bytes",
        config.max_upload_bytes
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Sheetbridge API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5678);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 9090,
            ..ApiConfig::default()
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    #[test]
    fn test_app_state_version() {
        let state = AppState::default();
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}

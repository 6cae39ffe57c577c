//! Hearth Web Server
//!
//! Thin HTTP boundary over the Hearth access-control core: bearer
//! extraction, address resolution, login, conditional aggregate reads, and
//! deferred shutdown scheduling.

pub mod accounts;
pub mod auth;
pub mod handlers;
pub mod hubs;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use server::HearthServer;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let api_root = state.config.api_root.clone();

    Router::new()
        .nest(&api_root, routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// API root prefix stripped during address resolution
    pub api_root: String,
    /// HMAC secret for locally issued tokens
    pub signing_secret: String,
    /// Access token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Issuer claim written into locally issued tokens
    pub issuer: String,
    /// External identity provider to federate with (optional)
    pub federation_issuer: Option<String>,
    /// Timeout for federation discovery and JWKS fetches
    pub federation_timeout_secs: u64,
    /// Delay between a shutdown request and the actual shutdown
    pub shutdown_delay_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            api_root: "/api/v1".to_string(),
            signing_secret: "hearth-default-secret-change-in-production".to_string(),
            token_ttl_secs: 3600,
            issuer: "hearth".to_string(),
            federation_issuer: None,
            federation_timeout_secs: 10,
            shutdown_delay_secs: 3,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HEARTH_HOST").unwrap_or(defaults.host),
            port: std::env::var("HEARTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            api_root: std::env::var("HEARTH_API_ROOT").unwrap_or(defaults.api_root),
            signing_secret: std::env::var("HEARTH_JWT_SECRET").unwrap_or(defaults.signing_secret),
            token_ttl_secs: std::env::var("HEARTH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_ttl_secs),
            issuer: std::env::var("HEARTH_ISSUER").unwrap_or(defaults.issuer),
            federation_issuer: std::env::var("HEARTH_FEDERATION_ISSUER").ok(),
            federation_timeout_secs: std::env::var("HEARTH_FEDERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.federation_timeout_secs),
            shutdown_delay_secs: std::env::var("HEARTH_SHUTDOWN_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shutdown_delay_secs),
        }
    }

    /// Build a web configuration from a loaded core configuration
    pub fn from_core(config: &hearth_core::HearthConfig) -> Self {
        let defaults = Self::default();
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            api_root: config.server.api_root.clone(),
            signing_secret: config.auth.signing_secret.clone(),
            token_ttl_secs: config.auth.token_ttl_secs,
            issuer: config.auth.issuer.clone(),
            federation_issuer: config
                .federation
                .as_ref()
                .map(|f| f.issuer_url.clone()),
            federation_timeout_secs: config
                .federation
                .as_ref()
                .map(|f| f.http_timeout_secs)
                .unwrap_or(defaults.federation_timeout_secs),
            shutdown_delay_secs: defaults.shutdown_delay_secs,
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_web=debug,tower_http=debug,axum=debug".into()),
        )
        .init();
}

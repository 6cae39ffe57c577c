//! Hearth Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::info;

/// Main Hearth web server
pub struct HearthServer {
    config: WebConfig,
    state: AppState,
}

impl HearthServer {
    /// Create a new Hearth server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    ///
    /// Blocks until the process is shut down; a shutdown scheduled through
    /// the admin endpoint drains in-flight requests gracefully.
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Hearth API server");
        info!("📍 Server address: http://{}", address);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        let shutdown = self.state.shutdown.clone();
        serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.triggered().await })
            .await
            .map_err(WebError::Server)?;

        info!("Server shut down gracefully");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for HearthServer
pub struct HearthServerBuilder {
    config: WebConfig,
}

impl HearthServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the API root prefix
    pub fn api_root<S: Into<String>>(mut self, api_root: S) -> Self {
        self.config.api_root = api_root.into();
        self
    }

    /// Set the token signing secret
    pub fn signing_secret<S: Into<String>>(mut self, secret: S) -> Self {
        self.config.signing_secret = secret.into();
        self
    }

    /// Federate with an external identity provider
    pub fn federation_issuer<S: Into<String>>(mut self, issuer: S) -> Self {
        self.config.federation_issuer = Some(issuer.into());
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<HearthServer> {
        HearthServer::new(self.config).await
    }
}

impl Default for HearthServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to start a server from environment configuration
pub async fn start_server() -> WebResult<()> {
    let config = WebConfig::from_env();
    let server = HearthServer::new(config).await?;
    server.start().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let config = WebConfig::default();
        let server = HearthServer::new(config).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = HearthServerBuilder::new()
            .host("localhost")
            .port(3000)
            .api_root("/api/v2")
            .signing_secret("builder-secret");

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert_eq!(builder.config.api_root, "/api/v2");
        assert_eq!(builder.config.signing_secret, "builder-secret");
    }

    #[test]
    fn test_config_address() {
        let config = WebConfig::default();
        assert_eq!(config.address(), "127.0.0.1:8080");
    }
}

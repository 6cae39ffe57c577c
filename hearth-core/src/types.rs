//! Core configuration types shared across Hearth crates

use serde::{Deserialize, Serialize};

/// Top-level Hearth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HearthConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Token issuance and verification settings
    pub auth: AuthConfig,
    /// Optional external identity provider
    pub federation: Option<FederationConfig>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// API root prefix stripped during address resolution
    pub api_root: String,
}

/// Token issuance and verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for locally issued tokens
    pub signing_secret: String,
    /// Access token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Issuer claim written into locally issued tokens
    pub issuer: String,
}

/// External identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Base issuer URL; the discovery document is fetched from its
    /// `.well-known/openid-configuration` path
    pub issuer_url: String,
    /// Timeout applied to discovery and JWKS fetches
    pub http_timeout_secs: u64,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            issuer_url: String::new(),
            http_timeout_secs: 10,
        }
    }
}

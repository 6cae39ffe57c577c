//! Federation Adapter
//!
//! Discovers an external OpenID-Connect-style identity provider's metadata
//! and signing key, and caches both per issuer for the process lifetime.
//! The token service consults the key cache (via [`IssuerKeys`]) when a
//! token claims a federated issuer.
//!
//! Discovery and JWKS fetches are the only network calls in the access
//! core; both run under an explicit client timeout and are never retried
//! here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use jsonwebtoken::jwk::{Jwk, JwkSet, PublicKeyUse};
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use hearth_core::FederationConfig;

use crate::error::{AccessError, AccessResult};
use crate::token::IssuerKeys;

/// Well-known suffix of the discovery document
pub const DISCOVERY_PATH: &str = ".well-known/openid-configuration";

/// Identity-provider metadata parsed from the discovery document
///
/// Immutable once cached for a given issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    #[serde(default)]
    pub grant_types_supported: Vec<String>,
    #[serde(default)]
    pub subject_types_supported: Vec<String>,
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
}

/// Fetches and caches federation metadata and signing keys
pub struct FederationClient {
    http: reqwest::Client,
    metadata: RwLock<HashMap<String, Arc<FederationMetadata>>>,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl FederationClient {
    pub fn new(timeout: Duration) -> AccessResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AccessError::Discovery(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            metadata: RwLock::new(HashMap::new()),
            keys: RwLock::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &FederationConfig) -> AccessResult<Self> {
        Self::new(Duration::from_secs(config.http_timeout_secs))
    }

    /// Fetch (or return the cached) discovery document for `issuer_url`
    ///
    /// Metadata is fetched at most once per issuer and reused for the
    /// process lifetime. Concurrent first accesses may race; the last
    /// writer wins and readers only ever observe a complete value.
    pub async fn discover(&self, issuer_url: &str) -> AccessResult<Arc<FederationMetadata>> {
        if let Some(found) = self.metadata.read().unwrap().get(issuer_url) {
            debug!("Federation metadata cache hit for issuer: {}", issuer_url);
            return Ok(found.clone());
        }

        let url = discovery_url(issuer_url)?;
        debug!("Fetching federation discovery document: {}", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AccessError::Discovery(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AccessError::Discovery(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let metadata: FederationMetadata = response
            .json()
            .await
            .map_err(|e| AccessError::Discovery(format!("Unparsable discovery document: {}", e)))?;

        let metadata = Arc::new(metadata);
        self.metadata
            .write()
            .unwrap()
            .insert(issuer_url.to_string(), metadata.clone());

        info!("Discovered federation metadata for issuer: {}", metadata.issuer);
        Ok(metadata)
    }

    /// Fetch (or return the cached) signing key for the metadata's issuer
    pub async fn resolve_signing_key(
        &self,
        metadata: &FederationMetadata,
    ) -> AccessResult<DecodingKey> {
        if let Some(key) = self.keys.read().unwrap().get(&metadata.issuer) {
            debug!("Signing key cache hit for issuer: {}", metadata.issuer);
            return Ok(key.clone());
        }

        debug!("Fetching JWKS from: {}", metadata.jwks_uri);

        let response = self
            .http
            .get(&metadata.jwks_uri)
            .send()
            .await
            .map_err(|e| {
                AccessError::KeyFetch(format!("Request to {} failed: {}", metadata.jwks_uri, e))
            })?;

        if !response.status().is_success() {
            return Err(AccessError::KeyFetch(format!(
                "{} returned status {}",
                metadata.jwks_uri,
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AccessError::KeyFetch(format!("Unparsable JWKS document: {}", e)))?;

        let jwk = select_signing_jwk(&jwks)
            .ok_or_else(|| AccessError::KeyFetch("No usable signing key in JWKS".to_string()))?;

        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AccessError::KeyFetch(format!("Unsupported JWKS key: {}", e)))?;

        self.keys
            .write()
            .unwrap()
            .insert(metadata.issuer.clone(), key.clone());

        info!("Cached signing key for issuer: {}", metadata.issuer);
        Ok(key)
    }

    /// Discover an issuer and cache its signing key in one step
    pub async fn prime_issuer(&self, issuer_url: &str) -> AccessResult<Arc<FederationMetadata>> {
        let metadata = self.discover(issuer_url).await?;
        self.resolve_signing_key(&metadata).await?;
        Ok(metadata)
    }
}

impl IssuerKeys for FederationClient {
    fn key_for_issuer(&self, issuer: &str) -> Option<DecodingKey> {
        self.keys.read().unwrap().get(issuer).cloned()
    }
}

fn discovery_url(issuer_url: &str) -> AccessResult<Url> {
    let base = format!("{}/", issuer_url.trim_end_matches('/'));
    let base = Url::parse(&base)
        .map_err(|e| AccessError::Discovery(format!("Invalid issuer URL: {}", e)))?;
    base.join(DISCOVERY_PATH)
        .map_err(|e| AccessError::Discovery(format!("Invalid issuer URL: {}", e)))
}

fn select_signing_jwk(jwks: &JwkSet) -> Option<&Jwk> {
    jwks.keys
        .iter()
        .find(|key| matches!(key.common.public_key_use, Some(PublicKeyUse::Signature)))
        .or_else(|| jwks.keys.first())
}

//! Application state wiring the access-control core into the web boundary

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use hearth_access::{Authorizer, FederationClient, SigningIdentity, TokenService};

use crate::accounts::AccountService;
use crate::hubs::HubRegistry;
use crate::shutdown::ShutdownController;
use crate::{WebConfig, WebError, WebResult};

/// Shared application state
///
/// Everything here is read-mostly: the signing identity is immutable after
/// startup and the federation caches populate at most once per issuer.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Token minting and verification
    pub tokens: Arc<TokenService>,
    /// Federation metadata and key cache
    pub federation: Arc<FederationClient>,
    /// Role- and ownership-based authorization
    pub authorizer: Arc<Authorizer>,
    /// Account registry and login service
    pub accounts: AccountService,
    /// Hub ownership and entity stamps
    pub hubs: Arc<HubRegistry>,
    /// Deferred shutdown scheduling
    pub shutdown: ShutdownController,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let federation = Arc::new(
            FederationClient::new(Duration::from_secs(config.federation_timeout_secs))
                .map_err(|e| WebError::Config(format!("Failed to create federation client: {}", e)))?,
        );

        // Prime the federation caches up front so federated tokens verify
        // from the first request. A failure here is not fatal: tokens from
        // that issuer are rejected until the provider becomes reachable and
        // the process is restarted.
        if let Some(issuer) = &config.federation_issuer {
            match federation.prime_issuer(issuer).await {
                Ok(metadata) => info!("Federated with identity provider: {}", metadata.issuer),
                Err(e) => warn!("Federation setup failed for {}: {}", issuer, e),
            }
        }

        let identity = SigningIdentity::from_secret(config.signing_secret.as_bytes());
        let tokens = Arc::new(
            TokenService::new(identity, config.token_ttl_secs, config.issuer.clone())
                .with_federated_keys(federation.clone()),
        );

        let hubs = Arc::new(HubRegistry::new());
        let authorizer = Arc::new(Authorizer::new(hubs.clone()));
        let accounts = AccountService::new(tokens.clone());
        let shutdown = ShutdownController::new(Duration::from_secs(config.shutdown_delay_secs));

        info!("Application state initialized successfully");
        Ok(Self {
            config,
            tokens,
            federation,
            authorizer,
            accounts,
            hubs,
            shutdown,
        })
    }
}

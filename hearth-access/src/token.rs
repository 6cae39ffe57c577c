//! Token Service
//!
//! Mints and verifies signed, self-contained bearer tokens carrying
//! identity and role claims. Verification is stateless: a credential exists
//! only as an in-memory value reconstructed from the token on each request,
//! so no session state is ever stored server-side.
//!
//! Expiry is checked against a caller-supplied clock; the boundary rule is
//! that a token is already invalid at its expiry instant (`now >= exp`).

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AccessError, AccessResult};
use crate::roles::Role;

/// Local signing and verification key material
///
/// Constructed once at startup and injected; immutable for the process
/// lifetime.
pub struct SigningIdentity {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningIdentity {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for SigningIdentity {
    // never expose key material through Debug output
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningIdentity(..)")
    }
}

/// Claim shape embedded in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role names carried by this credential
    pub roles: Vec<String>,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration instant (unix timestamp); absent means never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issuer (local service name or a federated issuer URL)
    pub iss: String,
}

/// Verified identity and role claims reconstructed from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub subject: String,
    pub roles: HashSet<Role>,
    pub issued_at: i64,
    pub expires_at: Option<i64>,
    pub issuer: String,
}

impl Credential {
    /// Exact set-membership role check; no implicit hierarchy
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Synchronous lookup of cached verification keys for federated issuers
pub trait IssuerKeys: Send + Sync {
    fn key_for_issuer(&self, issuer: &str) -> Option<DecodingKey>;
}

/// Mints and verifies bearer tokens
pub struct TokenService {
    identity: SigningIdentity,
    ttl: Duration,
    issuer: String,
    federated_keys: Option<Arc<dyn IssuerKeys>>,
}

impl TokenService {
    pub fn new(identity: SigningIdentity, ttl_secs: i64, issuer: impl Into<String>) -> Self {
        Self {
            identity,
            ttl: Duration::seconds(ttl_secs),
            issuer: issuer.into(),
            federated_keys: None,
        }
    }

    /// Wire in the federation adapter's key cache so tokens from known
    /// external issuers verify against their published keys
    pub fn with_federated_keys(mut self, keys: Arc<dyn IssuerKeys>) -> Self {
        self.federated_keys = Some(keys);
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Lifetime applied to minted tokens, in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Mint a signed token for `subject` carrying `roles`, issued now
    pub fn mint(&self, subject: &str, roles: &HashSet<Role>) -> AccessResult<String> {
        self.mint_at(subject, roles, Utc::now().timestamp())
    }

    /// Mint with an explicit issue instant; claim content is deterministic
    /// for a given `(subject, roles, issued_at)`
    pub fn mint_at(
        &self,
        subject: &str,
        roles: &HashSet<Role>,
        issued_at: i64,
    ) -> AccessResult<String> {
        let mut role_names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        role_names.sort();

        let claims = Claims {
            sub: subject.to_string(),
            roles: role_names,
            iat: issued_at,
            exp: Some(issued_at + self.ttl.num_seconds()),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.identity.encoding).map_err(|e| {
            warn!("Failed to encode token: {}", e);
            AccessError::TokenCreation
        })
    }

    /// Verify a token and reconstruct its credential
    ///
    /// Fails with [`AccessError::Malformed`] when the token cannot be
    /// parsed into the expected claim shape, [`AccessError::InvalidSignature`]
    /// when the signature matches neither the local identity nor the cached
    /// federation key for the claimed issuer, and [`AccessError::Expired`]
    /// when `now >= expires_at`.
    pub fn verify(&self, token: &str, now: i64) -> AccessResult<Credential> {
        let header = decode_header(token).map_err(|_| AccessError::Malformed)?;

        // Claims are parsed once without signature validation purely to
        // learn the claimed issuer; nothing from this pass is trusted until
        // the signature check below has passed.
        let claimed_issuer = peek_issuer(token, header.alg)?;

        let data = if claimed_issuer == self.issuer {
            decode::<Claims>(
                token,
                &self.identity.decoding,
                &relaxed_validation(Algorithm::HS256),
            )
        } else {
            let key = self
                .federated_keys
                .as_ref()
                .and_then(|keys| keys.key_for_issuer(&claimed_issuer))
                .ok_or_else(|| {
                    debug!("No verification key for issuer: {}", claimed_issuer);
                    AccessError::InvalidSignature
                })?;
            decode::<Claims>(token, &key, &relaxed_validation(header.alg))
        }
        .map_err(map_decode_error)?;

        credential_from_claims(data.claims, now)
    }
}

/// Validation with library-side expiry checking disabled; expiry is
/// enforced against the caller-supplied clock in [`credential_from_claims`]
fn relaxed_validation(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.required_spec_claims = Default::default();
    validation
}

fn peek_issuer(token: &str, algorithm: Algorithm) -> AccessResult<String> {
    let mut validation = relaxed_validation(algorithm);
    validation.insecure_disable_signature_validation();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims.iss)
        .map_err(|_| AccessError::Malformed)
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> AccessError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::Json(_) | ErrorKind::Base64(_) | ErrorKind::Utf8(_) | ErrorKind::InvalidToken => {
            AccessError::Malformed
        }
        _ => AccessError::InvalidSignature,
    }
}

fn credential_from_claims(claims: Claims, now: i64) -> AccessResult<Credential> {
    if let Some(exp) = claims.exp {
        // expiry must lie strictly after issuance
        if exp <= claims.iat {
            return Err(AccessError::Malformed);
        }
        // the expiry instant itself is already invalid
        if now >= exp {
            return Err(AccessError::Expired);
        }
    }

    let roles = claims
        .roles
        .iter()
        .map(|name| name.parse::<Role>())
        .collect::<Result<HashSet<_>, _>>()
        .map_err(|_| AccessError::Malformed)?;

    Ok(Credential {
        subject: claims.sub,
        roles,
        issued_at: claims.iat,
        expires_at: claims.exp,
        issuer: claims.iss,
    })
}

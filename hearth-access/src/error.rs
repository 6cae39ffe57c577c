//! Error taxonomy for the access-control core
//!
//! Every failure here is terminal for the request it occurs in; nothing is
//! retried internally. Messages must never include signing-key material or
//! raw token bytes.

use thiserror::Error;

pub type AccessResult<T> = Result<T, AccessError>;

/// Access-control failures
#[derive(Debug, Error)]
pub enum AccessError {
    /// Token or discovery document cannot be parsed into the expected shape
    #[error("Malformed token or claims")]
    Malformed,

    /// Signature does not match the local signing identity or the cached
    /// federation key for the claimed issuer
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is at or past its expiry instant
    #[error("Token has expired")]
    Expired,

    /// The capability requires an authenticated identity and none was supplied
    #[error("Authentication required")]
    Unauthenticated,

    /// Identity present but role set or resource ownership is insufficient
    #[error("Insufficient role or ownership for this resource")]
    Forbidden,

    /// Token could not be created
    #[error("Token creation failed")]
    TokenCreation,

    /// Federation discovery document unobtainable or invalid
    #[error("Identity provider discovery failed: {0}")]
    Discovery(String),

    /// Federation signing key unobtainable or unusable
    #[error("Identity provider key fetch failed: {0}")]
    KeyFetch(String),
}

impl AccessError {
    /// Stable error code for wire representations
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::Malformed => "malformed_token",
            AccessError::InvalidSignature => "invalid_signature",
            AccessError::Expired => "token_expired",
            AccessError::Unauthenticated => "unauthenticated",
            AccessError::Forbidden => "forbidden",
            AccessError::TokenCreation => "token_creation_failed",
            AccessError::Discovery(_) => "discovery_failed",
            AccessError::KeyFetch(_) => "key_fetch_failed",
        }
    }

    /// Whether this is an authentication failure (as opposed to an
    /// authorization failure); the boundary layer maps the two to
    /// distinct response statuses
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            AccessError::Malformed
                | AccessError::InvalidSignature
                | AccessError::Expired
                | AccessError::Unauthenticated
        )
    }
}

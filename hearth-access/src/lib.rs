//! Hearth Access - access-control and request-addressing core
//!
//! Resolves request addresses, mints and verifies bearer credentials,
//! enforces role- and ownership-based authorization, federates
//! authentication to an external identity provider, and computes change
//! fingerprints for conditional responses.
//!
//! This crate is free of HTTP-framework types; the web boundary adapts
//! these primitives to its transport.

pub mod address;
pub mod authorize;
pub mod context;
pub mod error;
pub mod federation;
pub mod fingerprint;
pub mod roles;
pub mod token;

pub use address::{path_identifier, resolve, Address};
pub use authorize::{Authorizer, HubDirectory};
pub use context::RequestContext;
pub use error::{AccessError, AccessResult};
pub use federation::{FederationClient, FederationMetadata};
pub use fingerprint::{evaluate, fingerprint, FingerprintEntry, Freshness};
pub use roles::{Capability, Role};
pub use token::{Claims, Credential, IssuerKeys, SigningIdentity, TokenService};

//! Hearth Core - shared foundations for the Hearth hub-management API
//!
//! This crate defines the error handling, logging, and configuration
//! primitives used by every other Hearth crate.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;

//! Utilities Module
//!
//! Hashing helpers, structured logging and signer configuration.

pub mod crypto;
pub mod logging;
pub mod signer_config;

pub use crypto::*;
pub use signer_config::{signer_config, ConfigLevel, SignerConfig, SignerSettings};

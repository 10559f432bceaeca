//! Message Signing Module
//!
//! Personal message signing (EIP-191 `personal_sign`).
//!
//! Format: "\x19Ethereum Signed Message:\n" + len(message) + message

pub mod ethereum;

pub use ethereum::*;

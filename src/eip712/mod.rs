//! EIP-712 Typed Data Signing
//!
//! Hashing and signing of typed structured data in its three revisions:
//! V1 (flat legacy lists), V3 (structs without arrays) and V4 (structs with
//! arrays and recursive types).
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use eth_typed_data::eip712::{sign_typed_data, SignTypedDataVersion, TypedData};
//!
//! let typed_data = TypedData::from_json(json_string, SignTypedDataVersion::V4)?;
//! let signature = sign_typed_data(&private_key, &typed_data, SignTypedDataVersion::V4)?;
//! ```

pub mod types;
pub mod encoder;
pub mod hasher;
pub mod legacy;
pub mod signer;

pub use types::*;
pub use encoder::*;
pub use hasher::*;
pub use legacy::*;
pub use signer::*;

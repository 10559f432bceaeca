//! Solidity ABI encoding
//!
//! This module provides the encoder half of the contract ABI:
//! - The Solidity primitive/array type grammar
//! - Standard head/tail encoding (`raw_encode`)
//! - Tight packing (`solidity_pack`) for the legacy typed-data hash
//! - Arbitrary-precision numeric coercions

pub mod types;
pub mod number;
pub mod encoder;
pub mod packed;


pub use types::*;
pub use number::*;
pub use encoder::*;
pub use packed::*;

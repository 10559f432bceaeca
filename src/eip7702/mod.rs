//! EIP-7702 Account Delegation
//!
//! Signing and recovery of set-code authorizations.
//! Reference: https://eips.ethereum.org/EIPS/eip-7702
//!
//! An authorization is the tuple `[chain_id, contract_address, nonce]`; the
//! signed digest is `keccak256(0x05 || rlp(tuple))`.

pub mod types;
pub mod authorization;


pub use types::*;
pub use authorization::*;

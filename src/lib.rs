//! Ethereum Typed Data Library
//!
//! Encoding, hashing, signing and signer recovery for EIP-712 typed data.
//!
//! # Architecture
//!
//! This crate provides:
//! - **abi**: Solidity type grammar, head/tail ABI encoding and tight packing
//! - **eip712**: typed-data type strings, struct hashing and the final digest
//!   for the V1, V3 and V4 revisions
//! - **signature**: secp256k1 signing and recovery, RPC signature strings
//! - **message_signer**: EIP-191 personal messages
//! - **eip7702**: account delegation authorizations
//! - **utils**: hashing helpers, structured logging and signer configuration
//!
//! # Security
//!
//! Private keys decoded through [`signature::private_key_from_hex`] live in
//! `zeroize` buffers that are cleared on drop. Log fields that carry keys,
//! addresses or digests are redacted unless the signer configuration says
//! otherwise.
//!
//! # Example
//!
//! ```rust,ignore
//! use eth_typed_data::{sign_typed_data, recover_typed_signature, SignTypedDataVersion, TypedData};
//!
//! let data = TypedData::from_json(json, SignTypedDataVersion::V4)?;
//! let signature = sign_typed_data(&private_key, &data, SignTypedDataVersion::V4)?;
//! let signer = recover_typed_signature(&data, &signature, SignTypedDataVersion::V4)?;
//! ```

pub mod error;
pub mod abi;
pub mod eip712;
pub mod eip7702;
pub mod message_signer;
pub mod signature;
pub mod utils;

pub use error::{TypedDataError, TypedDataResult};

pub use abi::{AbiValue, SolidityType};

pub use eip712::{
    encode_data, encode_field, encode_type, eip712_domain_hash, eip712_hash,
    find_type_dependencies, get_pre_image, hash_struct, hash_type, hash_typed_data,
    recover_typed_signature, sanitize_data, sign_typed_data, typed_signature_hash,
    validate_version, verify_typed_data, Eip712PreImage, MessageTypes, SignTypedDataVersion,
    TypedData, TypedDataField, TypedDataV1Field, TypedMessage,
};

pub use message_signer::{
    extract_public_key, hash_personal_message, personal_sign, recover_personal_signature,
    verify_personal_sign,
};

pub use eip7702::{
    hash_eip7702_authorization, recover_eip7702_authorization, sign_eip7702_authorization,
    Authorization,
};

pub use signature::{
    concat_sig, ecdsa_recover, ecdsa_sign, from_rpc_sig, private_to_address, public_to_address,
    EcdsaSignature,
};

pub use utils::crypto::{keccak256, to_checksum_address};

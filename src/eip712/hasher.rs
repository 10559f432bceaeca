//! EIP-712 Hashing
//!
//! Implements domain separator and final digest computation for EIP-712.

use super::encoder::hash_struct;
use super::types::*;
use crate::error::TypedDataResult;
use crate::log_debug;
use crate::utils::crypto::{keccak256, to_hex_prefixed};

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

const STRUCTURED_VERSIONS: [SignTypedDataVersion; 2] =
    [SignTypedDataVersion::V3, SignTypedDataVersion::V4];

/// Calculate the domain separator hash
///
/// domainSeparator = hashStruct(eip712Domain), resolved against a type map
/// that holds only the `EIP712Domain` definition.
pub fn eip712_domain_hash(
    typed_data: &TypedMessage,
    version: SignTypedDataVersion,
) -> TypedDataResult<[u8; 32]> {
    validate_version(version, &STRUCTURED_VERSIONS)?;

    let mut domain_types = MessageTypes::new();
    domain_types.insert(EIP712_DOMAIN.to_string(), typed_data.domain_fields().to_vec());

    hash_struct(EIP712_DOMAIN, typed_data.domain.as_ref(), &domain_types, version)
}

/// Pre-image components of a typed-data digest (for external signing)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    /// Absent when the primary type is `EIP712Domain`
    pub struct_hash: Option<[u8; 32]>,
    pub final_hash: [u8; 32],
}

/// Calculate the pre-image components for EIP-712
pub fn get_pre_image(
    typed_data: &TypedMessage,
    version: SignTypedDataVersion,
) -> TypedDataResult<Eip712PreImage> {
    validate_version(version, &STRUCTURED_VERSIONS)?;
    let typed_data = typed_data.clone().sanitized();

    let domain_separator = hash_struct(
        EIP712_DOMAIN,
        typed_data.domain.as_ref(),
        &typed_data.types,
        version,
    )?;

    let struct_hash = if typed_data.primary_type == EIP712_DOMAIN {
        None
    } else {
        Some(hash_struct(
            &typed_data.primary_type,
            typed_data.message.as_ref(),
            &typed_data.types,
            version,
        )?)
    };

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&domain_separator);
    if let Some(struct_hash) = &struct_hash {
        data.extend_from_slice(struct_hash);
    }
    let final_hash = keccak256(&data);

    log_debug!(
        "eip712",
        "hashed typed data",
        version = version,
        primary_type = typed_data.primary_type,
        digest = to_hex_prefixed(&final_hash),
    );

    Ok(Eip712PreImage {
        domain_separator,
        struct_hash,
        final_hash,
    })
}

/// Calculate the final EIP-712 hash for signing
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
///
/// The struct hash is left out when the primary type is `EIP712Domain`.
pub fn eip712_hash(
    typed_data: &TypedMessage,
    version: SignTypedDataVersion,
) -> TypedDataResult<[u8; 32]> {
    Ok(get_pre_image(typed_data, version)?.final_hash)
}

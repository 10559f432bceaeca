//! EIP-712 Signing
//!
//! ECDSA signing, recovery and verification for typed data.

use super::hasher::eip712_hash;
use super::legacy::typed_signature_hash;
use super::types::*;
use crate::error::{TypedDataError, TypedDataResult};
use crate::log_debug;
use crate::signature::{ecdsa_sign, recover_address};

/// Digest of typed data under `version`.
///
/// V1 requires the legacy list shape; V3 and V4 require a structured message.
pub fn hash_typed_data(
    typed_data: &TypedData,
    version: SignTypedDataVersion,
) -> TypedDataResult<[u8; 32]> {
    match (typed_data, version) {
        (TypedData::Legacy(fields), SignTypedDataVersion::V1) => typed_signature_hash(fields),
        (TypedData::Structured(_), SignTypedDataVersion::V1) => {
            Err(TypedDataError::ExpectNonEmptyArray)
        }
        (TypedData::Structured(message), _) => eip712_hash(message, version),
        (TypedData::Legacy(_), _) => Err(TypedDataError::VersionNotAllowed {
            version: version.to_string(),
            allowed: SignTypedDataVersion::V1.to_string(),
        }),
    }
}

/// Sign typed data
///
/// Returns the signature as `0x` + r + s + v.
pub fn sign_typed_data(
    private_key: &[u8],
    typed_data: &TypedData,
    version: SignTypedDataVersion,
) -> TypedDataResult<String> {
    if private_key.is_empty() {
        return Err(TypedDataError::MissingParameter("private key"));
    }

    let hash = hash_typed_data(typed_data, version)?;
    let signature = ecdsa_sign(&hash, private_key, None)?;

    log_debug!("eip712", "signed typed data", version = version, v = signature.v);

    signature.to_hex()
}

/// Recover the address that signed typed data
pub fn recover_typed_signature(
    typed_data: &TypedData,
    signature: &str,
    version: SignTypedDataVersion,
) -> TypedDataResult<String> {
    if signature.is_empty() {
        return Err(TypedDataError::MissingParameter("signature"));
    }

    let hash = hash_typed_data(typed_data, version)?;
    let address = recover_address(&hash, signature)?;

    log_debug!("eip712", "recovered typed data signer", version = version, signer = address);

    Ok(address)
}

/// Verify a typed-data signature against an expected address
///
/// Addresses are compared case-insensitively, with or without `0x`.
pub fn verify_typed_data(
    typed_data: &TypedData,
    signature: &str,
    expected_address: &str,
    version: SignTypedDataVersion,
) -> TypedDataResult<bool> {
    let recovered = recover_typed_signature(typed_data, signature, version)?;
    Ok(normalize_address(&recovered) == normalize_address(expected_address))
}

fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .to_lowercase()
}

//! Ethereum Personal Message Signing (EIP-191)
//!
//! Reference: https://eips.ethereum.org/EIPS/eip-191
//!
//! Messages arrive as JSON values: `0x` hex strings are decoded, other
//! strings are signed as their UTF-8 bytes.

use crate::abi::{legacy_to_buffer, AbiValue};
use crate::error::{TypedDataError, TypedDataResult};
use crate::log_debug;
use crate::signature::{ecdsa_recover, ecdsa_sign, from_rpc_sig, public_to_address};
use crate::utils::crypto::{keccak256, to_hex_prefixed};
use serde_json::Value;

/// Ethereum message prefix for personal_sign
const ETH_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash a message with the Ethereum personal sign prefix
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let prefix = format!("{}{}", ETH_MESSAGE_PREFIX, message.len());
    let mut data = Vec::with_capacity(prefix.len() + message.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

fn message_hash(data: &Value) -> TypedDataResult<[u8; 32]> {
    if data.is_null() {
        return Err(TypedDataError::MissingParameter("data"));
    }
    let message = legacy_to_buffer(&AbiValue::from(data))?;
    Ok(hash_personal_message(&message))
}

/// Sign a message using Ethereum personal_sign
///
/// Returns the signature as `0x` + r + s + v.
pub fn personal_sign(private_key: &[u8], data: &Value) -> TypedDataResult<String> {
    if private_key.is_empty() {
        return Err(TypedDataError::MissingParameter("private key"));
    }

    let hash = message_hash(data)?;
    let signature = ecdsa_sign(&hash, private_key, None)?;

    log_debug!("personal_sign", "signed message", digest = to_hex_prefixed(&hash));

    signature.to_hex()
}

/// Recover the uncompressed public key (`0x` + 128 hex chars) behind a
/// personal signature
pub fn extract_public_key(data: &Value, signature: &str) -> TypedDataResult<String> {
    Ok(to_hex_prefixed(&recover_public_key(data, signature)?))
}

/// Recover the signer's address from a signed message
pub fn recover_personal_signature(data: &Value, signature: &str) -> TypedDataResult<String> {
    let public_key = recover_public_key(data, signature)?;
    let address = to_hex_prefixed(&public_to_address(&public_key));

    log_debug!("personal_sign", "recovered signer", signer = address);

    Ok(address)
}

/// Verify a personal signature against an expected address
pub fn verify_personal_sign(data: &Value, signature: &str, address: &str) -> TypedDataResult<bool> {
    let recovered = recover_personal_signature(data, signature)?;
    let expected = address.trim().trim_start_matches("0x").to_lowercase();
    Ok(recovered.trim_start_matches("0x") == expected)
}

fn recover_public_key(data: &Value, signature: &str) -> TypedDataResult<[u8; 64]> {
    if signature.is_empty() {
        return Err(TypedDataError::MissingParameter("signature"));
    }
    let hash = message_hash(data)?;
    ecdsa_recover(&hash, &from_rpc_sig(signature)?, None)
}

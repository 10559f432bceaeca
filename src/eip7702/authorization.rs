//! EIP-7702 Authorization Handling
//!
//! Implements authorization hashing, signing and recovery.

use super::types::{Authorization, AUTHORIZATION_MAGIC};
use crate::error::{TypedDataError, TypedDataResult};
use crate::log_debug;
use crate::signature::{ecdsa_sign, recover_address};
use crate::utils::crypto::keccak256;

/// RLP encode an authorization for signing
///
/// Per EIP-7702: `rlp([chain_id, address, nonce])`
pub fn rlp_encode_authorization(auth: &Authorization) -> Vec<u8> {
    let mut content = rlp_encode_u64(auth.chain_id);
    content.extend(rlp_encode_bytes(&auth.contract_address));
    content.extend(rlp_encode_u64(auth.nonce));

    let mut encoded = Vec::with_capacity(content.len() + 9);
    if content.len() < 56 {
        encoded.push(0xc0 + content.len() as u8);
    } else {
        let len_bytes = encode_length(content.len());
        encoded.push(0xf7 + len_bytes.len() as u8);
        encoded.extend_from_slice(&len_bytes);
    }
    encoded.extend(content);
    encoded
}

/// Get the hash to sign for an authorization
///
/// Per EIP-7702: `keccak256(0x05 || rlp([chain_id, address, nonce]))`
pub fn hash_eip7702_authorization(auth: &Authorization) -> [u8; 32] {
    let rlp = rlp_encode_authorization(auth);

    let mut data = Vec::with_capacity(1 + rlp.len());
    data.push(AUTHORIZATION_MAGIC);
    data.extend_from_slice(&rlp);

    keccak256(&data)
}

/// Sign an authorization
///
/// Returns the signature as `0x` + r + s + v.
pub fn sign_eip7702_authorization(
    private_key: &[u8],
    auth: &Authorization,
) -> TypedDataResult<String> {
    if private_key.is_empty() {
        return Err(TypedDataError::MissingParameter("private key"));
    }

    let hash = hash_eip7702_authorization(auth);
    let signature = ecdsa_sign(&hash, private_key, None)?;

    log_debug!(
        "eip7702",
        "signed authorization",
        chain_id = auth.chain_id,
        contract_address = auth.contract_address_hex(),
        nonce = auth.nonce,
    );

    signature.to_hex()
}

/// Recover the address that signed an authorization
pub fn recover_eip7702_authorization(
    auth: &Authorization,
    signature: &str,
) -> TypedDataResult<String> {
    if signature.is_empty() {
        return Err(TypedDataError::MissingParameter("signature"));
    }
    recover_address(&hash_eip7702_authorization(auth), signature)
}

// =============================================================================
// RLP Encoding Helpers
// =============================================================================

pub(crate) fn rlp_encode_u64(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    rlp_encode_bytes(&bytes[start..])
}

pub(crate) fn rlp_encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        data.to_vec()
    } else if data.len() < 56 {
        let mut encoded = vec![0x80 + data.len() as u8];
        encoded.extend_from_slice(data);
        encoded
    } else {
        let len_bytes = encode_length(data.len());
        let mut encoded = vec![0xb7 + len_bytes.len() as u8];
        encoded.extend_from_slice(&len_bytes);
        encoded.extend_from_slice(data);
        encoded
    }
}

fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

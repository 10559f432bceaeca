//! Legacy (V1) typed data hashing
//!
//! V1 messages are flat lists of `{name, type, value}` entries with no domain
//! and no nested types. The digest combines a schema hash and a data hash,
//! both built with tight packing rather than the head/tail layout.

use super::types::TypedDataV1Field;
use crate::abi::{legacy_to_buffer, solidity_pack, AbiValue};
use crate::error::{TypedDataError, TypedDataResult};
use crate::utils::crypto::keccak256;

/// Hash a V1 typed message.
///
/// hash = keccak256(keccak256(pack(schema)) || keccak256(pack(values)))
/// where each schema entry is the string `"<type> <name>"`.
pub fn typed_signature_hash(typed_data: &[TypedDataV1Field]) -> TypedDataResult<[u8; 32]> {
    if typed_data.is_empty() {
        return Err(TypedDataError::ExpectNonEmptyArray);
    }

    let values = typed_data
        .iter()
        .map(|entry| {
            let value = AbiValue::from(&entry.value);
            if entry.type_name == "bytes" {
                legacy_to_buffer(&value).map(AbiValue::Bytes)
            } else {
                Ok(value)
            }
        })
        .collect::<TypedDataResult<Vec<_>>>()?;

    let types: Vec<&str> = typed_data.iter().map(|e| e.type_name.as_str()).collect();

    let schema = typed_data
        .iter()
        .map(|entry| match entry.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(AbiValue::from(serde_json::Value::String(
                format!("{} {}", entry.type_name, name),
            ))),
            _ => Err(TypedDataError::ExpectNonEmptyArray),
        })
        .collect::<TypedDataResult<Vec<_>>>()?;
    let schema_types = vec!["string"; typed_data.len()];

    let schema_hash = keccak256(&solidity_pack(&schema_types, &schema)?);
    let data_hash = keccak256(&solidity_pack(&types, &values)?);

    Ok(keccak256(&solidity_pack(
        &["bytes32", "bytes32"],
        &[AbiValue::from(schema_hash), AbiValue::from(data_hash)],
    )?))
}

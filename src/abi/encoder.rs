//! Standard (head/tail) ABI encoder
//!
//! Static values are laid out inline in declaration order; dynamic values
//! are replaced by a `uint256` offset into a trailing tail region.

use super::number::{
    bit_length, hex_to_bytes, is_hex_string, number_to_buffer, parse_number, set_length_right,
    to_be_padded, to_buffer, to_twos,
};
use super::types::*;
use crate::error::{TypedDataError, TypedDataResult};
use num_bigint::{BigInt, BigUint};
use num_traits::Signed;
use serde_json::Value;

/// Encode a single value into its 32-byte aligned ABI form
pub fn encode_single(abi_type: &SolidityType, value: &AbiValue) -> TypedDataResult<Vec<u8>> {
    match abi_type {
        SolidityType::Address => encode_uint(160, value),

        SolidityType::Bool => {
            let flag = if value.is_truthy() { 1u32 } else { 0u32 };
            Ok(to_be_padded(&BigUint::from(flag), 32))
        }

        SolidityType::String => {
            let text = match value {
                AbiValue::Json(Value::String(s)) => s.as_bytes().to_vec(),
                AbiValue::Bytes(bytes) => bytes.clone(),
                other => return Err(TypedDataError::invalid_value("string", other.describe())),
            };
            Ok(encode_dynamic_bytes(&text))
        }

        SolidityType::Array(inner, size) => {
            let items = array_items(abi_type, value)?;
            if let ArraySize::Fixed(k) = size {
                if *k != 0 && items.len() > *k {
                    return Err(TypedDataError::ArraySizeExceeded(*k));
                }
            }

            let mut encoded = Vec::new();
            if *size == ArraySize::Dynamic {
                encoded.extend(to_be_padded(&BigUint::from(items.len()), 32));
            }
            for item in &items {
                encoded.extend(encode_single(inner, &AbiValue::Json(item.clone()))?);
            }
            Ok(encoded)
        }

        SolidityType::Bytes => {
            let bytes = match value {
                AbiValue::Bytes(bytes) => bytes.clone(),
                AbiValue::Json(Value::String(s)) if is_hex_string(s) => hex_to_bytes(s)?,
                AbiValue::Json(Value::String(s)) => s.as_bytes().to_vec(),
                other => to_buffer(other)?,
            };
            Ok(encode_dynamic_bytes(&bytes))
        }

        SolidityType::FixedBytes(_) => Ok(set_length_right(&to_buffer(value)?, 32)),

        SolidityType::Uint(size) => encode_uint(*size, value),

        SolidityType::Int(size) => {
            let num = parse_number(value)?;
            check_int_width(*size, &num)?;
            // Always taken modulo 2^256 regardless of the declared width
            Ok(to_be_padded(&to_twos(&num, 256), 32))
        }

        SolidityType::Struct(name) => Err(TypedDataError::UnsupportedType(name.clone())),
    }
}

fn encode_uint(size: usize, value: &AbiValue) -> TypedDataResult<Vec<u8>> {
    let num = parse_number(value)?;
    check_uint_width(size, &num)?;
    Ok(to_be_padded(num.magnitude(), 32))
}

pub(crate) fn check_uint_width(size: usize, num: &BigInt) -> TypedDataResult<()> {
    let actual = bit_length(num);
    if actual > size as u64 {
        return Err(TypedDataError::UintExceedsWidth { width: size, actual });
    }
    if num.is_negative() {
        return Err(TypedDataError::NegativeUint);
    }
    Ok(())
}

pub(crate) fn check_int_width(size: usize, num: &BigInt) -> TypedDataResult<()> {
    let actual = bit_length(num);
    if actual > size as u64 {
        return Err(TypedDataError::IntExceedsWidth { width: size, actual });
    }
    Ok(())
}

/// Length word, payload, then zero padding to the next 32-byte boundary
fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(32) * 32;
    let mut result = Vec::with_capacity(32 + padded_len);
    result.extend(to_be_padded(&BigUint::from(bytes.len()), 32));
    result.extend_from_slice(bytes);
    result.resize(32 + padded_len, 0);
    result
}

/// Array elements of a value; a JSON string holding an array is accepted too
pub(crate) fn array_items(abi_type: &SolidityType, value: &AbiValue) -> TypedDataResult<Vec<Value>> {
    match value {
        AbiValue::Json(Value::Array(items)) => Ok(items.clone()),
        AbiValue::Json(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => Ok(items),
            _ => Err(TypedDataError::NotAnArray(abi_type.to_string())),
        },
        _ => Err(TypedDataError::NotAnArray(abi_type.to_string())),
    }
}

/// Head-region size contributed by a type: `32*K` for `T[K]`, else 32
fn head_size(abi_type: &SolidityType) -> TypedDataResult<usize> {
    match abi_type {
        SolidityType::Array(_, ArraySize::Fixed(k)) => {
            k.checked_mul(32).ok_or(TypedDataError::EncodingOverflow)
        }
        _ => Ok(32),
    }
}

/// Encode an ordered list of `(type, value)` pairs with the head/tail layout.
///
/// Each type string is parsed once up front. Offsets are relative to the
/// start of the returned buffer. Type and value counts are not cross-checked:
/// a missing value fails in the field encoder.
pub fn raw_encode<S: AsRef<str>>(types: &[S], values: &[AbiValue]) -> TypedDataResult<Vec<u8>> {
    let parsed = types
        .iter()
        .map(|t| SolidityType::parse(t.as_ref()))
        .collect::<TypedDataResult<Vec<_>>>()?;
    raw_encode_types(&parsed, values)
}

/// [`raw_encode`] over already parsed types
pub fn raw_encode_types(types: &[SolidityType], values: &[AbiValue]) -> TypedDataResult<Vec<u8>> {
    let mut head_length = types.iter().try_fold(0usize, |total, abi_type| {
        total
            .checked_add(head_size(abi_type)?)
            .ok_or(TypedDataError::EncodingOverflow)
    })?;

    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (i, abi_type) in types.iter().enumerate() {
        let value = values
            .get(i)
            .ok_or_else(|| TypedDataError::invalid_value(&abi_type.to_string(), "undefined"))?;

        let encoded = encode_single(abi_type, value)?;
        if abi_type.is_dynamic() {
            head.extend(to_be_padded(&BigUint::from(head_length), 32));
            head_length = head_length
                .checked_add(encoded.len())
                .ok_or(TypedDataError::EncodingOverflow)?;
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Minimal big-endian bytes of a numeric JSON value, used for numbers that
/// stand in for `bytes`/`string` payloads
pub fn numeric_payload(value: &AbiValue) -> TypedDataResult<Vec<u8>> {
    Ok(number_to_buffer(&parse_number(value)?))
}

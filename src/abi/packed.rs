//! Tight (`solidityPack`) encoding
//!
//! No 32-byte alignment: each value takes its natural width. Only the legacy
//! V1 typed-data hash uses this path.

use super::encoder::{array_items, check_int_width, check_uint_width};
use super::number::{parse_number, set_length_left, set_length_right, to_be_padded, to_buffer, to_twos};
use super::types::*;
use crate::error::{TypedDataError, TypedDataResult};
use serde_json::Value;

/// Bit width forced on numeric array elements
const ARRAY_ELEMENT_BITS: usize = 256;

/// Tightly pack `values` according to `types`
pub fn solidity_pack<S: AsRef<str>>(types: &[S], values: &[AbiValue]) -> TypedDataResult<Vec<u8>> {
    if types.len() != values.len() {
        return Err(TypedDataError::LengthMismatch);
    }

    let mut packed = Vec::new();
    for (type_name, value) in types.iter().zip(values) {
        packed.extend(solidity_hex_value(type_name.as_ref(), value, None)?);
    }
    Ok(packed)
}

/// Drop the first `[...]` group of an array type string
fn strip_first_dimension(type_name: &str) -> String {
    match (type_name.find('['), type_name.find(']')) {
        (Some(open), Some(close)) if close > open => {
            format!("{}{}", &type_name[..open], &type_name[close + 1..])
        }
        _ => type_name.to_string(),
    }
}

/// Tight encoding of one value.
///
/// `bitsize` overrides the output width of `bool`, `address` and integer
/// values; array elements are always packed at 256 bits.
pub fn solidity_hex_value(
    type_name: &str,
    value: &AbiValue,
    bitsize: Option<usize>,
) -> TypedDataResult<Vec<u8>> {
    if is_array_type(type_name) {
        let sub_type = strip_first_dimension(type_name);
        let abi_type = SolidityType::parse(type_name)?;
        let items = array_items(&abi_type, value)?;

        if !is_array_type(&sub_type) {
            if let Some((_, Some(ArraySize::Fixed(k)))) = split_array_suffix(type_name) {
                if k != 0 && items.len() > k {
                    return Err(TypedDataError::ArraySizeExceeded(k));
                }
            }
        }

        let mut packed = Vec::new();
        for item in items {
            packed.extend(solidity_hex_value(
                &sub_type,
                &AbiValue::Json(item),
                Some(ARRAY_ELEMENT_BITS),
            )?);
        }
        return Ok(packed);
    }

    match SolidityType::parse(type_name)? {
        SolidityType::Bytes => to_buffer(value),

        SolidityType::String => match value {
            AbiValue::Json(Value::String(s)) => Ok(s.as_bytes().to_vec()),
            AbiValue::Bytes(bytes) => Ok(bytes.clone()),
            other => Err(TypedDataError::invalid_value("string", other.describe())),
        },

        SolidityType::Bool => {
            let width = bitsize.unwrap_or(8) / 8;
            let mut packed = vec![0u8; width.max(1)];
            if value.is_truthy() {
                if let Some(last) = packed.last_mut() {
                    *last = 1;
                }
            }
            Ok(packed)
        }

        SolidityType::Address => {
            let width = bitsize.map(|bits| bits / 8).unwrap_or(20);
            Ok(set_length_left(&to_buffer(value)?, width))
        }

        SolidityType::FixedBytes(size) => Ok(set_length_right(&to_buffer(value)?, size)),

        SolidityType::Int(size) => {
            let num = parse_number(value)?;
            check_int_width(size, &num)?;
            let width = bitsize.unwrap_or(size) / 8;
            Ok(to_be_padded(&to_twos(&num, size), width))
        }

        SolidityType::Uint(size) => {
            let num = parse_number(value)?;
            check_uint_width(size, &num)?;
            let width = bitsize.unwrap_or(size) / 8;
            Ok(to_be_padded(num.magnitude(), width))
        }

        SolidityType::Array(..) | SolidityType::Struct(_) => {
            Err(TypedDataError::UnsupportedType(type_name.to_string()))
        }
    }
}

#[cfg(test)]
mod packed_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pack_natural_widths() {
        let packed = solidity_pack(
            &["bool", "uint16", "address", "bytes2", "string"],
            &[
                json!(true).into(),
                json!(258).into(),
                json!("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826").into(),
                json!("0xabcd").into(),
                json!("hi").into(),
            ],
        )
        .unwrap();
        assert_eq!(
            hex::encode(packed),
            "010102cd2a3d9f938e13cd947ec05abc7fe734df8dd826abcd6869"
        );
    }

    #[test]
    fn test_pack_int_twos_complement() {
        let packed = solidity_pack(&["int16"], &[json!(-2).into()]).unwrap();
        assert_eq!(packed, vec![0xff, 0xfe]);
    }

    #[test]
    fn test_pack_raw_bytes() {
        let packed = solidity_pack(&["bytes"], &[AbiValue::Bytes(b"raw".to_vec())]).unwrap();
        assert_eq!(packed, b"raw".to_vec());
    }

    #[test]
    fn test_pack_array_elements_full_width() {
        let packed = solidity_pack(&["uint8[]"], &[json!([1, 2]).into()]).unwrap();
        assert_eq!(packed.len(), 64);
        assert_eq!(packed[31], 1);
        assert_eq!(packed[63], 2);

        let packed = solidity_pack(&["bool[]"], &[json!([true]).into()]).unwrap();
        assert_eq!(packed.len(), 32);
        assert_eq!(packed[31], 1);
    }

    #[test]
    fn test_pack_array_size_boundary() {
        assert!(solidity_pack(&["uint[2]"], &[json!([1, 2]).into()]).is_ok());
        assert!(solidity_pack(&["uint[2]"], &[json!([1]).into()]).is_ok());
        let err = solidity_pack(&["uint[2]"], &[json!([1, 2, 3]).into()]).unwrap_err();
        assert_eq!(err.to_string(), "Elements exceed array size: 2");
    }

    #[test]
    fn test_pack_nested_array() {
        let packed = solidity_pack(&["uint8[][]"], &[json!([[1], [2, 3]]).into()]).unwrap();
        assert_eq!(packed.len(), 96);
    }

    #[test]
    fn test_pack_width_errors() {
        let err = solidity_pack(&["uint8"], &[json!(256).into()]).unwrap_err();
        assert_eq!(err.to_string(), "Supplied uint exceeds width: 8 vs 9");
        let err = solidity_pack(&["int7"], &[json!(1).into()]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid int<N> width: 7");
        let err = solidity_pack(&["bytes40"], &[json!("0x00").into()]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid bytes<N> width: 40");
    }

    #[test]
    fn test_pack_count_mismatch() {
        let err = solidity_pack(&["uint8", "uint8"], &[json!(1).into()]).unwrap_err();
        assert_eq!(err, TypedDataError::LengthMismatch);
    }
}

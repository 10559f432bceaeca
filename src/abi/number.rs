//! Big-integer and buffer coercions shared by the ABI encoders

use super::types::AbiValue;
use crate::error::{TypedDataError, TypedDataResult};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{FromPrimitive, Num, One, Signed, Zero};
use serde_json::Value;

/// Parse an ABI numeric argument.
///
/// Accepts JSON numbers of any size, `0x`-prefixed hex strings (base 16),
/// plain decimal strings (base 10) and raw big-endian bytes.
pub fn parse_number(value: &AbiValue) -> TypedDataResult<BigInt> {
    match value {
        AbiValue::Bytes(bytes) => Ok(BigInt::from_bytes_be(Sign::Plus, bytes)),
        AbiValue::Json(Value::Number(n)) => {
            let literal = n.to_string();
            if let Ok(parsed) = BigInt::from_str_radix(&literal, 10) {
                return Ok(parsed);
            }
            // Exponent notation for integral floats, e.g. 1e21
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => {
                    BigInt::from_f64(f).ok_or(TypedDataError::NotANumber)
                }
                _ => Err(TypedDataError::NotANumber),
            }
        }
        AbiValue::Json(Value::String(s)) => parse_numeric_string(s),
        AbiValue::Json(_) => Err(TypedDataError::NotANumber),
    }
}

// `from_str_radix` tolerates `_` separators and a leading `+`, so the digits
// are checked here first.
fn parse_numeric_string(s: &str) -> TypedDataResult<BigInt> {
    if let Some(digits) = s.strip_prefix("0x") {
        if digits.is_empty() {
            return Ok(BigInt::zero());
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypedDataError::NotANumber);
        }
        return BigInt::from_str_radix(digits, 16).map_err(|_| TypedDataError::NotANumber);
    }
    if s.is_empty() {
        return Ok(BigInt::zero());
    }
    let magnitude = s.strip_prefix('-').unwrap_or(s);
    if magnitude.is_empty() || !magnitude.chars().all(|c| c.is_ascii_digit()) {
        return Err(TypedDataError::NotANumber);
    }
    BigInt::from_str_radix(s, 10).map_err(|_| TypedDataError::NotANumber)
}

/// Bit length of the magnitude (`0` has length 0)
pub fn bit_length(n: &BigInt) -> u64 {
    n.magnitude().bits()
}

/// Two's-complement representation of `n` modulo `2^width`
pub fn to_twos(n: &BigInt, width: usize) -> BigUint {
    let modulus = BigInt::one() << width;
    let mut wrapped = n % &modulus;
    if wrapped.is_negative() {
        wrapped += &modulus;
    }
    wrapped.magnitude().clone()
}

/// Big-endian bytes of `n`, left-padded with zeros to `len`
pub fn to_be_padded(n: &BigUint, len: usize) -> Vec<u8> {
    let bytes = if n.is_zero() { Vec::new() } else { n.to_bytes_be() };
    set_length_left(&bytes, len)
}

/// Left-pad with zeros to `len`, keeping the trailing bytes if longer
pub fn set_length_left(bytes: &[u8], len: usize) -> Vec<u8> {
    if bytes.len() >= len {
        return bytes[bytes.len() - len..].to_vec();
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(bytes);
    out
}

/// Right-pad with zeros to `len`, keeping the leading bytes if longer
pub fn set_length_right(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(len)].to_vec();
    out.resize(len, 0);
    out
}

/// `0x` followed only by hex digits
pub fn is_hex_string(s: &str) -> bool {
    s.strip_prefix("0x")
        .map(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

/// Decode a hex string, with or without `0x`, padding odd lengths with a leading zero
pub fn hex_to_bytes(s: &str) -> TypedDataResult<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let result = if digits.len() % 2 == 1 {
        hex::decode(format!("0{}", digits))
    } else {
        hex::decode(digits)
    };
    result.map_err(|e| TypedDataError::InvalidHex(format!("{}: {}", s, e)))
}

/// Minimal big-endian bytes of a number; zero becomes a single `0x00`
pub fn number_to_buffer(n: &BigInt) -> Vec<u8> {
    if n.is_zero() {
        return vec![0];
    }
    n.magnitude().to_bytes_be()
}

/// Strict buffer conversion: raw bytes, `0x` hex strings, numbers, byte arrays
pub fn to_buffer(value: &AbiValue) -> TypedDataResult<Vec<u8>> {
    match value {
        AbiValue::Bytes(bytes) => Ok(bytes.clone()),
        AbiValue::Json(json) => match json {
            Value::Null => Ok(Vec::new()),
            Value::String(s) if is_hex_string(s) => hex_to_bytes(s),
            Value::String(s) => Err(TypedDataError::invalid_value(
                "bytes",
                format!("cannot convert non-hex string to buffer: {}", s),
            )),
            Value::Number(_) => {
                let n = parse_number(value)?;
                if n.is_negative() {
                    return Err(TypedDataError::invalid_value("bytes", json));
                }
                Ok(number_to_buffer(&n))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(|| TypedDataError::invalid_value("bytes", item))
                })
                .collect(),
            other => Err(TypedDataError::invalid_value("bytes", other)),
        },
    }
}

/// Legacy conversion: non-hex strings are taken as UTF-8 bytes, anything else
/// goes through [`to_buffer`]
pub fn legacy_to_buffer(value: &AbiValue) -> TypedDataResult<Vec<u8>> {
    match value {
        AbiValue::Json(Value::String(s)) if !is_hex_string(s) => Ok(s.as_bytes().to_vec()),
        other => to_buffer(other),
    }
}

#[cfg(test)]
mod number_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number(&json!(42).into()).unwrap(), BigInt::from(42));
        assert_eq!(parse_number(&json!("42").into()).unwrap(), BigInt::from(42));
        assert_eq!(parse_number(&json!("0x2a").into()).unwrap(), BigInt::from(42));
        assert_eq!(parse_number(&json!("-7").into()).unwrap(), BigInt::from(-7));
        assert_eq!(
            parse_number(&AbiValue::Bytes(vec![0x01, 0x00])).unwrap(),
            BigInt::from(256)
        );
        assert_eq!(parse_number(&json!(true).into()), Err(TypedDataError::NotANumber));
        assert_eq!(parse_number(&json!("abc").into()), Err(TypedDataError::NotANumber));
        assert_eq!(parse_number(&json!(1.5).into()), Err(TypedDataError::NotANumber));
    }

    #[test]
    fn test_malformed_numeric_strings_are_rejected() {
        for malformed in ["1_000", "0x1_0", "+5", "-", "12 ", "0x-1", "0xg1", "1e3"] {
            assert_eq!(
                parse_number(&json!(malformed).into()),
                Err(TypedDataError::NotANumber),
                "{malformed}"
            );
        }
        assert_eq!(parse_number(&json!("").into()).unwrap(), BigInt::zero());
        assert_eq!(parse_number(&json!("0x").into()).unwrap(), BigInt::zero());
    }

    #[test]
    fn test_parse_number_beyond_u64() {
        let value = json!("115792089237316195423570985008687907853269984665640564039457584007913129639935");
        let n = parse_number(&value.into()).unwrap();
        assert_eq!(bit_length(&n), 256);
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(to_twos(&BigInt::from(-1), 8), BigUint::from(0xffu32));
        assert_eq!(to_twos(&BigInt::from(-128), 8), BigUint::from(0x80u32));
        assert_eq!(to_twos(&BigInt::from(5), 8), BigUint::from(5u32));
        assert_eq!(to_be_padded(&to_twos(&BigInt::from(-1), 256), 32), vec![0xff; 32]);
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(&BigInt::from(0)), 0);
        assert_eq!(bit_length(&BigInt::from(255)), 8);
        assert_eq!(bit_length(&BigInt::from(256)), 9);
        assert_eq!(bit_length(&BigInt::from(-128)), 8);
    }

    #[test]
    fn test_buffer_conversions() {
        assert_eq!(to_buffer(&json!("0x0102").into()).unwrap(), vec![1, 2]);
        assert_eq!(to_buffer(&json!("0x102").into()).unwrap(), vec![1, 2]);
        assert_eq!(to_buffer(&json!(0).into()).unwrap(), vec![0]);
        assert_eq!(to_buffer(&json!(256).into()).unwrap(), vec![1, 0]);
        assert!(to_buffer(&json!("hello").into()).is_err());
        assert_eq!(legacy_to_buffer(&json!("hello").into()).unwrap(), b"hello".to_vec());
        assert_eq!(legacy_to_buffer(&json!("0xff").into()).unwrap(), vec![0xff]);
    }

    #[test]
    fn test_set_length() {
        assert_eq!(set_length_left(&[1, 2], 4), vec![0, 0, 1, 2]);
        assert_eq!(set_length_left(&[1, 2, 3], 2), vec![2, 3]);
        assert_eq!(set_length_right(&[1, 2], 4), vec![1, 2, 0, 0]);
        assert_eq!(set_length_right(&[1, 2, 3], 2), vec![1, 2]);
    }
}

//! Solidity type grammar and ABI leaf values

use crate::error::{TypedDataError, TypedDataResult};
use serde_json::Value;
use std::fmt;

/// Length of an array type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySize {
    /// `T[]`
    Dynamic,
    /// `T[K]`
    Fixed(usize),
}

/// A Solidity type, parsed once from its string form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolidityType {
    Bool,
    Address,
    /// `uintN`, N in 8..=256 step 8
    Uint(usize),
    /// `intN`, N in 8..=256 step 8
    Int(usize),
    /// `bytesN`, N in 1..=32
    FixedBytes(usize),
    /// Dynamic `bytes`
    Bytes,
    /// Dynamic `string`
    String,
    /// `T[]` or `T[K]`
    Array(Box<SolidityType>, ArraySize),
    /// A reference to a declared struct type
    Struct(String),
}

impl SolidityType {
    /// Parse a primitive or array type string.
    ///
    /// Width validation happens here so that an invalid `uintN`/`intN`/`bytesN`
    /// is rejected before any value is inspected.
    pub fn parse(type_name: &str) -> TypedDataResult<Self> {
        Self::parse_with(type_name, &|_| false)
    }

    /// Parse a type string, treating any name for which `is_struct` holds as a
    /// struct reference.
    pub fn parse_with(type_name: &str, is_struct: &dyn Fn(&str) -> bool) -> TypedDataResult<Self> {
        let s = type_name;

        if is_struct(s) {
            return Ok(SolidityType::Struct(s.to_string()));
        }

        if let Some((element, size)) = split_array_suffix(s) {
            let size = size.ok_or_else(|| TypedDataError::UnsupportedType(s.to_string()))?;
            let element = Self::parse_with(element, is_struct)?;
            return Ok(SolidityType::Array(Box::new(element), size));
        }

        match s {
            "bool" => Ok(SolidityType::Bool),
            "address" => Ok(SolidityType::Address),
            "string" => Ok(SolidityType::String),
            "bytes" => Ok(SolidityType::Bytes),
            "byte" => Ok(SolidityType::FixedBytes(1)),
            "uint" => Ok(SolidityType::Uint(256)),
            "int" => Ok(SolidityType::Int(256)),
            _ if s.starts_with("bytes") => {
                let size = parse_type_n(s)?;
                if !(1..=32).contains(&size) {
                    return Err(TypedDataError::InvalidBytesWidth(size));
                }
                Ok(SolidityType::FixedBytes(size))
            }
            _ if s.starts_with("uint") => {
                let size = parse_type_n(s)?;
                if size % 8 != 0 || !(8..=256).contains(&size) {
                    return Err(TypedDataError::InvalidUintWidth(size));
                }
                Ok(SolidityType::Uint(size))
            }
            _ if s.starts_with("int") => {
                let size = parse_type_n(s)?;
                if size % 8 != 0 || !(8..=256).contains(&size) {
                    return Err(TypedDataError::InvalidIntWidth(size));
                }
                Ok(SolidityType::Int(size))
            }
            _ => Err(TypedDataError::UnsupportedType(s.to_string())),
        }
    }

    /// Dynamic types are referenced by offset in the head and stored in the tail
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            SolidityType::Bytes | SolidityType::String | SolidityType::Array(_, ArraySize::Dynamic)
        )
    }
}

impl fmt::Display for SolidityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolidityType::Bool => write!(f, "bool"),
            SolidityType::Address => write!(f, "address"),
            SolidityType::Uint(n) => write!(f, "uint{}", n),
            SolidityType::Int(n) => write!(f, "int{}", n),
            SolidityType::FixedBytes(n) => write!(f, "bytes{}", n),
            SolidityType::Bytes => write!(f, "bytes"),
            SolidityType::String => write!(f, "string"),
            SolidityType::Array(inner, ArraySize::Dynamic) => write!(f, "{}[]", inner),
            SolidityType::Array(inner, ArraySize::Fixed(k)) => write!(f, "{}[{}]", inner, k),
            SolidityType::Struct(name) => write!(f, "{}", name),
        }
    }
}

/// Split off the last `[...]` suffix of a type string.
///
/// Returns `None` when the type is not an array. The inner option is `None`
/// when the bracket content is neither empty nor a decimal size.
pub fn split_array_suffix(type_name: &str) -> Option<(&str, Option<ArraySize>)> {
    if !type_name.ends_with(']') {
        return None;
    }
    let open = type_name.rfind('[')?;
    let element = &type_name[..open];
    let inner = &type_name[open + 1..type_name.len() - 1];

    let size = if inner.is_empty() {
        Some(ArraySize::Dynamic)
    } else {
        inner.parse::<usize>().ok().map(ArraySize::Fixed)
    };
    Some((element, size))
}

/// Whether a type string names an array
pub fn is_array_type(type_name: &str) -> bool {
    type_name.ends_with(']')
}

/// Parse the trailing bit/byte width of a type like `uint64` or `bytes4`
fn parse_type_n(type_name: &str) -> TypedDataResult<usize> {
    let digits_at = type_name
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| TypedDataError::UnsupportedType(type_name.to_string()))?;
    type_name[digits_at..]
        .parse::<usize>()
        .map_err(|_| TypedDataError::UnsupportedType(type_name.to_string()))
}

/// Truthiness of a JSON value: `false`, `0`, `""` and `null` are false
pub fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A value handed to the ABI encoders.
///
/// Field values arrive as JSON leaves; hashed fields (nested structs, dynamic
/// leaves, arrays) are produced internally as raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiValue {
    Json(Value),
    Bytes(Vec<u8>),
}

impl AbiValue {
    /// Truthiness used for `bool` encoding
    pub fn is_truthy(&self) -> bool {
        match self {
            AbiValue::Bytes(_) => true,
            AbiValue::Json(value) => json_truthy(value),
        }
    }

    /// Short rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            AbiValue::Json(value) => value.to_string(),
            AbiValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        }
    }
}

impl From<Value> for AbiValue {
    fn from(value: Value) -> Self {
        AbiValue::Json(value)
    }
}

impl From<&Value> for AbiValue {
    fn from(value: &Value) -> Self {
        AbiValue::Json(value.clone())
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(bytes: Vec<u8>) -> Self {
        AbiValue::Bytes(bytes)
    }
}

impl From<[u8; 32]> for AbiValue {
    fn from(bytes: [u8; 32]) -> Self {
        AbiValue::Bytes(bytes.to_vec())
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(SolidityType::parse("bool").unwrap(), SolidityType::Bool);
        assert_eq!(SolidityType::parse("address").unwrap(), SolidityType::Address);
        assert_eq!(SolidityType::parse("uint").unwrap(), SolidityType::Uint(256));
        assert_eq!(SolidityType::parse("int").unwrap(), SolidityType::Int(256));
        assert_eq!(SolidityType::parse("uint8").unwrap(), SolidityType::Uint(8));
        assert_eq!(SolidityType::parse("int128").unwrap(), SolidityType::Int(128));
        assert_eq!(SolidityType::parse("bytes1").unwrap(), SolidityType::FixedBytes(1));
        assert_eq!(SolidityType::parse("bytes32").unwrap(), SolidityType::FixedBytes(32));
        assert_eq!(SolidityType::parse("bytes").unwrap(), SolidityType::Bytes);
        assert_eq!(SolidityType::parse("string").unwrap(), SolidityType::String);
    }

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            SolidityType::parse("uint256[]").unwrap(),
            SolidityType::Array(Box::new(SolidityType::Uint(256)), ArraySize::Dynamic)
        );
        assert_eq!(
            SolidityType::parse("uint[2]").unwrap(),
            SolidityType::Array(Box::new(SolidityType::Uint(256)), ArraySize::Fixed(2))
        );
        let nested = SolidityType::parse("address[][3]").unwrap();
        assert_eq!(nested.to_string(), "address[][3]");
        assert!(!nested.is_dynamic());
        assert!(SolidityType::parse("bool[]").unwrap().is_dynamic());
    }

    #[test]
    fn test_parse_width_errors() {
        assert_eq!(SolidityType::parse("uint7"), Err(TypedDataError::InvalidUintWidth(7)));
        assert_eq!(SolidityType::parse("uint264"), Err(TypedDataError::InvalidUintWidth(264)));
        assert_eq!(SolidityType::parse("int0"), Err(TypedDataError::InvalidIntWidth(0)));
        assert_eq!(SolidityType::parse("bytes33"), Err(TypedDataError::InvalidBytesWidth(33)));
        assert_eq!(SolidityType::parse("bytes0"), Err(TypedDataError::InvalidBytesWidth(0)));
        assert_eq!(
            SolidityType::parse("Person"),
            Err(TypedDataError::UnsupportedType("Person".to_string()))
        );
        assert_eq!(
            SolidityType::parse("uint[x]"),
            Err(TypedDataError::UnsupportedType("uint[x]".to_string()))
        );
    }

    #[test]
    fn test_parse_struct_reference() {
        let is_struct = |name: &str| name == "Person";
        assert_eq!(
            SolidityType::parse_with("Person[]", &is_struct).unwrap(),
            SolidityType::Array(Box::new(SolidityType::Struct("Person".into())), ArraySize::Dynamic)
        );
        assert_eq!(
            SolidityType::parse_with("Person", &is_struct).unwrap(),
            SolidityType::Struct("Person".into())
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_rejected() {
        assert_eq!(
            SolidityType::parse(" uint256"),
            Err(TypedDataError::UnsupportedType(" uint256".to_string()))
        );
        assert!(SolidityType::parse("uint256 ").is_err());
        assert!(SolidityType::parse("bool[] ").is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!AbiValue::from(json!(false)).is_truthy());
        assert!(!AbiValue::from(json!(0)).is_truthy());
        assert!(!AbiValue::from(json!("")).is_truthy());
        assert!(!AbiValue::from(json!(null)).is_truthy());
        assert!(AbiValue::from(json!("0")).is_truthy());
        assert!(AbiValue::from(json!(2)).is_truthy());
        assert!(AbiValue::from(json!({})).is_truthy());
    }
}

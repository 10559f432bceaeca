//! EIP-712 Type Definitions
//!
//! Core data structures for typed data hashing and signing.

use crate::abi::json_truthy;
use crate::error::{TypedDataError, TypedDataResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Reserved name of the domain separator struct
pub const EIP712_DOMAIN: &str = "EIP712Domain";

/// Typed data revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignTypedDataVersion {
    /// Legacy array-of-triples hash, tightly packed
    V1,
    /// Structured hashing without arrays; absent fields are omitted
    V3,
    /// Structured hashing with arrays and recursive types; absent fields are errors
    V4,
}

impl fmt::Display for SignTypedDataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignTypedDataVersion::V1 => write!(f, "V1"),
            SignTypedDataVersion::V3 => write!(f, "V3"),
            SignTypedDataVersion::V4 => write!(f, "V4"),
        }
    }
}

impl FromStr for SignTypedDataVersion {
    type Err = TypedDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "V1" => Ok(SignTypedDataVersion::V1),
            "V3" => Ok(SignTypedDataVersion::V3),
            "V4" => Ok(SignTypedDataVersion::V4),
            "" => Err(TypedDataError::MissingParameter("version")),
            other => Err(TypedDataError::InvalidVersion(other.to_string())),
        }
    }
}

/// Check that `version` is one of `allowed`
pub fn validate_version(
    version: SignTypedDataVersion,
    allowed: &[SignTypedDataVersion],
) -> TypedDataResult<()> {
    if allowed.contains(&version) {
        return Ok(());
    }
    Err(TypedDataError::VersionNotAllowed {
        version: version.to_string(),
        allowed: allowed
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "Person[]")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Struct name -> ordered fields
pub type MessageTypes = HashMap<String, Vec<TypedDataField>>;

/// A V3/V4 typed message
///
/// Unknown top-level keys are dropped when deserializing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypedMessage {
    /// Type definitions (struct name -> fields)
    #[serde(default)]
    pub types: MessageTypes,

    /// The name of the primary type being signed
    pub primary_type: String,

    /// The domain separator values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Value>,

    /// The message values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl TypedMessage {
    /// Parse and sanitize a typed message from a JSON string
    pub fn from_json(json: &str) -> TypedDataResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        sanitize_data(&value)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> TypedDataResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Fields declared for the domain struct
    pub fn domain_fields(&self) -> &[TypedDataField] {
        self.types
            .get(EIP712_DOMAIN)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop falsy domain/message values and default the domain type to no fields
    pub(crate) fn sanitized(mut self) -> Self {
        self.types.entry(EIP712_DOMAIN.to_string()).or_default();
        self.domain = self.domain.filter(json_truthy);
        self.message = self.message.filter(json_truthy);
        self
    }
}

/// Keep only `types`, `primaryType`, `domain` and `message`, and make sure
/// `types` declares an `EIP712Domain` (empty if the caller left it out).
pub fn sanitize_data(data: &Value) -> TypedDataResult<TypedMessage> {
    if data.is_null() {
        return Err(TypedDataError::MissingParameter("data"));
    }
    let message: TypedMessage = serde_json::from_value(data.clone())?;
    Ok(message.sanitized())
}

/// One `{name, type, value}` entry of a legacy V1 message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypedDataV1Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub value: Value,
}

impl TypedDataV1Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            type_name: type_name.into(),
            value,
        }
    }
}

/// Typed data in either of its two shapes
#[derive(Debug, Clone, PartialEq)]
pub enum TypedData {
    /// V1: ordered `{name, type, value}` triples
    Legacy(Vec<TypedDataV1Field>),
    /// V3/V4: structured message
    Structured(TypedMessage),
}

impl TypedData {
    /// Interpret a JSON value in the shape `version` expects
    pub fn from_value(data: &Value, version: SignTypedDataVersion) -> TypedDataResult<Self> {
        if data.is_null() {
            return Err(TypedDataError::MissingParameter("data"));
        }
        match version {
            SignTypedDataVersion::V1 => match data {
                Value::Array(items) if !items.is_empty() => {
                    Ok(TypedData::Legacy(serde_json::from_value(data.clone())?))
                }
                _ => Err(TypedDataError::ExpectNonEmptyArray),
            },
            SignTypedDataVersion::V3 | SignTypedDataVersion::V4 => {
                Ok(TypedData::Structured(sanitize_data(data)?))
            }
        }
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str, version: SignTypedDataVersion) -> TypedDataResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, version)
    }
}

impl From<TypedMessage> for TypedData {
    fn from(message: TypedMessage) -> Self {
        TypedData::Structured(message)
    }
}

impl From<Vec<TypedDataV1Field>> for TypedData {
    fn from(fields: Vec<TypedDataV1Field>) -> Self {
        TypedData::Legacy(fields)
    }
}

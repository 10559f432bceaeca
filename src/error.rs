//! Error types for typed-data encoding and signing
//!
//! Every failure is permanent for the given input: encoding is a pure
//! computation, so nothing here is retryable. Messages are part of the
//! public contract and are matched verbatim by downstream consumers.

/// Result alias used throughout the crate
pub type TypedDataResult<T> = Result<T, TypedDataError>;

/// Errors produced while encoding, hashing, signing or recovering
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypedDataError {
    // Parameter presence
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    // Schema
    #[error("No type definition specified: {0}")]
    NoTypeDefinition(String),

    #[error("Unsupported or invalid type: {0}")]
    UnsupportedType(String),

    // Width / range
    #[error("Invalid uint<N> width: {0}")]
    InvalidUintWidth(usize),

    #[error("Invalid int<N> width: {0}")]
    InvalidIntWidth(usize),

    #[error("Invalid bytes<N> width: {0}")]
    InvalidBytesWidth(usize),

    #[error("Supplied uint exceeds width: {width} vs {actual}")]
    UintExceedsWidth { width: usize, actual: u64 },

    #[error("Supplied int exceeds width: {width} vs {actual}")]
    IntExceedsWidth { width: usize, actual: u64 },

    #[error("Supplied uint is negative")]
    NegativeUint,

    #[error("Elements exceed array size: {0}")]
    ArraySizeExceeded(usize),

    #[error("Encoded length overflows the address space")]
    EncodingOverflow,

    #[error("Argument is not a number")]
    NotANumber,

    #[error("Number of types are not matching the values")]
    LengthMismatch,

    #[error("Not an array: {0}")]
    NotAnArray(String),

    #[error("Invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    // Version policy
    #[error("Arrays are unimplemented in encodeData; use V4 extension")]
    ArraysUnimplemented,

    #[error("missing value for field {name} of type {type_name}")]
    MissingFieldValue { name: String, type_name: String },

    #[error("Cannot read field {field} of absent {type_name} value")]
    AbsentStructValue { type_name: String, field: String },

    #[error("Invalid version: '{0}'")]
    InvalidVersion(String),

    #[error("SignTypedDataVersion not allowed: '{version}'. Allowed versions are: {allowed}")]
    VersionNotAllowed { version: String, allowed: String },

    #[error("Expect argument to be non-empty array")]
    ExpectNonEmptyArray,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    // Signatures
    #[error("Invalid signature length")]
    InvalidSignatureLength,

    #[error("Invalid signature v value: {0}")]
    InvalidSignatureV(u64),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signature component too large: {0}")]
    SignatureComponentTooLarge(u64),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing error: {0}")]
    SigningError(String),
}

impl TypedDataError {
    pub(crate) fn invalid_value(type_name: &str, value: impl ToString) -> Self {
        Self::InvalidValue {
            type_name: type_name.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for TypedDataError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_verbatim() {
        assert_eq!(
            TypedDataError::UintExceedsWidth { width: 8, actual: 9 }.to_string(),
            "Supplied uint exceeds width: 8 vs 9"
        );
        assert_eq!(
            TypedDataError::MissingParameter("privateKey").to_string(),
            "Missing privateKey parameter"
        );
        assert_eq!(
            TypedDataError::MissingFieldValue {
                name: "to".into(),
                type_name: "address".into()
            }
            .to_string(),
            "missing value for field to of type address"
        );
        assert_eq!(
            TypedDataError::VersionNotAllowed {
                version: "V1".into(),
                allowed: "V3, V4".into()
            }
            .to_string(),
            "SignTypedDataVersion not allowed: 'V1'. Allowed versions are: V3, V4"
        );
    }
}

//! EIP-7702 Type Definitions

use crate::abi::{hex_to_bytes, parse_number, AbiValue};
use crate::error::{TypedDataError, TypedDataResult};
use num_traits::ToPrimitive;
use serde_json::Value;

/// Magic byte for authorization signing
pub const AUTHORIZATION_MAGIC: u8 = 0x05;

/// An unsigned delegation authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization {
    /// Chain ID (0 for any chain)
    pub chain_id: u64,

    /// Contract whose code the account delegates to
    pub contract_address: [u8; 20],

    /// Nonce of the authorizing account
    pub nonce: u64,
}

impl Authorization {
    pub fn new(chain_id: u64, contract_address: [u8; 20], nonce: u64) -> Self {
        Self {
            chain_id,
            contract_address,
            nonce,
        }
    }

    /// Parse the JSON tuple form `[chainId, contractAddress, nonce]`.
    ///
    /// Each missing or `null` part is reported by name.
    pub fn from_value(value: &Value) -> TypedDataResult<Self> {
        let parts = match value {
            Value::Null => return Err(TypedDataError::MissingParameter("authorization")),
            Value::Array(parts) => parts,
            other => return Err(TypedDataError::invalid_value("authorization", other)),
        };
        let part = |index: usize, name: &'static str| {
            parts
                .get(index)
                .filter(|v| !v.is_null())
                .ok_or(TypedDataError::MissingParameter(name))
        };

        let chain_id = parse_u64(part(0, "chainId")?, "chainId")?;
        let contract_address = parse_address(part(1, "contractAddress")?)?;
        let nonce = parse_u64(part(2, "nonce")?, "nonce")?;

        Ok(Self::new(chain_id, contract_address, nonce))
    }

    /// Contract address as `0x`-prefixed lower-case hex
    pub fn contract_address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.contract_address))
    }
}

fn parse_u64(value: &Value, name: &str) -> TypedDataResult<u64> {
    parse_number(&AbiValue::from(value))?
        .to_u64()
        .ok_or_else(|| TypedDataError::invalid_value(name, value))
}

fn parse_address(value: &Value) -> TypedDataResult<[u8; 20]> {
    let text = value
        .as_str()
        .ok_or_else(|| TypedDataError::invalid_value("contractAddress", value))?;
    hex_to_bytes(text)?
        .try_into()
        .map_err(|_| TypedDataError::invalid_value("contractAddress", text))
}

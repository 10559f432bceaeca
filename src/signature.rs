//! ECDSA signatures over secp256k1
//!
//! Signing, public-key recovery and the `0x`-prefixed `r || s || v` string
//! form used by every signing entry point in this crate.

use crate::error::{TypedDataError, TypedDataResult};
use crate::log_debug;
use crate::utils::crypto::{keccak256, to_hex_prefixed};
use crate::utils::signer_config::signer_config;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroizing;

/// Largest integer that survives a round trip through a double-precision float
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Signature components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaSignature {
    /// r component (32 bytes, big-endian)
    pub r: [u8; 32],
    /// s component (32 bytes, big-endian)
    pub s: [u8; 32],
    /// Recovery value: 27/28, or `chain_id * 2 + 35/36`
    pub v: u64,
}

impl EcdsaSignature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u64) -> Self {
        Self { r, s, v }
    }

    /// Render as `0x` + r + s + v (see [`concat_sig`])
    pub fn to_hex(&self) -> TypedDataResult<String> {
        concat_sig(self.v, &self.r, &self.s)
    }

    /// Compact 64-byte `r || s`
    fn compact(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        bytes
    }
}

/// Concatenate signature parts into the RPC string form.
///
/// `r` and `s` always take 64 hex characters; `v` is rendered at its natural
/// hex width and must fit in [`MAX_SAFE_INTEGER`].
pub fn concat_sig(v: u64, r: &[u8; 32], s: &[u8; 32]) -> TypedDataResult<String> {
    if v > MAX_SAFE_INTEGER {
        return Err(TypedDataError::SignatureComponentTooLarge(v));
    }
    Ok(format!("0x{}{}{:x}", hex::encode(r), hex::encode(s), v))
}

/// Parse an RPC signature string.
///
/// 65+ bytes are read as `r || s || v` with `v` lifted by 27 when below 27.
/// 64 bytes are read as an EIP-2098 compact signature when enabled in the
/// signer configuration.
pub fn from_rpc_sig(signature: &str) -> TypedDataResult<EcdsaSignature> {
    let digits = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(digits)
        .map_err(|e| TypedDataError::InvalidSignature(format!("invalid hex: {}", e)))?;

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];

    if bytes.len() >= 65 {
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);

        let v_bytes = &bytes[64..];
        let significant = v_bytes.iter().skip_while(|b| **b == 0).count();
        if significant > 8 {
            return Err(TypedDataError::SignatureComponentTooLarge(u64::MAX));
        }
        let mut v = v_bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        if v < 27 {
            v += 27;
        }
        return Ok(EcdsaSignature::new(r, s, v));
    }

    if bytes.len() == 64 && signer_config().accepts_compact_signatures() {
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        let v = u64::from(s[0] >> 7) + 27;
        s[0] &= 0x7f;
        return Ok(EcdsaSignature::new(r, s, v));
    }

    Err(TypedDataError::InvalidSignatureLength)
}

/// Recovery id from `v`, honoring an optional chain id
fn recovery_id(v: u64, chain_id: Option<u64>) -> TypedDataResult<RecoveryId> {
    let base = match chain_id {
        Some(chain_id) => chain_id
            .checked_mul(2)
            .and_then(|c| c.checked_add(35))
            .ok_or(TypedDataError::InvalidSignatureV(v))?,
        None => 27,
    };
    let id = v
        .checked_sub(base)
        .filter(|id| *id <= 1)
        .ok_or(TypedDataError::InvalidSignatureV(v))?;
    RecoveryId::from_i32(id as i32).map_err(|_| TypedDataError::InvalidSignatureV(v))
}

/// Parse a 32-byte private key
pub fn secret_key(private_key: &[u8]) -> TypedDataResult<SecretKey> {
    if private_key.len() != 32 {
        return Err(TypedDataError::InvalidPrivateKey(format!(
            "expected 32 bytes, got {}",
            private_key.len()
        )));
    }
    SecretKey::from_slice(private_key).map_err(|e| TypedDataError::InvalidPrivateKey(e.to_string()))
}

/// Decode a hex private key into a buffer that is wiped on drop
pub fn private_key_from_hex(private_key: &str) -> TypedDataResult<Zeroizing<Vec<u8>>> {
    let digits = private_key.strip_prefix("0x").unwrap_or(private_key);
    hex::decode(digits)
        .map(Zeroizing::new)
        .map_err(|_| TypedDataError::InvalidPrivateKey("invalid hex".to_string()))
}

/// Sign a 32-byte digest
pub fn ecdsa_sign(
    hash: &[u8; 32],
    private_key: &[u8],
    chain_id: Option<u64>,
) -> TypedDataResult<EcdsaSignature> {
    let secp = Secp256k1::new();
    let secret_key = secret_key(private_key)?;
    let message = Message::from_digest(*hash);

    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);

    let recovery = recovery_id.to_i32() as u64;
    let v = match chain_id {
        Some(chain_id) => chain_id
            .checked_mul(2)
            .and_then(|c| c.checked_add(35 + recovery))
            .ok_or_else(|| TypedDataError::SigningError("chain id too large".to_string()))?,
        None => recovery + 27,
    };

    Ok(EcdsaSignature::new(r, s, v))
}

/// Recover the uncompressed public key (64 bytes, no `0x04` prefix)
pub fn ecdsa_recover(
    hash: &[u8; 32],
    signature: &EcdsaSignature,
    chain_id: Option<u64>,
) -> TypedDataResult<[u8; 64]> {
    let secp = Secp256k1::new();
    let recovery_id = recovery_id(signature.v, chain_id)?;

    let recoverable = RecoverableSignature::from_compact(&signature.compact(), recovery_id)
        .map_err(|e| TypedDataError::InvalidSignature(e.to_string()))?;

    if signer_config().rejects_high_s() {
        let standard = recoverable.to_standard();
        let mut normalized = standard;
        normalized.normalize_s();
        if normalized != standard {
            return Err(TypedDataError::InvalidSignature("high s value".to_string()));
        }
    }

    let message = Message::from_digest(*hash);
    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| TypedDataError::InvalidSignature(e.to_string()))?;

    log_debug!("signature", "recovered public key", hash = to_hex_prefixed(hash));

    Ok(uncompressed_body(&public_key))
}

fn uncompressed_body(public_key: &PublicKey) -> [u8; 64] {
    let serialized = public_key.serialize_uncompressed();
    let mut body = [0u8; 64];
    body.copy_from_slice(&serialized[1..]);
    body
}

/// Address of a 64-byte public key: last 20 bytes of its Keccak-256
pub fn public_to_address(public_key: &[u8; 64]) -> [u8; 20] {
    let hash = keccak256(public_key);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Address controlled by a private key
pub fn private_to_address(private_key: &[u8]) -> TypedDataResult<[u8; 20]> {
    let secp = Secp256k1::new();
    let public_key = PublicKey::from_secret_key(&secp, &secret_key(private_key)?);
    Ok(public_to_address(&uncompressed_body(&public_key)))
}

/// Recover the signer address of a digest as `0x`-prefixed lower-case hex
pub fn recover_address(hash: &[u8; 32], signature: &str) -> TypedDataResult<String> {
    let parsed = from_rpc_sig(signature)?;
    let public_key = ecdsa_recover(hash, &parsed, None)?;
    Ok(to_hex_prefixed(&public_to_address(&public_key)))
}

use eth_typed_data::signature::{ecdsa_sign, from_rpc_sig, recover_address};
use eth_typed_data::utils::logging::{disable_debug, enable_debug, is_debug_enabled};
use eth_typed_data::utils::{signer_config, ConfigLevel};
use eth_typed_data::{keccak256, TypedDataError};

// The global configuration is shared by every test in this binary, so the
// preset changes live in a single test.
#[test]
fn strict_preset_refuses_compact_and_high_s_signatures() {
    let key = keccak256(b"cow");
    let hash = keccak256(b"config");
    let signature = ecdsa_sign(&hash, &key, None).unwrap();

    let mut s = signature.s;
    if signature.v == 28 {
        s[0] |= 0x80;
    }
    let compact = format!("0x{}{}", hex::encode(signature.r), hex::encode(s));

    // High-s twin of the same signature: s' = n - s, parity flipped
    let n = hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").unwrap();
    let mut high_s = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let diff = n[i] as i16 - signature.s[i] as i16 - borrow;
        borrow = if diff < 0 { 1 } else { 0 };
        high_s[i] = (diff + 256 * borrow) as u8;
    }
    let flipped_v = if signature.v == 27 { 28 } else { 27 };
    let malleable = format!(
        "0x{}{}{:x}",
        hex::encode(signature.r),
        hex::encode(high_s),
        flipped_v
    );

    signer_config().set_level(ConfigLevel::Standard);
    let standard_compact = recover_address(&hash, &compact).unwrap();
    let standard_malleable = recover_address(&hash, &malleable).unwrap();
    assert_eq!(standard_compact, standard_malleable);

    signer_config().set_level(ConfigLevel::Strict);
    assert_eq!(from_rpc_sig(&compact), Err(TypedDataError::InvalidSignatureLength));
    assert!(matches!(
        recover_address(&hash, &malleable),
        Err(TypedDataError::InvalidSignature(_))
    ));

    let warnings = signer_config().update(|settings| settings.accept_compact_signatures = true);
    assert_eq!(warnings.len(), 1);
    assert_eq!(recover_address(&hash, &compact).unwrap(), standard_compact);

    signer_config().set_level(ConfigLevel::Standard);
}

#[test]
fn debug_switch_toggles() {
    enable_debug();
    assert!(is_debug_enabled());
    // Signing with debug output on still succeeds
    assert!(ecdsa_sign(&keccak256(b"log"), &keccak256(b"cow"), None).is_ok());
    disable_debug();
    assert!(!is_debug_enabled());
}

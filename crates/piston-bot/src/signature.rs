use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Verifies a Discord interaction signature.
///
/// Discord sends `X-Signature-Ed25519: <hex>` and
/// `X-Signature-Timestamp: <decimal string>`. This function validates
/// the detached Ed25519 signature of `timestamp ++ raw body` against
/// the application's public key. Any malformed input (bad hex, wrong
/// key or signature length) fails verification instead of erroring.
pub fn verify(public_key_hex: &str, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(key_bytes) = hex::decode(public_key_hex) else {
        return false;
    };
    let Ok(key_bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(key_bytes.as_slice()) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };

    let Ok(sig_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(sig_bytes.as_slice()) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    key.verify(&message, &signature).is_ok()
}

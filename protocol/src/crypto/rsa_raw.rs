//! Raw (unpadded) RSA over fixed-size blocks.
//!
//! The padding is already embedded by [`super::codec`], so these functions
//! apply the bare modular exponentiation and nothing else. Using the
//! `rsa` crate's `Pkcs1v15Sign` here would add a second frame and break
//! interoperability with the gateway.
//!
//! The private operation goes through `rsa::hazmat::rsa_decrypt_and_check`,
//! which applies blinding and verifies the CRT result before returning it.

use rand::rngs::OsRng;
use rsa::hazmat::{rsa_decrypt_and_check, rsa_encrypt};
use rsa::traits::PublicKeyParts;
use rsa::BigUint;

use super::keys::{SigningKey, VerifyingKey};
use crate::error::GatewayError;

/// Raw private-key exponentiation: `block^d mod n`.
///
/// `block` must be exactly `key.byte_len()` bytes and, read as a big-endian
/// integer, smaller than the modulus. The result is left-padded to
/// `key.byte_len()` bytes so its hex form is always `2 × byte_len` long.
///
/// # Errors
///
/// [`GatewayError::CryptoFailure`] on a length mismatch, an out-of-range
/// block, or a failed exponentiation.
pub fn sign(block: &[u8], key: &SigningKey) -> Result<Vec<u8>, GatewayError> {
    let key_len = key.byte_len();
    if block.len() != key_len {
        return Err(GatewayError::CryptoFailure(format!(
            "block is {} bytes, key expects {}",
            block.len(),
            key_len
        )));
    }

    let m = BigUint::from_bytes_be(block);
    if &m >= key.as_rsa().n() {
        return Err(GatewayError::CryptoFailure(
            "block value is not smaller than the modulus".into(),
        ));
    }

    let mut rng = OsRng;
    let s = rsa_decrypt_and_check(key.as_rsa(), Some(&mut rng), &m)
        .map_err(|e| GatewayError::CryptoFailure(format!("private exponentiation failed: {}", e)))?;

    left_pad(s.to_bytes_be(), key_len)
}

/// Raw public-key exponentiation: `signature^e mod n`.
///
/// Accepts signatures up to the modulus length (leading zero bytes may have
/// been dropped by the sender) and returns the recovered block, left-padded
/// to `key.byte_len()` bytes.
///
/// # Errors
///
/// [`GatewayError::CryptoFailure`] if the signature is empty, too long, or
/// not smaller than the modulus.
pub fn verify(signature: &[u8], key: &VerifyingKey) -> Result<Vec<u8>, GatewayError> {
    let modulus = key.as_rsa().n();
    let modulus_len = key.as_rsa().size();
    if signature.is_empty() || signature.len() > modulus_len {
        return Err(GatewayError::CryptoFailure(format!(
            "signature is {} bytes, key modulus is {}",
            signature.len(),
            modulus_len
        )));
    }

    let c = BigUint::from_bytes_be(signature);
    if &c >= modulus {
        return Err(GatewayError::CryptoFailure(
            "signature value is not smaller than the modulus".into(),
        ));
    }

    let m = rsa_encrypt(key.as_rsa(), &c)
        .map_err(|e| GatewayError::CryptoFailure(format!("public exponentiation failed: {}", e)))?;

    left_pad(m.to_bytes_be(), key.byte_len())
}

fn left_pad(bytes: Vec<u8>, len: usize) -> Result<Vec<u8>, GatewayError> {
    if bytes.len() > len {
        return Err(GatewayError::CryptoFailure(format!(
            "result is {} bytes, exceeds {}-byte block",
            bytes.len(),
            len
        )));
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

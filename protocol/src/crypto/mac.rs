//! # MAC Composition
//!
//! The gateway MAC is MD5 over a length-prefixed concatenation of field
//! values: for each value, its UTF-8 byte length in decimal ASCII followed by
//! the value itself, no separators.
//!
//! ```text
//! ["AB12", "10.00"]  →  "4AB12" + "510.00"  →  "4AB12510.00"  →  md5
//! ```
//!
//! The same construction is used in both directions with two quirks the bank
//! insists on: the field lists differ, and the request hash is rendered in
//! lowercase hex while the response hash is compared in uppercase.

use md5::{Digest, Md5};

use crate::error::GatewayError;

/// Hex rendering of a MAC hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexCase {
    /// Used when signing outgoing requests.
    Lower,
    /// Used when checking gateway responses.
    Upper,
}

/// Builds the length-prefixed concatenation `len(v1) v1 len(v2) v2 …`.
///
/// Lengths count UTF-8 bytes, not characters: `"ă"` contributes `"2ă"`.
pub fn compose(values: &[&str]) -> String {
    let capacity = values.iter().map(|v| v.len() + 3).sum();
    let mut out = String::with_capacity(capacity);
    for value in values {
        out.push_str(&value.len().to_string());
        out.push_str(value);
    }
    out
}

/// MD5 of the composed values, rendered in the requested case.
pub fn mac_hash(values: &[&str], case: HexCase) -> String {
    let digest = Md5::digest(compose(values).as_bytes());
    match case {
        HexCase::Lower => hex::encode(digest),
        HexCase::Upper => hex::encode_upper(digest),
    }
}

/// MAC for an outgoing request over `order, nonce, timestamp, trtype, amount`.
///
/// Returns lowercase hex.
///
/// # Errors
///
/// [`GatewayError::InvalidInput`] if any value is empty. We never produce
/// a MAC over missing data.
pub fn request_mac(
    order: &str,
    nonce: &str,
    timestamp: &str,
    trtype: &str,
    amount: &str,
) -> Result<String, GatewayError> {
    let named = [
        ("ORDER", order),
        ("NONCE", nonce),
        ("TIMESTAMP", timestamp),
        ("TRTYPE", trtype),
        ("AMOUNT", amount),
    ];
    if let Some((name, _)) = named.iter().find(|(_, v)| v.is_empty()) {
        return Err(GatewayError::InvalidInput(format!(
            "cannot compute request MAC: {} is empty",
            name
        )));
    }
    Ok(mac_hash(
        &[order, nonce, timestamp, trtype, amount],
        HexCase::Lower,
    ))
}

/// MAC for a gateway response over `action, rc, rrn, order, amount`.
///
/// Returns uppercase hex. Empty values are hashed as-is (`"0"` length
/// prefix): the signature check, not this function, decides whether the
/// response is acceptable.
pub fn response_mac(action: &str, rc: &str, rrn: &str, order: &str, amount: &str) -> String {
    mac_hash(&[action, rc, rrn, order, amount], HexCase::Upper)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

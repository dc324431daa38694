//! # Signature Block Codec
//!
//! Before the MAC hash goes through RSA it is wrapped in a fixed-size frame
//! built from three literals the bank hands every merchant:
//!
//! ```text
//! signature_first ‖ signature_padding × pad_count ‖ signature_prefix ‖ mac_hash
//! ```
//!
//! `pad_count` is chosen so the whole thing hex-decodes to exactly the key
//! byte length:
//!
//! ```text
//! pad_count = key_len − len(mac_hash)/2 − len(prefix)/2 − len(first)/2
//! ```
//!
//! With the literals most merchants receive (`0001`, `FF`, the MD5
//! DigestInfo prefix) this is PKCS#1 v1.5 type-1 padding written out by hand,
//! but it is configured, not assumed, so the accounting has to be exact.

use crate::config::MAC_HASH_BYTES;
use crate::error::GatewayError;

/// The three bank-issued literals that shape the signature frame.
///
/// Built once at startup and immutable afterwards. Construction validates
/// the literals so a bad configuration fails before the first request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureConfig {
    first: String,
    prefix: String,
    padding: String,
}

impl SignatureConfig {
    /// Validates and stores the literals.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Configuration`] if a literal is not hex, has an odd
    /// number of digits, or if `padding` is not exactly one byte (two hex
    /// digits), since the pad count is measured in bytes.
    pub fn new(
        first: impl Into<String>,
        prefix: impl Into<String>,
        padding: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let first = first.into();
        let prefix = prefix.into();
        let padding = padding.into();

        check_hex_literal("signature_first", &first)?;
        check_hex_literal("signature_prefix", &prefix)?;
        check_hex_literal("signature_padding", &padding)?;
        if padding.len() != 2 {
            return Err(GatewayError::Configuration(format!(
                "signature_padding must be one byte (two hex digits), got {} digits",
                padding.len()
            )));
        }

        Ok(Self {
            first,
            prefix,
            padding,
        })
    }

    /// The literal hex prefix of the whole block.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The literal hex marker immediately preceding the MAC hash.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The single padding byte, as two hex digits.
    pub fn padding(&self) -> &str {
        &self.padding
    }

    /// Number of padding bytes for a hash of `hash_hex_len` hex digits in a
    /// `key_len`-byte block.
    ///
    /// # Errors
    ///
    /// [`GatewayError::PaddingUnderflow`] when the literals and hash alone
    /// already exceed the key length.
    pub fn pad_count(&self, hash_hex_len: usize, key_len: usize) -> Result<usize, GatewayError> {
        let required = hash_hex_len / 2 + self.prefix.len() / 2 + self.first.len() / 2;
        key_len
            .checked_sub(required)
            .ok_or(GatewayError::PaddingUnderflow { key_len, required })
    }

    /// Builds the padded hex block around `mac_hex`.
    ///
    /// The result always hex-decodes to exactly `key_len` bytes.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidInput`] if `mac_hex` is empty, odd-length or not hex.
    /// - [`GatewayError::PaddingUnderflow`] if the key is too small.
    pub fn encode(&self, mac_hex: &str, key_len: usize) -> Result<String, GatewayError> {
        if mac_hex.is_empty() || mac_hex.len() % 2 != 0 || !is_hex(mac_hex) {
            return Err(GatewayError::InvalidInput(
                "MAC hash must be a non-empty, even-length hex string".into(),
            ));
        }
        let pad_count = self.pad_count(mac_hex.len(), key_len)?;

        tracing::debug!(key_len, pad_count, "encoding signature block");

        let mut block = String::with_capacity(key_len * 2);
        block.push_str(&self.first);
        for _ in 0..pad_count {
            block.push_str(&self.padding);
        }
        block.push_str(&self.prefix);
        block.push_str(mac_hex);
        Ok(block)
    }

    /// [`encode`](Self::encode), hex-decoded to the raw block bytes.
    pub fn encode_block(&self, mac_hex: &str, key_len: usize) -> Result<Vec<u8>, GatewayError> {
        let block = self.encode(mac_hex, key_len)?;
        hex::decode(&block).map_err(|e| GatewayError::InvalidInput(format!("bad block hex: {}", e)))
    }

    /// Recovers the embedded MAC hash from a decrypted `key_len`-byte block.
    ///
    /// The block is rendered as uppercase hex (left-padded with zero bytes if
    /// the RSA output came back short), the `first ‖ padding… ‖ prefix` frame
    /// expected for an MD5 hash is stripped, and the remainder is returned.
    /// Returns `None` when the frame is not there; the caller treats that as
    /// a signature mismatch.
    pub fn decode_block(&self, block: &[u8], key_len: usize) -> Option<String> {
        if block.len() > key_len {
            return None;
        }
        let pad_count = self.pad_count(MAC_HASH_BYTES * 2, key_len).ok()?;

        let mut text = "00".repeat(key_len - block.len());
        text.push_str(&hex::encode_upper(block));

        let mut frame = self.first.to_ascii_uppercase();
        frame.push_str(&self.padding.to_ascii_uppercase().repeat(pad_count));
        frame.push_str(&self.prefix.to_ascii_uppercase());

        text.strip_prefix(frame.as_str()).map(str::to_string)
    }
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn check_hex_literal(name: &str, value: &str) -> Result<(), GatewayError> {
    if value.is_empty() {
        return Err(GatewayError::Configuration(format!("{} is missing", name)));
    }
    if value.len() % 2 != 0 || !is_hex(value) {
        return Err(GatewayError::Configuration(format!(
            "{} must be an even-length hex string",
            name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

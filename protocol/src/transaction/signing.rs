//! `P_SIGN` production.
//!
//! The same three steps run in both directions: MAC the fields, wrap
//! the MAC in the bank's frame, raw-sign the frame. Only the field list and
//! the hex case differ. Merchants sign requests; [`sign_response`] exists so
//! tests and simulators can play the bank.

use super::types::{REQUEST_MAC_ORDER, RESPONSE_MAC_ORDER};
use crate::crypto::codec::SignatureConfig;
use crate::crypto::keys::SigningKey;
use crate::crypto::{request_mac, response_mac, rsa_raw};
use crate::error::GatewayError;
use crate::message::{Field, FieldRecord};
use crate::security::SecurityContext;

/// Frames and raw-signs a MAC hash, returning the signature bytes.
///
/// The result is always exactly `key.byte_len()` bytes.
pub fn sign_mac(
    mac_hex: &str,
    key: &SigningKey,
    config: &SignatureConfig,
) -> Result<Vec<u8>, GatewayError> {
    let block = config.encode_block(mac_hex, key.byte_len())?;
    rsa_raw::sign(&block, key)
}

/// Computes the `P_SIGN` value for a stamped request: lowercase hex,
/// `2 × key_len` characters.
///
/// # Errors
///
/// - [`GatewayError::Configuration`] if the context cannot sign.
/// - [`GatewayError::InvalidInput`] if any MAC field is empty.
pub fn sign_request(
    request: &FieldRecord,
    context: &SecurityContext,
) -> Result<String, GatewayError> {
    let key = context.merchant_key()?;
    let [order, nonce, timestamp, trtype, amount] = REQUEST_MAC_ORDER.map(|f| request.value(f));
    let mac = request_mac(order, nonce, timestamp, trtype, amount)?;

    tracing::debug!(trtype, key_len = key.byte_len(), "signing request MAC");

    let signature = sign_mac(&mac, key, context.signature_config())?;
    Ok(hex::encode(signature))
}

/// Signs a response the way the gateway does and stores the result in
/// `P_SIGN`. The bank emits uppercase hex.
///
/// Meant for simulators and tests; merchants never sign responses.
pub fn sign_response(
    response: &mut FieldRecord,
    bank_key: &SigningKey,
    config: &SignatureConfig,
) -> Result<(), GatewayError> {
    let [action, rc, rrn, order, amount] = RESPONSE_MAC_ORDER.map(|f| response.value(f));
    let mac = response_mac(action, rc, rrn, order, amount);
    let signature = sign_mac(&mac, bank_key, config)?;
    response.set(Field::PSign, hex::encode_upper(signature));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

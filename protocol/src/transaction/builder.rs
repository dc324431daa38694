//! Signed request construction.
//!
//! A single [`RequestBuilder`] serves every transaction variant. It looks up
//! the variant's [`TransactionLayout`](super::types::TransactionLayout), checks
//! the caller's fields against it, stamps the fields the gateway expects us
//! to generate, and signs the result:
//!
//! 1. validate required fields (all missing ones are reported at once)
//! 2. copy required + optional fields, drop everything else
//! 3. stamp `TRTYPE`, `TIMESTAMP` (UTC) and a fresh `NONCE`
//! 4. MAC → padding frame → raw RSA → `P_SIGN`
//! 5. render in the variant's wire order
//!
//! Validation happens before any cryptographic work, so a bad request never
//! costs an RSA operation.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;

use super::signing::sign_request;
use super::types::{TransactionType, STAMPED_FIELDS};
use crate::clock::{Clock, SystemClock};
use crate::config::NONCE_BYTES;
use crate::error::GatewayError;
use crate::message::{Field, FieldRecord};
use crate::security::SecurityContext;

// ---------------------------------------------------------------------------
// Nonce source
// ---------------------------------------------------------------------------

/// Supplies the `NONCE` value for each request.
pub trait NonceSource: Send + Sync {
    /// A fresh nonce, as lowercase hex.
    fn nonce(&self) -> String;
}

/// [`NONCE_BYTES`] random bytes from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonce;

impl NonceSource for OsNonce {
    fn nonce(&self) -> String {
        let mut bytes = [0u8; NONCE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Always returns the same nonce. Only useful for reproducible tests.
#[derive(Debug, Clone)]
pub struct FixedNonce(pub String);

impl NonceSource for FixedNonce {
    fn nonce(&self) -> String {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// RequestBuilder
// ---------------------------------------------------------------------------

/// Builds signed gateway requests for any [`TransactionType`].
///
/// Cheap to clone; all state is behind `Arc`s and never mutated.
#[derive(Clone)]
pub struct RequestBuilder {
    context: Arc<SecurityContext>,
    clock: Arc<dyn Clock>,
    nonce: Arc<dyn NonceSource>,
}

impl RequestBuilder {
    /// A builder using the system clock and OS randomness.
    pub fn new(context: Arc<SecurityContext>) -> Self {
        Self {
            context,
            clock: Arc::new(SystemClock),
            nonce: Arc::new(OsNonce),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the nonce source.
    pub fn with_nonce_source(mut self, nonce: Arc<dyn NonceSource>) -> Self {
        self.nonce = nonce;
        self
    }

    /// The security context requests are signed with.
    pub fn context(&self) -> &Arc<SecurityContext> {
        &self.context
    }

    /// Validates, stamps, and signs `fields` as a `tx_type` request.
    ///
    /// Caller-supplied values for `TRTYPE`, `TIMESTAMP`, `NONCE` and `P_SIGN`
    /// are ignored.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Validation`] listing every missing required field.
    /// - [`GatewayError::Configuration`] if the context has no merchant key.
    /// - [`GatewayError::PaddingUnderflow`] / [`GatewayError::CryptoFailure`] from signing.
    pub fn build(
        &self,
        tx_type: TransactionType,
        fields: &FieldRecord,
    ) -> Result<FieldRecord, GatewayError> {
        let layout = tx_type.layout();

        let missing: Vec<Field> = layout
            .required
            .iter()
            .copied()
            .filter(|field| !fields.has(*field))
            .collect();
        if !missing.is_empty() {
            tracing::debug!(%tx_type, missing = missing.len(), "request rejected before signing");
            return Err(GatewayError::Validation { missing });
        }

        let overridden = STAMPED_FIELDS.iter().filter(|field| fields.has(**field)).count();
        if overridden > 0 {
            tracing::debug!(%tx_type, overridden, "ignoring caller-supplied stamp fields");
        }

        let mut request = FieldRecord::new();
        for field in layout.required.iter().chain(layout.optional) {
            if STAMPED_FIELDS.contains(field) {
                continue;
            }
            if let Some(value) = fields.get(*field) {
                request.set(*field, value);
            }
        }
        request.set(Field::TrType, tx_type.code());
        request.set(Field::Timestamp, self.clock.timestamp());
        request.set(Field::Nonce, self.nonce.nonce());

        let p_sign = sign_request(&request, &self.context)?;
        request.set(Field::PSign, p_sign);
        request.retain_ordered(layout.wire_order);

        tracing::info!(
            %tx_type,
            order = request.value(Field::Order),
            fields = request.len(),
            "request signed"
        );
        Ok(request)
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// One-shot convenience around [`RequestBuilder::build`] with the system
/// clock and OS nonces.
pub fn build_signed_request(
    context: &Arc<SecurityContext>,
    tx_type: TransactionType,
    fields: &FieldRecord,
) -> Result<FieldRecord, GatewayError> {
    RequestBuilder::new(Arc::clone(context)).build(tx_type, fields)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Gateway response verification.
//!
//! The gateway posts its verdict back to the merchant's callback URL. Before
//! anything in that form is trusted, [`ResponseVerifier`] checks two things:
//!
//! 1. **ACTION** — anything other than `0` is a gateway-reported failure
//!    and is recorded without touching the signature.
//! 2. **P_SIGN** — for `ACTION=0`, the bank's raw-RSA signature must
//!    recover the uppercase MAC over `ACTION, RC, RRN, ORDER, AMOUNT`.
//!
//! Verification never returns `Err`. Every problem is collected into a
//! [`VerificationReport`] so the caller can log the full picture and still
//! branch on a single `is_valid()`.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::types::{ActionCode, TransactionType, RESPONSE_MAC_ORDER};
use crate::crypto::{response_mac, rsa_raw};
use crate::error::GatewayError;
use crate::message::{Field, FieldRecord};
use crate::security::SecurityContext;

// ---------------------------------------------------------------------------
// VerificationReport
// ---------------------------------------------------------------------------

/// The outcome of verifying one gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    tx_type: Option<TransactionType>,
    action: Option<ActionCode>,
    errors: Vec<GatewayError>,
}

impl VerificationReport {
    /// `true` iff no error was recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every error recorded, in the order encountered.
    pub fn errors(&self) -> &[GatewayError] {
        &self.errors
    }

    /// The errors rendered as display strings.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// The most recent error, if any.
    pub fn last_error(&self) -> Option<&GatewayError> {
        self.errors.last()
    }

    /// The response's transaction type, when `TRTYPE` was recognizable.
    pub fn tx_type(&self) -> Option<TransactionType> {
        self.tx_type
    }

    /// The gateway's action code, when `ACTION` was recognizable.
    pub fn action(&self) -> Option<ActionCode> {
        self.action
    }

    fn record(&mut self, error: GatewayError) {
        self.errors.push(error);
    }
}

impl Serialize for VerificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("VerificationReport", 4)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("trtype", &self.tx_type.map(TransactionType::code))?;
        state.serialize_field("action", &self.action.map(ActionCode::code))?;
        state.serialize_field("errors", &self.error_messages())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// ResponseVerifier
// ---------------------------------------------------------------------------

/// Checks gateway responses against the bank's public key.
#[derive(Debug, Clone, Copy)]
pub struct ResponseVerifier<'a> {
    context: &'a SecurityContext,
}

impl<'a> ResponseVerifier<'a> {
    /// A verifier bound to `context`.
    pub fn new(context: &'a SecurityContext) -> Self {
        Self { context }
    }

    /// Verifies `fields` and reports every problem found.
    pub fn verify(&self, fields: &FieldRecord) -> VerificationReport {
        let mut report = VerificationReport {
            tx_type: TransactionType::from_code(fields.value(Field::TrType)),
            action: None,
            errors: Vec::new(),
        };

        if fields.is_empty() {
            report.record(GatewayError::MalformedResponse("no response fields".into()));
            return report;
        }

        let raw_action = fields.value(Field::Action);
        report.action = ActionCode::parse(raw_action);
        let outcome = match report.action {
            Some(ActionCode::Success) => self.check_signature(fields),
            Some(ActionCode::Duplicate) => Err(GatewayError::DuplicateTransaction),
            Some(ActionCode::Declined) => Err(GatewayError::Declined),
            Some(ActionCode::Fault) => Err(GatewayError::ProcessingFault),
            None if raw_action.is_empty() => {
                Err(GatewayError::MalformedResponse("ACTION is missing".into()))
            }
            None => Err(GatewayError::MalformedResponse(format!(
                "unknown ACTION code {:?}",
                raw_action
            ))),
        };

        match outcome {
            Ok(()) => tracing::info!(
                order = fields.value(Field::Order),
                rrn = fields.value(Field::Rrn),
                "response verified"
            ),
            Err(error) => {
                tracing::warn!(
                    order = fields.value(Field::Order),
                    action = raw_action,
                    %error,
                    "response rejected"
                );
                report.record(error);
            }
        }
        report
    }

    fn check_signature(&self, fields: &FieldRecord) -> Result<(), GatewayError> {
        let key = self.context.bank_key()?;
        let p_sign = fields.value(Field::PSign);
        if p_sign.is_empty() {
            return Err(GatewayError::MalformedResponse("P_SIGN is missing".into()));
        }

        let [action, rc, rrn, order, amount] = RESPONSE_MAC_ORDER.map(|f| fields.value(f));
        let expected = response_mac(action, rc, rrn, order, amount);

        let signature = hex::decode(p_sign).map_err(|e| {
            tracing::debug!(error = %e, "P_SIGN is not valid hex");
            GatewayError::SignatureMismatch
        })?;
        // The signature is untrusted input; a value the key cannot even
        // exponentiate is a forgery, not a local crypto fault.
        let block = rsa_raw::verify(&signature, key).map_err(|e| {
            tracing::debug!(error = %e, "P_SIGN rejected by public operation");
            GatewayError::SignatureMismatch
        })?;

        tracing::debug!(key_len = key.byte_len(), "decoding response signature block");

        let recovered = self
            .context
            .signature_config()
            .decode_block(&block, key.byte_len())
            .ok_or(GatewayError::SignatureMismatch)?;

        if recovered.eq_ignore_ascii_case(&expected) {
            Ok(())
        } else {
            Err(GatewayError::SignatureMismatch)
        }
    }
}

/// Verifies a gateway response with the bank key held by `context`.
pub fn verify_response(context: &SecurityContext, fields: &FieldRecord) -> VerificationReport {
    ResponseVerifier::new(context).verify(fields)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Typed view over an inbound gateway response.
//!
//! The callback form is resolved to its [`TransactionType`] by `TRTYPE`
//! first; a form the gateway would never send (no fields, no or unknown
//! `TRTYPE`) is rejected outright instead of being verified. Request-only
//! fields echoed back in the form are dropped.

use serde_json::Value;

use super::types::{ActionCode, TransactionType};
use super::verification::{verify_response, VerificationReport};
use crate::error::GatewayError;
use crate::message::{Field, FieldRecord};
use crate::security::SecurityContext;

/// A gateway response with a recognized transaction type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    tx_type: TransactionType,
    fields: FieldRecord,
}

impl GatewayResponse {
    /// Resolves the transaction type of a received field set.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MalformedResponse`] for an empty set or a missing or
    /// unknown `TRTYPE`.
    pub fn from_fields(mut fields: FieldRecord) -> Result<Self, GatewayError> {
        if fields.is_empty() {
            return Err(GatewayError::MalformedResponse("no response fields".into()));
        }
        let code = fields.value(Field::TrType);
        if code.is_empty() {
            return Err(GatewayError::MalformedResponse("TRTYPE is missing".into()));
        }
        let tx_type = TransactionType::from_code(code).ok_or_else(|| {
            GatewayError::MalformedResponse(format!("unknown TRTYPE {:?}", code))
        })?;

        let received = fields.len();
        fields.retain(|field| !field.is_request_only());
        if fields.len() < received {
            tracing::debug!(
                %tx_type,
                dropped = received - fields.len(),
                "dropping request-only fields from response"
            );
        }
        Ok(Self { tx_type, fields })
    }

    /// [`from_fields`](Self::from_fields) over wire-name/value pairs, e.g. a
    /// decoded callback form.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::from_fields(FieldRecord::from_pairs(pairs))
    }

    /// [`from_fields`](Self::from_fields) over a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, GatewayError> {
        Self::from_fields(FieldRecord::from_json(value)?)
    }

    /// Verifies the response signature and action code.
    pub fn verify(&self, context: &SecurityContext) -> VerificationReport {
        verify_response(context, &self.fields)
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    /// The parsed `ACTION`, if it is one of the known codes.
    pub fn action_code(&self) -> Option<ActionCode> {
        ActionCode::parse(self.action())
    }

    pub fn fields(&self) -> &FieldRecord {
        &self.fields
    }

    pub fn into_fields(self) -> FieldRecord {
        self.fields
    }

    pub fn terminal(&self) -> &str {
        self.fields.value(Field::Terminal)
    }

    pub fn trtype(&self) -> &str {
        self.fields.value(Field::TrType)
    }

    pub fn order(&self) -> &str {
        self.fields.value(Field::Order)
    }

    pub fn amount(&self) -> &str {
        self.fields.value(Field::Amount)
    }

    pub fn currency(&self) -> &str {
        self.fields.value(Field::Currency)
    }

    pub fn action(&self) -> &str {
        self.fields.value(Field::Action)
    }

    /// ISO-8583 response code.
    pub fn rc(&self) -> &str {
        self.fields.value(Field::Rc)
    }

    /// Issuer approval code.
    pub fn approval(&self) -> &str {
        self.fields.value(Field::Approval)
    }

    /// Retrieval reference number, needed for completion and reversal.
    pub fn rrn(&self) -> &str {
        self.fields.value(Field::Rrn)
    }

    /// Internal reference, needed for completion and reversal.
    pub fn int_ref(&self) -> &str {
        self.fields.value(Field::IntRef)
    }

    pub fn timestamp(&self) -> &str {
        self.fields.value(Field::Timestamp)
    }

    pub fn nonce(&self) -> &str {
        self.fields.value(Field::Nonce)
    }

    pub fn p_sign(&self) -> &str {
        self.fields.value(Field::PSign)
    }

    /// E-commerce indicator.
    pub fn eci(&self) -> &str {
        self.fields.value(Field::Eci)
    }
}

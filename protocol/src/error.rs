//! Error types for the e-Gateway protocol.
//!
//! Every fallible operation in the crate returns a [`GatewayError`]. The
//! variants fall into four families:
//!
//! - **Configuration** — missing signature literals or keys. Fatal; fail at startup.
//! - **Input** — `Validation`, `InvalidInput`, `PaddingUnderflow`. The caller must fix
//!   the data (or the configuration); retrying the same call is pointless.
//! - **Environment** — `KeyUnavailable`, `CryptoFailure`. Fatal for the process until
//!   somebody fixes the key files.
//! - **Gateway outcomes** — `DuplicateTransaction`, `Declined`, `ProcessingFault`,
//!   `MalformedResponse`, `SignatureMismatch`. Business/security results that are
//!   reported to the caller and never retried automatically.
//!
//! Messages never contain key material or full signatures.

use thiserror::Error;

use crate::message::Field;

/// Errors that can occur while signing requests or verifying responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// A signature literal, key path, or key is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Required request fields are empty. Listed in the variant's table order.
    #[error("validation failed: missing required fields [{}]", join_fields(.missing))]
    Validation {
        /// Every required field that was absent or empty.
        missing: Vec<Field>,
    },

    /// A MAC was requested over missing data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The key is too small to hold the configured literals plus the MAC hash.
    #[error("padding underflow: key holds {key_len} bytes but the frame needs {required}")]
    PaddingUnderflow {
        /// Key length in bytes (`modulus_bits / 8`).
        key_len: usize,
        /// Bytes needed by `first + prefix + hash` without any padding.
        required: usize,
    },

    /// A key file could not be read or parsed.
    #[error("key unavailable: {0}")]
    KeyUnavailable(String),

    /// The raw RSA transform failed (bad block length, value out of range, ...).
    #[error("crypto failure: {0}")]
    CryptoFailure(String),

    /// The gateway reported `ACTION=1`.
    #[error("bank response: duplicate transaction")]
    DuplicateTransaction,

    /// The gateway reported `ACTION=2`.
    #[error("bank response: transaction declined")]
    Declined,

    /// The gateway reported `ACTION=3`.
    #[error("bank response: processing fault")]
    ProcessingFault,

    /// The response is missing data or carries an unknown code.
    #[error("bank response: malformed ({0})")]
    MalformedResponse(String),

    /// The response signature does not authenticate the response fields.
    #[error("bank response: signature mismatch")]
    SignatureMismatch,
}

impl GatewayError {
    /// Returns `true` for outcomes reported by the gateway itself, as opposed
    /// to local configuration or environment problems.
    pub fn is_gateway_outcome(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTransaction
                | Self::Declined
                | Self::ProcessingFault
                | Self::MalformedResponse(_)
                | Self::SignatureMismatch
        )
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

//! # Security Context
//!
//! The bank issues one fixed set of signing parameters per merchant
//! integration: the three frame literals, the merchant's private key, and the
//! bank's public key. They are configured once at process start and then
//! only ever read.
//!
//! [`SecurityOptions`] collects the pieces (from flags, env, or code) and
//! [`SecurityOptions::build`] validates everything up front and freezes it
//! into a [`SecurityContext`]. Wrap the context in an `Arc` and share it
//! across threads freely; nothing in it is mutable.

use std::path::PathBuf;
use std::sync::Arc;

use crate::crypto::codec::SignatureConfig;
use crate::crypto::keys::{SigningKey, VerifyingKey};
use crate::error::GatewayError;

/// Builder for a [`SecurityContext`]. Every setter is optional; `build`
/// decides what is missing.
#[derive(Debug, Clone, Default)]
pub struct SecurityOptions {
    signature_first: Option<String>,
    signature_prefix: Option<String>,
    signature_padding: Option<String>,
    private_key_path: Option<PathBuf>,
    bank_public_key_path: Option<PathBuf>,
    private_key: Option<SigningKey>,
    bank_public_key: Option<VerifyingKey>,
}

impl SecurityOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal hex prefix of the padded block (provided by the bank).
    pub fn signature_first(mut self, value: impl Into<String>) -> Self {
        self.signature_first = Some(value.into());
        self
    }

    /// Literal hex marker preceding the MAC hash (provided by the bank).
    pub fn signature_prefix(mut self, value: impl Into<String>) -> Self {
        self.signature_prefix = Some(value.into());
        self
    }

    /// Padding byte as two hex digits (provided by the bank).
    pub fn signature_padding(mut self, value: impl Into<String>) -> Self {
        self.signature_padding = Some(value.into());
        self
    }

    /// Path to the merchant's PEM private key. Loaded during `build`.
    pub fn private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    /// Path to the bank's PEM public key. Loaded during `build`.
    pub fn bank_public_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bank_public_key_path = Some(path.into());
        self
    }

    /// An already-loaded merchant private key. Takes precedence over the path.
    pub fn private_key(mut self, key: SigningKey) -> Self {
        self.private_key = Some(key);
        self
    }

    /// An already-loaded bank public key. Takes precedence over the path.
    pub fn bank_public_key(mut self, key: VerifyingKey) -> Self {
        self.bank_public_key = Some(key);
        self
    }

    /// Validates the options, loads key files, and freezes the result.
    ///
    /// At least one key must be present: a process may only sign, or only
    /// verify, but one that can do neither is misconfigured.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Configuration`] for a missing/invalid literal or no keys at all.
    /// - [`GatewayError::KeyUnavailable`] if a configured key file cannot be loaded.
    /// - [`GatewayError::PaddingUnderflow`] if either key is too short for the frame.
    pub fn build(self) -> Result<SecurityContext, GatewayError> {
        let first = self
            .signature_first
            .ok_or_else(|| missing("signature_first"))?;
        let prefix = self
            .signature_prefix
            .ok_or_else(|| missing("signature_prefix"))?;
        let padding = self
            .signature_padding
            .ok_or_else(|| missing("signature_padding"))?;
        let signature = SignatureConfig::new(first, prefix, padding)?;

        let merchant_key = match (self.private_key, self.private_key_path) {
            (Some(key), _) => Some(key),
            (None, Some(path)) => Some(SigningKey::load(path)?),
            (None, None) => None,
        };
        let bank_key = match (self.bank_public_key, self.bank_public_key_path) {
            (Some(key), _) => Some(key),
            (None, Some(path)) => Some(VerifyingKey::load(path)?),
            (None, None) => None,
        };

        if merchant_key.is_none() && bank_key.is_none() {
            return Err(GatewayError::Configuration(
                "neither a merchant private key nor a bank public key is configured".into(),
            ));
        }

        // Surface an undersized key at startup, not on the first request
        // or callback.
        let mac_len = crate::config::MAC_HASH_BYTES * 2;
        if let Some(key) = &merchant_key {
            signature.pad_count(mac_len, key.byte_len())?;
        }
        if let Some(key) = &bank_key {
            signature.pad_count(mac_len, key.byte_len())?;
        }

        tracing::info!(
            signing = merchant_key.is_some(),
            verifying = bank_key.is_some(),
            merchant_key_bits = merchant_key.as_ref().map(SigningKey::bits),
            bank_key_bits = bank_key.as_ref().map(VerifyingKey::bits),
            "security context initialized"
        );

        Ok(SecurityContext {
            signature,
            merchant_key,
            bank_key,
        })
    }
}

/// Immutable signing/verification parameters for one merchant integration.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    signature: SignatureConfig,
    merchant_key: Option<SigningKey>,
    bank_key: Option<VerifyingKey>,
}

impl SecurityContext {
    /// Convenience: build straight into an `Arc`.
    pub fn shared(options: SecurityOptions) -> Result<Arc<Self>, GatewayError> {
        options.build().map(Arc::new)
    }

    /// The frame literals.
    pub fn signature_config(&self) -> &SignatureConfig {
        &self.signature
    }

    /// The merchant private key used for request signing.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Configuration`] when the context was built for
    /// verification only.
    pub fn merchant_key(&self) -> Result<&SigningKey, GatewayError> {
        self.merchant_key
            .as_ref()
            .ok_or_else(|| missing("merchant private key"))
    }

    /// The bank public key used for response verification.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Configuration`] when the context was built for
    /// signing only.
    pub fn bank_key(&self) -> Result<&VerifyingKey, GatewayError> {
        self.bank_key
            .as_ref()
            .ok_or_else(|| missing("bank public key"))
    }

    /// Returns `true` if requests can be signed.
    pub fn can_sign(&self) -> bool {
        self.merchant_key.is_some()
    }

    /// Returns `true` if responses can be verified.
    pub fn can_verify(&self) -> bool {
        self.bank_key.is_some()
    }
}

fn missing(what: &str) -> GatewayError {
    GatewayError::Configuration(format!("missing parameter {}", what))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! # Merchant Facade
//!
//! Most integrations never touch [`FieldRecord`] directly. They hold one
//! [`MerchantProfile`] (the static shop details the bank registered) and
//! call [`Gateway::authorization`], [`Gateway::completion`] and
//! [`Gateway::reversal`] with the per-order values only. The facade fills
//! in the rest and hands the record to the [`RequestBuilder`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use egateway_protocol::{Gateway, MerchantProfile, SecurityContext, SecurityOptions};
//!
//! let context = SecurityContext::shared(
//!     SecurityOptions::new()
//!         .signature_first("0001")
//!         .signature_prefix("003020300C06082A864886F70D020505000410")
//!         .signature_padding("FF")
//!         .private_key_path("/etc/egateway/merchant.pem")
//!         .bank_public_key_path("/etc/egateway/bank.pub"),
//! )?;
//! let profile = MerchantProfile::new("498000049800001", "49800001")
//!     .back_ref("https://shop.example.com/return");
//! let gateway = Gateway::new(profile, context);
//!
//! let request = gateway.authorization("10,00", "AB12", "", "buyer@example.com")?;
//! # Ok::<(), egateway_protocol::GatewayError>(())
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{
    ACCEPTED_LANGUAGES, DEFAULT_COUNTRY, DEFAULT_CURRENCY, DEFAULT_LANGUAGE, DEFAULT_MERCH_GMT,
};
use crate::error::GatewayError;
use crate::message::{Field, FieldRecord};
use crate::security::SecurityContext;
use crate::transaction::{GatewayResponse, RequestBuilder, TransactionType, VerificationReport};

// ---------------------------------------------------------------------------
// MerchantProfile
// ---------------------------------------------------------------------------

/// Static shop details sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Merchant ID assigned by the bank (`MERCHANT`).
    pub merchant: String,
    /// Terminal ID assigned by the bank (`TERMINAL`).
    pub terminal: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Language of the bank's hosted payment form.
    #[serde(default = "default_language")]
    pub language: String,
    /// Two-letter shop country code.
    #[serde(default = "default_country")]
    pub country: String,
    /// Shop timezone offset from UTC, e.g. `+2`.
    #[serde(default = "default_merch_gmt")]
    pub merch_gmt: String,
    #[serde(default)]
    pub merch_name: Option<String>,
    #[serde(default)]
    pub merch_url: Option<String>,
    #[serde(default)]
    pub merch_address: Option<String>,
    /// Where the bank sends the cardholder after the payment form.
    #[serde(default)]
    pub back_ref: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_merch_gmt() -> String {
    DEFAULT_MERCH_GMT.to_string()
}

/// Maps a requested language to one the payment form supports.
///
/// Exact matches win; otherwise the first two letters are tried, so
/// `ro-MD` and `ru_RU` resolve to `ro` and `ru`.
pub fn normalize_language(language: &str) -> Option<&'static str> {
    let exact = ACCEPTED_LANGUAGES.iter().copied().find(|l| *l == language);
    let prefix = || {
        let head = language.get(..2)?;
        ACCEPTED_LANGUAGES
            .iter()
            .copied()
            .find(|l| l.eq_ignore_ascii_case(head))
    };
    exact.or_else(prefix)
}

impl MerchantProfile {
    /// A profile with the bank's defaults (MDL, `en`, `md`, `+2`).
    pub fn new(merchant: impl Into<String>, terminal: impl Into<String>) -> Self {
        Self {
            merchant: merchant.into(),
            terminal: terminal.into(),
            currency: default_currency(),
            language: default_language(),
            country: default_country(),
            merch_gmt: default_merch_gmt(),
            merch_name: None,
            merch_url: None,
            merch_address: None,
            back_ref: String::new(),
        }
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the payment form language.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Configuration`] if neither the value nor its
    /// two-letter prefix is an accepted language.
    pub fn language(mut self, language: &str) -> Result<Self, GatewayError> {
        self.language = normalize_language(language)
            .ok_or_else(|| {
                GatewayError::Configuration(format!(
                    "language {:?} is not accepted by the gateway",
                    language
                ))
            })?
            .to_string();
        Ok(self)
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn merch_gmt(mut self, offset: impl Into<String>) -> Self {
        self.merch_gmt = offset.into();
        self
    }

    pub fn merch_name(mut self, name: impl Into<String>) -> Self {
        self.merch_name = Some(name.into());
        self
    }

    pub fn merch_url(mut self, url: impl Into<String>) -> Self {
        self.merch_url = Some(url.into());
        self
    }

    pub fn merch_address(mut self, address: impl Into<String>) -> Self {
        self.merch_address = Some(address.into());
        self
    }

    pub fn back_ref(mut self, url: impl Into<String>) -> Self {
        self.back_ref = url.into();
        self
    }

    fn authorization_fields(&self) -> FieldRecord {
        let mut fields = FieldRecord::new()
            .with(Field::Currency, &self.currency)
            .with(Field::Merchant, &self.merchant)
            .with(Field::Terminal, &self.terminal)
            .with(Field::Country, &self.country)
            .with(Field::MerchGmt, &self.merch_gmt)
            .with(Field::BackRef, &self.back_ref)
            .with(Field::Lang, &self.language);
        let optional = [
            (Field::MerchName, &self.merch_name),
            (Field::MerchUrl, &self.merch_url),
            (Field::MerchAddress, &self.merch_address),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                fields.set(field, value);
            }
        }
        fields
    }
}

/// Gateway amounts use `.` as the decimal separator.
pub fn normalize_amount(amount: &str) -> String {
    amount.trim().replace(',', ".")
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// High-level request/response entry point for one merchant.
#[derive(Debug, Clone)]
pub struct Gateway {
    profile: MerchantProfile,
    builder: RequestBuilder,
}

impl Gateway {
    pub fn new(profile: MerchantProfile, context: Arc<SecurityContext>) -> Self {
        Self {
            profile,
            builder: RequestBuilder::new(context),
        }
    }

    /// Uses `builder` (with its own clock and nonce source) for signing.
    pub fn with_builder(profile: MerchantProfile, builder: RequestBuilder) -> Self {
        Self { profile, builder }
    }

    /// Replaces the builder's time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.builder = self.builder.with_clock(clock);
        self
    }

    pub fn profile(&self) -> &MerchantProfile {
        &self.profile
    }

    /// Signed pre-authorization request for the hosted payment form.
    ///
    /// An empty `description` becomes `Order {order} payment`.
    pub fn authorization(
        &self,
        amount: &str,
        order: &str,
        description: &str,
        email: &str,
    ) -> Result<FieldRecord, GatewayError> {
        let description = if description.is_empty() {
            format!("Order {} payment", order)
        } else {
            description.to_string()
        };
        let fields = self
            .profile
            .authorization_fields()
            .with(Field::Amount, normalize_amount(amount))
            .with(Field::Order, order)
            .with(Field::Desc, description)
            .with(Field::Email, email);
        self.builder.build(TransactionType::Authorization, &fields)
    }

    /// Signed sales completion for a previously authorized order.
    pub fn completion(
        &self,
        amount: &str,
        order: &str,
        rrn: &str,
        int_ref: &str,
    ) -> Result<FieldRecord, GatewayError> {
        self.follow_up(TransactionType::Completion, amount, order, rrn, int_ref)
    }

    /// Signed reversal of a previously authorized order.
    pub fn reversal(
        &self,
        amount: &str,
        order: &str,
        rrn: &str,
        int_ref: &str,
    ) -> Result<FieldRecord, GatewayError> {
        self.follow_up(TransactionType::Reversal, amount, order, rrn, int_ref)
    }

    fn follow_up(
        &self,
        tx_type: TransactionType,
        amount: &str,
        order: &str,
        rrn: &str,
        int_ref: &str,
    ) -> Result<FieldRecord, GatewayError> {
        let fields = FieldRecord::new()
            .with(Field::Order, order)
            .with(Field::Amount, normalize_amount(amount))
            .with(Field::Currency, &self.profile.currency)
            .with(Field::Rrn, rrn)
            .with(Field::IntRef, int_ref)
            .with(Field::Terminal, &self.profile.terminal);
        self.builder.build(tx_type, &fields)
    }

    /// Resolves a received callback into a typed response.
    pub fn response(&self, fields: FieldRecord) -> Result<GatewayResponse, GatewayError> {
        GatewayResponse::from_fields(fields)
    }

    /// Verifies a typed response against the bank key.
    pub fn verify(&self, response: &GatewayResponse) -> VerificationReport {
        response.verify(self.builder.context())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

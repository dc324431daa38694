//! The gateway field vocabulary.
//!
//! Field names are part of the wire contract and are preserved verbatim.
//! Anything not in this list is not something the gateway understands, so
//! inbound unknowns are dropped rather than carried around as strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named field of a gateway request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Merchant terminal ID assigned by the bank (8 chars).
    #[serde(rename = "TERMINAL")]
    Terminal,
    /// Transaction type code: 0, 21 or 24.
    #[serde(rename = "TRTYPE")]
    TrType,
    /// Merchant order ID (6–32 chars).
    #[serde(rename = "ORDER")]
    Order,
    /// Order total, decimal point separated (up to 12 chars).
    #[serde(rename = "AMOUNT")]
    Amount,
    /// ISO 4217 alpha currency code.
    #[serde(rename = "CURRENCY")]
    Currency,
    /// Gateway action code (response only).
    #[serde(rename = "ACTION")]
    Action,
    /// ISO-8583 field 39 response code (response only).
    #[serde(rename = "RC")]
    Rc,
    /// ISO-8583 field 38 approval code; may be empty (response only).
    #[serde(rename = "APPROVAL")]
    Approval,
    /// Retrieval reference number, ISO-8583 field 37 (12 chars).
    #[serde(rename = "RRN")]
    Rrn,
    /// Gateway internal reference number.
    #[serde(rename = "INT_REF")]
    IntRef,
    /// GMT timestamp, `YYYYMMDDHHMMSS`.
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
    /// Unpredictable random hex token.
    #[serde(rename = "NONCE")]
    Nonce,
    /// Hex-encoded RSA signature block.
    #[serde(rename = "P_SIGN")]
    PSign,
    /// Electronic Commerce Indicator (response only).
    #[serde(rename = "ECI")]
    Eci,
    /// Order description.
    #[serde(rename = "DESC")]
    Desc,
    /// Merchant display name.
    #[serde(rename = "MERCH_NAME")]
    MerchName,
    /// Merchant shop URL.
    #[serde(rename = "MERCH_URL")]
    MerchUrl,
    /// Merchant ID assigned by the bank.
    #[serde(rename = "MERCHANT")]
    Merchant,
    /// Client e-mail address.
    #[serde(rename = "EMAIL")]
    Email,
    /// Merchant postal address.
    #[serde(rename = "MERCH_ADDRESS")]
    MerchAddress,
    /// Merchant shop two-letter country code.
    #[serde(rename = "COUNTRY")]
    Country,
    /// Merchant GMT offset, e.g. `+2`.
    #[serde(rename = "MERCH_GMT")]
    MerchGmt,
    /// URL the cardholder returns to after the payment form.
    #[serde(rename = "BACKREF")]
    BackRef,
    /// Payment form language.
    #[serde(rename = "LANG")]
    Lang,
}

impl Field {
    /// Every field, shared ones first, then request-only ones.
    pub const ALL: [Field; 24] = [
        Field::Terminal,
        Field::TrType,
        Field::Order,
        Field::Amount,
        Field::Currency,
        Field::Action,
        Field::Rc,
        Field::Approval,
        Field::Rrn,
        Field::IntRef,
        Field::Timestamp,
        Field::Nonce,
        Field::PSign,
        Field::Eci,
        Field::Desc,
        Field::MerchName,
        Field::MerchUrl,
        Field::Merchant,
        Field::Email,
        Field::MerchAddress,
        Field::Country,
        Field::MerchGmt,
        Field::BackRef,
        Field::Lang,
    ];

    /// Fields a gateway response can carry.
    pub const RESPONSE: [Field; 14] = [
        Field::Terminal,
        Field::TrType,
        Field::Order,
        Field::Amount,
        Field::Currency,
        Field::Action,
        Field::Rc,
        Field::Approval,
        Field::Rrn,
        Field::IntRef,
        Field::Timestamp,
        Field::Nonce,
        Field::PSign,
        Field::Eci,
    ];

    /// The exact wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Terminal => "TERMINAL",
            Self::TrType => "TRTYPE",
            Self::Order => "ORDER",
            Self::Amount => "AMOUNT",
            Self::Currency => "CURRENCY",
            Self::Action => "ACTION",
            Self::Rc => "RC",
            Self::Approval => "APPROVAL",
            Self::Rrn => "RRN",
            Self::IntRef => "INT_REF",
            Self::Timestamp => "TIMESTAMP",
            Self::Nonce => "NONCE",
            Self::PSign => "P_SIGN",
            Self::Eci => "ECI",
            Self::Desc => "DESC",
            Self::MerchName => "MERCH_NAME",
            Self::MerchUrl => "MERCH_URL",
            Self::Merchant => "MERCHANT",
            Self::Email => "EMAIL",
            Self::MerchAddress => "MERCH_ADDRESS",
            Self::Country => "COUNTRY",
            Self::MerchGmt => "MERCH_GMT",
            Self::BackRef => "BACKREF",
            Self::Lang => "LANG",
        }
    }

    /// Looks a field up by its wire name. Case-sensitive, like the gateway.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Returns `true` for fields that only ever appear in requests.
    pub fn is_request_only(self) -> bool {
        !Self::RESPONSE.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing a name outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gateway field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownField(s.to_string()))
    }
}

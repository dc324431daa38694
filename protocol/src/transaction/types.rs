//! Core type definitions for gateway transactions.
//!
//! Each [`TransactionType`] carries one static [`TransactionLayout`]: which
//! fields the caller must supply, which optional ones are transmitted, and
//! the order the signed form is rendered in. The request builder consults
//! this table instead of encoding per-variant rules in code.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{
    ACTION_DECLINED, ACTION_DUPLICATE, ACTION_FAULT, ACTION_SUCCESS, TRTYPE_AUTHORIZATION,
    TRTYPE_COMPLETION, TRTYPE_REVERSAL,
};
use crate::message::Field;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The operation a request asks the gateway to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Pre-authorization through the bank's hosted payment form (TRTYPE 0).
    Authorization,
    /// Sales completion of an authorized amount (TRTYPE 21).
    Completion,
    /// Reversal of an authorization (TRTYPE 24).
    Reversal,
}

impl TransactionType {
    /// All variants.
    pub const ALL: [TransactionType; 3] = [Self::Authorization, Self::Completion, Self::Reversal];

    /// The `TRTYPE` wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Authorization => TRTYPE_AUTHORIZATION,
            Self::Completion => TRTYPE_COMPLETION,
            Self::Reversal => TRTYPE_REVERSAL,
        }
    }

    /// Resolves a `TRTYPE` wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// The static field description for this variant.
    pub fn layout(self) -> &'static TransactionLayout {
        match self {
            Self::Authorization => &AUTHORIZATION,
            Self::Completion => &COMPLETION,
            Self::Reversal => &REVERSAL,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorization => write!(f, "Authorization"),
            Self::Completion => write!(f, "Completion"),
            Self::Reversal => write!(f, "Reversal"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionLayout
// ---------------------------------------------------------------------------

/// Field requirements for one transaction variant.
#[derive(Debug)]
pub struct TransactionLayout {
    /// Caller-supplied fields that must be non-empty before signing.
    pub required: &'static [Field],
    /// Caller-supplied fields that are sent when present, even if empty.
    pub optional: &'static [Field],
    /// Order of the signed form on the wire, stamped fields included.
    pub wire_order: &'static [Field],
}

/// Request MAC field order, shared by every variant.
pub const REQUEST_MAC_ORDER: [Field; 5] = [
    Field::Order,
    Field::Nonce,
    Field::Timestamp,
    Field::TrType,
    Field::Amount,
];

/// Response MAC field order.
pub const RESPONSE_MAC_ORDER: [Field; 5] = [
    Field::Action,
    Field::Rc,
    Field::Rrn,
    Field::Order,
    Field::Amount,
];

/// Fields the builder stamps itself; callers cannot override them.
pub const STAMPED_FIELDS: [Field; 4] = [
    Field::TrType,
    Field::Timestamp,
    Field::Nonce,
    Field::PSign,
];

static AUTHORIZATION: TransactionLayout = TransactionLayout {
    required: &[
        Field::Order,
        Field::Amount,
        Field::Currency,
        Field::Desc,
        Field::Merchant,
        Field::Terminal,
        Field::Email,
        Field::Country,
        Field::MerchGmt,
        Field::BackRef,
        Field::Lang,
    ],
    optional: &[Field::MerchName, Field::MerchUrl, Field::MerchAddress],
    wire_order: &[
        Field::Amount,
        Field::Currency,
        Field::Order,
        Field::Desc,
        Field::MerchName,
        Field::MerchUrl,
        Field::Merchant,
        Field::Terminal,
        Field::Email,
        Field::TrType,
        Field::MerchAddress,
        Field::Country,
        Field::MerchGmt,
        Field::Timestamp,
        Field::Nonce,
        Field::BackRef,
        Field::Lang,
        Field::PSign,
    ],
};

static FOLLOW_UP_REQUIRED: [Field; 6] = [
    Field::Order,
    Field::Amount,
    Field::Currency,
    Field::Rrn,
    Field::IntRef,
    Field::Terminal,
];

static FOLLOW_UP_WIRE_ORDER: [Field; 10] = [
    Field::Order,
    Field::Amount,
    Field::Currency,
    Field::Rrn,
    Field::IntRef,
    Field::TrType,
    Field::Terminal,
    Field::Timestamp,
    Field::Nonce,
    Field::PSign,
];

static COMPLETION: TransactionLayout = TransactionLayout {
    required: &FOLLOW_UP_REQUIRED,
    optional: &[],
    wire_order: &FOLLOW_UP_WIRE_ORDER,
};

static REVERSAL: TransactionLayout = TransactionLayout {
    required: &FOLLOW_UP_REQUIRED,
    optional: &[],
    wire_order: &FOLLOW_UP_WIRE_ORDER,
};

// ---------------------------------------------------------------------------
// ActionCode
// ---------------------------------------------------------------------------

/// Gateway-reported outcome classifier returned in every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCode {
    /// `0`: transaction successfully completed.
    Success,
    /// `1`: duplicate transaction detected.
    Duplicate,
    /// `2`: transaction declined.
    Declined,
    /// `3`: transaction processing fault.
    Fault,
}

impl ActionCode {
    /// Parses the `ACTION` field. Only the exact codes `0`–`3` are accepted.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            ACTION_SUCCESS => Some(Self::Success),
            ACTION_DUPLICATE => Some(Self::Duplicate),
            ACTION_DECLINED => Some(Self::Declined),
            ACTION_FAULT => Some(Self::Fault),
            _ => None,
        }
    }

    /// The wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Success => ACTION_SUCCESS,
            Self::Duplicate => ACTION_DUPLICATE,
            Self::Declined => ACTION_DECLINED,
            Self::Fault => ACTION_FAULT,
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Duplicate => write!(f, "Duplicate"),
            Self::Declined => write!(f, "Declined"),
            Self::Fault => write!(f, "Fault"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

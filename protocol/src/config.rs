//! # Protocol Configuration & Constants
//!
//! Every magic number the gateway imposes on us lives here. Most of them are
//! dictated by the bank's integration guide, so "tuning" them is not an
//! option. Change one and every request gets bounced.

// ---------------------------------------------------------------------------
// Gateway endpoint
// ---------------------------------------------------------------------------

/// Production CGI endpoint the signed form is POSTed to. The core never
/// connects to it; it is exported so transports don't hardcode it twice.
pub const GATEWAY_URL: &str = "https://egateway.victoriabank.md/cgi-bin/cgi_link";

// ---------------------------------------------------------------------------
// Transaction type codes (TRTYPE)
// ---------------------------------------------------------------------------

/// Pre-authorization: the cardholder is redirected to the bank's payment form.
pub const TRTYPE_AUTHORIZATION: &str = "0";

/// Sales completion of a previously authorized amount.
pub const TRTYPE_COMPLETION: &str = "21";

/// Reversal (cancellation) of a previous authorization.
pub const TRTYPE_REVERSAL: &str = "24";

// ---------------------------------------------------------------------------
// Action codes (ACTION)
// ---------------------------------------------------------------------------

/// Transaction successfully completed.
pub const ACTION_SUCCESS: &str = "0";

/// Duplicate transaction detected.
pub const ACTION_DUPLICATE: &str = "1";

/// Transaction declined.
pub const ACTION_DECLINED: &str = "2";

/// Transaction processing fault.
pub const ACTION_FAULT: &str = "3";

// ---------------------------------------------------------------------------
// Field formats
// ---------------------------------------------------------------------------

/// `TIMESTAMP` format, always in GMT/UTC: `YYYYMMDDHHMMSS`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of random bytes in a request nonce. The gateway accepts 8–32
/// unpredictable bytes in hex; 16 renders as a 32-char MD5-looking token.
pub const NONCE_BYTES: usize = 16;

/// MD5 digest length in bytes. The MAC is always an MD5 hex digest.
pub const MAC_HASH_BYTES: usize = 16;

// ---------------------------------------------------------------------------
// Merchant defaults
// ---------------------------------------------------------------------------

/// ISO 4217 currency used when the merchant profile does not set one.
pub const DEFAULT_CURRENCY: &str = "MDL";

/// Two-letter country code of the merchant shop.
pub const DEFAULT_COUNTRY: &str = "md";

/// Payment form language when the merchant profile does not set one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages the bank's payment form can render.
pub const ACCEPTED_LANGUAGES: &[&str] = &["en", "ro", "ru"];

/// Merchant GMT offset sent as `MERCH_GMT` (Europe/Chisinau winter time).
pub const DEFAULT_MERCH_GMT: &str = "+2";

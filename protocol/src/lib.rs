// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # e-Gateway Protocol: Core Library
//!
//! Merchant-side signing and verification for the bank's card e-commerce
//! gateway. Every request we send (authorization, completion, reversal) and
//! every response the gateway posts back carries a `P_SIGN` field: an MD5
//! MAC over a handful of fields, wrapped in a bank-defined padding frame and
//! pushed through raw RSA.
//!
//! None of this is a standard. It is the bank's format, byte for byte, and
//! the code here reproduces it exactly, including the unpadded RSA. If you
//! are tempted to swap in PKCS#1 v1.5 or PSS "because it's safer", the bank
//! will reject every request you send.
//!
//! ## Architecture
//!
//! - **message** — The wire field vocabulary and the ordered [`FieldRecord`].
//! - **crypto** — MAC composition, the padding codec, key loading, raw RSA.
//! - **security** — The immutable signing/verification context built once at startup.
//! - **transaction** — Request building/signing and response verification.
//! - **merchant** — Merchant profile and the high-level [`Gateway`] facade.
//! - **clock** — UTC time source, injectable for tests.
//! - **config** — Protocol constants.
//! - **error** — The [`GatewayError`] taxonomy shared by every layer.
//!
//! ## Flow
//!
//! ```text
//! RequestBuilder → MacComposer → SignatureCodec → raw RSA (sign) → transport
//! transport → ResponseVerifier → MacComposer → raw RSA (verify) → SignatureCodec
//! ```
//!
//! Transport is somebody else's problem. This crate never opens a socket.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod merchant;
pub mod message;
pub mod security;
pub mod transaction;

pub use error::GatewayError;
pub use merchant::{Gateway, MerchantProfile};
pub use message::{Field, FieldRecord};
pub use security::{SecurityContext, SecurityOptions};
pub use transaction::{build_signed_request, verify_response, TransactionType, VerificationReport};

//! # Transaction Module
//!
//! Request construction and response verification for the three gateway
//! operations: authorization, sales completion and reversal.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — TransactionType, its field table, ActionCode
//! builder.rs      — RequestBuilder: validate, stamp, sign, order
//! signing.rs      — MAC → frame → raw RSA → P_SIGN, both directions
//! verification.rs — ResponseVerifier and the collected VerificationReport
//! response.rs     — GatewayResponse: TRTYPE dispatch and field accessors
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** — [`RequestBuilder::build`] turns caller fields into a signed
//!    [`FieldRecord`](crate::message::FieldRecord).
//! 2. **Submit** — the transport posts the record to the gateway (not our job).
//! 3. **Receive** — the gateway posts its verdict to the merchant callback.
//! 4. **Verify** — [`verify_response`] checks `ACTION` and `P_SIGN`.
//!
//! ## Design Decisions
//!
//! - One builder, one table. Per-variant differences live only in
//!   [`TransactionLayout`]; adding a variant means adding a row.
//! - Time and randomness are injected ([`Clock`](crate::clock::Clock),
//!   [`NonceSource`]) so a signed request can be reproduced byte for byte
//!   in tests.
//! - Verification collects errors instead of short-circuiting with `?`, so
//!   the callback handler can log everything the gateway got wrong.

pub mod builder;
pub mod response;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{build_signed_request, FixedNonce, NonceSource, OsNonce, RequestBuilder};
pub use response::GatewayResponse;
pub use signing::{sign_request, sign_response};
pub use types::{ActionCode, TransactionLayout, TransactionType};
pub use verification::{verify_response, ResponseVerifier, VerificationReport};

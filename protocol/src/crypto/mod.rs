//! # Cryptographic Primitives for the Gateway Scheme
//!
//! Everything that touches a hash or a key lives here:
//!
//! - **mac** — length-prefixed field concatenation hashed with MD5.
//! - **codec** — the bank's padding frame around the MAC hash ([`SignatureConfig`]).
//! - **keys** — RSA key loading and the two non-interchangeable key roles.
//! - **rsa_raw** — unpadded RSA exponentiation over fixed-size blocks.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't; the bank did. MD5 and textbook RSA are not choices anyone
//! on this team would make, but the gateway only speaks this dialect. The
//! primitives themselves (MD5, modular exponentiation with blinding) come
//! from RustCrypto; the only hand-written part is the frame layout, and
//! that is pinned down by tests.

pub mod codec;
pub mod keys;
pub mod mac;
pub mod rsa_raw;

pub use codec::SignatureConfig;
pub use keys::{SigningKey, VerifyingKey};
pub use mac::{compose, request_mac, response_mac, HexCase};

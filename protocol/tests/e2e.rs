//! End-to-end integration tests for the e-Gateway protocol.
//!
//! These tests play both sides of the wire: a merchant that signs requests
//! and verifies callbacks, and a bank simulator that checks the merchant's
//! `P_SIGN` and signs its own responses. Only the public API is used, so a
//! break here is a break for every integration.

use std::sync::{Arc, OnceLock};

use chrono::TimeZone;

use egateway_protocol::clock::FixedClock;
use egateway_protocol::crypto::codec::SignatureConfig;
use egateway_protocol::crypto::{request_mac, rsa_raw, SigningKey};
use egateway_protocol::transaction::{
    sign_response, ActionCode, FixedNonce, GatewayResponse, RequestBuilder, TransactionType,
};
use egateway_protocol::{
    build_signed_request, verify_response, Field, FieldRecord, Gateway, GatewayError,
    MerchantProfile, SecurityContext, SecurityOptions,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const FIRST: &str = "0001";
const PREFIX: &str = "003020300C06082A864886F70D020505000410";
const PADDING: &str = "FF";

fn merchant_key() -> &'static SigningKey {
    static KEY: OnceLock<SigningKey> = OnceLock::new();
    KEY.get_or_init(|| SigningKey::generate(1024).unwrap())
}

fn bank_key() -> &'static SigningKey {
    static KEY: OnceLock<SigningKey> = OnceLock::new();
    KEY.get_or_init(|| SigningKey::generate(1024).unwrap())
}

fn frame() -> SignatureConfig {
    SignatureConfig::new(FIRST, PREFIX, PADDING).unwrap()
}

/// The merchant's view: own private key, bank's public key.
fn merchant_context() -> Arc<SecurityContext> {
    SecurityContext::shared(
        SecurityOptions::new()
            .signature_first(FIRST)
            .signature_prefix(PREFIX)
            .signature_padding(PADDING)
            .private_key(merchant_key().clone())
            .bank_public_key(bank_key().verifying_key()),
    )
    .unwrap()
}

fn pinned_gateway() -> Gateway {
    let at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let builder = RequestBuilder::new(merchant_context())
        .with_clock(Arc::new(FixedClock(at)))
        .with_nonce_source(Arc::new(FixedNonce("8f14e45fceea167a5a36dedd4bea2543".into())));
    let profile = MerchantProfile::new("498000049800001", "49800001")
        .back_ref("https://shop.example.com/return")
        .merch_name("Example Shop")
        .merch_url("https://shop.example.com");
    Gateway::with_builder(profile, builder)
}

/// What the bank does on receipt: recompute the request MAC and compare
/// it with what the merchant's key recovers from `P_SIGN`.
fn bank_accepts(request: &FieldRecord) -> bool {
    let Ok(mac) = request_mac(
        request.value(Field::Order),
        request.value(Field::Nonce),
        request.value(Field::Timestamp),
        request.value(Field::TrType),
        request.value(Field::Amount),
    ) else {
        return false;
    };
    let Ok(signature) = hex::decode(request.value(Field::PSign)) else {
        return false;
    };
    let public = merchant_key().verifying_key();
    let Ok(block) = rsa_raw::verify(&signature, &public) else {
        return false;
    };
    frame()
        .decode_block(&block, public.byte_len())
        .is_some_and(|recovered| recovered.eq_ignore_ascii_case(&mac))
}

/// The bank's callback for `request`, signed with the bank key.
fn bank_callback(request: &FieldRecord, action: &str) -> FieldRecord {
    let mut response = FieldRecord::new()
        .with(Field::Terminal, request.value(Field::Terminal))
        .with(Field::TrType, request.value(Field::TrType))
        .with(Field::Order, request.value(Field::Order))
        .with(Field::Amount, request.value(Field::Amount))
        .with(Field::Currency, request.value(Field::Currency))
        .with(Field::Action, action)
        .with(Field::Rc, if action == "0" { "00" } else { "05" })
        .with(Field::Approval, "A1B2C3")
        .with(Field::Rrn, "612345678901")
        .with(Field::IntRef, "9F8E7D6C5B4A3921")
        .with(Field::Timestamp, "20260301120007")
        .with(Field::Nonce, request.value(Field::Nonce));
    sign_response(&mut response, bank_key(), &frame()).unwrap();
    response
}

// ---------------------------------------------------------------------------
// Full lifecycle
// ---------------------------------------------------------------------------

#[test]
fn authorization_then_completion_lifecycle() {
    let gateway = pinned_gateway();

    // 1. Merchant signs the authorization for order AB12, 10.00 MDL.
    let auth = gateway
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();
    assert_eq!(auth.value(Field::TrType), "0");
    assert_eq!(auth.value(Field::Currency), "MDL");
    assert_eq!(auth.value(Field::Desc), "Order AB12 payment");
    assert_eq!(auth.value(Field::Timestamp), "20260301120000");
    assert_eq!(auth.value(Field::PSign).len(), 2 * merchant_key().byte_len());

    // 2. The bank authenticates it.
    assert!(bank_accepts(&auth));

    // 3. The bank calls back; the merchant verifies.
    let callback = gateway.response(bank_callback(&auth, "0")).unwrap();
    assert_eq!(callback.tx_type(), TransactionType::Authorization);
    let report = gateway.verify(&callback);
    assert!(report.is_valid(), "{:?}", report.errors());
    assert_eq!(report.action(), Some(ActionCode::Success));

    // 4. Merchant completes using the references from the callback.
    let completion = gateway
        .completion("10.00", callback.order(), callback.rrn(), callback.int_ref())
        .unwrap();
    assert_eq!(completion.value(Field::TrType), "21");
    assert_eq!(completion.value(Field::Rrn), "612345678901");
    assert!(bank_accepts(&completion));

    let completed = gateway.response(bank_callback(&completion, "0")).unwrap();
    assert_eq!(completed.tx_type(), TransactionType::Completion);
    assert!(gateway.verify(&completed).is_valid());
}

#[test]
fn reversal_is_signed_and_verified() {
    let gateway = pinned_gateway();
    let reversal = gateway
        .reversal("10,00", "AB12", "612345678901", "9F8E7D6C5B4A3921")
        .unwrap();
    assert_eq!(reversal.value(Field::TrType), "24");
    assert_eq!(reversal.value(Field::Amount), "10.00");
    assert!(bank_accepts(&reversal));

    let response = gateway.response(bank_callback(&reversal, "0")).unwrap();
    assert_eq!(response.tx_type(), TransactionType::Reversal);
    assert!(gateway.verify(&response).is_valid());
}

#[test]
fn wire_form_is_in_gateway_order() {
    let auth = pinned_gateway()
        .authorization("10.00", "AB12", "Books", "buyer@example.com")
        .unwrap();
    let names: Vec<&str> = auth.to_form_pairs().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        [
            "AMOUNT", "CURRENCY", "ORDER", "DESC", "MERCH_NAME", "MERCH_URL", "MERCHANT",
            "TERMINAL", "EMAIL", "TRTYPE", "COUNTRY", "MERCH_GMT", "TIMESTAMP", "NONCE",
            "BACKREF", "LANG", "P_SIGN"
        ]
    );

    let json = serde_json::to_value(&auth).unwrap();
    assert_eq!(json["ORDER"], "AB12");
    assert_eq!(json["TRTYPE"], "0");
}

#[test]
fn free_function_uses_fresh_time_and_nonce() {
    let fields = FieldRecord::new()
        .with(Field::Order, "AB12")
        .with(Field::Amount, "10.00")
        .with(Field::Currency, "MDL")
        .with(Field::Rrn, "612345678901")
        .with(Field::IntRef, "9F8E7D6C5B4A3921")
        .with(Field::Terminal, "49800001");
    let context = merchant_context();
    let a = build_signed_request(&context, TransactionType::Completion, &fields).unwrap();
    let b = build_signed_request(&context, TransactionType::Completion, &fields).unwrap();
    assert_eq!(a.value(Field::Nonce).len(), 32);
    assert_ne!(a.value(Field::Nonce), b.value(Field::Nonce));
    assert_ne!(a.value(Field::PSign), b.value(Field::PSign));
    assert!(bank_accepts(&a) && bank_accepts(&b));
}

// ---------------------------------------------------------------------------
// Tampering
// ---------------------------------------------------------------------------

#[test]
fn bank_rejects_tampered_requests() {
    let auth = pinned_gateway()
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();
    assert!(!bank_accepts(&auth.clone().with(Field::Amount, "1.00")));
    assert!(!bank_accepts(&auth.clone().with(Field::Order, "AB13")));
    assert!(!bank_accepts(&auth.clone().with(Field::Nonce, "00")));

    let mut signature = hex::decode(auth.value(Field::PSign)).unwrap();
    signature[100] ^= 0x80;
    assert!(!bank_accepts(&auth.with(Field::PSign, hex::encode(signature))));
}

#[test]
fn merchant_rejects_tampered_callbacks() {
    let gateway = pinned_gateway();
    let auth = gateway
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();
    let genuine = bank_callback(&auth, "0");
    let context = merchant_context();

    for (field, value) in [
        (Field::Order, "AB99"),
        (Field::Amount, "1000.00"),
        (Field::Rc, "01"),
        (Field::Rrn, "000000000001"),
    ] {
        let report = verify_response(&context, &genuine.clone().with(field, value));
        assert_eq!(report.errors(), [GatewayError::SignatureMismatch], "{}", field);
    }

    // A duplicate notice replayed as a success.
    let duplicate = bank_callback(&auth, "1").with(Field::Action, "0");
    let report = verify_response(&context, &duplicate);
    assert_eq!(report.errors(), [GatewayError::SignatureMismatch]);
}

#[test]
fn callback_signed_by_merchant_key_is_rejected() {
    // A merchant key must never be able to forge bank responses.
    let auth = pinned_gateway()
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();
    let mut forged = bank_callback(&auth, "0");
    sign_response(&mut forged, merchant_key(), &frame()).unwrap();
    let report = verify_response(&merchant_context(), &forged);
    assert!(!report.is_valid());
}

// ---------------------------------------------------------------------------
// Action dispatch
// ---------------------------------------------------------------------------

#[test]
fn gateway_outcomes_are_reported() {
    let gateway = pinned_gateway();
    let auth = gateway
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();

    let cases = [
        ("1", GatewayError::DuplicateTransaction),
        ("2", GatewayError::Declined),
        ("3", GatewayError::ProcessingFault),
    ];
    for (action, expected) in cases {
        let response = gateway.response(bank_callback(&auth, action)).unwrap();
        let report = gateway.verify(&response);
        assert!(!report.is_valid());
        assert!(report.last_error().is_some_and(GatewayError::is_gateway_outcome));
        assert_eq!(report.errors(), [expected]);
    }

    let response = gateway.response(bank_callback(&auth, "9")).unwrap();
    assert!(matches!(
        gateway.verify(&response).errors(),
        [GatewayError::MalformedResponse(_)]
    ));
}

#[test]
fn callback_form_parsing() {
    let gateway = pinned_gateway();
    assert!(matches!(
        GatewayResponse::from_pairs([("ORDER", "AB12"), ("TRTYPE", "5")]),
        Err(GatewayError::MalformedResponse(_))
    ));
    assert!(matches!(
        gateway.response(FieldRecord::new()),
        Err(GatewayError::MalformedResponse(_))
    ));

    // Numeric JSON values are read as their text.
    let auth = gateway
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();
    let mut json = serde_json::to_value(&bank_callback(&auth, "0")).unwrap();
    json["TRTYPE"] = serde_json::json!(0);
    json["UNRELATED"] = serde_json::json!("ignored");
    let response = GatewayResponse::from_json(&json).unwrap();
    assert_eq!(response.trtype(), "0");
    assert!(gateway.verify(&response).is_valid());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn keys_loaded_from_pem_files() {
    let dir = tempfile::tempdir().unwrap();
    let private = dir.path().join("merchant.pem");
    let bank_public = dir.path().join("bank.pub");
    std::fs::write(&private, merchant_key().to_pem().unwrap()).unwrap();
    std::fs::write(&bank_public, bank_key().verifying_key().to_pem().unwrap()).unwrap();

    let context = SecurityContext::shared(
        SecurityOptions::new()
            .signature_first(FIRST)
            .signature_prefix(PREFIX)
            .signature_padding(PADDING)
            .private_key_path(&private)
            .bank_public_key_path(&bank_public),
    )
    .unwrap();
    let gateway = Gateway::new(
        MerchantProfile::new("498000049800001", "49800001").back_ref("https://shop.example.com"),
        context,
    );
    let auth = gateway
        .authorization("10.00", "AB12", "", "buyer@example.com")
        .unwrap();
    assert!(bank_accepts(&auth));
    let response = gateway.response(bank_callback(&auth, "0")).unwrap();
    assert!(gateway.verify(&response).is_valid());
}

#[test]
fn undersized_key_fails_before_first_request() {
    let tiny = SigningKey::generate(256).unwrap();
    let err = SecurityOptions::new()
        .signature_first(FIRST)
        .signature_prefix(PREFIX)
        .signature_padding(PADDING)
        .private_key(tiny)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::PaddingUnderflow {
            key_len: 32,
            required: 37
        }
    );
}

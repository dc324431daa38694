//! Walkthrough of one complete order against a simulated bank.
//!
//! Generates merchant and bank keys, signs an authorization, lets the
//! "bank" authenticate it and call back, verifies the callback, then
//! completes the order. Finishes with a couple of forged callbacks to show
//! what rejection looks like. Output is colored, storytelling-style.
//!
//! Run with:
//!   cargo run --example demo --release

use std::sync::Arc;
use std::time::Instant;

use egateway_protocol::crypto::codec::SignatureConfig;
use egateway_protocol::crypto::{request_mac, rsa_raw, SigningKey};
use egateway_protocol::transaction::sign_response;
use egateway_protocol::{
    Field, FieldRecord, Gateway, GatewayError, MerchantProfile, SecurityContext, SecurityOptions,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

const FIRST: &str = "0001";
const PREFIX: &str = "003020300C06082A864886F70D020505000410";
const PADDING: &str = "FF";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    e-GATEWAY  --  Merchant Signing Walkthrough                     {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    MD5 MAC  |  bank padding frame  |  raw RSA                      {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!("{CYAN}------------------------------------------------------------------------{RESET}");
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{RED}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

fn abbreviated(value: &str) -> String {
    if value.len() <= 24 {
        return value.to_string();
    }
    format!("{}...{} ({} chars)", &value[..12], &value[value.len() - 8..], value.len())
}

fn print_form(record: &FieldRecord) {
    for (name, value) in record.to_form_pairs() {
        println!("  {DIM}{name:<14}{RESET} {}", abbreviated(value));
    }
}

// ---------------------------------------------------------------------------
// Bank simulator
// ---------------------------------------------------------------------------

struct Bank {
    key: SigningKey,
    merchant_public: egateway_protocol::crypto::VerifyingKey,
    frame: SignatureConfig,
}

impl Bank {
    fn accepts(&self, request: &FieldRecord) -> bool {
        let Ok(mac) = request_mac(
            request.value(Field::Order),
            request.value(Field::Nonce),
            request.value(Field::Timestamp),
            request.value(Field::TrType),
            request.value(Field::Amount),
        ) else {
            return false;
        };
        hex::decode(request.value(Field::PSign))
            .ok()
            .and_then(|sig| rsa_raw::verify(&sig, &self.merchant_public).ok())
            .and_then(|block| self.frame.decode_block(&block, self.merchant_public.byte_len()))
            .is_some_and(|recovered| recovered.eq_ignore_ascii_case(&mac))
    }

    fn callback(&self, request: &FieldRecord, action: &str) -> Result<FieldRecord, GatewayError> {
        let mut response = FieldRecord::new()
            .with(Field::Terminal, request.value(Field::Terminal))
            .with(Field::TrType, request.value(Field::TrType))
            .with(Field::Order, request.value(Field::Order))
            .with(Field::Amount, request.value(Field::Amount))
            .with(Field::Currency, request.value(Field::Currency))
            .with(Field::Action, action)
            .with(Field::Rc, "00")
            .with(Field::Approval, "A1B2C3")
            .with(Field::Rrn, "612345678901")
            .with(Field::IntRef, "9F8E7D6C5B4A3921")
            .with(Field::Nonce, request.value(Field::Nonce));
        sign_response(&mut response, &self.key, &self.frame)?;
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), GatewayError> {
    let demo_start = Instant::now();

    banner();

    // -----------------------------------------------------------------------
    // Step 1: Keys
    // -----------------------------------------------------------------------

    section(1, "Key Generation");
    subsection("Generating 2048-bit RSA keys for the merchant and the bank...");

    let t = Instant::now();
    let merchant_key = SigningKey::generate(2048)?;
    let bank_key = SigningKey::generate(2048)?;
    timing("keygen x2", t.elapsed());

    info("Merchant key", &format!("{} bits, {}-byte frame", merchant_key.bits(), merchant_key.byte_len()));
    info("Bank key", &format!("{} bits", bank_key.bits()));

    let frame = SignatureConfig::new(FIRST, PREFIX, PADDING)?;
    let pad = frame.pad_count(32, merchant_key.byte_len())?;
    info("Frame", &format!("{FIRST} + {PADDING} x {pad} + MD5 prefix + hash"));

    let bank = Bank {
        merchant_public: merchant_key.verifying_key(),
        key: bank_key.clone(),
        frame: frame.clone(),
    };

    // -----------------------------------------------------------------------
    // Step 2: Merchant setup
    // -----------------------------------------------------------------------

    section(2, "Merchant Configuration");

    let context = SecurityContext::shared(
        SecurityOptions::new()
            .signature_first(FIRST)
            .signature_prefix(PREFIX)
            .signature_padding(PADDING)
            .private_key(merchant_key)
            .bank_public_key(bank_key.verifying_key()),
    )?;
    let profile = MerchantProfile::new("498000049800001", "49800001")
        .language("ro-MD")?
        .merch_name("Example Shop")
        .merch_url("https://shop.example.com")
        .back_ref("https://shop.example.com/return");
    info("Merchant", &profile.merchant);
    info("Language", &profile.language);
    let gateway = Gateway::new(profile, Arc::clone(&context));
    success("Security context frozen; safe to share across threads");

    // -----------------------------------------------------------------------
    // Step 3: Authorization
    // -----------------------------------------------------------------------

    section(3, "Authorization Request (TRTYPE 0)");
    subsection("Order AB12, 10,00 MDL, default description...");

    let t = Instant::now();
    let auth = gateway.authorization("10,00", "AB12", "", "buyer@example.com")?;
    timing("build + sign", t.elapsed());
    print_form(&auth);

    if bank.accepts(&auth) {
        success("Bank recovered the request MAC from P_SIGN");
    } else {
        rejected("Bank could not authenticate the request");
    }

    // -----------------------------------------------------------------------
    // Step 4: Callback
    // -----------------------------------------------------------------------

    section(4, "Bank Callback");

    let callback = gateway.response(bank.callback(&auth, "0")?)?;
    let t = Instant::now();
    let report = gateway.verify(&callback);
    timing("verify", t.elapsed());
    if report.is_valid() {
        success(&format!("Authorization approved, RRN {}", callback.rrn()));
    } else {
        rejected(&report.error_messages().join("; "));
    }

    // -----------------------------------------------------------------------
    // Step 5: Completion
    // -----------------------------------------------------------------------

    section(5, "Sales Completion (TRTYPE 21)");

    let completion =
        gateway.completion("10.00", callback.order(), callback.rrn(), callback.int_ref())?;
    print_form(&completion);
    if bank.accepts(&completion) {
        success("Completion authenticated by the bank");
    }

    // -----------------------------------------------------------------------
    // Step 6: Forgeries
    // -----------------------------------------------------------------------

    section(6, "Forged Callbacks");

    subsection("Attacker changes AMOUNT on a genuine callback...");
    let forged = bank.callback(&auth, "0")?.with(Field::Amount, "0.01");
    let report = gateway.verify(&gateway.response(forged)?);
    for message in report.error_messages() {
        rejected(&message);
    }

    subsection("Bank declines a second attempt...");
    let declined = gateway.response(bank.callback(&auth, "2")?)?;
    for message in gateway.verify(&declined).error_messages() {
        rejected(&message);
    }

    println!();
    timing("total", demo_start.elapsed());
    println!();
    Ok(())
}

// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # e-Gateway CLI
//!
//! Entry point for the `egateway` binary. Parses CLI arguments, initializes
//! logging, and runs one of:
//!
//! - `keygen`  — generate a PEM key pair for a test integration
//! - `sign`    — build a signed authorization, completion or reversal
//! - `verify`  — check a gateway callback and print a JSON report
//! - `version` — print build version information
//!
//! Output meant for machines (signed forms, reports) goes to stdout; logs go
//! to stderr.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use egateway_protocol::crypto::SigningKey;
use egateway_protocol::transaction::GatewayResponse;
use egateway_protocol::{FieldRecord, Gateway, MerchantProfile, SecurityContext, SecurityOptions};

use cli::{Commands, EgatewayCli, SignCommand};
use logging::LogFormat;

fn main() -> Result<ExitCode> {
    let cli = EgatewayCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Keygen(args) => keygen(args).map(|()| ExitCode::SUCCESS),
        Commands::Sign(args) => sign(args).map(|()| ExitCode::SUCCESS),
        Commands::Verify(args) => verify(args),
        Commands::Version => {
            print_version();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Generates a key pair and writes it as `<name>.pem` / `<name>.pub`.
fn keygen(args: cli::KeygenArgs) -> Result<()> {
    tracing::info!(bits = args.bits, out = %args.out.display(), "generating RSA key pair");

    let key = SigningKey::generate(args.bits).context("key generation failed")?;
    let (private_path, public_path) = write_key_pair(&key, &args.out, &args.name)?;

    println!("Key pair generated.");
    println!("  Modulus bits : {}", key.bits());
    println!("  Private key  : {}", private_path.display());
    println!("  Public key   : {}", public_path.display());
    Ok(())
}

/// Writes `key` into `dir`, returning the private and public key paths.
fn write_key_pair(key: &SigningKey, dir: &Path, name: &str) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let private_path = dir.join(format!("{}.pem", name));
    let public_path = dir.join(format!("{}.pub", name));

    let private_pem = key.to_pem().context("failed to encode private key")?;
    write_private(&private_path, &private_pem)?;
    let public_pem = key
        .verifying_key()
        .to_pem()
        .context("failed to encode public key")?;
    std::fs::write(&public_path, public_pem)
        .with_context(|| format!("failed to write public key to {}", public_path.display()))?;

    Ok((private_path, public_path))
}

fn write_private(path: &Path, pem: &str) -> Result<()> {
    std::fs::write(path, pem)
        .with_context(|| format!("failed to write private key to {}", path.display()))?;

    // Restrict permissions on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }
    Ok(())
}

/// Builds the immutable security context from flags/env.
fn security_context(args: &cli::SecurityArgs) -> Result<Arc<SecurityContext>> {
    let mut options = SecurityOptions::new();
    if let Some(first) = &args.signature_first {
        options = options.signature_first(first);
    }
    if let Some(prefix) = &args.signature_prefix {
        options = options.signature_prefix(prefix);
    }
    if let Some(padding) = &args.signature_padding {
        options = options.signature_padding(padding);
    }
    if let Some(path) = &args.private_key {
        options = options.private_key_path(path);
    }
    if let Some(path) = &args.bank_public_key {
        options = options.bank_public_key_path(path);
    }
    SecurityContext::shared(options).context("failed to initialize security context")
}

/// Signs one request and prints it as a JSON object in wire order.
fn sign(args: cli::SignArgs) -> Result<()> {
    let context = security_context(&args.security)?;
    if !context.can_sign() {
        bail!("signing needs the merchant private key (--private-key)");
    }

    let request = signed_request(args.request, context)?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

fn signed_request(request: SignCommand, context: Arc<SecurityContext>) -> Result<FieldRecord> {
    let signed = match request {
        SignCommand::Authorization(auth) => {
            let m = auth.merchant;
            let mut profile = MerchantProfile::new(m.merchant, m.terminal)
                .currency(m.currency)
                .language(&m.language)
                .context("invalid merchant language")?
                .country(m.country)
                .merch_gmt(m.merch_gmt)
                .back_ref(m.back_ref);
            if let Some(name) = m.merch_name {
                profile = profile.merch_name(name);
            }
            if let Some(url) = m.merch_url {
                profile = profile.merch_url(url);
            }
            if let Some(address) = m.merch_address {
                profile = profile.merch_address(address);
            }
            Gateway::new(profile, context)
                .authorization(&auth.amount, &auth.order, &auth.description, &auth.email)
                .context("failed to sign authorization request")?
        }
        SignCommand::Completion(f) => follow_up_gateway(&f, context)
            .completion(&f.amount, &f.order, &f.rrn, &f.int_ref)
            .context("failed to sign completion request")?,
        SignCommand::Reversal(f) => follow_up_gateway(&f, context)
            .reversal(&f.amount, &f.order, &f.rrn, &f.int_ref)
            .context("failed to sign reversal request")?,
    };
    Ok(signed)
}

fn follow_up_gateway(args: &cli::FollowUpArgs, context: Arc<SecurityContext>) -> Gateway {
    // Follow-ups only carry TERMINAL and CURRENCY from the profile.
    let profile = MerchantProfile::new("", args.terminal.as_str()).currency(args.currency.as_str());
    Gateway::new(profile, context)
}

/// Verifies a response and prints `{valid, trtype, action, errors}`.
///
/// Exits with status 1 when the response is not valid.
fn verify(args: cli::VerifyArgs) -> Result<ExitCode> {
    let context = security_context(&args.security)?;
    if !context.can_verify() {
        bail!("verification needs the bank public key (--bank-public-key)");
    }

    let raw = read_input(&args.input)?;
    let report = verification_report(&context, &raw)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report_is_valid(&report) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Parses a JSON response and verifies it.
///
/// A response without a usable `TRTYPE` still produces a report, carrying
/// the `MalformedResponse` error. Input that is not a JSON object is an error.
fn verification_report(context: &SecurityContext, raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).context("response input is not valid JSON")?;
    let fields = FieldRecord::from_json(&value).context("response input is not a field object")?;

    let report = match GatewayResponse::from_fields(fields) {
        Ok(response) => serde_json::to_value(response.verify(context))?,
        Err(e) => serde_json::json!({
            "valid": false,
            "trtype": null,
            "action": null,
            "errors": [e.to_string()],
        }),
    };
    Ok(report)
}

fn report_is_valid(report: &Value) -> bool {
    report["valid"] == true
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read response from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read response from {}", input))
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("egateway {}", env!("CARGO_PKG_VERSION"));
    println!("gateway  {}", egateway_protocol::config::GATEWAY_URL);
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use egateway_protocol::transaction::{sign_response, TransactionType};
    use egateway_protocol::Field;
    use std::sync::OnceLock;

    const PREFIX: &str = "003020300C06082A864886F70D020505000410";

    fn test_key() -> &'static SigningKey {
        static KEY: OnceLock<SigningKey> = OnceLock::new();
        KEY.get_or_init(|| SigningKey::generate(1024).expect("keygen"))
    }

    /// Writes the shared test key to `dir` and returns flags pointing at it.
    fn security_flags(dir: &Path) -> Vec<String> {
        let (private, public) = write_key_pair(test_key(), dir, "merchant").expect("write keys");
        vec![
            "--signature-first".into(),
            "0001".into(),
            "--signature-prefix".into(),
            PREFIX.into(),
            "--signature-padding".into(),
            "FF".into(),
            "--private-key".into(),
            private.display().to_string(),
            "--bank-public-key".into(),
            public.display().to_string(),
        ]
    }

    /// `egateway <command> <security flags> <rest>`
    fn parse(command: &str, security: &[String], rest: &[&str]) -> Commands {
        let argv = ["egateway", command]
            .into_iter()
            .map(String::from)
            .chain(security.iter().cloned())
            .chain(rest.iter().map(|s| s.to_string()));
        EgatewayCli::try_parse_from(argv).expect("parse").command
    }

    fn signed_callback(context: &SecurityContext, action: &str) -> String {
        let mut fields = FieldRecord::new()
            .with(Field::Terminal, "49800001")
            .with(Field::TrType, "0")
            .with(Field::Order, "AB12")
            .with(Field::Amount, "10.00")
            .with(Field::Currency, "MDL")
            .with(Field::Action, action)
            .with(Field::Rc, "00")
            .with(Field::Rrn, "612345678901")
            .with(Field::IntRef, "9F8E7D6C5B4A3921");
        sign_response(&mut fields, test_key(), context.signature_config()).unwrap();
        serde_json::to_string(&fields).unwrap()
    }

    fn context_from_files(dir: &Path) -> Arc<SecurityContext> {
        let Commands::Verify(args) = parse("verify", &security_flags(dir), &[]) else {
            panic!("expected verify");
        };
        security_context(&args.security).unwrap()
    }

    #[test]
    fn keygen_writes_loadable_pair() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("keys");
        let (private, public) = write_key_pair(test_key(), &out, "shop").unwrap();

        assert_eq!(private, out.join("shop.pem"));
        assert_eq!(public, out.join("shop.pub"));
        assert_eq!(SigningKey::load(&private).unwrap().bits(), 1024);
        let public_pem = std::fs::read_to_string(&public).unwrap();
        assert_eq!(
            egateway_protocol::crypto::VerifyingKey::from_pem(&public_pem).unwrap(),
            test_key().verifying_key()
        );
    }

    #[cfg(unix)]
    #[test]
    fn keygen_restricts_private_key_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let (private, _) = write_key_pair(test_key(), dir.path(), "merchant").unwrap();
        let mode = std::fs::metadata(&private).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn sign_completion_renders_wire_order() {
        let dir = tempfile::tempdir().unwrap();
        let command = parse(
            "sign",
            &security_flags(dir.path()),
            &[
                "completion",
                "--terminal",
                "49800001",
                "--amount",
                "10,00",
                "--order",
                "AB12",
                "--rrn",
                "612345678901",
                "--int-ref",
                "9F8E7D6C5B4A3921",
            ],
        );
        let Commands::Sign(args) = command else {
            panic!("expected sign");
        };
        let context = security_context(&args.security).unwrap();
        let request = signed_request(args.request, context).unwrap();
        assert_eq!(request.value(Field::Amount), "10.00");

        let json = serde_json::to_string_pretty(&request).unwrap();
        let positions: Vec<usize> = TransactionType::Completion
            .layout()
            .wire_order
            .iter()
            .map(|field| {
                json.find(&format!("\"{}\"", field.name()))
                    .unwrap_or_else(|| panic!("{} missing from {json}", field))
            })
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{json}");
    }

    #[test]
    fn sign_without_private_key_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (_, public) = write_key_pair(test_key(), dir.path(), "bank").unwrap();
        let args = cli::SignArgs {
            security: cli::SecurityArgs {
                signature_first: Some("0001".into()),
                signature_prefix: Some(PREFIX.into()),
                signature_padding: Some("FF".into()),
                private_key: None,
                bank_public_key: Some(public),
            },
            request: SignCommand::Completion(cli::FollowUpArgs {
                terminal: "49800001".into(),
                currency: "MDL".into(),
                amount: "10.00".into(),
                order: "AB12".into(),
                rrn: "612345678901".into(),
                int_ref: "9F8E7D6C5B4A3921".into(),
            }),
        };
        let err = sign(args).unwrap_err();
        assert!(err.to_string().contains("--private-key"), "{err}");
    }

    #[test]
    fn genuine_callback_passes() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_from_files(dir.path());

        let report = verification_report(&context, &signed_callback(&context, "0")).unwrap();
        assert!(report_is_valid(&report), "{report}");
        assert_eq!(report["trtype"], "0");
        assert_eq!(report["errors"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn tampered_callback_fails() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_from_files(dir.path());

        let tampered = signed_callback(&context, "0").replace("10.00", "0.01");
        let report = verification_report(&context, &tampered).unwrap();
        assert!(!report_is_valid(&report));
        assert_eq!(report["errors"][0], "bank response: signature mismatch");
    }

    #[test]
    fn declined_callback_fails() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_from_files(dir.path());

        let report = verification_report(&context, &signed_callback(&context, "2")).unwrap();
        assert!(!report_is_valid(&report));
        assert_eq!(report["errors"][0], "bank response: transaction declined");
    }

    #[test]
    fn unknown_trtype_is_reported_as_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_from_files(dir.path());

        let report =
            verification_report(&context, r#"{"TRTYPE": "7", "ACTION": "0"}"#).unwrap();
        assert!(!report_is_valid(&report));
        assert!(report["trtype"].is_null());
        let message = report["errors"][0].as_str().unwrap();
        assert!(message.starts_with("bank response: malformed"), "{message}");
        assert!(message.contains("TRTYPE"), "{message}");
    }

    #[test]
    fn non_object_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_from_files(dir.path());

        assert!(verification_report(&context, "not json").is_err());
        assert!(verification_report(&context, "[1, 2]").is_err());
    }

    #[test]
    fn response_is_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callback.json");
        std::fs::write(&path, r#"{"TRTYPE": "21"}"#).unwrap();

        let raw = read_input(path.to_str().unwrap()).unwrap();
        assert_eq!(raw, r#"{"TRTYPE": "21"}"#);
        assert!(read_input(dir.path().join("missing.json").to_str().unwrap()).is_err());
    }
}

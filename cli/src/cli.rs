//! # CLI Interface
//!
//! Defines the command-line argument structure for `egateway` using
//! `clap` derive. Supports four subcommands: `keygen`, `sign`, `verify`,
//! and `version`.
//!
//! Every security and merchant setting can also come from an `EGATEWAY_*`
//! environment variable, which is how deployments are expected to pass them.

use clap::{Args, Parser, Subcommand};
use egateway_protocol::config;
use std::path::PathBuf;

/// Merchant-side signing and verification for the bank e-commerce gateway.
///
/// Produces signed request forms ready to post to the gateway and checks
/// the signed callbacks it sends back. Never talks to the network itself.
#[derive(Parser, Debug)]
#[command(
    name = "egateway",
    about = "Bank e-commerce gateway signing tool",
    version,
    propagate_version = true
)]
pub struct EgatewayCli {
    /// Log output format on stderr: `pretty` or `json`.
    #[arg(long, global = true, env = "EGATEWAY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `egateway` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an RSA key pair for a test integration.
    Keygen(KeygenArgs),
    /// Build and sign a gateway request; prints it as JSON in wire order.
    Sign(SignArgs),
    /// Verify a gateway response read as a JSON object.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Modulus size in bits.
    #[arg(long, default_value_t = 2048)]
    pub bits: usize,

    /// Directory the key files are written to. Created if missing.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// File stem: writes `<name>.pem` (private) and `<name>.pub` (public).
    #[arg(long, default_value = "merchant")]
    pub name: String,
}

/// Bank-issued frame literals and key locations.
#[derive(Args, Debug)]
pub struct SecurityArgs {
    /// Leading hex literal of the signature block.
    #[arg(long, env = "EGATEWAY_SIGNATURE_FIRST")]
    pub signature_first: Option<String>,

    /// Hex marker placed right before the MAC hash.
    #[arg(long, env = "EGATEWAY_SIGNATURE_PREFIX")]
    pub signature_prefix: Option<String>,

    /// Padding byte, two hex digits.
    #[arg(long, env = "EGATEWAY_SIGNATURE_PADDING")]
    pub signature_padding: Option<String>,

    /// Merchant private key (PEM).
    #[arg(long, env = "EGATEWAY_PRIVATE_KEY")]
    pub private_key: Option<PathBuf>,

    /// Bank public key (PEM).
    #[arg(long, env = "EGATEWAY_BANK_PUBLIC_KEY")]
    pub bank_public_key: Option<PathBuf>,
}

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub security: SecurityArgs,

    #[command(subcommand)]
    pub request: SignCommand,
}

/// Which request to sign.
#[derive(Subcommand, Debug)]
pub enum SignCommand {
    /// Pre-authorization through the hosted payment form (TRTYPE 0).
    Authorization(AuthorizationArgs),
    /// Sales completion of an authorized order (TRTYPE 21).
    Completion(FollowUpArgs),
    /// Reversal of an authorized order (TRTYPE 24).
    Reversal(FollowUpArgs),
}

/// Static shop details, normally set once through the environment.
#[derive(Args, Debug)]
pub struct MerchantArgs {
    #[arg(long, env = "EGATEWAY_MERCHANT")]
    pub merchant: String,

    #[arg(long, env = "EGATEWAY_TERMINAL")]
    pub terminal: String,

    #[arg(long, env = "EGATEWAY_CURRENCY", default_value = config::DEFAULT_CURRENCY)]
    pub currency: String,

    /// Payment form language; `ro-MD` style values fall back to `ro`.
    #[arg(long, env = "EGATEWAY_LANGUAGE", default_value = config::DEFAULT_LANGUAGE)]
    pub language: String,

    #[arg(long, env = "EGATEWAY_COUNTRY", default_value = config::DEFAULT_COUNTRY)]
    pub country: String,

    /// Shop timezone offset from UTC, e.g. `+2` or `-5`.
    #[arg(
        long,
        env = "EGATEWAY_MERCH_GMT",
        default_value = config::DEFAULT_MERCH_GMT,
        allow_hyphen_values = true
    )]
    pub merch_gmt: String,

    #[arg(long, env = "EGATEWAY_MERCH_NAME")]
    pub merch_name: Option<String>,

    #[arg(long, env = "EGATEWAY_MERCH_URL")]
    pub merch_url: Option<String>,

    #[arg(long, env = "EGATEWAY_MERCH_ADDRESS")]
    pub merch_address: Option<String>,

    /// Return URL for the cardholder after the payment form.
    #[arg(long, env = "EGATEWAY_BACKREF", default_value = "")]
    pub back_ref: String,
}

/// Arguments for `sign authorization`.
#[derive(Args, Debug)]
pub struct AuthorizationArgs {
    #[command(flatten)]
    pub merchant: MerchantArgs,

    /// Amount, `.` or `,` as decimal separator.
    #[arg(long)]
    pub amount: String,

    #[arg(long)]
    pub order: String,

    /// Order description; defaults to `Order <order> payment`.
    #[arg(long, default_value = "")]
    pub description: String,

    /// Cardholder e-mail.
    #[arg(long)]
    pub email: String,
}

/// Arguments for `sign completion` and `sign reversal`.
#[derive(Args, Debug)]
pub struct FollowUpArgs {
    #[arg(long, env = "EGATEWAY_TERMINAL")]
    pub terminal: String,

    #[arg(long, env = "EGATEWAY_CURRENCY", default_value = config::DEFAULT_CURRENCY)]
    pub currency: String,

    #[arg(long)]
    pub amount: String,

    #[arg(long)]
    pub order: String,

    /// Retrieval reference number from the authorization response.
    #[arg(long)]
    pub rrn: String,

    /// Internal reference from the authorization response.
    #[arg(long)]
    pub int_ref: String,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub security: SecurityArgs,

    /// JSON file with the response fields, or `-` for stdin.
    #[arg(long, short = 'i', default_value = "-")]
    pub input: String,
}

//! `attestify verify` command — Check reported data against an issued challenge.
//!
//! A failed binding is an expected outcome: it prints `"verified": false`
//! with the reason and exits with status 1. Malformed input is an error.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use attestify_core::Result;
use attestify_runtime::{BindingMode, BindingVerifier};

#[derive(Args)]
pub struct VerifyArgs {
    #[command(subcommand)]
    pub mode: VerifyMode,
}

#[derive(Subcommand)]
pub enum VerifyMode {
    /// Direct equality between challenge and reported data (no TLS binding)
    Plain {
        /// Challenge issued by the relying party
        #[arg(long)]
        challenge: String,
        /// Data reported by the attester
        #[arg(long)]
        report_data: String,
    },
    /// Report data bound to the attester's TLS certificate fingerprint
    Tls {
        /// Base64 challenge issued by the relying party
        #[arg(long)]
        challenge: String,
        /// Fingerprint claimed by the attester
        #[arg(long)]
        fingerprint: String,
        /// Base64 64-byte report data from the quote
        #[arg(long)]
        report_data: String,
        /// PEM certificate to check against the fingerprint
        #[arg(long)]
        certificate: Option<PathBuf>,
    },
}

/// JSON output for the verify command.
#[derive(Debug, serde::Serialize)]
struct VerifyOutput {
    verified: bool,
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

pub fn execute(args: VerifyArgs) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (mode, outcome) = run(&args.mode)?;
    let output = to_output(mode, outcome)?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    if !output.verified {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the selected check. The outer error covers unreadable input files.
fn run(mode: &VerifyMode) -> std::io::Result<(BindingMode, Result<()>)> {
    let verifier = BindingVerifier::new();
    match mode {
        VerifyMode::Plain {
            challenge,
            report_data,
        } => Ok((
            BindingMode::Plain,
            verifier.verify_plain(challenge, report_data),
        )),
        VerifyMode::Tls {
            challenge,
            fingerprint,
            report_data,
            certificate,
        } => {
            let outcome = match certificate {
                Some(path) => {
                    let pem = std::fs::read_to_string(path)?;
                    verifier.verify_certificate_binding(challenge, &pem, fingerprint, report_data)
                }
                None => verifier.verify_tls_bound(challenge, fingerprint, report_data),
            };
            Ok((BindingMode::TlsBound, outcome))
        }
    }
}

/// Rejections become `verified: false`; any other failure is an error.
fn to_output(mode: BindingMode, outcome: Result<()>) -> Result<VerifyOutput> {
    match outcome {
        Ok(()) => Ok(VerifyOutput {
            verified: true,
            mode: mode.to_string(),
            reason: None,
        }),
        Err(e) if e.is_rejection() => {
            tracing::info!(%mode, reason = %e, "Attestation rejected");
            Ok(VerifyOutput {
                verified: false,
                mode: mode.to_string(),
                reason: Some(e.to_string()),
            })
        }
        Err(e) => Err(e),
    }
}

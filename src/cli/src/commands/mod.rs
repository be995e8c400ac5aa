//! CLI command definitions and dispatch.

mod challenge;
mod evidence;
mod fingerprint;
mod init;
mod verify;
mod version;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use attestify_core::IdentityConfig;
use attestify_runtime::tee::{CertStore, FileCertStore, MemoryCertStore};
use attestify_runtime::{is_mock_mode, IdentityProvider};

/// Attestify — bind attestation evidence to a TLS certificate.
#[derive(Parser)]
#[command(name = "attestify", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate and persist the provider identity, print its fingerprint
    Init(init::InitArgs),
    /// Produce challenge-bound evidence as an evidence-provider response
    Evidence(evidence::EvidenceArgs),
    /// Generate a random base64 challenge
    Challenge(challenge::ChallengeArgs),
    /// Re-derive the fingerprint of a PEM certificate
    Fingerprint(fingerprint::FingerprintArgs),
    /// Verify reported data against an issued challenge
    Verify(verify::VerifyArgs),
    /// Show version information
    Version(version::VersionArgs),
}

/// Identity options shared by provider-side commands.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// Directory for cert.pem and key.pem (overrides config and ATTESTIFY_CERT_DIR)
    #[arg(long)]
    pub cert_dir: Option<PathBuf>,

    /// Path to identity configuration JSON file
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

impl IdentityArgs {
    /// Resolve configuration: file (or defaults), then environment, then flags.
    pub fn resolve(&self) -> Result<IdentityConfig, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => IdentityConfig::load(path)?,
            None => IdentityConfig::default(),
        };
        let mut config = config.with_env_overrides();
        if let Some(dir) = &self.cert_dir {
            config.cert_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Build a provider over the configured store. Mock mode keeps the
/// identity in memory only.
pub(crate) fn open_provider(
    args: &IdentityArgs,
) -> Result<IdentityProvider, Box<dyn std::error::Error>> {
    let config = args.resolve()?;
    let store: Arc<dyn CertStore> = if is_mock_mode() {
        tracing::warn!("Mock mode enabled: identity is not persisted");
        Arc::new(MemoryCertStore::new())
    } else {
        Arc::new(FileCertStore::new(&config.cert_dir))
    };
    Ok(IdentityProvider::new(config, store))
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Init(args) => init::execute(args),
        Command::Evidence(args) => evidence::execute(args),
        Command::Challenge(args) => challenge::execute(args),
        Command::Fingerprint(args) => fingerprint::execute(args),
        Command::Verify(args) => verify::execute(args),
        Command::Version(args) => version::execute(args),
    }
}

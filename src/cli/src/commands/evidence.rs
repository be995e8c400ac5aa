//! `attestify evidence` command — Produce challenge-bound TLS evidence.
//!
//! Prints the same JSON envelope the evidence-provider endpoint returns.
//! With `--quote-user-data`, prints instead the base64 64-byte value a
//! TLS-bound quote must carry for a base64 challenge.

use base64::Engine;
use clap::Args;

use attestify_core::{BindingError, EvidenceResponse};
use attestify_runtime::IdentityProvider;

use super::{open_provider, IdentityArgs};

#[derive(Args)]
pub struct EvidenceArgs {
    /// Challenge issued by the relying party
    #[arg(long)]
    pub challenge: String,

    /// Treat the challenge as base64 and print the quote user data instead
    #[arg(long)]
    pub quote_user_data: bool,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

pub fn execute(args: EvidenceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let provider = open_provider(&args.identity)?;

    if args.quote_user_data {
        provider.initialize()?;
        println!("{}", quote_user_data(&provider, &args.challenge)?);
        return Ok(());
    }

    let response = build_response(&provider, &args.challenge);
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize (if needed) and wrap the evidence in the response envelope.
fn build_response(provider: &IdentityProvider, challenge: &str) -> EvidenceResponse {
    let evidence = provider
        .initialize()
        .and_then(|()| provider.generate_evidence(challenge));
    match evidence {
        Ok(data) => EvidenceResponse::success(data),
        Err(e) => {
            tracing::warn!(error = %e, "Evidence generation failed");
            EvidenceResponse::error(e.to_string())
        }
    }
}

/// Base64 TLS-bound user data for a base64 challenge.
fn quote_user_data(
    provider: &IdentityProvider,
    challenge_b64: &str,
) -> Result<String, BindingError> {
    let challenge = base64::engine::general_purpose::STANDARD.decode(challenge_b64)?;
    Ok(provider.quote_user_data(&challenge)?.to_base64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use attestify_core::{IdentityConfig, InitError};
    use attestify_runtime::tee::{CertStore, MemoryCertStore};
    use attestify_runtime::BindingVerifier;

    struct BrokenStore;

    impl CertStore for BrokenStore {
        fn persist(&self, _cert: &str, _key: &str) -> Result<(), InitError> {
            Err(InitError::storage(
                "/app/ssl/cert.pem",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
            ))
        }

        fn load_certificate(&self) -> Result<String, InitError> {
            unreachable!()
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    fn memory_provider() -> IdentityProvider {
        IdentityProvider::new(IdentityConfig::default(), Arc::new(MemoryCertStore::new()))
    }

    #[test]
    fn test_build_response_success() {
        let provider = memory_provider();
        let response = build_response(&provider, "nonce");
        assert!(response.is_success());
        assert!(response.message.is_none());
        assert_eq!(response.data.certificate_fingerprint.len(), 64);
        assert_eq!(response.data.report_data.len(), 64);
    }

    #[test]
    fn test_build_response_error() {
        let provider = IdentityProvider::new(IdentityConfig::default(), Arc::new(BrokenStore));
        let response = build_response(&provider, "nonce");
        assert!(!response.is_success());
        assert!(response
            .message
            .as_deref()
            .unwrap()
            .contains("no such directory"));
    }

    #[test]
    fn test_quote_user_data_verifies() {
        let provider = memory_provider();
        provider.initialize().unwrap();

        let challenge = base64::engine::general_purpose::STANDARD.encode([9u8; 32]);
        let user_data = quote_user_data(&provider, &challenge).unwrap();

        let verifier = BindingVerifier::new();
        assert!(verifier
            .verify_tls_bound(&challenge, provider.fingerprint().unwrap(), &user_data)
            .is_ok());
    }

    #[test]
    fn test_quote_user_data_rejects_bad_base64() {
        let provider = memory_provider();
        provider.initialize().unwrap();
        assert!(matches!(
            quote_user_data(&provider, "***"),
            Err(BindingError::Decoding(_))
        ));
    }
}

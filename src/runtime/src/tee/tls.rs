//! TLS configuration around the provider identity.
//!
//! The provider serves its ephemeral self-signed certificate. A relying
//! party pins the fingerprint it will later check against the quote's
//! report data, so the certificate seen on the wire and the certificate
//! bound into the evidence are the same one.
//!
//! ## Usage
//!
//! ```ignore
//! // Provider side:
//! let server_config = create_server_config(&provider.identity()?)?;
//!
//! // Relying party:
//! let client_config = create_pinned_client_config(&claimed_fingerprint)?;
//! ```

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::{CertificateError, DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};

use attestify_core::{BindingError, Result};

use super::identity::Identity;
use super::report_data::fingerprint_der;

// ============================================================================
// TLS configuration builders
// ============================================================================

/// Create a rustls `ServerConfig` presenting the identity certificate.
pub fn create_server_config(identity: &Identity) -> Result<rustls::ServerConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let cert = identity.certificate_der().clone();
    let key = PrivateKeyDer::Pkcs8(identity.private_key().clone_key());

    rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| BindingError::Certificate(format!("Failed to select TLS versions: {}", e)))?
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .map_err(|e| BindingError::Certificate(format!("Failed to create TLS server config: {}", e)))
}

/// Create a rustls `ClientConfig` that only accepts a server certificate
/// whose SHA-256 fingerprint equals `fingerprint`.
///
/// Handshake signatures are still verified against the pinned certificate's
/// key, so a relay cannot present the certificate without holding the key.
pub fn create_pinned_client_config(fingerprint: &str) -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = PinnedFingerprintVerifier::new(
        fingerprint,
        provider.signature_verification_algorithms,
    );

    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| BindingError::Certificate(format!("Failed to select TLS versions: {}", e)))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    Ok(config)
}

// ============================================================================
// Fingerprint-pinning certificate verifier
// ============================================================================

/// Accepts exactly one end-entity certificate, identified by fingerprint.
#[derive(Debug)]
struct PinnedFingerprintVerifier {
    fingerprint: String,
    algorithms: WebPkiSupportedAlgorithms,
}

impl PinnedFingerprintVerifier {
    fn new(fingerprint: &str, algorithms: WebPkiSupportedAlgorithms) -> Self {
        Self {
            fingerprint: fingerprint.to_ascii_lowercase(),
            algorithms,
        }
    }
}

impl ServerCertVerifier for PinnedFingerprintVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let presented = fingerprint_der(end_entity.as_ref());
        if presented == self.fingerprint {
            tracing::debug!("Server certificate matches pinned fingerprint");
            return Ok(ServerCertVerified::assertion());
        }

        tracing::warn!(
            pinned = %self.fingerprint,
            presented = %presented,
            "Server certificate does not match pinned fingerprint"
        );
        Err(rustls::Error::InvalidCertificate(
            CertificateError::ApplicationVerificationFailure,
        ))
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

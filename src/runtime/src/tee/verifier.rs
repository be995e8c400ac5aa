//! Relying-party side of evidence binding.
//!
//! Reconstructs the report data an honest attester would have produced for
//! a challenge the relying party issued, and compares it to what the
//! attester reported. The verifier holds no state; every call is
//! independent.

use base64::Engine;

use attestify_core::{BindingError, Result, TlsCertificateEvidence};

use super::report_data::{fingerprint_pem, ReportData};

/// Binding mode used to check reported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Direct equality between issued challenge and reported data.
    Plain,
    /// 64-byte `SHA-256(challenge || fingerprint) || challenge[..32]` layout.
    TlsBound,
}

impl std::fmt::Display for BindingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingMode::Plain => write!(f, "plain"),
            BindingMode::TlsBound => write!(f, "tls-bound"),
        }
    }
}

/// Stateless checker for challenge-bound report data.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingVerifier;

impl BindingVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Plain mode: `reported_data` must equal `issued_challenge` exactly.
    ///
    /// This is the weakest mode. It binds nothing to the TLS channel and
    /// offers no relay protection when the challenge has low entropy or
    /// can be observed by a relay. Use it only when the transport already
    /// guarantees channel identity.
    pub fn verify_plain(&self, issued_challenge: &str, reported_data: &str) -> Result<()> {
        if issued_challenge == reported_data {
            tracing::debug!(mode = %BindingMode::Plain, "Challenge binding verified");
            return Ok(());
        }
        tracing::debug!(mode = %BindingMode::Plain, "Challenge binding rejected");
        Err(BindingError::ChallengeMismatch)
    }

    /// The report data an attester holding `claimed_fingerprint` must have
    /// embedded for `issued_challenge_b64`.
    ///
    /// Fails with [`BindingError::Decoding`] before any digest is computed
    /// when the challenge is not standard base64.
    pub fn expected_report_data(
        &self,
        issued_challenge_b64: &str,
        claimed_fingerprint: &str,
    ) -> Result<ReportData> {
        let challenge = base64::engine::general_purpose::STANDARD.decode(issued_challenge_b64)?;
        let expected = ReportData::bind(&challenge, claimed_fingerprint);
        if expected.is_short_challenge() {
            tracing::warn!(
                challenge_len = challenge.len(),
                "Challenge shorter than 32 bytes; report data carries a partial challenge"
            );
        }
        Ok(expected)
    }

    /// TLS-bound mode: `reported_data_b64` must equal the base64 encoding
    /// of [`ReportData::bind`] over the decoded challenge, byte for byte.
    pub fn verify_tls_bound(
        &self,
        issued_challenge_b64: &str,
        claimed_fingerprint: &str,
        reported_data_b64: &str,
    ) -> Result<()> {
        let expected = self.expected_report_data(issued_challenge_b64, claimed_fingerprint)?;
        compare_report_data(&expected, reported_data_b64)
    }

    /// Check that `certificate_pem` hashes to `claimed_fingerprint`.
    pub fn verify_certificate(&self, certificate_pem: &str, claimed_fingerprint: &str) -> Result<()> {
        let actual = fingerprint_pem(certificate_pem)?;
        if actual == claimed_fingerprint {
            return Ok(());
        }
        Err(BindingError::CertificateMismatch {
            claimed: claimed_fingerprint.to_string(),
            actual,
        })
    }

    /// TLS-bound check plus a certificate that must hash to
    /// `claimed_fingerprint`.
    ///
    /// The challenge is decoded first, so malformed input is reported as
    /// [`BindingError::Decoding`] rather than as a rejection.
    pub fn verify_certificate_binding(
        &self,
        issued_challenge_b64: &str,
        certificate_pem: &str,
        claimed_fingerprint: &str,
        reported_data_b64: &str,
    ) -> Result<()> {
        let expected = self.expected_report_data(issued_challenge_b64, claimed_fingerprint)?;
        self.verify_certificate(certificate_pem, claimed_fingerprint)?;
        compare_report_data(&expected, reported_data_b64)
    }

    /// Full check of provider evidence: the certificate must match its
    /// advertised fingerprint, and the reported quote data must bind the
    /// issued challenge to that fingerprint.
    pub fn verify_evidence(
        &self,
        issued_challenge_b64: &str,
        evidence: &TlsCertificateEvidence,
        reported_data_b64: &str,
    ) -> Result<()> {
        self.verify_certificate_binding(
            issued_challenge_b64,
            &evidence.certificate_pem,
            &evidence.certificate_fingerprint,
            reported_data_b64,
        )
    }
}

/// Exact comparison of the base64 encodings, no normalization.
fn compare_report_data(expected: &ReportData, reported_data_b64: &str) -> Result<()> {
    if expected.to_base64() == reported_data_b64 {
        tracing::debug!(mode = %BindingMode::TlsBound, "Challenge binding verified");
        return Ok(());
    }
    tracing::debug!(mode = %BindingMode::TlsBound, "Challenge binding rejected");
    Err(BindingError::BindingVerification)
}

//! Report-data byte layout shared by the provider and verifier.
//!
//! Both halves of the protocol must produce identical bytes, so the digest
//! input order and encodings live here and nowhere else.
//!
//! ## Provider form
//!
//! `hex(SHA-256(challenge || fingerprint))`, where `fingerprint` is the hex
//! text of the certificate digest taken as ASCII bytes.
//!
//! ## Verifier form (64 bytes, base64 on the wire)
//!
//! | Offset | Length | Content |
//! |--------|--------|---------|
//! | 0x00   | 32     | `SHA-256(challenge || fingerprint)` |
//! | 0x20   | 32     | first 32 bytes of the challenge |
//!
//! A challenge shorter than 32 bytes is copied as-is; the bytes after it
//! keep their initial zero value. Deployed verifiers depend on this exact
//! layout.

use attestify_core::{BindingError, Result};
use base64::Engine;
use sha2::{Digest, Sha256};

/// Size of the report-data field.
pub const REPORT_DATA_SIZE: usize = 64;

/// Offset of the binding digest.
pub const DIGEST_OFFSET: usize = 0;

/// Length of the binding digest (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Offset of the challenge prefix.
pub const CHALLENGE_OFFSET: usize = DIGEST_OFFSET + DIGEST_LEN;

/// Maximum number of challenge bytes embedded after the digest.
pub const CHALLENGE_LEN: usize = REPORT_DATA_SIZE - CHALLENGE_OFFSET;

/// Length of a hex-encoded SHA-256 fingerprint.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Hex SHA-256 fingerprint of a DER-encoded certificate.
pub fn fingerprint_der(cert_der: &[u8]) -> String {
    hex::encode(Sha256::digest(cert_der))
}

/// Re-derive the fingerprint of a PEM-encoded certificate.
///
/// The digest is taken over the DER bytes carried in the PEM block, after
/// checking they parse as an X.509 certificate.
pub fn fingerprint_pem(cert_pem: &str) -> Result<String> {
    use der::Decode;
    use x509_cert::Certificate;

    let (label, der) = der::pem::decode_vec(cert_pem.trim().as_bytes())
        .map_err(|e| BindingError::Certificate(format!("Invalid PEM: {}", e)))?;
    if label != "CERTIFICATE" {
        return Err(BindingError::Certificate(format!(
            "Expected CERTIFICATE PEM block, got {}",
            label
        )));
    }
    Certificate::from_der(&der)
        .map_err(|e| BindingError::Certificate(format!("Invalid X.509 certificate: {}", e)))?;

    Ok(fingerprint_der(&der))
}

/// `SHA-256(challenge || fingerprint)` with the fingerprint taken as ASCII.
pub fn binding_digest(challenge: &[u8], fingerprint: &str) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(challenge);
    hasher.update(fingerprint.as_bytes());
    hasher.finalize().into()
}

/// Hex report data returned by the evidence provider.
pub fn provider_report_data(challenge: &[u8], fingerprint: &str) -> String {
    hex::encode(binding_digest(challenge, fingerprint))
}

/// Fixed 64-byte report-data buffer in the TLS-bound layout.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReportData {
    bytes: [u8; REPORT_DATA_SIZE],
    /// Number of challenge bytes written at `CHALLENGE_OFFSET`.
    challenge_len: usize,
}

impl ReportData {
    /// Build the layout for `challenge` bound to `fingerprint`.
    pub fn bind(challenge: &[u8], fingerprint: &str) -> Self {
        let digest = binding_digest(challenge, fingerprint);
        let mut bytes = [0u8; REPORT_DATA_SIZE];
        bytes[DIGEST_OFFSET..DIGEST_OFFSET + DIGEST_LEN].copy_from_slice(&digest);

        let challenge_len = challenge.len().min(CHALLENGE_LEN);
        bytes[CHALLENGE_OFFSET..CHALLENGE_OFFSET + challenge_len]
            .copy_from_slice(&challenge[..challenge_len]);

        Self {
            bytes,
            challenge_len,
        }
    }

    /// The binding digest (bytes `0..32`).
    pub fn digest(&self) -> &[u8] {
        &self.bytes[DIGEST_OFFSET..DIGEST_OFFSET + DIGEST_LEN]
    }

    /// Exactly the challenge bytes that were embedded, never padding.
    pub fn challenge_prefix(&self) -> &[u8] {
        &self.bytes[CHALLENGE_OFFSET..CHALLENGE_OFFSET + self.challenge_len]
    }

    /// Whether the challenge filled the whole second half.
    pub fn is_short_challenge(&self) -> bool {
        self.challenge_len < CHALLENGE_LEN
    }

    /// The full 64-byte buffer.
    pub fn as_bytes(&self) -> &[u8; REPORT_DATA_SIZE] {
        &self.bytes
    }

    /// Standard base64 (padded) encoding of the full buffer.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.bytes)
    }
}

impl std::fmt::Debug for ReportData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportData")
            .field("digest", &hex::encode(self.digest()))
            .field("challenge_prefix", &hex::encode(self.challenge_prefix()))
            .finish()
    }
}

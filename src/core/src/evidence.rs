//! Wire types for the evidence-provider endpoint.
//!
//! A relying party posts an [`EvidenceRequest`] carrying its challenge and
//! receives an [`EvidenceResponse`] whose `data` binds that challenge to the
//! provider's TLS certificate fingerprint.

use serde::{Deserialize, Serialize};

/// Status string of a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// Status string of a failed response.
pub const STATUS_ERROR: &str = "error";

/// Evidence request from a relying party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRequest {
    /// Caller-opaque challenge, used as raw bytes.
    pub challenge: String,
}

/// TLS certificate evidence bound to a challenge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsCertificateEvidence {
    /// Hex SHA-256 of the DER-encoded certificate.
    #[serde(rename = "certificateFingerprint")]
    pub certificate_fingerprint: String,
    /// PEM-encoded certificate. Never contains key material.
    #[serde(rename = "certificatePem")]
    pub certificate_pem: String,
    /// Hex SHA-256 of `challenge || fingerprint`.
    #[serde(rename = "reportData")]
    pub report_data: String,
}

/// Response envelope returned by the evidence-provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceResponse {
    pub status: String,
    pub data: TlsCertificateEvidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EvidenceResponse {
    pub fn success(data: TlsCertificateEvidence) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            data: TlsCertificateEvidence::default(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

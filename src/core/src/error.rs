use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Evidence binding error types
#[derive(Error, Debug)]
pub enum BindingError {
    /// Identity generation or persistence failed
    #[error("Identity initialization failed: {0}")]
    Initialization(#[from] InitError),

    /// Fingerprint or evidence requested before the identity is ready
    #[error("TLS certificate not initialized")]
    NotInitialized,

    /// Issued challenge is not valid base64
    #[error("Failed to decode challenge: {0}")]
    Decoding(#[from] base64::DecodeError),

    /// Plain-mode verification failed
    #[error(
        "Challenge mismatch: the reportData field does not match the challenge issued by the relying party"
    )]
    ChallengeMismatch,

    /// TLS-bound verification failed
    #[error("TLS binding verification failed: reportData does not match SHA256(challenge || tlsFingerprint)")]
    BindingVerification,

    /// Presented certificate does not hash to the claimed fingerprint
    #[error("Certificate mismatch: claimed fingerprint {claimed}, certificate hashes to {actual}")]
    CertificateMismatch { claimed: String, actual: String },

    /// Certificate could not be parsed or encoded
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BindingError {
    /// Whether this is a clean verification failure ("attestation rejected")
    /// rather than a system or input fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BindingError::ChallengeMismatch
                | BindingError::BindingVerification
                | BindingError::CertificateMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for BindingError {
    fn from(err: serde_json::Error) -> Self {
        BindingError::Serialization(err.to_string())
    }
}

/// Underlying cause of a failed identity initialization.
///
/// Cloneable so that every caller blocked on the same initialization
/// attempt observes the same cause.
#[derive(Error, Debug, Clone)]
pub enum InitError {
    /// Key pair generation failed
    #[error("failed to generate private key: {0}")]
    KeyGeneration(String),

    /// Certificate construction or self-signing failed
    #[error("failed to create certificate: {0}")]
    Certificate(String),

    /// Writing or reading back the certificate store failed
    #[error("certificate store I/O failed at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Persisted certificate does not reproduce the generated fingerprint
    #[error("persisted certificate fingerprint {persisted} does not match generated {generated}")]
    FingerprintMismatch {
        generated: String,
        persisted: String,
    },
}

impl InitError {
    /// Wrap an I/O failure against `path`.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InitError::Storage {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// Result type alias for evidence binding operations
pub type Result<T> = std::result::Result<T, BindingError>;

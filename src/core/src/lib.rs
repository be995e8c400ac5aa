//! Attestify Core - Foundational Types
//!
//! Error taxonomy, identity configuration, and the wire types shared by
//! the evidence-provider and evidence-verifier halves of TLS evidence
//! binding.

pub mod config;
pub mod error;
pub mod evidence;

// Re-export commonly used types
pub use config::IdentityConfig;
pub use error::{BindingError, InitError, Result};
pub use evidence::{EvidenceRequest, EvidenceResponse, TlsCertificateEvidence};

/// Attestify version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

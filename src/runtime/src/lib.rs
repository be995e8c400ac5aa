//! Attestify Runtime - TLS evidence binding.
//!
//! Provider-side identity generation and evidence, relying-party binding
//! verification, and the TLS plumbing that ties the two to one certificate.

pub mod tee;

// Re-export common types
pub use tee::{BindingMode, BindingVerifier, Identity, IdentityProvider, ReportData};
pub use tee::{CertStore, FileCertStore, MemoryCertStore};
pub use tee::{create_pinned_client_config, create_server_config, is_mock_mode};

/// Attestify Runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

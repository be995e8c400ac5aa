//! TLS evidence binding.
//!
//! Binds a relying party's challenge to the TLS certificate of the process
//! producing attestation evidence, so the quote cannot be relayed through a
//! different TLS endpoint.
//!
//! - `report_data`: Byte layout and digest helpers shared by both sides.
//! - `identity`: Provider-side ephemeral identity and evidence generation.
//! - `store`: Certificate and key persistence.
//! - `verifier`: Relying-party checks (plain and TLS-bound).
//! - `tls`: rustls configuration serving and pinning the identity.
//! - `mock`: Environment-driven mock mode flag.

pub mod identity;
pub mod mock;
pub mod report_data;
pub mod store;
pub mod tls;
pub mod verifier;

pub use identity::{generate_identity, Identity, IdentityProvider};
pub use mock::{is_mock_mode, MOCK_MODE_ENV};
pub use report_data::{
    binding_digest, fingerprint_der, fingerprint_pem, provider_report_data, ReportData,
    REPORT_DATA_SIZE,
};
pub use store::{CertStore, FileCertStore, MemoryCertStore};
pub use tls::{create_pinned_client_config, create_server_config};
pub use verifier::{BindingMode, BindingVerifier};

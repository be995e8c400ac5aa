//! Ephemeral TLS identity of the evidence provider.
//!
//! One [`IdentityProvider`] owns exactly one self-signed ECDSA P-256
//! certificate for its lifetime. Initialization runs once across all
//! concurrent callers:
//!
//! ```text
//! Uninitialized ──▶ Initializing ──▶ Ready
//!                        │
//!                        └─────────▶ Failed   (terminal; restart to retry)
//! ```
//!
//! Callers arriving while another thread is `Initializing` block until it
//! reaches `Ready` or `Failed`. Once ready, the identity is immutable and
//! read without locking.

use std::sync::{Arc, OnceLock};

use parking_lot::{Condvar, Mutex};
use rustls_pki_types::{CertificateDer, PrivatePkcs8KeyDer};

use attestify_core::{BindingError, IdentityConfig, InitError, Result, TlsCertificateEvidence};

use super::report_data::{fingerprint_der, fingerprint_pem, provider_report_data, ReportData};
use super::store::CertStore;

/// Number of fingerprint characters shown in logs.
const LOG_FINGERPRINT_PREFIX: usize = 16;

// ============================================================================
// Identity
// ============================================================================

/// Generated key pair, certificate, and cached fingerprint.
pub struct Identity {
    fingerprint: String,
    certificate_pem: String,
    certificate_der: CertificateDer<'static>,
    private_key: PrivatePkcs8KeyDer<'static>,
    not_after: time::OffsetDateTime,
}

impl Identity {
    /// Hex SHA-256 of the DER-encoded certificate.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    pub fn certificate_der(&self) -> &CertificateDer<'static> {
        &self.certificate_der
    }

    /// PKCS#8 private key, for building a TLS server configuration.
    pub fn private_key(&self) -> &PrivatePkcs8KeyDer<'static> {
        &self.private_key
    }

    pub fn not_after(&self) -> time::OffsetDateTime {
        self.not_after
    }

    /// Evidence binding `challenge` to this certificate.
    pub fn evidence(&self, challenge: &str) -> TlsCertificateEvidence {
        TlsCertificateEvidence {
            certificate_fingerprint: self.fingerprint.clone(),
            certificate_pem: self.certificate_pem.clone(),
            report_data: provider_report_data(challenge.as_bytes(), &self.fingerprint),
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("fingerprint", &self.fingerprint)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh key pair and self-signed certificate.
///
/// Returns the identity and the PEM-encoded private key for persistence.
pub fn generate_identity(
    config: &IdentityConfig,
) -> std::result::Result<(Identity, String), InitError> {
    use rcgen::{
        CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
        KeyUsagePurpose, SerialNumber, PKCS_ECDSA_P256_SHA256,
    };

    config
        .validate()
        .map_err(|e| InitError::Certificate(e.to_string()))?;

    let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)
        .map_err(|e| InitError::KeyGeneration(e.to_string()))?;

    let mut params = CertificateParams::new(config.dns_names.clone())
        .map_err(|e| InitError::Certificate(format!("invalid subject alt name: {}", e)))?;

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, config.common_name.as_str());
    dn.push(DnType::OrganizationName, config.organization.as_str());
    params.distinguished_name = dn;

    params.serial_number = Some(SerialNumber::from_slice(&random_serial()));

    let not_before = time::OffsetDateTime::now_utc();
    let not_after = not_before
        .checked_add(time::Duration::days(i64::from(config.validity_days)))
        .ok_or_else(|| {
            InitError::Certificate(format!(
                "validity of {} days is out of range",
                config.validity_days
            ))
        })?;
    params.not_before = not_before;
    params.not_after = not_after;

    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params.is_ca = IsCa::ExplicitNoCa;

    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| InitError::Certificate(e.to_string()))?;

    let certificate_der = cert.der().clone();
    let identity = Identity {
        fingerprint: fingerprint_der(certificate_der.as_ref()),
        certificate_pem: cert.pem(),
        certificate_der,
        private_key: PrivatePkcs8KeyDer::from(key_pair.serialize_der()),
        not_after,
    };

    Ok((identity, key_pair.serialize_pem()))
}

/// Random positive 128-bit serial number.
fn random_serial() -> [u8; 16] {
    use rand::RngCore;

    let mut serial = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut serial);
    serial[0] &= 0x7F;
    serial[0] |= 0x01;
    serial
}

// ============================================================================
// Provider
// ============================================================================

/// Initialization state, guarded by the provider's mutex.
#[derive(Debug)]
enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(InitError),
}

/// Owns the process-lifetime identity and produces challenge-bound evidence.
pub struct IdentityProvider {
    config: IdentityConfig,
    store: Arc<dyn CertStore>,
    state: Mutex<InitState>,
    finished: Condvar,
    identity: OnceLock<Arc<Identity>>,
}

impl IdentityProvider {
    pub fn new(config: IdentityConfig, store: Arc<dyn CertStore>) -> Self {
        Self {
            config,
            store,
            state: Mutex::new(InitState::Uninitialized),
            finished: Condvar::new(),
            identity: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Generate, persist, and cache the identity. Idempotent.
    ///
    /// The first caller does the work; concurrent callers block until it
    /// finishes and observe the same outcome. A failure is terminal for
    /// this provider: later calls return the same cause without retrying.
    pub fn initialize(&self) -> Result<()> {
        if self.identity.get().is_some() {
            return Ok(());
        }

        let mut state = self.state.lock();
        while matches!(*state, InitState::Initializing) {
            self.finished.wait(&mut state);
        }
        match &*state {
            InitState::Ready => return Ok(()),
            InitState::Failed(cause) => return Err(cause.clone().into()),
            InitState::Uninitialized | InitState::Initializing => {}
        }
        *state = InitState::Initializing;
        drop(state);

        let guard = UnwindGuard { provider: self };
        let outcome = self.build();
        std::mem::forget(guard);

        let mut state = self.state.lock();
        let result = match outcome {
            Ok(identity) => {
                let _ = self.identity.set(Arc::new(identity));
                *state = InitState::Ready;
                Ok(())
            }
            Err(cause) => {
                tracing::error!(error = %cause, "TLS certificate generation failed");
                *state = InitState::Failed(cause.clone());
                Err(cause.into())
            }
        };
        self.finished.notify_all();
        result
    }

    /// Generate the identity, persist it, and confirm the read-back
    /// certificate reproduces the fingerprint.
    fn build(&self) -> std::result::Result<Identity, InitError> {
        let (identity, key_pem) = generate_identity(&self.config)?;

        self.store.persist(identity.certificate_pem(), &key_pem)?;

        let persisted_pem = self.store.load_certificate()?;
        let persisted = fingerprint_pem(&persisted_pem)
            .map_err(|e| InitError::Certificate(e.to_string()))?;
        if persisted != identity.fingerprint() {
            return Err(InitError::FingerprintMismatch {
                generated: identity.fingerprint().to_string(),
                persisted,
            });
        }

        tracing::info!(
            fingerprint = %format!("{}...", &identity.fingerprint()[..LOG_FINGERPRINT_PREFIX]),
            store = %self.store.describe(),
            not_after = %identity.not_after(),
            "TLS certificate generated"
        );

        Ok(identity)
    }

    /// Whether initialization has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.identity.get().is_some()
    }

    /// The cached identity.
    pub fn identity(&self) -> Result<Arc<Identity>> {
        self.identity
            .get()
            .cloned()
            .ok_or(BindingError::NotInitialized)
    }

    /// The cached certificate fingerprint.
    pub fn fingerprint(&self) -> Result<&str> {
        self.identity
            .get()
            .map(|identity| identity.fingerprint())
            .ok_or(BindingError::NotInitialized)
    }

    /// The cached PEM certificate.
    pub fn certificate_pem(&self) -> Result<&str> {
        self.identity
            .get()
            .map(|identity| identity.certificate_pem())
            .ok_or(BindingError::NotInitialized)
    }

    /// Bind `challenge` to the certificate fingerprint.
    ///
    /// `reportData = hex(SHA-256(challenge || fingerprint))`, with both
    /// operands taken as raw bytes.
    pub fn generate_evidence(&self, challenge: &str) -> Result<TlsCertificateEvidence> {
        let identity = self.identity.get().ok_or(BindingError::NotInitialized)?;
        Ok(identity.evidence(challenge))
    }

    /// 64-byte user data for a TLS-bound quote over `challenge`.
    pub fn quote_user_data(&self, challenge: &[u8]) -> Result<ReportData> {
        let fingerprint = self.fingerprint()?;
        Ok(ReportData::bind(challenge, fingerprint))
    }
}

/// Moves the provider to `Failed` and wakes waiters if `build` unwinds,
/// so no caller is left blocked on `Initializing`.
struct UnwindGuard<'a> {
    provider: &'a IdentityProvider,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        let cause = InitError::Certificate("identity generation panicked".to_string());
        tracing::error!(error = %cause, "TLS certificate generation failed");
        *self.provider.state.lock() = InitState::Failed(cause);
        self.provider.finished.notify_all();
    }
}

impl std::fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("store", &self.store.describe())
            .field("ready", &self.is_ready())
            .finish()
    }
}

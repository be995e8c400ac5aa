//! Certificate and key persistence.
//!
//! The identity provider writes its certificate and private key once, at
//! initialization, then reads the certificate back to confirm the
//! persisted bytes reproduce the fingerprint it advertises. Nothing is
//! read on the request path.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use attestify_core::InitError;

/// Storage for the provider's certificate and private key.
pub trait CertStore: Send + Sync {
    /// Durably write the PEM-encoded certificate and private key.
    fn persist(&self, cert_pem: &str, key_pem: &str) -> std::result::Result<(), InitError>;

    /// Read the persisted PEM certificate back.
    fn load_certificate(&self) -> std::result::Result<String, InitError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

// ============================================================================
// File store
// ============================================================================

/// Writes `cert.pem` (world-readable) and `key.pem` (owner-only) into a directory.
#[derive(Debug, Clone)]
pub struct FileCertStore {
    dir: PathBuf,
}

impl FileCertStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cert_path(&self) -> PathBuf {
        self.dir.join("cert.pem")
    }

    pub fn key_path(&self) -> PathBuf {
        self.dir.join("key.pem")
    }
}

impl CertStore for FileCertStore {
    fn persist(&self, cert_pem: &str, key_pem: &str) -> std::result::Result<(), InitError> {
        fs::create_dir_all(&self.dir).map_err(|e| InitError::storage(&self.dir, e))?;

        let cert_path = self.cert_path();
        write_with_mode(&cert_path, cert_pem.as_bytes(), 0o644)
            .map_err(|e| InitError::storage(&cert_path, e))?;

        let key_path = self.key_path();
        write_with_mode(&key_path, key_pem.as_bytes(), 0o600)
            .map_err(|e| InitError::storage(&key_path, e))?;

        Ok(())
    }

    fn load_certificate(&self) -> std::result::Result<String, InitError> {
        let cert_path = self.cert_path();
        fs::read_to_string(&cert_path).map_err(|e| InitError::storage(&cert_path, e))
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Write `data` to `path` with `mode`.
///
/// The bytes go to a fresh sibling file created with `mode` and are then
/// renamed over `path`, so an existing file's looser mode never applies
/// to the new contents.
fn write_with_mode(path: &Path, data: &[u8], mode: u32) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    match fs::remove_file(&tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let written = options.open(&tmp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()?;

        // The process umask may have cleared bits from `mode`
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(mode))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    });

    match written.and_then(|()| fs::rename(&tmp_path, path)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store for mock mode and tests. Counts persist calls.
#[derive(Debug, Default)]
pub struct MemoryCertStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    cert_pem: Option<String>,
    key_pem: Option<String>,
    persists: usize,
}

impl MemoryCertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `persist` has been called.
    pub fn persist_count(&self) -> usize {
        self.inner.lock().persists
    }

    /// Whether a private key has been stored.
    pub fn has_key(&self) -> bool {
        self.inner.lock().key_pem.is_some()
    }
}

impl CertStore for MemoryCertStore {
    fn persist(&self, cert_pem: &str, key_pem: &str) -> std::result::Result<(), InitError> {
        let mut state = self.inner.lock();
        state.cert_pem = Some(cert_pem.to_string());
        state.key_pem = Some(key_pem.to_string());
        state.persists += 1;
        Ok(())
    }

    fn load_certificate(&self) -> std::result::Result<String, InitError> {
        self.inner.lock().cert_pem.clone().ok_or_else(|| {
            InitError::storage(
                "memory://cert.pem",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no certificate stored"),
            )
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

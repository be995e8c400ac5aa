use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BindingError, Result};

/// Environment variable overriding the certificate directory.
pub const CERT_DIR_ENV: &str = "ATTESTIFY_CERT_DIR";

/// Default directory for the persisted certificate and key.
pub const DEFAULT_CERT_DIR: &str = "/app/ssl";

/// Longest accepted certificate validity (100 years).
pub const MAX_VALIDITY_DAYS: u32 = 36_500;

/// Ephemeral identity configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Directory receiving `cert.pem` and `key.pem`
    pub cert_dir: PathBuf,

    /// Subject common name
    pub common_name: String,

    /// Subject organization
    pub organization: String,

    /// Subject alternative DNS names
    pub dns_names: Vec<String>,

    /// Certificate validity window, counted from generation
    pub validity_days: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            cert_dir: PathBuf::from(DEFAULT_CERT_DIR),
            common_name: "localhost".to_string(),
            organization: "Evidence Provider".to_string(),
            dns_names: vec!["localhost".to_string(), "evidence-provider".to_string()],
            validity_days: 365,
        }
    }
}

impl IdentityConfig {
    /// Defaults with `ATTESTIFY_CERT_DIR` applied when set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            BindingError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(CERT_DIR_ENV) {
            if !dir.trim().is_empty() {
                tracing::debug!(cert_dir = %dir, "Using certificate directory from environment");
                self.cert_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Reject configurations that cannot produce a usable certificate.
    pub fn validate(&self) -> Result<()> {
        if self.common_name.trim().is_empty() {
            return Err(BindingError::Config(
                "common_name must not be empty".to_string(),
            ));
        }
        if self.dns_names.is_empty() {
            return Err(BindingError::Config(
                "dns_names must contain at least one name".to_string(),
            ));
        }
        if self.validity_days == 0 {
            return Err(BindingError::Config(
                "validity_days must be greater than zero".to_string(),
            ));
        }
        if self.validity_days > MAX_VALIDITY_DAYS {
            return Err(BindingError::Config(format!(
                "validity_days must be at most {}, got {}",
                MAX_VALIDITY_DAYS, self.validity_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = IdentityConfig::default();
        assert_eq!(config.cert_dir, PathBuf::from("/app/ssl"));
        assert_eq!(config.common_name, "localhost");
        assert_eq!(config.organization, "Evidence Provider");
        assert_eq!(config.dns_names, vec!["localhost", "evidence-provider"]);
        assert_eq!(config.validity_days, 365);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_common_name() {
        let config = IdentityConfig {
            common_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BindingError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_validity() {
        let config = IdentityConfig {
            validity_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_validity_upper_bound() {
        let at_limit = IdentityConfig {
            validity_days: MAX_VALIDITY_DAYS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_long = IdentityConfig {
            validity_days: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(too_long.validate(), Err(BindingError::Config(_))));
    }

    #[test]
    fn test_load_rejects_huge_validity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, r#"{"validity_days": 4294967295}"#).unwrap();
        assert!(matches!(
            IdentityConfig::load(&path),
            Err(BindingError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_no_dns_names() {
        let config = IdentityConfig {
            dns_names: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, r#"{"common_name": "attester.internal", "validity_days": 30}"#)
            .unwrap();

        let config = IdentityConfig::load(&path).unwrap();
        assert_eq!(config.common_name, "attester.internal");
        assert_eq!(config.validity_days, 30);
        assert_eq!(config.organization, "Evidence Provider");
    }

    #[test]
    fn test_load_missing_file() {
        let result = IdentityConfig::load(Path::new("/nonexistent/identity.json"));
        assert!(matches!(result, Err(BindingError::Config(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            IdentityConfig::load(&path),
            Err(BindingError::Serialization(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var(CERT_DIR_ENV, "/var/lib/attestify");
        let config = IdentityConfig::from_env();
        std::env::remove_var(CERT_DIR_ENV);
        assert_eq!(config.cert_dir, PathBuf::from("/var/lib/attestify"));
    }

    #[test]
    #[serial]
    fn test_env_override_ignores_blank() {
        std::env::set_var(CERT_DIR_ENV, " ");
        let config = IdentityConfig::from_env();
        std::env::remove_var(CERT_DIR_ENV);
        assert_eq!(config.cert_dir, PathBuf::from(DEFAULT_CERT_DIR));
    }
}

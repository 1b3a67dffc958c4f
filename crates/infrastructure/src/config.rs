//! Application configuration
//!
//! Layered from built-in defaults, an optional `casascout.toml` and
//! `CASASCOUT_*` environment variables, e.g.
//! `CASASCOUT_IDEALISTA__PAGE_SIZE=20`.

use std::path::{Path, PathBuf};

use integration_fotocasa::FotocasaConfig;
use integration_idealista::IdealistaConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InfrastructureError;

/// Base name of the optional configuration file
pub const CONFIG_FILE_NAME: &str = "casascout";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "CASASCOUT";

/// Where tokens and saved results live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fotocasa: FotocasaConfig,

    #[serde(default)]
    pub idealista: IdealistaConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from `casascout.toml` (if present) and environment
    pub fn load() -> Result<Self, InfrastructureError> {
        Self::load_from(None)
    }

    /// Load configuration, reading the given file instead of `casascout.toml`
    ///
    /// An explicit file must exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self, InfrastructureError> {
        Self::load_with_env(path, None)
    }

    /// Environment values stay strings until deserialized so digit-only
    /// values such as a device identity keep their leading zeros.
    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, InfrastructureError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE_NAME).required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate both client configurations
    pub fn validate(&self) -> Result<(), InfrastructureError> {
        self.fotocasa
            .validate()
            .map_err(|e| InfrastructureError::Invalid(format!("fotocasa: {e}")))?;
        self.idealista
            .validate()
            .map_err(|e| InfrastructureError::Invalid(format!("idealista: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use integration_fotocasa::{FotocasaEnvironment, OfferType};
    use integration_idealista::Operation;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("."));
        assert_eq!(config.fotocasa.environment, FotocasaEnvironment::Pro);
        assert_eq!(config.idealista.operation, Operation::Rent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("casascout.toml");
        std::fs::write(
            &path,
            r#"
[fotocasa]
environment = "PRE"
offer_type = "buy"
page_size = 50

[idealista]
operation = "sale"
locale = "es"

[storage]
data_dir = "/var/lib/casascout"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.fotocasa.environment, FotocasaEnvironment::Pre);
        assert_eq!(config.fotocasa.offer_type, OfferType::Buy);
        assert_eq!(config.fotocasa.page_size, 50);
        assert_eq!(config.idealista.operation, Operation::Sale);
        assert_eq!(config.idealista.locale, "es");
        assert_eq!(config.idealista.page_size, 50);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/casascout"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("casascout.toml");
        std::fs::write(&path, "[idealista]\npage_size = 0\n").unwrap();

        let err = AppConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, InfrastructureError::Invalid(_)));
        assert!(err.to_string().contains("idealista"));
    }

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_device_identity_keeps_leading_zero() {
        let config = AppConfig::load_with_env(
            None,
            env(&[("CASASCOUT_FOTOCASA__DEVICE_IDENTITY", "014902020000007")]),
        )
        .unwrap();
        let identity = config.fotocasa.device_identity.unwrap();
        assert_eq!(identity.to_string(), "014902020000007");
        assert_eq!(identity.reporting_body_id(), "01");
    }

    #[test]
    fn test_env_numbers_still_parse() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("CASASCOUT_IDEALISTA__PAGE_SIZE", "20"),
                ("CASASCOUT_FOTOCASA__PAGE_SIZE", "25"),
            ]),
        )
        .unwrap();
        assert_eq!(config.idealista.page_size, 20);
        assert_eq!(config.fotocasa.page_size, 25);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("casascout.toml");
        std::fs::write(&path, "[idealista]\nlocale = \"es\"\n").unwrap();

        let config = AppConfig::load_with_env(
            Some(&path),
            env(&[("CASASCOUT_IDEALISTA__LOCALE", "en")]),
        )
        .unwrap();
        assert_eq!(config.idealista.locale, "en");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::load_from(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, InfrastructureError::Config(_)));
    }
}

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "rps";
pub const DEFAULT_RECON_SERVICE: &str = "honeybadgerscc";
pub const DEFAULT_RECON_CHANNEL: &str = "mychannel";

/// How move-cell references are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellScheme {
    /// `rps<player>cell`, predictable.
    Deterministic,
    #[default]
    Hashed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpsConfig {
    /// Ledger database file; `<data_dir>/ledger.db` when unset.
    pub ledger_path: Option<PathBuf>,
    /// Namespace every reconstruction request is tagged with.
    pub namespace: String,
    pub cell_scheme: CellScheme,
    pub recon: ReconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Base URL of the reconstruction service. Requests are only logged when unset.
    pub endpoint: Option<String>,
    pub service: String,
    pub channel: String,
    pub timeout_secs: u64,
}

impl Default for RpsConfig {
    fn default() -> Self {
        Self {
            ledger_path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            cell_scheme: CellScheme::default(),
            recon: ReconConfig::default(),
        }
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            service: DEFAULT_RECON_SERVICE.to_string(),
            channel: DEFAULT_RECON_CHANNEL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl ReconConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RpsConfig {
    /// Load from a JSON file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn ledger_path(&self, data_dir: &Path) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(|| data_dir.join("ledger.db"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CoreError::config("Namespace cannot be empty"));
        }

        if self.recon.service.is_empty() {
            return Err(CoreError::config("Reconstruction service id cannot be empty"));
        }

        if self.recon.channel.is_empty() {
            return Err(CoreError::config("Reconstruction channel cannot be empty"));
        }

        if self.recon.timeout_secs == 0 {
            return Err(CoreError::config(
                "Reconstruction timeout must be greater than 0",
            ));
        }

        if matches!(self.recon.endpoint.as_deref(), Some("")) {
            return Err(CoreError::config("Reconstruction endpoint cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = RpsConfig::default();
        config.validate().unwrap();
        assert_eq!(config.namespace, "rps");
        assert_eq!(config.cell_scheme, CellScheme::Hashed);
        assert_eq!(config.recon.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RpsConfig::default();
        config.recon.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = RpsConfig::default();
        config.recon.endpoint = Some(String::new());
        assert!(config.validate().is_err());

        let mut config = RpsConfig::default();
        config.namespace.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"cell_scheme":"deterministic","recon":{"endpoint":"http://localhost:9000"}}"#,
        )
        .unwrap();

        let config = RpsConfig::load(&path).unwrap();
        assert_eq!(config.cell_scheme, CellScheme::Deterministic);
        assert_eq!(config.recon.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.recon.channel, DEFAULT_RECON_CHANNEL);
        assert_eq!(
            config.ledger_path(temp_dir.path()),
            temp_dir.path().join("ledger.db")
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = RpsConfig::load(&temp_dir.path().join("absent.json")).unwrap();
        assert!(config.recon.endpoint.is_none());
    }
}

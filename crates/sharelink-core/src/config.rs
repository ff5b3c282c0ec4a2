//! ShareConfig - 設定（TOML ファイル + デフォルト値）
//!
//! ```toml
//! storage_root = "/var/lib/sharelink"
//! base_url = "https://share.example.com"
//! sweep_interval_secs = 300
//! max_upload_bytes = 26214400
//! max_text_bytes = 1048576
//! default_public = true
//! ```
//!
//! 省略したキーはデフォルト値になります。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;
pub const DEFAULT_MAX_TEXT_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Root directory for persisted metadata and blobs.
    pub storage_root: PathBuf,
    /// Prefix of every share URL.
    pub base_url: String,
    pub sweep_interval_secs: u64,
    pub max_upload_bytes: u64,
    pub max_text_bytes: u64,
    pub default_public: bool,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("sharelink-data"),
            base_url: DEFAULT_BASE_URL.to_string(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            default_public: true,
        }
    }
}

impl ShareConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sweep_interval_secs must be positive".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 || self.max_text_bytes == 0 {
            return Err(ConfigError::Invalid(
                "size limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.storage_root.join("artifacts.json")
    }

    pub fn blobs_path(&self) -> PathBuf {
        self.storage_root.join("blobs")
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ShareConfig::from_toml_str("").unwrap();
        assert_eq!(config, ShareConfig::default());
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn partial_toml_overrides_some_keys() {
        let config = ShareConfig::from_toml_str(
            r#"
            storage_root = "/tmp/share"
            base_url = "https://share.example.com/"
            max_upload_bytes = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.storage_root, PathBuf::from("/tmp/share"));
        assert_eq!(config.base_url, "https://share.example.com/");
        assert_eq!(config.max_upload_bytes, 10);
        assert_eq!(config.max_text_bytes, DEFAULT_MAX_TEXT_BYTES);
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/share/artifacts.json"));
        assert_eq!(config.blobs_path(), PathBuf::from("/tmp/share/blobs"));
    }

    #[rstest]
    #[case::bad_scheme("base_url = \"ftp://x\"")]
    #[case::zero_interval("sweep_interval_secs = 0")]
    #[case::zero_upload("max_upload_bytes = 0")]
    fn invalid_values_are_rejected(#[case] raw: &str) {
        assert!(matches!(
            ShareConfig::from_toml_str(raw),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ShareConfig::from_toml_str("base_url = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharelink.toml");
        std::fs::write(&path, "default_public = false\n").unwrap();
        let config = ShareConfig::load(&path).unwrap();
        assert!(!config.default_public);

        let missing = ShareConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}

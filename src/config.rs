//! YAML configuration for devfp.
//!
//! One file covers the collector, the digest primitive and the comparator
//! weights. Every section is optional and falls back to its defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "kiosk-fleet"
//!
//! signals:
//!   private_quota_threshold: 150000000
//!   salt_key: "fp_salt"
//!   salt_path: "/var/lib/devfp/salt.json"
//!   screen_res: "1920x1080"
//!
//! digest:
//!   algorithm: "sha256"
//!
//! matcher:
//!   weights:
//!     audio_hash: 2
//!     canvas_hash: 1
//! ```

use std::fs;
use std::path::Path;

use canonical::DigestAlgorithm;
use matcher::{Comparator, MatchConfig};
use serde::{Deserialize, Serialize};
use signals::{Collector, CollectorConfig};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DevfpConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub signals: CollectorConfig,

    #[serde(default)]
    pub digest: DigestYamlConfig,

    #[serde(default)]
    pub matcher: MatchConfig,
}

impl DevfpConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: DevfpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.signals.salt_key.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "signals.salt_key must not be empty".to_string(),
            ));
        }
        if let Some(res) = &self.signals.screen_res {
            if !is_resolution(res) {
                return Err(ConfigLoadError::Validation(format!(
                    "signals.screen_res must look like <width>x<height>, got {res:?}"
                )));
            }
        }
        self.matcher
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("matcher: {err}")))?;

        Ok(())
    }

    /// Headless collector for this configuration.
    pub fn collector(&self) -> Collector {
        Collector::headless(&self.signals)
    }

    pub fn comparator(&self) -> Result<Comparator, ConfigLoadError> {
        Comparator::new(self.matcher.clone())
            .map_err(|err| ConfigLoadError::Validation(format!("matcher: {err}")))
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest.algorithm
    }
}

impl Default for DevfpConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            signals: CollectorConfig::default(),
            digest: DigestYamlConfig::default(),
            matcher: MatchConfig::default(),
        }
    }
}

/// Digest section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestYamlConfig {
    #[serde(default)]
    pub algorithm: DigestAlgorithm,
}

fn is_resolution(text: &str) -> bool {
    match text.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.bytes().all(|b| b.is_ascii_digit())
                && h.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_yaml() {
        let config = DevfpConfig::from_yaml("version: \"1.0\"\n").unwrap();
        assert_eq!(config, DevfpConfig::default());
        assert_eq!(config.digest_algorithm(), DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1.0"
signals:
  salt_path: "/tmp/devfp-salt.json"
digest:
  algorithm: "fx64"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = DevfpConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.signals.salt_path,
            Some(PathBuf::from("/tmp/devfp-salt.json"))
        );
        assert_eq!(config.digest_algorithm(), DigestAlgorithm::Fx64);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = DevfpConfig::from_file("/nonexistent/devfp.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }

    #[test]
    fn test_unsupported_version() {
        let err = DevfpConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_unknown_algorithm_is_parse_error() {
        let yaml = "version: \"1\"\ndigest:\n  algorithm: \"md5\"\n";
        let err = DevfpConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }

    #[test]
    fn test_empty_salt_key_rejected() {
        let yaml = "version: \"1\"\nsignals:\n  salt_key: \"  \"\n";
        let err = DevfpConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("salt_key"));
    }

    #[test]
    fn test_bad_screen_res_rejected() {
        let yaml = "version: \"1\"\nsignals:\n  screen_res: \"wide\"\n";
        let err = DevfpConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("screen_res"));

        let ok = "version: \"1\"\nsignals:\n  screen_res: \"1280x720\"\n";
        assert!(DevfpConfig::from_yaml(ok).is_ok());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let yaml = r#"
version: "1.0"
matcher:
  weights:
    audio_hash: 0
    drm_hash: 0
    canvas_hash: 0
    user_agent: 0
    screen_res: 0
    device_memory: 0
    hardware_concurrency: 0
    timezone: 0
    language: 0
    primary_language: 0
"#;
        let err = DevfpConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("weights"));
    }

    #[test]
    fn test_maximal_weights_accepted() {
        let yaml = r#"
version: "1.0"
matcher:
  weights:
    audio_hash: 4294967295
    drm_hash: 4294967295
"#;
        let config = DevfpConfig::from_yaml(yaml).unwrap();
        let comparator = config.comparator().unwrap();
        assert_eq!(
            comparator.config().weights.total(),
            2 * u64::from(u32::MAX) + 9
        );
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
version: "1.0"
name: "kiosk-fleet"
signals:
  private_quota_threshold: 1000
  salt_key: "kiosk_salt"
  screen_res: "1920x1080"
digest:
  algorithm: "sha256"
matcher:
  weights:
    canvas_hash: 3
"#;
        let config = DevfpConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("kiosk-fleet"));
        assert_eq!(config.signals.private_quota_threshold, 1000);
        assert_eq!(config.signals.salt_key, "kiosk_salt");
        assert_eq!(config.signals.screen_res.as_deref(), Some("1920x1080"));
        assert_eq!(config.matcher.weights.canvas_hash, 3);
        assert_eq!(config.matcher.weights.audio_hash, 2);
        assert_eq!(config.comparator().unwrap().config().weights.total(), 15);
    }
}

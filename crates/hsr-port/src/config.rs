//! Redundancy group configuration.
//!
//! Loaded from TOML, for example:
//!
//! ```toml
//! name = "hsr0"
//! protocol = "prp-v1"
//! rx_offloaded = false
//! ```

use std::fs;
use std::io;
use std::path::Path;

use hsr_types::ProtocolVersion;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::host::Features;

/// Longest interface name the host accepts (IFNAMSIZ - 1).
pub const MAX_IFNAME_LEN: usize = 15;

fn default_name() -> String {
    "hsr0".to_string()
}

fn default_features_mask() -> Features {
    Features::ALL
}

/// Settings fixed for the lifetime of a redundancy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Name of the logical redundancy interface.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub protocol: ProtocolVersion,

    /// Duplicate handling happens in hardware before frames reach the hook.
    #[serde(default)]
    pub rx_offloaded: bool,

    /// Features the master may expose; intersected with every slave's.
    #[serde(default = "default_features_mask")]
    pub features_mask: Features,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            protocol: ProtocolVersion::default(),
            rx_offloaded: false,
            features_mask: default_features_mask(),
        }
    }
}

impl GroupConfig {
    pub fn new(name: impl Into<String>, protocol: ProtocolVersion) -> Self {
        Self {
            name: name.into(),
            protocol,
            ..Self::default()
        }
    }

    pub fn with_rx_offloaded(mut self, offloaded: bool) -> Self {
        self.rx_offloaded = offloaded;
        self
    }

    pub fn with_features_mask(mut self, mask: Features) -> Self {
        self.features_mask = mask;
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GroupConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!(path = %path.display(), group = %config.name, "loaded group config");
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::invalid("name", "cannot be empty"));
        }
        if self.name.len() > MAX_IFNAME_LEN {
            return Err(ConfigError::invalid(
                "name",
                format!("'{}' is longer than {} bytes", self.name, MAX_IFNAME_LEN),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GroupConfig::default();
        assert_eq!(config.name, "hsr0");
        assert_eq!(config.protocol, ProtocolVersion::HsrV1);
        assert!(!config.rx_offloaded);
        assert_eq!(config.features_mask, Features::ALL);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = GroupConfig::from_toml_str("name = \"prp1\"\nprotocol = \"prp-v1\"\n").unwrap();
        assert_eq!(config.name, "prp1");
        assert_eq!(config.protocol, ProtocolVersion::PrpV1);
        assert!(!config.rx_offloaded);
    }

    #[test]
    fn test_parse_full_toml() {
        let content = r#"
            name = "hsr7"
            protocol = "hsr-v0"
            rx_offloaded = true
            features_mask = 3
        "#;
        let config = GroupConfig::from_toml_str(content).unwrap();
        assert_eq!(config.protocol, ProtocolVersion::HsrV0);
        assert!(config.rx_offloaded);
        assert_eq!(config.features_mask, Features::SG | Features::HW_CSUM);
    }

    #[test]
    fn test_invalid_protocol() {
        assert!(matches!(
            GroupConfig::from_toml_str("protocol = \"hsr-v9\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(GroupConfig::new("", ProtocolVersion::HsrV1).validate().is_err());
        assert!(GroupConfig::new("a-very-long-hsr-name", ProtocolVersion::HsrV1)
            .validate()
            .is_err());
        assert!(GroupConfig::new("hsr0", ProtocolVersion::HsrV1).validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GroupConfig::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, GroupConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"prp0\"").unwrap();
        writeln!(file, "protocol = \"prp-v1\"").unwrap();
        let config = GroupConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.name, "prp0");
        assert_eq!(config.protocol, ProtocolVersion::PrpV1);
    }
}

//! Configuration management.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// How long a provenance record is retained before it expires.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// How fresh a record must be to count as the message currently being
/// processed rather than a genuine reshare.
pub const DEFAULT_RECENCY_WINDOW: Duration = Duration::from_secs(5);

/// Main configuration for relink.
///
/// Static for the lifetime of the engine; there is no runtime mutation.
#[derive(Debug, Clone)]
pub struct RelinkConfig {
    /// Canonical-key prefixes (host, or host + path) exempt from reshare
    /// notification.
    pub allowlist: Vec<String>,
    /// Retention window for provenance records.
    pub link_ttl: Duration,
    /// Suppression window for just-written records.
    pub recency_window: Duration,
}

impl Default for RelinkConfig {
    fn default() -> Self {
        Self {
            allowlist: Vec::new(),
            link_ttl: DEFAULT_LINK_TTL,
            recency_window: DEFAULT_RECENCY_WINDOW,
        }
    }
}

impl RelinkConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::OperationFailed {
            operation: "read_config".to_string(),
            cause: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses configuration from a TOML string.
    ///
    /// Missing fields fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(file.into_config())
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Allow-listed canonical-key prefixes.
    pub allowlist: Option<Vec<String>>,
    /// Retention window in seconds.
    pub link_ttl_secs: Option<u64>,
    /// Recency suppression window in seconds.
    pub recency_window_secs: Option<u64>,
}

impl ConfigFile {
    /// Converts the parsed file into a config, applying defaults.
    #[must_use]
    pub fn into_config(self) -> RelinkConfig {
        let defaults = RelinkConfig::default();
        RelinkConfig {
            allowlist: self.allowlist.unwrap_or(defaults.allowlist),
            link_ttl: self
                .link_ttl_secs
                .map_or(defaults.link_ttl, Duration::from_secs),
            recency_window: self
                .recency_window_secs
                .map_or(defaults.recency_window, Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelinkConfig::default();
        assert!(config.allowlist.is_empty());
        assert_eq!(config.link_ttl, Duration::from_secs(604_800));
        assert_eq!(config.recency_window, Duration::from_secs(5));
    }

    #[test]
    fn test_from_toml_str() {
        let config = RelinkConfig::from_toml_str(
            r#"
            allowlist = ["support.vendor.com", "status.vendor.com/incidents"]
            link_ttl_secs = 86400
            "#,
        )
        .unwrap();

        assert_eq!(config.allowlist.len(), 2);
        assert_eq!(config.link_ttl, Duration::from_secs(86400));
        // Unset fields keep their defaults.
        assert_eq!(config.recency_window, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config = RelinkConfig::from_toml_str("").unwrap();
        assert_eq!(config.link_ttl, DEFAULT_LINK_TTL);
    }

    #[test]
    fn test_malformed_toml_is_invalid_input() {
        let err = RelinkConfig::from_toml_str("allowlist = 42").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

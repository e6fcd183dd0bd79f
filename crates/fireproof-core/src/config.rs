//! Privacy services configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

pub const DEFAULT_FIRST_PARTY_DOMAIN: &str = "duckduckgo.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Cookies of this exact domain always survive a clear
    pub first_party_domain: String,
    /// Upper bound on each website data store call
    pub store_timeout_ms: Option<u64>,
    /// Keep the cookie stash in memory only (private profiles)
    pub ephemeral_stash: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("fireproof.db"),
            first_party_domain: DEFAULT_FIRST_PARTY_DOMAIN.to_string(),
            store_timeout_ms: None,
            ephemeral_stash: false,
        }
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Self::validate_domain(&self.first_party_domain)?;

        if self.store_timeout_ms == Some(0) {
            return Err(CoreError::Config(
                "store timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// A bare host name: no surrounding or inner whitespace, no leading
    /// dot, no path
    pub fn validate_domain(domain: &str) -> Result<()> {
        let valid = !domain.is_empty()
            && !domain.starts_with('.')
            && !domain.contains('/')
            && !domain.chars().any(char::is_whitespace);
        if valid {
            Ok(())
        } else {
            Err(CoreError::Config(format!(
                "invalid first party domain: {domain:?}"
            )))
        }
    }

    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout_ms.map(Duration::from_millis)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Fireproof"))
            .unwrap_or_else(|| PathBuf::from(".fireproof"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(
            target_os = "windows",
            target_os = "macos",
            target_os = "ios",
            target_os = "linux",
            target_os = "android"
        )))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/data"));
        assert_eq!(config.database_path, PathBuf::from("/data/fireproof.db"));
        assert_eq!(config.first_party_domain, "duckduckgo.com");
        assert_eq!(config.store_timeout(), None);
        assert!(!config.ephemeral_stash);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            Config::from_json(r#"{"store_timeout_ms": 1500, "ephemeral_stash": true}"#).unwrap();
        assert_eq!(config.store_timeout(), Some(Duration::from_millis(1500)));
        assert!(config.ephemeral_stash);
        assert_eq!(config.first_party_domain, DEFAULT_FIRST_PARTY_DOMAIN);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_json(r#"{"first_party_domain": ""}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"first_party_domain": ".duckduckgo.com"}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"first_party_domain": " duckduckgo.com"}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"store_timeout_ms": 0}"#),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            Config::from_json("not json"),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_validate_domain() {
        assert!(Config::validate_domain("example.com").is_ok());
        assert!(Config::validate_domain("").is_err());
        assert!(Config::validate_domain("example.com/login").is_err());
        assert!(Config::validate_domain("example.com\n").is_err());
        assert!(Config::validate_domain("exa mple.com").is_err());
    }
}

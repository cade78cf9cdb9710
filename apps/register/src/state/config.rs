//! # Configuration State
//!
//! Stores register configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`COURTSIDE_*`)
//! 2. Config file (`config.toml` in the platform config dir)
//! 3. Defaults (this file)
//!
//! ## Configuration File Format
//! ```toml
//! [venue]
//! name = "Arena Norte"
//! currency_symbol = "R$"
//!
//! [backend]
//! base_url = "https://venue.example/.netlify/functions"
//! timeout_secs = 30
//!
//! [roster]
//! url = "https://xyz.supabase.co"
//! anon_key = "eyJ..."
//!
//! [settlement]
//! record_policy = "entered_amounts"  # entered_amounts | even_split
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use courtside_api::{ClientConfig, RosterConfig, DEFAULT_TIMEOUT_SECS};
use courtside_core::RecordPolicy;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// `[venue]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VenueConfig {
    /// Shown in the shell banner.
    #[serde(default = "default_venue_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_venue_name() -> String {
    "Courtside".to_string()
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            name: default_venue_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// `[backend]`: catalog, discounts and order sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendSettings {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(default = "default_discounts_path")]
    pub discounts_path: String,

    #[serde(default = "default_orders_path")]
    pub orders_path: String,
}

fn default_backend_url() -> String {
    "http://localhost:8888/.netlify/functions".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_catalog_path() -> String {
    "api-estoque".to_string()
}

fn default_discounts_path() -> String {
    "api-descontos".to_string()
}

fn default_orders_path() -> String {
    "api-pedidos".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout(),
            catalog_path: default_catalog_path(),
            discounts_path: default_discounts_path(),
            orders_path: default_orders_path(),
        }
    }
}

/// `[roster]`: hosted teams/players database. Empty URL disables the
/// roster screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

/// `[settlement]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementSettings {
    #[serde(default)]
    pub record_policy: RecordPolicy,
}

// =============================================================================
// Config State
// =============================================================================

/// Register configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigState {
    #[serde(default)]
    pub venue: VenueConfig,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub roster: RosterSettings,

    #[serde(default)]
    pub settlement: SettlementSettings,
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns defaults (with env overrides) if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.backend.base_url) {
            return Err(ConfigError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.backend.base_url
            )));
        }

        if !self.roster.url.is_empty() {
            if !is_http_url(&self.roster.url) {
                return Err(ConfigError::InvalidUrl(format!(
                    "Roster URL must start with http:// or https://, got: {}",
                    self.roster.url
                )));
            }
            if self.roster.anon_key.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "roster.anon_key is required when roster.url is set".into(),
                ));
            }
        }

        if self.backend.timeout_secs == 0 || self.roster.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("COURTSIDE_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.base_url = url;
        }

        if let Ok(url) = std::env::var("COURTSIDE_ROSTER_URL") {
            debug!(url = %url, "Overriding roster URL from environment");
            self.roster.url = url;
        }

        if let Ok(key) = std::env::var("COURTSIDE_ROSTER_KEY") {
            self.roster.anon_key = key;
        }

        if let Ok(policy) = std::env::var("COURTSIDE_RECORD_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.settlement.record_policy = parsed,
                Err(_) => warn!(policy = %policy, "Unknown record policy in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "courtside", "pos")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn record_policy(&self) -> RecordPolicy {
        self.settlement.record_policy
    }

    /// Client settings for the backend functions.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            catalog_path: self.backend.catalog_path.clone(),
            discounts_path: self.backend.discounts_path.clone(),
            orders_path: self.backend.orders_path.clone(),
            ..ClientConfig::new(self.backend.base_url.clone())
                .with_timeout(self.backend.timeout_secs)
        }
    }

    /// Client settings for the roster database, when one is configured.
    pub fn roster_config(&self) -> Option<RosterConfig> {
        if self.roster.url.is_empty() {
            return None;
        }
        Some(
            RosterConfig::new(self.roster.url.clone(), self.roster.anon_key.clone())
                .with_timeout(self.roster.timeout_secs),
        )
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigState::default();
        assert_eq!(config.record_policy(), RecordPolicy::EnteredAmounts);
        assert_eq!(config.backend.timeout_secs, 30);
        assert!(config.roster_config().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_sections() {
        let config: ConfigState = toml::from_str(
            r#"
            [venue]
            name = "Arena Norte"

            [backend]
            base_url = "https://venue.example/fn"
            timeout_secs = 10

            [roster]
            url = "https://xyz.supabase.co"
            anon_key = "key"

            [settlement]
            record_policy = "even_split"
            "#,
        )
        .unwrap();

        assert_eq!(config.venue.name, "Arena Norte");
        assert_eq!(config.venue.currency_symbol, "R$");
        assert_eq!(config.record_policy(), RecordPolicy::EvenSplit);

        let client = config.client_config();
        assert_eq!(client.base_url, "https://venue.example/fn");
        assert_eq!(client.timeout, 10);
        assert_eq!(client.orders_path, "api-pedidos");

        let roster = config.roster_config().unwrap();
        assert_eq!(roster.anon_key, "key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = ConfigState::default();
        config.backend.base_url = "ftp://nope".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let mut config = ConfigState::default();
        config.roster.url = "https://xyz.supabase.co".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ConfigState::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("courtside-no-such-config.toml");
        let config = ConfigState::load_or_default(Some(path));
        assert_eq!(config.venue.name, "Courtside");
    }
}

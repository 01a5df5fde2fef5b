//! Configuration management for apsema
//!
//! Configuration is read from a YAML file. Every section has defaults, so a
//! file only needs to carry the credentials.

use crate::api::Credentials;
use crate::error::{ApsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default vendor endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.apsystemsema.com:9282";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "APSEMA_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vendor API credentials and installation identifiers
    pub credentials: Credentials,

    /// HTTP endpoint settings
    pub api: ApiConfig,

    /// Seconds between poll cycles
    pub poll_interval_secs: u64,

    /// IANA timezone of the installation, used for the minutely `date_range`
    pub timezone: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Vendor endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the EMA OpenAPI
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Console level override
    pub console_level: Option<String>,

    /// File level override
    pub file_level: Option<String>,

    /// Log directory, or a file path whose parent directory is used
    pub file: String,

    /// Number of rotated daily files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/apsema.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            api: ApiConfig::default(),
            poll_interval_secs: 3600,
            timezone: "UTC".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Locate and load the configuration file.
    ///
    /// `APSEMA_CONFIG` wins when set and must point at a readable file. Otherwise
    /// the first existing default location is used, falling back to defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_paths = [
            "apsema_config.yaml",
            "/data/apsema_config.yaml",
            "/etc/apsema/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Poll period as a duration
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    /// Parsed installation timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| ApsError::validation("timezone", e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let creds = &self.credentials;
        for (field, value) in [
            ("credentials.app_id", creds.app_id()),
            ("credentials.app_secret", creds.app_secret()),
            ("credentials.sid", creds.sid()),
            ("credentials.ecu_id", creds.ecu_id()),
        ] {
            if value.trim().is_empty() {
                return Err(ApsError::validation(field, "Cannot be empty"));
            }
        }

        if reqwest::Url::parse(&self.api.base_url).is_err() {
            return Err(ApsError::validation(
                "api.base_url",
                format!("Not a valid URL: {}", self.api.base_url),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ApsError::validation(
                "api.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(ApsError::validation(
                "poll_interval_secs",
                "Must be greater than 0",
            ));
        }

        self.tz()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            credentials: Credentials::new("app", "secret", "sid", "ecu"),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.poll_interval_secs, 3600);
        assert_eq!(config.timezone, "UTC");
    }

    #[test]
    fn test_config_validation() {
        assert!(valid().validate().is_ok());

        // Defaults carry no credentials
        assert!(Config::default().validate().is_err());

        let mut config = valid();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
credentials:
  app_id: A
  app_secret: S
  sid: "123"
  ecu_id: "456"
poll_interval_secs: 30
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.credentials.sid(), "123");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.logging.level, "INFO");
        assert!(config.validate().is_ok());
    }
}

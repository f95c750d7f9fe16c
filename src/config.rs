//! Configuration management for Sofi Chat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SofiError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Sofi Chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Reveal animation settings
    #[serde(default)]
    pub reveal: RevealConfig,
    /// Statistics storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the chat backend; endpoints are resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on every backend request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:10000".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Reveal animation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Animate replies character by character; when false replies appear at once
    #[serde(default = "default_reveal_enabled")]
    pub enabled: bool,

    /// Speed multiplier; 2.0 halves every delay
    #[serde(default = "default_reveal_speed")]
    pub speed: f64,
}

fn default_reveal_enabled() -> bool {
    true
}

fn default_reveal_speed() -> f64 {
    1.0
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            enabled: default_reveal_enabled(),
            speed: default_reveal_speed(),
        }
    }
}

/// Statistics storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Statistics file; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Values supplied on the command line that take precedence over file and env
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--backend-url`
    pub backend_url: Option<String>,
    /// `--stats-path`
    pub stats_path: Option<PathBuf>,
    /// `--no-animation`
    pub no_animation: bool,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `overrides` - Command-line overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(overrides);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SofiError::Config(format!("Failed to read config file: {}", e)))?;
        let config = serde_yaml::from_str(&contents).map_err(SofiError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SOFI_BACKEND_URL") {
            tracing::debug!(base_url = %base_url, "Env override: SOFI_BACKEND_URL");
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SOFI_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.backend.timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid SOFI_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(enabled) = std::env::var("SOFI_REVEAL_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.reveal.enabled = true,
                "0" | "false" | "no" | "off" => self.reveal.enabled = false,
                _ => tracing::warn!("Invalid value for SOFI_REVEAL_ENABLED: {}", enabled),
            }
        }

        if let Ok(speed) = std::env::var("SOFI_REVEAL_SPEED") {
            match speed.parse::<f64>() {
                Ok(v) => self.reveal.speed = v,
                Err(_) => tracing::warn!("Invalid SOFI_REVEAL_SPEED: {}", speed),
            }
        }

        if let Ok(stats_path) = std::env::var("SOFI_STATS_PATH") {
            tracing::debug!(stats_path = %stats_path, "Env override: SOFI_STATS_PATH");
            self.storage.path = Some(PathBuf::from(stats_path));
        }
    }

    fn apply_cli_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.backend_url {
            self.backend.base_url = url.clone();
        }
        if let Some(path) = &overrides.stats_path {
            self.storage.path = Some(path.clone());
        }
        if overrides.no_animation {
            self.reveal.enabled = false;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the backend URL is not an absolute http(s) URL, the
    /// timeout is outside 1..=600 seconds, or the reveal speed is not positive
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| {
            SofiError::Config(format!(
                "Invalid backend.base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SofiError::Config(format!(
                "backend.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(SofiError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.backend.timeout_seconds > 600 {
            return Err(SofiError::Config(
                "backend.timeout_seconds must be less than or equal to 600".to_string(),
            )
            .into());
        }

        if !(self.reveal.speed.is_finite() && self.reveal.speed > 0.0) {
            return Err(
                SofiError::Config("reveal.speed must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, create_test_file, temp_dir};
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:10000");
        assert_eq!(config.backend.timeout_seconds, 60);
        assert!(config.reveal.enabled);
        assert_eq!(config.reveal.speed, 1.0);
        assert!(config.storage.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
backend:
  base_url: https://sofi.example.com
  timeout_seconds: 15
reveal:
  enabled: false
storage:
  path: /tmp/sofi/stats.json
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.base_url, "https://sofi.example.com");
        assert_eq!(config.backend.timeout_seconds, 15);
        assert!(!config.reveal.enabled);
        assert_eq!(config.reveal.speed, 1.0);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/sofi/stats.json"))
        );
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:10000");
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let config = Config::load("nonexistent.yaml", &ConfigOverrides::default()).unwrap();
        assert_eq!(config.backend.timeout_seconds, 60);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win() {
        let overrides = ConfigOverrides {
            backend_url: Some("http://127.0.0.1:9999".to_string()),
            stats_path: Some(PathBuf::from("stats.json")),
            no_animation: true,
        };
        let config = Config::load("nonexistent.yaml", &overrides).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.storage.path, Some(PathBuf::from("stats.json")));
        assert!(!config.reveal.enabled);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("SOFI_BACKEND_URL", "http://env.example:8080");
        std::env::set_var("SOFI_TIMEOUT_SECONDS", "5");
        std::env::set_var("SOFI_REVEAL_ENABLED", "off");
        std::env::set_var("SOFI_REVEAL_SPEED", "not-a-number");

        let config = Config::load("nonexistent.yaml", &ConfigOverrides::default()).unwrap();

        std::env::remove_var("SOFI_BACKEND_URL");
        std::env::remove_var("SOFI_TIMEOUT_SECONDS");
        std::env::remove_var("SOFI_REVEAL_ENABLED");
        std::env::remove_var("SOFI_REVEAL_SPEED");

        assert_eq!(config.backend.base_url, "http://env.example:8080");
        assert_eq!(config.backend.timeout_seconds, 5);
        assert!(!config.reveal.enabled);
        assert_eq!(config.reveal.speed, 1.0);
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let dir = temp_dir();
        let path = create_test_file(
            &dir,
            "config.yaml",
            "backend:\n  base_url: http://127.0.0.1:8000\nreveal:\n  speed: 2.5\n",
        );

        let config = Config::load(path.to_str().unwrap(), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.backend.timeout_seconds, 60);
        assert_eq!(config.reveal.speed, 2.5);
    }

    #[test]
    #[serial]
    fn test_load_malformed_file_is_yaml_error() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "backend: [unclosed");

        let err = Config::load(path.to_str().unwrap(), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<SofiError>(), Some(SofiError::Yaml(_))));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.backend.base_url = "not a url".to_string();
        assert_error_contains(config.validate(), "Invalid backend.base_url");

        config.backend.base_url = "ftp://example.com".to_string();
        assert_error_contains(config.validate(), "http or https");
    }

    #[test]
    fn test_validate_rejects_timeouts() {
        let mut config = Config::default();
        config.backend.timeout_seconds = 0;
        assert_error_contains(config.validate(), "greater than 0");

        config.backend.timeout_seconds = 601;
        assert_error_contains(config.validate(), "less than or equal to 600");
    }

    #[test]
    fn test_validate_rejects_non_positive_speed() {
        let mut config = Config::default();
        config.reveal.speed = 0.0;
        assert_error_contains(config.validate(), "reveal.speed");

        config.reveal.speed = f64::NAN;
        assert_error_contains(config.validate(), "reveal.speed");
    }

    #[test]
    fn test_example_config_parses() {
        let contents = std::fs::read_to_string("config/config.yaml")
            .expect("Failed to read example config/config.yaml");
        let config: Config = serde_yaml::from_str(&contents).expect("Failed to parse config");
        assert!(config.validate().is_ok());
    }
}

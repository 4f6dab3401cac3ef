//! Configuration management for the `WeatherWiz` dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherWizError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `WeatherWiz` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherWizConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Model artifact locations
    #[serde(default)]
    pub model: ModelConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds, 0 disables the client timeout
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u64,
    /// Retries for transient failures
    #[serde(default)]
    pub max_retries: u32,
}

/// Locations of the pre-trained model artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Serialized random forest classifier
    #[serde(default = "default_classifier_path")]
    pub classifier_path: PathBuf,
    /// Serialized label decoder
    #[serde(default = "default_label_encoder_path")]
    pub label_encoder_path: PathBuf,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Branding image shown above the dashboard
    #[serde(default = "default_logo_path")]
    pub logo_path: PathBuf,
    /// PEM certificate, enables TLS together with `tls_key_path`
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key
    #[serde(default)]
    pub tls_key_path: Option<PathBuf>,
    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint for trace export
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_weather_base_url() -> String {
    "http://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u64 {
    30
}

fn default_classifier_path() -> PathBuf {
    PathBuf::from("model/random_forest_model.json")
}

fn default_label_encoder_path() -> PathBuf {
    PathBuf::from("model/label_encoder.json")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_logo_path() -> PathBuf {
    PathBuf::from("media/WeatherWiz.png")
}

fn default_max_body_bytes() -> usize {
    16 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier_path: default_classifier_path(),
            label_encoder_path: default_label_encoder_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logo_path: default_logo_path(),
            tls_cert_path: None,
            tls_key_path: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl WeatherWizConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Explicit path first, then the per-user config dir, then the working directory
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERWIZ_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("WEATHERWIZ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherWizConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherwiz").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// Validate the weather API credential
    pub fn validate_api_keys(&self) -> Result<()> {
        let Some(api_key) = &self.weather.api_key else {
            return Err(WeatherWizError::config(
                "Weather API key is required. Set weather.api_key or WEATHERWIZ_WEATHER__API_KEY.",
            )
            .into());
        };

        if api_key.trim().is_empty() {
            return Err(WeatherWizError::config("Weather API key cannot be empty.").into());
        }

        if api_key.len() < 8 {
            return Err(WeatherWizError::config(
                "Weather API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if api_key.len() > 100 {
            return Err(WeatherWizError::config(
                "Weather API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherWizError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(WeatherWizError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.server.port == 0 {
            return Err(WeatherWizError::config("Server port must be non-zero").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherWizError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherWizError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(WeatherWizError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Certificate and key must be configured together
    fn validate_tls(&self) -> Result<()> {
        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(WeatherWizError::config(
                "TLS requires both server.tls_cert_path and server.tls_key_path",
            )
            .into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn valid_config() -> WeatherWizConfig {
        let mut config = WeatherWizConfig::default();
        config.weather.api_key = Some("valid_api_key_123".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = WeatherWizConfig::default();
        assert_eq!(config.weather.base_url, "http://api.openweathermap.org/data/2.5");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.weather.max_retries, 0);
        assert_eq!(
            config.model.classifier_path,
            PathBuf::from("model/random_forest_model.json")
        );
        assert_eq!(config.server.logo_path, PathBuf::from("media/WeatherWiz.png"));
        assert_eq!(config.logging.level, "info");
        assert!(config.weather.api_key.is_none());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = WeatherWizConfig::default();
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key is required"));
    }

    #[rstest]
    #[case("short", "too short")]
    #[case("   ", "cannot be empty")]
    fn test_config_validation_bad_api_key(#[case] key: &str, #[case] expected: &str) {
        let mut config = WeatherWizConfig::default();
        config.weather.api_key = Some(key.to_string());
        let err = config.validate_api_keys().unwrap_err();
        assert!(err.to_string().contains(expected), "got: {err}");
    }

    #[test]
    fn test_config_validation_valid_api_key() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = valid_config();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_half_tls() {
        let mut config = valid_config();
        config.server.tls_cert_path = Some(PathBuf::from("cert.pem"));
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("TLS requires both"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[weather]
api_key = "file_api_key_123"
max_retries = 2

[server]
port = 9000

[model]
classifier_path = "artifacts/forest.json"
"#
        )
        .unwrap();

        let config = WeatherWizConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.weather.api_key.as_deref(), Some("file_api_key_123"));
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.model.classifier_path,
            PathBuf::from("artifacts/forest.json")
        );
        // Sections missing from the file keep their defaults
        assert_eq!(
            config.model.label_encoder_path,
            PathBuf::from("model/label_encoder.json")
        );
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_path_generation() {
        let path = WeatherWizConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("weatherwiz"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}

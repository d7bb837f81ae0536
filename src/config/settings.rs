//! Engine settings and configuration management.
//!
//! Settings cover the archetype catalog source, the seed store bound, the
//! rotation window, the canvas noise tunables and the optional REST API.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::noise::NoiseConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "KI_FINGERPRINT_";

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Identity engine settings.
///
/// # Configuration Precedence
///
/// Settings are applied in the following order (later sources override earlier):
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables (`KI_FINGERPRINT_*`)
/// 4. CLI arguments
///
/// # Example
///
/// ```rust
/// use ki_fingerprint_engine::config::EngineSettings;
///
/// let settings = EngineSettings::default()
///     .with_max_scopes(64)
///     .with_noise(25.0, 0.002);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Archetype catalog file (JSON or TOML). The bundled catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Maximum number of scopes held by the seed store.
    #[serde(default = "default_max_scopes")]
    pub max_scopes: usize,

    /// Seed age in milliseconds after which rotation is advised.
    #[serde(default = "default_rotation_max_age_ms")]
    pub rotation_max_age_ms: u64,

    /// Sobel magnitude a pixel must exceed to receive noise.
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,

    /// Noise amplitude as a fraction of full scale.
    #[serde(default = "default_noise_level")]
    pub noise_level: f64,

    /// Enable the HTTP API server.
    #[serde(default = "default_api_enabled")]
    pub api_enabled: bool,

    /// Port for the HTTP API server.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

// Default value functions for serde
fn default_max_scopes() -> usize {
    crate::session::DEFAULT_MAX_SCOPES
}

fn default_rotation_max_age_ms() -> u64 {
    24 * 60 * 60 * 1000
}

fn default_edge_threshold() -> f64 {
    crate::noise::DEFAULT_EDGE_THRESHOLD
}

fn default_noise_level() -> f64 {
    crate::noise::DEFAULT_NOISE_LEVEL
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_port() -> u16 {
    9333
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            max_scopes: default_max_scopes(),
            rotation_max_age_ms: default_rotation_max_age_ms(),
            edge_threshold: default_edge_threshold(),
            noise_level: default_noise_level(),
            api_enabled: default_api_enabled(),
            api_port: default_api_port(),
        }
    }
}

impl EngineSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ki_fingerprint_engine::config::EngineSettings;
    ///
    /// let settings = EngineSettings::from_file("fingerprint.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match file_extension(path).as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the extension is unknown.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let content = match file_extension(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads settings from environment variables.
    ///
    /// Variables are prefixed with `KI_FINGERPRINT_`, for example:
    /// - `KI_FINGERPRINT_CATALOG_PATH`
    /// - `KI_FINGERPRINT_NOISE_LEVEL`
    /// - `KI_FINGERPRINT_API_PORT`
    pub fn from_env() -> Self {
        Self::default().merge_with_env()
    }

    /// Merges current settings with environment variable overrides.
    pub fn merge_with_env(mut self) -> Self {
        self.apply_overrides(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok());
        self
    }

    /// Applies overrides from `lookup`, keyed by the unprefixed variable name.
    ///
    /// Values that fail to parse are ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CATALOG_PATH") {
            self.catalog_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Some(max) = lookup("MAX_SCOPES").and_then(|v| v.parse().ok()) {
            self.max_scopes = max;
        }

        if let Some(age) = lookup("ROTATION_MAX_AGE_MS").and_then(|v| v.parse().ok()) {
            self.rotation_max_age_ms = age;
        }

        if let Some(threshold) = lookup("EDGE_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.edge_threshold = threshold;
        }

        if let Some(level) = lookup("NOISE_LEVEL").and_then(|v| v.parse().ok()) {
            self.noise_level = level;
        }

        if let Some(val) = lookup("API_ENABLED") {
            self.api_enabled = val.to_lowercase() == "true" || val == "1";
        }

        if let Some(port) = lookup("API_PORT").and_then(|v| v.parse().ok()) {
            self.api_port = port;
        }
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ki_fingerprint_engine::config::{CliArgs, EngineSettings};
    ///
    /// let args = CliArgs {
    ///     api_port: Some(8080),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = EngineSettings::default().merge_with_args(&args);
    /// assert_eq!(settings.api_port, 8080);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(ref catalog) = args.catalog_path {
            self.catalog_path = Some(catalog.clone());
        }
        if let Some(max) = args.max_scopes {
            self.max_scopes = max;
        }
        if let Some(age) = args.rotation_max_age_ms {
            self.rotation_max_age_ms = age;
        }
        if let Some(threshold) = args.edge_threshold {
            self.edge_threshold = threshold;
        }
        if let Some(level) = args.noise_level {
            self.noise_level = level;
        }
        if let Some(api_enabled) = args.api_enabled {
            self.api_enabled = api_enabled;
        }
        if let Some(api_port) = args.api_port {
            self.api_port = api_port;
        }
        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_scopes == 0 {
            return Err(ConfigError::ValidationError(
                "Maximum scopes must be at least 1".to_string(),
            ));
        }

        if self.rotation_max_age_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Rotation max age must be greater than 0ms".to_string(),
            ));
        }

        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Edge threshold must be a non-negative number, got {}",
                self.edge_threshold
            )));
        }

        if !(self.noise_level > 0.0 && self.noise_level <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "Noise level must be in (0, 1], got {}",
                self.noise_level
            )));
        }

        if self.api_enabled && self.api_port == 0 {
            return Err(ConfigError::ValidationError(
                "API port cannot be 0 when API is enabled".to_string(),
            ));
        }

        if let Some(ref path) = self.catalog_path {
            if !path.exists() {
                return Err(ConfigError::ValidationError(format!(
                    "Catalog file does not exist: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Noise tunables for the injector.
    pub fn noise_config(&self) -> NoiseConfig {
        NoiseConfig {
            edge_threshold: self.edge_threshold,
            noise_level: self.noise_level,
        }
    }

    // Builder-style methods for convenient configuration

    /// Sets the catalog file.
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Sets the seed store bound.
    pub fn with_max_scopes(mut self, max: usize) -> Self {
        self.max_scopes = max;
        self
    }

    /// Sets the rotation window in milliseconds.
    pub fn with_rotation_max_age(mut self, max_age_ms: u64) -> Self {
        self.rotation_max_age_ms = max_age_ms;
        self
    }

    /// Sets the edge threshold and noise level.
    pub fn with_noise(mut self, edge_threshold: f64, noise_level: f64) -> Self {
        self.edge_threshold = edge_threshold;
        self.noise_level = noise_level;
        self
    }

    /// Enables or disables the API server.
    pub fn with_api(mut self, enabled: bool, port: u16) -> Self {
        self.api_enabled = enabled;
        self.api_port = port;
        self
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// CLI argument structure for parsing command line options.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Archetype catalog file.
    pub catalog_path: Option<PathBuf>,
    /// Seed store bound.
    pub max_scopes: Option<usize>,
    /// Rotation window in milliseconds.
    pub rotation_max_age_ms: Option<u64>,
    /// Edge threshold.
    pub edge_threshold: Option<f64>,
    /// Noise level.
    pub noise_level: Option<f64>,
    /// Enable API server.
    pub api_enabled: Option<bool>,
    /// API server port.
    pub api_port: Option<u16>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    ///
    /// 1. Default values
    /// 2. Configuration file (if specified)
    /// 3. Environment variables
    /// 4. CLI arguments (self)
    pub fn load_settings(&self) -> Result<EngineSettings, ConfigError> {
        self.load_settings_from(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Same chain as [`CliArgs::load_settings`], reading overrides from `lookup`.
    fn load_settings_from<F>(&self, lookup: F) -> Result<EngineSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = if let Some(ref config_file) = self.config_file {
            EngineSettings::from_file(config_file)?
        } else {
            EngineSettings::default()
        };

        settings.apply_overrides(lookup);
        settings = settings.merge_with_args(self);
        settings.validate()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert!(settings.catalog_path.is_none());
        assert_eq!(settings.max_scopes, 256);
        assert_eq!(settings.rotation_max_age_ms, 86_400_000);
        assert_eq!(settings.edge_threshold, 30.0);
        assert_eq!(settings.noise_level, 0.001);
        assert!(settings.api_enabled);
        assert_eq!(settings.api_port, 9333);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let settings = EngineSettings::default()
            .with_catalog_path("catalog.json")
            .with_max_scopes(8)
            .with_rotation_max_age(60_000)
            .with_noise(12.5, 0.01)
            .with_api(false, 0);

        assert_eq!(settings.catalog_path, Some(PathBuf::from("catalog.json")));
        assert_eq!(settings.max_scopes, 8);
        assert_eq!(settings.rotation_max_age_ms, 60_000);
        assert_eq!(
            settings.noise_config(),
            NoiseConfig {
                edge_threshold: 12.5,
                noise_level: 0.01
            }
        );
        assert!(!settings.api_enabled);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = EngineSettings::default();
        settings.max_scopes = 0;
        assert!(settings.validate().is_err());

        let settings = EngineSettings::default().with_noise(30.0, 0.0);
        assert!(settings.validate().is_err());

        let settings = EngineSettings::default().with_noise(30.0, 1.5);
        assert!(settings.validate().is_err());

        let settings = EngineSettings::default().with_noise(f64::NAN, 0.001);
        assert!(settings.validate().is_err());

        let settings = EngineSettings::default().with_api(true, 0);
        assert!(settings.validate().is_err());

        // Disabled API does not care about the port
        let settings = EngineSettings::default().with_api(false, 0);
        assert!(settings.validate().is_ok());

        let settings = EngineSettings::default().with_catalog_path("/nonexistent/catalog.json");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("MAX_SCOPES", "12"),
            ("NOISE_LEVEL", "0.004"),
            ("API_ENABLED", "false"),
            ("API_PORT", "not-a-port"),
            ("CATALOG_PATH", "/tmp/archetypes.toml"),
        ]
        .into_iter()
        .collect();

        let mut settings = EngineSettings::default();
        settings.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.max_scopes, 12);
        assert_eq!(settings.noise_level, 0.004);
        assert!(!settings.api_enabled);
        assert_eq!(settings.api_port, 9333); // Unparseable, unchanged
        assert_eq!(
            settings.catalog_path,
            Some(PathBuf::from("/tmp/archetypes.toml"))
        );
    }

    #[test]
    fn test_cli_args_merge() {
        let args = CliArgs {
            api_port: Some(8080),
            noise_level: Some(0.002),
            ..Default::default()
        };

        let settings = EngineSettings::default().merge_with_args(&args);

        assert_eq!(settings.api_port, 8080);
        assert_eq!(settings.noise_level, 0.002);
        assert_eq!(settings.max_scopes, 256); // Unchanged
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = EngineSettings::default()
            .with_max_scopes(32)
            .with_api(true, 7000);

        for name in ["engine.toml", "engine.json"] {
            let path = dir.path().join(name);
            settings.to_file(&path).unwrap();
            assert_eq!(EngineSettings::from_file(&path).unwrap(), settings);
        }

        let bad = dir.path().join("engine.yaml");
        std::fs::write(&bad, "max_scopes: 3").unwrap();
        assert!(matches!(
            EngineSettings::from_file(&bad),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "noise_level = 0.003\napi_enabled = false\n").unwrap();

        let settings = EngineSettings::from_file(&path).unwrap();
        assert_eq!(settings.noise_level, 0.003);
        assert!(!settings.api_enabled);
        assert_eq!(settings.max_scopes, 256);
        assert_eq!(settings.edge_threshold, 30.0);
    }

    #[test]
    fn test_load_settings_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"max_scopes": 10, "api_port": 9500}"#).unwrap();

        let args = CliArgs {
            config_file: Some(path),
            api_port: Some(9600),
            ..Default::default()
        };
        let settings = args.load_settings_from(|_| None).unwrap();
        assert_eq!(settings.max_scopes, 10);
        assert_eq!(settings.api_port, 9600);
    }

    #[test]
    fn test_load_settings_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "max_scopes = 10\napi_port = 9500\nnoise_level = 0.01\n").unwrap();

        let vars: HashMap<&str, &str> = [("MAX_SCOPES", "20"), ("API_PORT", "9550")]
            .into_iter()
            .collect();
        let args = CliArgs {
            config_file: Some(path),
            api_port: Some(9600),
            ..Default::default()
        };
        let settings = args
            .load_settings_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.noise_level, 0.01);
        assert_eq!(settings.max_scopes, 20);
        assert_eq!(settings.api_port, 9600);
    }
}

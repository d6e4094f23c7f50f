//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a [`HubConfig`]
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("sensorhub.toml")).unwrap();
//! println!("Input: {}", config.device.input_path.display());
//! ```

mod parser;
mod validator;

pub use contracts::HubConfig;
pub use parser::ConfigFormat;

use contracts::HubError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<HubConfig, HubError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<HubConfig, HubError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already-built configuration
    pub fn validate(config: &HubConfig) -> Result<(), HubError> {
        validator::validate(config)
    }

    /// Serialize HubConfig to TOML string
    pub fn to_toml(config: &HubConfig) -> Result<String, HubError> {
        toml::to_string_pretty(config)
            .map_err(|e| HubError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize HubConfig to JSON string
    pub fn to_json(config: &HubConfig) -> Result<String, HubError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| HubError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, HubError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| HubError::config_parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| HubError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, HubError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<HubConfig, HubError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

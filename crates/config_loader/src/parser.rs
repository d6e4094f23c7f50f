//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{HubConfig, HubError};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<HubConfig, HubError> {
    toml::from_str(content).map_err(|e| HubError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<HubConfig, HubError> {
    serde_json::from_str(content).map_err(|e| HubError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<HubConfig, HubError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{LogFormat, SensorKind};
    use std::path::PathBuf;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
input_queue_len = 8
startup_enable = ["acceleration"]

[device]
input_path = "/dev/input/event3"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.input_queue_len, 8);
        assert_eq!(config.device.input_path, PathBuf::from("/dev/input/event3"));
        assert_eq!(config.startup_enable, vec![SensorKind::Acceleration]);
        // untouched sections keep their defaults
        assert_eq!(config.calibration, HubConfig::default().calibration);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "log_format": "json",
            "metrics_port": 9000,
            "scale": { "pressure_divisor": 10.0 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.metrics_port, Some(9000));
        assert_eq!(config.scale.pressure_divisor, 10.0);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, HubError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_sensor_kind_rejected() {
        let result = parse_toml(r#"startup_enable = ["thermometer"]"#);
        assert!(matches!(result, Err(HubError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}

//! 配置校验模块
//!
//! 校验规则：
//! - 设备与校准路径非空
//! - input_queue_len >= 1
//! - 换算系数为有限非零值
//! - startup_enable 无重复项

use std::collections::HashSet;
use std::path::Path;

use contracts::{HubConfig, HubError, ScaleFactors};

/// 校验 HubConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &HubConfig) -> Result<(), HubError> {
    validate_paths(config)?;
    validate_queue_len(config)?;
    validate_scale(&config.scale)?;
    validate_startup_enable(config)?;
    Ok(())
}

/// 校验路径非空
fn validate_paths(config: &HubConfig) -> Result<(), HubError> {
    let paths: [(&str, &Path); 4] = [
        ("device.input_path", &config.device.input_path),
        ("device.sysfs_root", &config.device.sysfs_root),
        ("calibration.mag_path", &config.calibration.mag_path),
        ("calibration.acc_path", &config.calibration.acc_path),
    ];

    for (field, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(HubError::config_validation(field, "path cannot be empty"));
        }
    }
    Ok(())
}

fn validate_queue_len(config: &HubConfig) -> Result<(), HubError> {
    if config.input_queue_len == 0 {
        return Err(HubError::config_validation(
            "input_queue_len",
            "input_queue_len must be >= 1, got 0",
        ));
    }
    Ok(())
}

/// 校验换算系数
fn validate_scale(scale: &ScaleFactors) -> Result<(), HubError> {
    let factors = [
        ("acceleration", scale.acceleration),
        ("magnetic", scale.magnetic),
        ("gyroscope", scale.gyroscope),
        ("pressure_divisor", scale.pressure_divisor),
        ("orientation", scale.orientation),
        ("rotation_vector_divisor", scale.rotation_vector_divisor),
        ("motion_vector", scale.motion_vector),
        ("magnetic_uncalibrated", scale.magnetic_uncalibrated),
        ("gyroscope_uncalibrated", scale.gyroscope_uncalibrated),
    ];

    for (name, value) in factors {
        if !value.is_finite() || value == 0.0 {
            return Err(HubError::config_validation(
                format!("scale.{name}"),
                format!("scale factor must be finite and non-zero, got {value}"),
            ));
        }
    }
    Ok(())
}

/// 校验 startup_enable 唯一性
fn validate_startup_enable(config: &HubConfig) -> Result<(), HubError> {
    let mut seen = HashSet::new();
    for (idx, kind) in config.startup_enable.iter().enumerate() {
        if !seen.insert(kind) {
            return Err(HubError::config_validation(
                format!("startup_enable[{idx}]"),
                format!("duplicate sensor kind '{kind}'"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorKind;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&HubConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_path() {
        let mut config = HubConfig::default();
        config.calibration.acc_path = PathBuf::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("calibration.acc_path"), "got: {err}");
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_queue_len() {
        let config = HubConfig {
            input_queue_len: 0,
            ..HubConfig::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("input_queue_len must be >= 1"), "got: {err}");
    }

    #[test]
    fn test_zero_scale_factor() {
        let mut config = HubConfig::default();
        config.scale.pressure_divisor = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("scale.pressure_divisor"), "got: {err}");
    }

    #[test]
    fn test_non_finite_scale_factor() {
        let mut config = HubConfig::default();
        config.scale.gyroscope = f32::NAN;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("finite"), "got: {err}");
    }

    #[test]
    fn test_duplicate_startup_kind() {
        let config = HubConfig {
            startup_enable: vec![
                SensorKind::Acceleration,
                SensorKind::Light,
                SensorKind::Acceleration,
            ],
            ..HubConfig::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("startup_enable[2]"), "got: {err}");
        assert!(err.contains("duplicate"), "got: {err}");
    }

    #[test]
    fn test_first_error_wins() {
        let mut config = HubConfig {
            input_queue_len: 0,
            ..HubConfig::default()
        };
        config.device.input_path = PathBuf::new();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("device.input_path"), "got: {err}");
    }
}

//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::HubConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    input_path: String,
    sysfs_root: String,
    input_queue_len: usize,
    startup_enable: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    input_path: config.device.input_path.display().to_string(),
                    sysfs_root: config.device.sysfs_root.display().to_string(),
                    input_queue_len: config.input_queue_len,
                    startup_enable: config
                        .startup_enable
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &HubConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.device.input_path.exists() {
        warnings.push(format!(
            "Input device {} does not exist on this machine",
            config.device.input_path.display()
        ));
    }
    if !config.device.sysfs_root.is_dir() {
        warnings.push(format!(
            "Control directory {} does not exist on this machine",
            config.device.sysfs_root.display()
        ));
    }
    if config.input_queue_len == 1 {
        warnings.push("input_queue_len = 1 - every read pulls a single event".to_string());
    }
    if config.debug_fill_block {
        warnings.push("debug_fill_block is on - every input fill is logged".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Input device: {}", summary.input_path);
            println!("  Control directory: {}", summary.sysfs_root);
            println!("  Input queue: {}", summary.input_queue_len);
            if !summary.startup_enable.is_empty() {
                println!("  Startup sensors: {}", summary.startup_enable.join(", "));
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_config() {
        let (_file, args) = args_for("input_queue_len = 8\n");
        let result = validate_config(&args);
        assert!(result.valid);
        assert_eq!(result.summary.map(|s| s.input_queue_len), Some(8));
    }

    #[test]
    fn test_invalid_config() {
        let (_file, args) = args_for("input_queue_len = 0\n");
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("input_queue_len"));
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/sensorhub.toml".into(),
            json: false,
        };
        assert!(!validate_config(&args).valid);
    }
}

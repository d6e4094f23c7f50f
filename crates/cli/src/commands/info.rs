//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{HubConfig, SensorKind};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    source: String,
    device: DeviceInfo,
    calibration: CalibrationInfo,
    input_queue_len: usize,
    startup_enable: Vec<String>,
    debug_fill_block: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorInfo>,
}

#[derive(Serialize)]
struct DeviceInfo {
    input_path: String,
    sysfs_root: String,
}

#[derive(Serialize)]
struct CalibrationInfo {
    mag_path: String,
    acc_path: String,
    load_on_start: bool,
}

#[derive(Serialize)]
struct SensorInfo {
    kind: String,
    handle: i32,
    slot: usize,
    framework_type: i32,
    initial_state: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let (config, source) = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration info");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            let config = config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (config, path.display().to_string())
        }
        None => (HubConfig::default(), "built-in defaults".to_string()),
    };

    if args.json {
        let info = build_config_info(&config, source, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, &source, args);
    }

    Ok(())
}

fn sensor_table() -> Vec<SensorInfo> {
    SensorKind::ALL
        .iter()
        .map(|kind| SensorInfo {
            kind: kind.to_string(),
            handle: kind.handle().0,
            slot: kind.slot(),
            framework_type: kind.framework_type(),
            initial_state: kind.supports_initial_state(),
        })
        .collect()
}

fn build_config_info(config: &HubConfig, source: String, args: &InfoArgs) -> ConfigInfo {
    ConfigInfo {
        source,
        device: DeviceInfo {
            input_path: config.device.input_path.display().to_string(),
            sysfs_root: config.device.sysfs_root.display().to_string(),
        },
        calibration: CalibrationInfo {
            mag_path: config.calibration.mag_path.display().to_string(),
            acc_path: config.calibration.acc_path.display().to_string(),
            load_on_start: config.calibration.load_on_start,
        },
        input_queue_len: config.input_queue_len,
        startup_enable: config
            .startup_enable
            .iter()
            .map(ToString::to_string)
            .collect(),
        debug_fill_block: config.debug_fill_block,
        sensors: if args.sensors {
            sensor_table()
        } else {
            Vec::new()
        },
    }
}

fn print_config_info(config: &HubConfig, source: &str, args: &InfoArgs) {
    println!("Sensor Hub Configuration ({source})\n");

    println!("Device");
    println!("   ├─ Input: {}", config.device.input_path.display());
    println!("   └─ Control: {}", config.device.sysfs_root.display());

    println!("\nCalibration");
    println!("   ├─ Magnetic: {}", config.calibration.mag_path.display());
    println!("   ├─ Accelerometer: {}", config.calibration.acc_path.display());
    println!("   └─ Load on start: {}", config.calibration.load_on_start);

    println!("\nRuntime");
    println!("   ├─ Input queue: {}", config.input_queue_len);
    println!("   ├─ Fill logging: {}", config.debug_fill_block);
    if config.startup_enable.is_empty() {
        println!("   └─ Startup sensors: (none)");
    } else {
        let names: Vec<String> = config.startup_enable.iter().map(ToString::to_string).collect();
        println!("   └─ Startup sensors: {}", names.join(", "));
    }

    if args.sensors {
        println!("\nSensors ({})", SensorKind::ALL.len());
        println!(
            "   {:<28} {:>6} {:>4} {:>5}  initial",
            "kind", "handle", "slot", "type"
        );
        for sensor in sensor_table() {
            println!(
                "   {:<28} {:>6} {:>4} {:>5}  {}",
                sensor.kind,
                sensor.handle,
                sensor.slot,
                sensor.framework_type,
                if sensor.initial_state { "yes" } else { "-" }
            );
        }
    }

    println!();
}

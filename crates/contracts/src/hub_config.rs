//! HubConfig - Config Loader output
//!
//! Device locations, calibration persistence, unit conversion and runtime switches.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SensorKind;

/// Complete hub configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Device locations
    #[serde(default)]
    pub device: DeviceConfig,

    /// Calibration persistence
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Raw-to-physical conversion factors
    #[serde(default)]
    pub scale: ScaleFactors,

    /// Capacity of the bounded input reader
    #[serde(default = "default_input_queue_len")]
    pub input_queue_len: usize,

    /// Sensors enabled when the hub is constructed
    #[serde(default)]
    pub startup_enable: Vec<SensorKind>,

    /// Log around every input fill
    #[serde(default)]
    pub debug_fill_block: bool,

    /// Log output format (binary only)
    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus exporter port (binary only, None = disabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            calibration: CalibrationConfig::default(),
            scale: ScaleFactors::default(),
            input_queue_len: default_input_queue_len(),
            startup_enable: Vec::new(),
            debug_fill_block: false,
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

fn default_input_queue_len() -> usize {
    4
}

/// Device locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Hub evdev node
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Hub sysfs control directory
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            sysfs_root: default_sysfs_root(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("/dev/input/event0")
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys/class/htc_sensorhub/sensor_hub/")
}

/// Persisted calibration locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Persisted magnetic calibration
    #[serde(default = "default_mag_path")]
    pub mag_path: PathBuf,

    /// Persisted accelerometer calibration
    #[serde(default = "default_acc_path")]
    pub acc_path: PathBuf,

    /// Push persisted calibration into the device at construction
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            mag_path: default_mag_path(),
            acc_path: default_acc_path(),
            load_on_start: true,
        }
    }
}

fn default_mag_path() -> PathBuf {
    PathBuf::from("/data/misc/cw_calibrator_mag.ini")
}

fn default_acc_path() -> PathBuf {
    PathBuf::from("/data/misc/cw_calibrator_acc.ini")
}

fn default_true() -> bool {
    true
}

/// Raw-to-physical conversion factors
///
/// Multipliers unless the field name says divisor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleFactors {
    /// milli-g -> m/s^2
    pub acceleration: f32,
    /// raw -> uT
    pub magnetic: f32,
    /// milli-rad/s -> rad/s
    pub gyroscope: f32,
    /// Pa -> hPa
    pub pressure_divisor: f32,
    /// centi-degrees -> degrees
    pub orientation: f32,
    /// fixed-point -> unit quaternion component
    pub rotation_vector_divisor: f32,
    /// linear acceleration and gravity, raw -> m/s^2
    pub motion_vector: f32,
    /// uncalibrated magnetic measurement and bias, raw -> uT
    pub magnetic_uncalibrated: f32,
    /// uncalibrated gyroscope measurement and bias, raw -> rad/s
    pub gyroscope_uncalibrated: f32,
}

impl ScaleFactors {
    pub const GRAVITY_EARTH: f32 = 9.806_65;
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            acceleration: Self::GRAVITY_EARTH / 1000.0,
            magnetic: 0.01,
            gyroscope: 0.001,
            pressure_divisor: 100.0,
            orientation: 0.01,
            rotation_vector_divisor: 10_000.0,
            motion_vector: 0.01,
            magnetic_uncalibrated: 0.01,
            gyroscope_uncalibrated: 0.001,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

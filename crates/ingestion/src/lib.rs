//! # Ingestion
//!
//! Linux 侧的协作者实现。
//!
//! Responsibilities:
//! - Read kernel `input_event` frames from the hub's evdev node
//! - Answer current-value queries (`EVIOCGABS`)
//! - Write `enable` / `delay_ms` commands to the hub's sysfs directory
//! - Persist calibration blobs as text
//! - Provide scripted mocks for tests
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{EvdevDevice, FileCalibrationStore, MonotonicClock, SysfsControl};
//!
//! let device = EvdevDevice::open(&config.device.input_path)?;
//! let control = SysfsControl::open(&config.device.sysfs_root)?;
//! let hub = SensorHub::new(
//!     config,
//!     Box::new(device),
//!     Box::new(control),
//!     Box::new(FileCalibrationStore),
//!     Box::new(MonotonicClock),
//! )?;
//! ```

mod clock;
mod error;
mod evdev;
pub mod mock;
mod sysfs;

// Re-exports
pub use clock::MonotonicClock;
pub use error::{IngestionError, Result};
pub use evdev::EvdevDevice;
pub use mock::{
    ControlWrite, FaultMode, FixedClock, MemoryCalibrationStore, MockInputDevice,
    RecordingControl,
};
pub use sysfs::{FileCalibrationStore, SysfsControl, DELAY_ATTRIBUTE, ENABLE_ATTRIBUTE};

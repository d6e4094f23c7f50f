//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the sensor hub workspace.
//! Business crates depend only on this crate; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Kernel input events carry a `timeval`; records are stamped in nanoseconds (i64)
//! - Synthetic records are stamped from the [`Clock`] collaborator
//!
//! ## Slot Model
//! - Every [`SensorKind`] owns exactly one slot, indexed densely from 0
//! - The slot index is what the hub writes to its control files; callers use
//!   [`SensorHandle`] values instead

mod calibration;
mod codes;
mod device;
mod error;
mod hub_config;
mod input;
mod sensor;

pub use calibration::CalibrationKind;
pub use codes::{AbsCode, RelCode};
pub use device::{AbsQuery, CalibrationStore, Clock, ControlChannel, EventSource, InputDevice};
pub use error::{ControlFault, HubError, EINVAL, EIO};
pub use hub_config::{CalibrationConfig, DeviceConfig, HubConfig, LogFormat, ScaleFactors};
pub use input::{InputEventType, RawInputEvent, TimeVal};
pub use sensor::{
    Quaternion, SensorHandle, SensorKind, SensorPayload, SensorRecord, SensorVector,
    UncalibratedVector, SENSOR_KIND_COUNT,
};

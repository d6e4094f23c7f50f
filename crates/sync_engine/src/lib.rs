//! # Sync Engine
//!
//! Sensor hub core: turns the hub's raw input stream into complete sensor
//! records and drives the per-sensor control files.
//!
//! - [`Demultiplexer`]: routes each axis code to its slot field
//! - [`flush_frame`]: commits pending slots on a sync marker
//! - [`InitialStateSampler`]: queries current values of freshly enabled sensors
//! - [`HubControl`]: serialized enable/delay writes and calibration persistence
//! - [`SensorHub`]: the facade tying them together
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::SensorHub;
//!
//! let mut hub = SensorHub::new(config, device, channel, store, clock)?;
//! hub.set_enable(SensorKind::Acceleration.handle(), true)?;
//!
//! let mut out = vec![SensorRecord::default(); 16];
//! let n = hub.read_events(&mut out)?;
//! for record in &out[..n] {
//!     // handle record
//! }
//! ```

mod aggregator;
mod control;
mod demux;
mod hub;
mod reader;
mod sampler;
mod slots;
mod units;

pub use aggregator::{flush_frame, FrameOutcome};
pub use control::{CalibrationLoad, ControlTransaction, HubControl};
pub use demux::{Demultiplexer, DemuxOutcome};
pub use hub::SensorHub;
pub use reader::InputReader;
pub use sampler::{InitialStateSampler, SYNTHETIC_PRIORITY};
pub use slots::{Slot, SlotMask, SlotTable, STATUS_ACCURACY_HIGH, STATUS_UNRELIABLE};
pub use units::{lux_from_level, Conversion, LIGHT_LEVEL_UNKNOWN};

// Re-export contracts types
pub use contracts::{HubConfig, HubError, SensorHandle, SensorKind, SensorRecord};

//! Collaborator traits
//!
//! The hub core talks to the outside world only through these traits.
//! `ingestion` provides Linux implementations and scripted mocks.

use std::io;
use std::path::Path;

use crate::{CalibrationKind, ControlFault, HubError, RawInputEvent};

/// Ordered source of raw input events
pub trait EventSource: Send {
    /// Read up to `buf.len()` events in arrival order
    ///
    /// Returns the number of events written; `Ok(0)` means nothing is available.
    fn read_into(&mut self, buf: &mut [RawInputEvent]) -> io::Result<usize>;
}

/// Current-value query for an absolute axis
pub trait AbsQuery: Send {
    /// Last value the device reported for `code`
    fn query_abs(&self, code: u16) -> io::Result<i32>;
}

/// Input device: an event stream plus its current-value query
pub trait InputDevice: EventSource + AbsQuery {}

impl<T: EventSource + AbsQuery> InputDevice for T {}

/// Hub control files
///
/// Implementations format small text commands (`"<slot> <value>\n"`).
pub trait ControlChannel: Send {
    /// Enable or disable a slot
    fn write_enable(&mut self, slot: usize, enabled: bool) -> Result<(), ControlFault>;

    /// Set a slot's sampling interval in milliseconds
    fn write_delay_ms(&mut self, slot: usize, interval_ms: i64) -> Result<(), ControlFault>;

    /// Location of a device-local attribute (calibration blobs)
    fn attribute_path(&self, attribute: &str) -> std::path::PathBuf;
}

/// Calibration blob store
pub trait CalibrationStore: Send {
    /// Read exactly `kind.value_count()` integers from `path`
    fn read(&mut self, kind: CalibrationKind, path: &Path) -> Result<Vec<i32>, HubError>;

    /// Write calibration values to `path`
    fn write(&mut self, kind: CalibrationKind, path: &Path, values: &[i32])
        -> Result<(), HubError>;
}

/// Monotonic time source (nanoseconds)
pub trait Clock: Send {
    fn now_ns(&self) -> i64;
}

//! SensorKind / SensorRecord - hub output contract
//!
//! The closed set of sensors behind the hub and the records handed upward.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of slots; one per [`SensorKind`].
pub const SENSOR_KIND_COUNT: usize = 17;

/// Sensor kind
///
/// Declaration order is slot order. Frame emission walks slots in ascending
/// index, so reordering variants changes the output order of a sync frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    #[default]
    Acceleration,
    Magnetic,
    Gyroscope,
    Light,
    Pressure,
    Orientation,
    RotationVector,
    LinearAcceleration,
    Gravity,
    MagneticUncalibrated,
    GyroscopeUncalibrated,
    GameRotationVector,
    GeomagneticRotationVector,
    SignificantMotion,
    StepDetector,
    StepCounter,
    AnyMotion,
}

impl SensorKind {
    /// All kinds in slot order
    pub const ALL: [SensorKind; SENSOR_KIND_COUNT] = [
        SensorKind::Acceleration,
        SensorKind::Magnetic,
        SensorKind::Gyroscope,
        SensorKind::Light,
        SensorKind::Pressure,
        SensorKind::Orientation,
        SensorKind::RotationVector,
        SensorKind::LinearAcceleration,
        SensorKind::Gravity,
        SensorKind::MagneticUncalibrated,
        SensorKind::GyroscopeUncalibrated,
        SensorKind::GameRotationVector,
        SensorKind::GeomagneticRotationVector,
        SensorKind::SignificantMotion,
        SensorKind::StepDetector,
        SensorKind::StepCounter,
        SensorKind::AnyMotion,
    ];

    /// Dense slot index (also the id written to the control files)
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Kind stored at a slot index
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    /// External handle exposed to callers
    pub fn handle(self) -> SensorHandle {
        let id = match self {
            SensorKind::Acceleration => 0,
            SensorKind::Magnetic => 1,
            SensorKind::Orientation => 2,
            SensorKind::Light => 3,
            SensorKind::Pressure => 4,
            SensorKind::Gyroscope => 5,
            SensorKind::RotationVector => 6,
            SensorKind::LinearAcceleration => 7,
            SensorKind::Gravity => 8,
            SensorKind::MagneticUncalibrated => 9,
            SensorKind::GyroscopeUncalibrated => 10,
            SensorKind::GameRotationVector => 11,
            SensorKind::GeomagneticRotationVector => 12,
            SensorKind::SignificantMotion => 13,
            SensorKind::StepDetector => 14,
            SensorKind::StepCounter => 15,
            SensorKind::AnyMotion => 16,
        };
        SensorHandle(id)
    }

    /// Resolve an external handle
    pub fn from_handle(handle: SensorHandle) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.handle() == handle)
    }

    /// Host framework sensor type code
    pub fn framework_type(self) -> i32 {
        match self {
            SensorKind::Acceleration => 1,
            SensorKind::Magnetic => 2,
            SensorKind::Orientation => 3,
            SensorKind::Gyroscope => 4,
            SensorKind::Light => 5,
            SensorKind::Pressure => 6,
            SensorKind::Gravity => 9,
            SensorKind::LinearAcceleration => 10,
            SensorKind::RotationVector => 11,
            SensorKind::MagneticUncalibrated => 14,
            SensorKind::GameRotationVector => 15,
            SensorKind::GyroscopeUncalibrated => 16,
            SensorKind::SignificantMotion => 17,
            SensorKind::StepDetector => 18,
            SensorKind::StepCounter => 19,
            SensorKind::GeomagneticRotationVector => 20,
            // Vendor range starts at 0x10000
            SensorKind::AnyMotion => 0x1_0001,
        }
    }

    /// Stable snake_case name
    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Acceleration => "acceleration",
            SensorKind::Magnetic => "magnetic",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Light => "light",
            SensorKind::Pressure => "pressure",
            SensorKind::Orientation => "orientation",
            SensorKind::RotationVector => "rotation_vector",
            SensorKind::LinearAcceleration => "linear_acceleration",
            SensorKind::Gravity => "gravity",
            SensorKind::MagneticUncalibrated => "magnetic_uncalibrated",
            SensorKind::GyroscopeUncalibrated => "gyroscope_uncalibrated",
            SensorKind::GameRotationVector => "game_rotation_vector",
            SensorKind::GeomagneticRotationVector => "geomagnetic_rotation_vector",
            SensorKind::SignificantMotion => "significant_motion",
            SensorKind::StepDetector => "step_detector",
            SensorKind::StepCounter => "step_counter",
            SensorKind::AnyMotion => "any_motion",
        }
    }

    /// Whether enabling this kind queries its current value and queues a synthetic record
    pub fn supports_initial_state(self) -> bool {
        matches!(
            self,
            SensorKind::Light
                | SensorKind::Pressure
                | SensorKind::Magnetic
                | SensorKind::Orientation
        )
    }

    /// Rotation-vector variants carry a derived scalar quaternion component
    pub fn is_rotation_vector(self) -> bool {
        matches!(
            self,
            SensorKind::RotationVector
                | SensorKind::GameRotationVector
                | SensorKind::GeomagneticRotationVector
        )
    }

    /// One-shot detectors disable themselves after firing
    pub fn is_one_shot(self) -> bool {
        self == SensorKind::SignificantMotion
    }

    /// Disabling these kinds persists the device-local magnetic calibration
    pub fn saves_magnetic_calibration(self) -> bool {
        matches!(
            self,
            SensorKind::Magnetic | SensorKind::Orientation | SensorKind::RotationVector
        )
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let alias = match normalized.as_str() {
            "accel" | "accelerometer" => Some(SensorKind::Acceleration),
            "mag" | "compass" => Some(SensorKind::Magnetic),
            "gyro" => Some(SensorKind::Gyroscope),
            "baro" | "barometer" => Some(SensorKind::Pressure),
            "rv" => Some(SensorKind::RotationVector),
            _ => None,
        };
        alias
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.name() == normalized)
            })
            .ok_or_else(|| format!("unknown sensor kind: {s}"))
    }
}

/// External sensor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorHandle(pub i32);

impl fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Complete record for one sensor at one sync boundary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Caller-facing handle
    pub handle: SensorHandle,

    /// Sensor kind
    pub kind: SensorKind,

    /// Host framework type code
    pub sensor_type: i32,

    /// Timestamp (nanoseconds)
    pub timestamp: i64,

    /// Converted values
    pub payload: SensorPayload,
}

/// Record payload, shaped by sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SensorPayload {
    /// Tri-axis value with accuracy status
    Vector(SensorVector),

    /// Unit quaternion (x, y, z, w)
    RotationVector(Quaternion),

    /// Uncalibrated measurement plus estimated bias
    Uncalibrated(UncalibratedVector),

    /// Single float (light level, one-shot detectors)
    Scalar { value: f32 },

    /// Monotonic step count
    StepCount { steps: u64 },
}

impl Default for SensorPayload {
    fn default() -> Self {
        SensorPayload::Scalar { value: 0.0 }
    }
}

impl SensorPayload {
    /// First three numeric values regardless of layout
    pub fn values(&self) -> [f32; 3] {
        match self {
            SensorPayload::Vector(v) => [v.x, v.y, v.z],
            SensorPayload::RotationVector(q) => [q.x, q.y, q.z],
            SensorPayload::Uncalibrated(u) => u.uncalib,
            SensorPayload::Scalar { value } => [*value, 0.0, 0.0],
            SensorPayload::StepCount { steps } => [*steps as f32, 0.0, 0.0],
        }
    }

    /// Accuracy status, when the layout carries one
    pub fn status(&self) -> Option<i8> {
        match self {
            SensorPayload::Vector(v) => Some(v.status),
            _ => None,
        }
    }
}

/// Tri-axis vector with accuracy status
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub status: i8,
}

/// Rotation quaternion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Uncalibrated reading and bias estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UncalibratedVector {
    pub uncalib: [f32; 3],
    pub bias: [f32; 3],
}

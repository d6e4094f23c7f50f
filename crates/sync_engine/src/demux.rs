//! Event demultiplexer.
//!
//! Routes each raw axis / signal update to the field of the slot it belongs to,
//! converting units on the way in.

use contracts::{AbsCode, RelCode, ScaleFactors, SensorKind};
use tracing::{debug, trace};

use crate::slots::SlotTable;
use crate::units::{self, lux_from_level, Conversion};

/// Slot field written by an absolute code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `values[index]`
    Value(usize),
    /// Accuracy status
    Status,
    /// Light level, mapped through the lux table
    LightLevel,
    /// Step count
    Steps,
}

/// Where an absolute code lands and how it is converted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub kind: SensorKind,
    pub field: Field,
    pub conversion: Conversion,
}

/// Result of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxOutcome {
    /// Slot updated and marked pending
    Updated(SensorKind),
    /// Known code carrying no reading
    Ignored,
    /// Code outside the table
    Unknown,
}

/// Event demultiplexer
#[derive(Debug, Clone)]
pub struct Demultiplexer {
    scale: ScaleFactors,
}

impl Demultiplexer {
    pub fn new(scale: ScaleFactors) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> &ScaleFactors {
        &self.scale
    }

    /// Routing table entry for an absolute code
    pub fn route(&self, code: AbsCode) -> Route {
        use AbsCode::*;
        use Field::*;

        let s = &self.scale;
        let (kind, field, conversion) = match code {
            AccX => (SensorKind::Acceleration, Value(0), Conversion::Multiply(s.acceleration)),
            AccY => (SensorKind::Acceleration, Value(1), Conversion::Multiply(s.acceleration)),
            AccZ => (SensorKind::Acceleration, Value(2), Conversion::Multiply(s.acceleration)),

            MagX => (SensorKind::Magnetic, Value(0), Conversion::Multiply(s.magnetic)),
            MagY => (SensorKind::Magnetic, Value(1), Conversion::Multiply(s.magnetic)),
            MagZ => (SensorKind::Magnetic, Value(2), Conversion::Multiply(s.magnetic)),
            MagAccuracy => (SensorKind::Magnetic, Status, Conversion::Identity),

            GyroX => (SensorKind::Gyroscope, Value(0), Conversion::Multiply(s.gyroscope)),
            GyroY => (SensorKind::Gyroscope, Value(1), Conversion::Multiply(s.gyroscope)),
            GyroZ => (SensorKind::Gyroscope, Value(2), Conversion::Multiply(s.gyroscope)),

            Light => (SensorKind::Light, LightLevel, Conversion::Identity),

            PressureX => (SensorKind::Pressure, Value(0), units::pressure(s)),
            PressureY => (SensorKind::Pressure, Value(1), units::pressure(s)),
            PressureZ => (SensorKind::Pressure, Value(2), units::pressure(s)),

            OriX => (SensorKind::Orientation, Value(0), Conversion::Multiply(s.orientation)),
            OriY => (SensorKind::Orientation, Value(1), Conversion::Multiply(s.orientation)),
            OriZ => (SensorKind::Orientation, Value(2), Conversion::Multiply(s.orientation)),
            OriAccuracy => (SensorKind::Orientation, Status, Conversion::Identity),

            RotX => rotation(SensorKind::RotationVector, 0, s),
            RotY => rotation(SensorKind::RotationVector, 1, s),
            RotZ => rotation(SensorKind::RotationVector, 2, s),

            LinX => (SensorKind::LinearAcceleration, Value(0), Conversion::Multiply(s.motion_vector)),
            LinY => (SensorKind::LinearAcceleration, Value(1), Conversion::Multiply(s.motion_vector)),
            LinZ => (SensorKind::LinearAcceleration, Value(2), Conversion::Multiply(s.motion_vector)),

            GraX => (SensorKind::Gravity, Value(0), Conversion::Multiply(s.motion_vector)),
            GraY => (SensorKind::Gravity, Value(1), Conversion::Multiply(s.motion_vector)),
            GraZ => (SensorKind::Gravity, Value(2), Conversion::Multiply(s.motion_vector)),

            MagUncalX => mag_uncal(0, s),
            MagUncalY => mag_uncal(1, s),
            MagUncalZ => mag_uncal(2, s),
            MagUncalBiasX => mag_uncal(3, s),
            MagUncalBiasY => mag_uncal(4, s),
            MagUncalBiasZ => mag_uncal(5, s),

            GyroUncalX => gyro_uncal(0, s),
            GyroUncalY => gyro_uncal(1, s),
            GyroUncalZ => gyro_uncal(2, s),
            GyroUncalBiasX => gyro_uncal(3, s),
            GyroUncalBiasY => gyro_uncal(4, s),
            GyroUncalBiasZ => gyro_uncal(5, s),

            GameRotX => rotation(SensorKind::GameRotationVector, 0, s),
            GameRotY => rotation(SensorKind::GameRotationVector, 1, s),
            GameRotZ => rotation(SensorKind::GameRotationVector, 2, s),

            GeomagRotX => rotation(SensorKind::GeomagneticRotationVector, 0, s),
            GeomagRotY => rotation(SensorKind::GeomagneticRotationVector, 1, s),
            GeomagRotZ => rotation(SensorKind::GeomagneticRotationVector, 2, s),

            StepDetector => (SensorKind::StepDetector, Value(0), Conversion::Identity),
            StepCounter => (SensorKind::StepCounter, Steps, Conversion::Identity),
        };

        Route {
            kind,
            field,
            conversion,
        }
    }

    /// Apply an absolute-axis update
    pub fn apply_abs(&self, table: &mut SlotTable, code: u16, value: i32) -> DemuxOutcome {
        let Some(abs) = AbsCode::from_code(code) else {
            return DemuxOutcome::Unknown;
        };

        let route = self.route(abs);
        match route.field {
            Field::Value(index) => {
                table.update(route.kind).values[index] = route.conversion.apply(value);
            }
            Field::Status => {
                debug!(kind = %route.kind, value, "accuracy status update");
                table.update(route.kind).status = clamp_status(value);
            }
            Field::LightLevel => match lux_from_level(value) {
                Some(lux) => {
                    trace!(level = value, lux, "light level update");
                    table.update(route.kind).values[0] = lux;
                }
                None => return DemuxOutcome::Ignored,
            },
            Field::Steps => {
                debug!(value, "step counter update");
                table.update(route.kind).steps = value.max(0) as u64;
            }
        }

        DemuxOutcome::Updated(route.kind)
    }

    /// Apply a relative discrete signal
    pub fn apply_rel(&self, table: &mut SlotTable, code: u16, value: i32) -> DemuxOutcome {
        let kind = match RelCode::from_code(code) {
            Some(RelCode::SignificantMotion) => SensorKind::SignificantMotion,
            Some(RelCode::AnyMotion) => SensorKind::AnyMotion,
            None => return DemuxOutcome::Unknown,
        };

        debug!(kind = %kind, code, value, "motion signal");
        table.update(kind).values[0] = 1.0;
        DemuxOutcome::Updated(kind)
    }
}

fn rotation(kind: SensorKind, index: usize, s: &ScaleFactors) -> (SensorKind, Field, Conversion) {
    (
        kind,
        Field::Value(index),
        Conversion::Divide(s.rotation_vector_divisor),
    )
}

fn mag_uncal(index: usize, s: &ScaleFactors) -> (SensorKind, Field, Conversion) {
    (
        SensorKind::MagneticUncalibrated,
        Field::Value(index),
        Conversion::Multiply(s.magnetic_uncalibrated),
    )
}

fn gyro_uncal(index: usize, s: &ScaleFactors) -> (SensorKind, Field, Conversion) {
    (
        SensorKind::GyroscopeUncalibrated,
        Field::Value(index),
        Conversion::Multiply(s.gyroscope_uncalibrated),
    )
}

/// Accuracy status fits in an i8
pub(crate) fn clamp_status(value: i32) -> i8 {
    value.clamp(i8::MIN as i32, i8::MAX as i32) as i8
}

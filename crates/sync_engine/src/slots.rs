//! Per-sensor slot table with pending / enabled bitsets.
//!
//! One slot per [`SensorKind`], stored densely in slot order. The bitsets are
//! fixed-width since the slot count fits in a machine word.

use std::fmt;
use std::ops::BitOrAssign;

use contracts::{
    Quaternion, SensorKind, SensorPayload, SensorRecord, SensorVector, UncalibratedVector,
    SENSOR_KIND_COUNT,
};

use crate::units::quaternion_w;

/// Accuracy status: readings unreliable
pub const STATUS_UNRELIABLE: i8 = 0;
/// Accuracy status: high accuracy
pub const STATUS_ACCURACY_HIGH: i8 = 3;

const _: () = assert!(SENSOR_KIND_COUNT <= u32::BITS as usize);

/// One bit per slot
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotMask(u32);

impl SlotMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn set(&mut self, kind: SensorKind) {
        self.0 |= 1 << kind.slot();
    }

    #[inline]
    pub fn clear(&mut self, kind: SensorKind) {
        self.0 &= !(1 << kind.slot());
    }

    /// Set or clear in one call
    #[inline]
    pub fn assign(&mut self, kind: SensorKind, on: bool) {
        if on {
            self.set(kind);
        } else {
            self.clear(kind);
        }
    }

    #[inline]
    pub fn contains(&self, kind: SensorKind) -> bool {
        self.0 & (1 << kind.slot()) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = SensorKind> + '_ {
        SensorKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }
}

impl BitOrAssign for SlotMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SlotMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Latest values for one sensor kind
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    kind: SensorKind,
    /// Numeric fields; uncalibrated kinds keep the bias in 3..6
    pub values: [f32; 6],
    pub status: i8,
    pub steps: u64,
    pub timestamp: i64,
}

impl Slot {
    fn new(kind: SensorKind) -> Self {
        let status = match kind {
            SensorKind::Orientation
            | SensorKind::LinearAcceleration
            | SensorKind::Gravity
            | SensorKind::RotationVector
            | SensorKind::GameRotationVector
            | SensorKind::GeomagneticRotationVector
            | SensorKind::MagneticUncalibrated
            | SensorKind::GyroscopeUncalibrated => STATUS_ACCURACY_HIGH,
            _ => STATUS_UNRELIABLE,
        };
        Self {
            kind,
            values: [0.0; 6],
            status,
            steps: 0,
            timestamp: 0,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Fill the derived scalar component of rotation-vector kinds
    pub fn complete_rotation_vector(&mut self) {
        if self.kind.is_rotation_vector() {
            self.values[3] = quaternion_w(self.values[0], self.values[1], self.values[2]);
        }
    }

    /// Snapshot the slot as an output record
    pub fn to_record(&self) -> SensorRecord {
        let v = &self.values;
        let payload = match self.kind {
            SensorKind::Acceleration
            | SensorKind::Magnetic
            | SensorKind::Gyroscope
            | SensorKind::Pressure
            | SensorKind::Orientation
            | SensorKind::LinearAcceleration
            | SensorKind::Gravity => SensorPayload::Vector(SensorVector {
                x: v[0],
                y: v[1],
                z: v[2],
                status: self.status,
            }),
            SensorKind::RotationVector
            | SensorKind::GameRotationVector
            | SensorKind::GeomagneticRotationVector => SensorPayload::RotationVector(Quaternion {
                x: v[0],
                y: v[1],
                z: v[2],
                w: v[3],
            }),
            SensorKind::MagneticUncalibrated | SensorKind::GyroscopeUncalibrated => {
                SensorPayload::Uncalibrated(UncalibratedVector {
                    uncalib: [v[0], v[1], v[2]],
                    bias: [v[3], v[4], v[5]],
                })
            }
            SensorKind::Light
            | SensorKind::SignificantMotion
            | SensorKind::StepDetector
            | SensorKind::AnyMotion => SensorPayload::Scalar { value: v[0] },
            SensorKind::StepCounter => SensorPayload::StepCount { steps: self.steps },
        };

        SensorRecord {
            handle: self.kind.handle(),
            kind: self.kind,
            sensor_type: self.kind.framework_type(),
            timestamp: self.timestamp,
            payload,
        }
    }
}

/// Slot table plus pending / enabled sets
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: [Slot; SENSOR_KIND_COUNT],
    pending: SlotMask,
    enabled: SlotMask,
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotTable {
    /// Allocate every slot with zeroed payload
    pub fn new() -> Self {
        Self {
            slots: SensorKind::ALL.map(Slot::new),
            pending: SlotMask::empty(),
            enabled: SlotMask::empty(),
        }
    }

    #[inline]
    pub fn slot(&self, kind: SensorKind) -> &Slot {
        &self.slots[kind.slot()]
    }

    /// Mutable slot access; marks the slot pending
    #[inline]
    pub fn update(&mut self, kind: SensorKind) -> &mut Slot {
        self.pending.set(kind);
        &mut self.slots[kind.slot()]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, kind: SensorKind) -> &mut Slot {
        &mut self.slots[kind.slot()]
    }

    #[inline]
    pub fn pending(&self) -> SlotMask {
        self.pending
    }

    #[inline]
    pub(crate) fn take_pending(&mut self, kind: SensorKind) -> bool {
        let was_pending = self.pending.contains(kind);
        self.pending.clear(kind);
        was_pending
    }

    #[inline]
    pub fn enabled(&self) -> SlotMask {
        self.enabled
    }

    #[inline]
    pub fn is_enabled(&self, kind: SensorKind) -> bool {
        self.enabled.contains(kind)
    }

    /// Record the requested enable state; pending bits are left alone
    #[inline]
    pub fn set_enabled(&mut self, kind: SensorKind, on: bool) {
        self.enabled.assign(kind, on);
    }
}

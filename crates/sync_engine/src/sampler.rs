//! Initial-state sampler
//!
//! Queries the current value of a freshly enabled sensor and queues one
//! synthetic record so the consumer sees a value right away.

use contracts::{AbsCode, AbsQuery, ScaleFactors, SensorKind, SensorRecord};
use tracing::{debug, warn};

use crate::demux::clamp_status;
use crate::slots::{SlotMask, SlotTable};
use crate::units::{self, lux_from_level};

/// Order synthetic records are served in
pub const SYNTHETIC_PRIORITY: [SensorKind; 4] = [
    SensorKind::Pressure,
    SensorKind::Light,
    SensorKind::Magnetic,
    SensorKind::Orientation,
];

const PRESSURE_AXES: [AbsCode; 3] = [AbsCode::PressureX, AbsCode::PressureY, AbsCode::PressureZ];

/// Synthetic-pending flags
#[derive(Debug, Default)]
pub struct InitialStateSampler {
    synthetic: SlotMask,
}

impl InitialStateSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query `kind`'s current value and queue a synthetic record on success
    ///
    /// Returns whether a record was queued. Kinds without a queryable value
    /// and failed queries leave every flag untouched.
    pub fn sample<Q: AbsQuery + ?Sized>(
        &mut self,
        kind: SensorKind,
        table: &mut SlotTable,
        device: &Q,
        scale: &ScaleFactors,
    ) -> bool {
        let queued = match kind {
            SensorKind::Light => sample_light(table, device),
            SensorKind::Pressure => sample_pressure(table, device, scale),
            SensorKind::Magnetic => sample_status(kind, AbsCode::MagAccuracy, table, device),
            SensorKind::Orientation => sample_status(kind, AbsCode::OriAccuracy, table, device),
            _ => false,
        };

        if queued {
            debug!(kind = %kind, "initial state queued");
            self.synthetic.set(kind);
        }
        queued
    }

    /// Whether any synthetic record is waiting
    pub fn has_pending(&self) -> bool {
        !self.synthetic.is_empty()
    }

    pub fn pending(&self) -> SlotMask {
        self.synthetic
    }

    /// Serve queued synthetic records in priority order, stamped with `now`
    ///
    /// Flags of slots disabled since sampling are dropped without output.
    /// Flags not reached for lack of room stay raised.
    pub fn drain(&mut self, table: &mut SlotTable, now: i64, out: &mut [SensorRecord]) -> usize {
        let mut served = 0;

        for kind in SYNTHETIC_PRIORITY {
            if served == out.len() {
                break;
            }
            if !self.synthetic.contains(kind) {
                continue;
            }
            self.synthetic.clear(kind);

            if !table.is_enabled(kind) {
                debug!(kind = %kind, "synthetic record dropped, sensor disabled");
                continue;
            }

            let slot = table.slot_mut(kind);
            slot.timestamp = now;
            out[served] = slot.to_record();
            served += 1;
            observability::record_synthetic_record(kind);
        }

        served
    }
}

fn sample_light<Q: AbsQuery + ?Sized>(table: &mut SlotTable, device: &Q) -> bool {
    match device.query_abs(AbsCode::Light.code()) {
        Ok(level) => match lux_from_level(level) {
            Some(lux) => {
                table.update(SensorKind::Light).values[0] = lux;
                true
            }
            None => {
                debug!(level, "light level unknown, nothing queued");
                false
            }
        },
        Err(e) => {
            warn!(error = %e, "cannot query initial light level");
            false
        }
    }
}

/// Axes that fail read as zero; one good axis is enough to queue a record
fn sample_pressure<Q: AbsQuery + ?Sized>(
    table: &mut SlotTable,
    device: &Q,
    scale: &ScaleFactors,
) -> bool {
    let conversion = units::pressure(scale);
    let mut values = [0.0f32; 3];
    let mut any = false;

    for (value, axis) in values.iter_mut().zip(PRESSURE_AXES) {
        match device.query_abs(axis.code()) {
            Ok(raw) => {
                *value = conversion.apply(raw);
                any = true;
            }
            Err(e) => {
                warn!(axis = ?axis, error = %e, "cannot query initial pressure axis");
            }
        }
    }

    if any {
        table.update(SensorKind::Pressure).values[..3].copy_from_slice(&values);
    } else {
        table.slot_mut(SensorKind::Pressure).values[..3].copy_from_slice(&values);
    }
    any
}

fn sample_status<Q: AbsQuery + ?Sized>(
    kind: SensorKind,
    code: AbsCode,
    table: &mut SlotTable,
    device: &Q,
) -> bool {
    match device.query_abs(code.code()) {
        Ok(status) => {
            table.update(kind).status = clamp_status(status);
            true
        }
        Err(e) => {
            warn!(kind = %kind, error = %e, "cannot query initial accuracy status");
            false
        }
    }
}

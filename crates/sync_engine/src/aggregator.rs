//! Frame aggregator: commits pending slots on a sync marker.

use contracts::{SensorKind, SensorRecord};
use tracing::{instrument, trace};

use crate::slots::{SlotMask, SlotTable};

/// What one flush did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Records written to the output buffer
    pub emitted: usize,
    /// One-shot slots consumed by this scan, to be disabled once it is over
    pub self_disable: SlotMask,
    /// Pending slots consumed without emission because they were disabled
    pub stale: SlotMask,
}

/// Flush pending slots into `out` in ascending slot order
///
/// Stops when `out` is full or nothing is pending; slots not reached keep
/// their pending bit. Every slot reached is stamped with `timestamp` and has
/// its derived fields completed, but only enabled slots are written out.
#[instrument(
    level = "trace",
    name = "frame_flush",
    skip(table, out),
    fields(pending = table.pending().bits(), capacity = out.len())
)]
pub fn flush_frame(table: &mut SlotTable, timestamp: i64, out: &mut [SensorRecord]) -> FrameOutcome {
    let mut outcome = FrameOutcome::default();

    for kind in SensorKind::ALL {
        if outcome.emitted == out.len() || table.pending().is_empty() {
            break;
        }
        if !table.take_pending(kind) {
            continue;
        }

        if kind.is_one_shot() {
            outcome.self_disable.set(kind);
        }

        let enabled = table.is_enabled(kind);
        let slot = table.slot_mut(kind);
        slot.timestamp = timestamp;
        slot.complete_rotation_vector();

        if !enabled {
            trace!(kind = %kind, "stale update dropped");
            outcome.stale.set(kind);
            continue;
        }

        out[outcome.emitted] = slot.to_record();
        outcome.emitted += 1;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorPayload;

    fn buffer(n: usize) -> Vec<SensorRecord> {
        vec![SensorRecord::default(); n]
    }

    #[test]
    fn test_emits_enabled_pending_only() {
        let mut table = SlotTable::new();
        table.set_enabled(SensorKind::Acceleration, true);
        table.update(SensorKind::Acceleration).values[0] = 1.0;
        table.update(SensorKind::Gyroscope).values[0] = 2.0;

        let mut out = buffer(4);
        let outcome = flush_frame(&mut table, 1000, &mut out);

        assert_eq!(outcome.emitted, 1);
        assert_eq!(out[0].kind, SensorKind::Acceleration);
        assert_eq!(out[0].timestamp, 1000);
        assert!(outcome.stale.contains(SensorKind::Gyroscope));
        assert!(table.pending().is_empty());
    }

    #[test]
    fn test_second_flush_is_empty() {
        let mut table = SlotTable::new();
        table.set_enabled(SensorKind::Light, true);
        table.update(SensorKind::Light);

        let mut out = buffer(4);
        assert_eq!(flush_frame(&mut table, 1, &mut out).emitted, 1);
        assert_eq!(flush_frame(&mut table, 2, &mut out).emitted, 0);
    }

    #[test]
    fn test_capacity_limits_and_keeps_rest_pending() {
        let mut table = SlotTable::new();
        for kind in [SensorKind::Gyroscope, SensorKind::Acceleration] {
            table.set_enabled(kind, true);
            table.update(kind);
        }

        let mut out = buffer(1);
        let outcome = flush_frame(&mut table, 5, &mut out);

        assert_eq!(outcome.emitted, 1);
        assert_eq!(out[0].kind, SensorKind::Acceleration);
        assert!(table.pending().contains(SensorKind::Gyroscope));
    }

    #[test]
    fn test_ascending_slot_order() {
        let mut table = SlotTable::new();
        let kinds = [
            SensorKind::StepCounter,
            SensorKind::Magnetic,
            SensorKind::RotationVector,
            SensorKind::Acceleration,
        ];
        for kind in kinds {
            table.set_enabled(kind, true);
            table.update(kind);
        }

        let mut out = buffer(8);
        let outcome = flush_frame(&mut table, 0, &mut out);
        let order: Vec<_> = out[..outcome.emitted].iter().map(|r| r.kind).collect();
        assert_eq!(
            order,
            vec![
                SensorKind::Acceleration,
                SensorKind::Magnetic,
                SensorKind::RotationVector,
                SensorKind::StepCounter,
            ]
        );
    }

    #[test]
    fn test_rotation_vector_w_clamped() {
        let mut table = SlotTable::new();
        table.set_enabled(SensorKind::RotationVector, true);
        table.update(SensorKind::RotationVector).values[..3].copy_from_slice(&[0.8, 0.8, 0.0]);

        let mut out = buffer(1);
        flush_frame(&mut table, 0, &mut out);
        match out[0].payload {
            SensorPayload::RotationVector(q) => assert_eq!(q.w, 0.0),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_significant_motion_requests_disable() {
        let mut table = SlotTable::new();
        table.set_enabled(SensorKind::SignificantMotion, true);
        table.update(SensorKind::SignificantMotion).values[0] = 1.0;

        let mut out = buffer(2);
        let outcome = flush_frame(&mut table, 0, &mut out);
        assert_eq!(outcome.emitted, 1);
        assert!(outcome.self_disable.contains(SensorKind::SignificantMotion));
        // applying it is the caller's job
        assert!(table.is_enabled(SensorKind::SignificantMotion));
    }

    #[test]
    fn test_disabled_significant_motion_still_requests_disable() {
        let mut table = SlotTable::new();
        table.update(SensorKind::SignificantMotion).values[0] = 1.0;

        let mut out = buffer(2);
        let outcome = flush_frame(&mut table, 0, &mut out);
        assert_eq!(outcome.emitted, 0);
        assert!(outcome.stale.contains(SensorKind::SignificantMotion));
        assert!(outcome.self_disable.contains(SensorKind::SignificantMotion));
    }

    #[test]
    fn test_zero_capacity_consumes_nothing() {
        let mut table = SlotTable::new();
        table.update(SensorKind::Acceleration);
        let outcome = flush_frame(&mut table, 0, &mut []);
        assert_eq!(outcome, FrameOutcome::default());
        assert!(table.pending().contains(SensorKind::Acceleration));
    }
}

//! Control context
//!
//! Owns the control channel and calibration store behind one lock. Every
//! control operation runs inside a [`ControlTransaction`], so commands from
//! concurrent callers never interleave on the shared control files.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use contracts::{
    CalibrationConfig, CalibrationKind, CalibrationStore, ControlChannel, ControlFault, HubError,
    SensorKind,
};
use tracing::{debug, error, info, warn};

struct ControlState {
    channel: Box<dyn ControlChannel>,
    store: Box<dyn CalibrationStore>,
}

/// Shared control context
pub struct HubControl {
    state: Mutex<ControlState>,
    calibration: CalibrationConfig,
}

impl fmt::Debug for HubControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubControl")
            .field("calibration", &self.calibration)
            .finish_non_exhaustive()
    }
}

/// Which persisted calibration blobs reached the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationLoad {
    pub magnetic: bool,
    pub accelerometer: bool,
}

impl HubControl {
    pub fn new(
        channel: Box<dyn ControlChannel>,
        store: Box<dyn CalibrationStore>,
        calibration: CalibrationConfig,
    ) -> Self {
        Self {
            state: Mutex::new(ControlState { channel, store }),
            calibration,
        }
    }

    pub fn calibration(&self) -> &CalibrationConfig {
        &self.calibration
    }

    /// Acquire the control lock for one operation
    pub fn transaction(&self) -> Result<ControlTransaction<'_>, HubError> {
        let guard = self.state.lock().map_err(|_| HubError::LockPoisoned)?;
        Ok(ControlTransaction {
            state: guard,
            calibration: &self.calibration,
        })
    }
}

/// Exclusive access to the control files; released on drop
pub struct ControlTransaction<'a> {
    state: MutexGuard<'a, ControlState>,
    calibration: &'a CalibrationConfig,
}

impl ControlTransaction<'_> {
    pub fn write_enable(&mut self, kind: SensorKind, on: bool) -> Result<(), ControlFault> {
        let result = self.state.channel.write_enable(kind.slot(), on);
        if let Err(e) = &result {
            error!(kind = %kind, on, error = %e, "enable write failed");
            observability::record_control_failure("enable");
        }
        result
    }

    pub fn write_delay(&mut self, kind: SensorKind, interval_ms: i64) -> Result<(), ControlFault> {
        let result = self.state.channel.write_delay_ms(kind.slot(), interval_ms);
        if let Err(e) = &result {
            error!(kind = %kind, interval_ms, error = %e, "delay write failed");
            observability::record_control_failure("delay");
        }
        result
    }

    /// Push persisted calibration into the device
    ///
    /// Missing or malformed data is skipped. An all-zero accelerometer blob is
    /// treated as "never calibrated" and not written.
    pub fn load_persisted_calibration(&mut self) -> CalibrationLoad {
        let mut load = CalibrationLoad::default();

        match self.copy_to_device(CalibrationKind::Magnetic, |_| true) {
            Ok(written) => load.magnetic = written,
            Err(e) => info!(error = %e, "no persisted magnetic calibration"),
        }

        match self.copy_to_device(CalibrationKind::Accelerometer, |values| {
            values.iter().any(|v| *v != 0)
        }) {
            Ok(written) => load.accelerometer = written,
            Err(e) => info!(error = %e, "no persisted accelerometer calibration"),
        }

        load
    }

    fn copy_to_device(
        &mut self,
        kind: CalibrationKind,
        accept: impl Fn(&[i32]) -> bool,
    ) -> Result<bool, HubError> {
        let persisted = self.persisted_path(kind)?;
        let ControlState { channel, store } = &mut *self.state;

        let values = store.read(kind, &persisted)?;
        if !accept(&values) {
            debug!(kind = ?kind, "persisted calibration not applied");
            return Ok(false);
        }

        let device = channel.attribute_path(kind.device_attribute());
        if let Err(e) = store.write(kind, &device, &values) {
            error!(kind = ?kind, error = %e, "failed to load calibration into device");
            observability::record_control_failure("calibration_load");
            return Ok(false);
        }

        info!(kind = ?kind, path = %persisted.display(), "calibration loaded into device");
        Ok(true)
    }

    /// Copy the device-local magnetic calibration to durable storage
    pub fn persist_magnetic_calibration(&mut self) -> Result<(), HubError> {
        let kind = CalibrationKind::Magnetic;
        let persisted = self.persisted_path(kind)?;
        let ControlState { channel, store } = &mut *self.state;

        let device = channel.attribute_path(kind.device_attribute());
        let values = store.read(kind, &device).inspect_err(|e| {
            warn!(error = %e, "device magnetic calibration unavailable");
        })?;

        store.write(kind, &persisted, &values).inspect_err(|e| {
            error!(error = %e, "failed to persist magnetic calibration");
            observability::record_control_failure("calibration_save");
        })?;

        info!(path = %persisted.display(), "magnetic calibration saved");
        Ok(())
    }

    fn persisted_path(&self, kind: CalibrationKind) -> Result<std::path::PathBuf, HubError> {
        match kind {
            CalibrationKind::Magnetic => Ok(self.calibration.mag_path.clone()),
            CalibrationKind::Accelerometer => Ok(self.calibration.acc_path.clone()),
            CalibrationKind::Gyroscope => Err(HubError::calibration(
                kind,
                "no persisted location configured",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestion::{ControlWrite, MemoryCalibrationStore, RecordingControl};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn device_path(kind: CalibrationKind) -> PathBuf {
        PathBuf::from(RecordingControl::ROOT).join(kind.device_attribute())
    }

    fn control() -> (HubControl, RecordingControl, MemoryCalibrationStore) {
        let channel = RecordingControl::new();
        let store = MemoryCalibrationStore::new();
        let control = HubControl::new(
            Box::new(channel.clone()),
            Box::new(store.clone()),
            CalibrationConfig::default(),
        );
        (control, channel, store)
    }

    #[test]
    fn test_enable_uses_slot_index() {
        let (control, channel, _) = control();
        let mut tx = control.transaction().unwrap();
        tx.write_enable(SensorKind::Light, true).unwrap();
        tx.write_delay(SensorKind::Light, 200).unwrap();
        drop(tx);

        assert_eq!(
            channel.writes(),
            vec![
                ControlWrite::Enable { slot: 3, enabled: true },
                ControlWrite::Delay { slot: 3, interval_ms: 200 },
            ]
        );
    }

    #[test]
    fn test_load_persisted_calibration() {
        let (control, _, store) = control();
        let config = CalibrationConfig::default();
        let mag: Vec<i32> = (0..26).collect();
        store.insert(&config.mag_path, mag.clone());
        store.insert(&config.acc_path, vec![4, 5, 6]);

        let load = control.transaction().unwrap().load_persisted_calibration();
        assert_eq!(
            load,
            CalibrationLoad {
                magnetic: true,
                accelerometer: true
            }
        );
        assert_eq!(store.get(device_path(CalibrationKind::Magnetic)), Some(mag));
        assert_eq!(
            store.get(device_path(CalibrationKind::Accelerometer)),
            Some(vec![4, 5, 6])
        );
    }

    #[test]
    fn test_zero_accelerometer_calibration_skipped() {
        let (control, _, store) = control();
        store.insert(&CalibrationConfig::default().acc_path, vec![0, 0, 0]);

        let load = control.transaction().unwrap().load_persisted_calibration();
        assert_eq!(load, CalibrationLoad::default());
        assert_eq!(store.get(device_path(CalibrationKind::Accelerometer)), None);
    }

    #[test]
    fn test_short_magnetic_calibration_skipped() {
        let (control, _, store) = control();
        store.insert(&CalibrationConfig::default().mag_path, vec![1, 2, 3]);

        let load = control.transaction().unwrap().load_persisted_calibration();
        assert!(!load.magnetic);
        assert_eq!(store.get(device_path(CalibrationKind::Magnetic)), None);
    }

    #[test]
    fn test_persist_magnetic_calibration() {
        let (control, _, store) = control();
        let values: Vec<i32> = (100..126).collect();
        store.insert(device_path(CalibrationKind::Magnetic), values.clone());

        control
            .transaction()
            .unwrap()
            .persist_magnetic_calibration()
            .unwrap();
        assert_eq!(store.get(&CalibrationConfig::default().mag_path), Some(values));
    }

    #[test]
    fn test_persist_without_device_data_fails() {
        let (control, _, _) = control();
        assert!(control
            .transaction()
            .unwrap()
            .persist_magnetic_calibration()
            .is_err());
    }

    #[test]
    fn test_transactions_serialize_across_threads() {
        let (control, channel, _) = control();
        let control = Arc::new(control);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let control = Arc::clone(&control);
                std::thread::spawn(move || {
                    let mut tx = control.transaction().unwrap();
                    tx.write_enable(SensorKind::ALL[i], true).unwrap();
                    tx.write_enable(SensorKind::ALL[i], false).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // each on/off pair is contiguous
        let writes = channel.enable_writes();
        assert_eq!(writes.len(), 8);
        for pair in writes.chunks(2) {
            assert_eq!(pair[0].0, pair[1].0);
            assert!(pair[0].1 && !pair[1].1);
        }
    }
}

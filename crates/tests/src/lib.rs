//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需真实传感器集线器）
//! - 文件系统控制与校准往返测试

#[cfg(test)]
mod contract_tests {
    use contracts::{HubConfig, SensorHandle, SensorKind, SENSOR_KIND_COUNT};

    #[test]
    fn test_handles_round_trip() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_handle(kind.handle()), Some(kind));
        }
        assert_eq!(SensorKind::from_handle(SensorHandle(-1)), None);
        assert_eq!(
            SensorKind::from_handle(SensorHandle(SENSOR_KIND_COUNT as i32 + 100)),
            None
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config_loader::ConfigLoader::validate(&HubConfig::default()).is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        AbsCode, HubConfig, RawInputEvent, RelCode, SensorKind, SensorPayload, SensorRecord,
    };
    use ingestion::{FixedClock, MemoryCalibrationStore, MockInputDevice, RecordingControl};
    use observability::HubMetricsAggregator;
    use sync_engine::{HubControl, SensorHub};

    const HUB_TOML: &str = r#"
input_queue_len = 3
startup_enable = ["magnetic", "light"]

[calibration]
load_on_start = false
"#;

    fn hub_from_toml(device: &MockInputDevice, control: &RecordingControl) -> SensorHub {
        let config = ConfigLoader::load_from_str(HUB_TOML, ConfigFormat::Toml).unwrap();
        SensorHub::new(
            config,
            Box::new(device.clone()),
            Box::new(control.clone()),
            Box::new(MemoryCalibrationStore::new()),
            Box::new(FixedClock::new(7)),
        )
        .unwrap()
    }

    fn mag_frame(value: i32, timestamp: i64) -> [RawInputEvent; 4] {
        [
            RawInputEvent::abs(AbsCode::MagX.code(), value),
            RawInputEvent::abs(AbsCode::MagY.code(), value),
            RawInputEvent::abs(AbsCode::MagZ.code(), value),
            RawInputEvent::sync(timestamp),
        ]
    }

    /// Read with a small buffer until the device and the hub's queue are both empty
    fn drain(hub: &mut SensorHub, device: &MockInputDevice, capacity: usize) -> Vec<SensorRecord> {
        let mut buffer = vec![SensorRecord::default(); capacity];
        let mut records = Vec::new();
        for _ in 0..256 {
            let n = hub.read_events(&mut buffer).unwrap();
            records.extend_from_slice(&buffer[..n]);
            if n == 0 && hub.queued_events() == 0 && device.queued() == 0 {
                break;
            }
        }
        records
    }

    /// Startup sensors -> synthetic records -> streamed frames through a tiny queue
    #[test]
    fn test_e2e_mock_hub() {
        let device = MockInputDevice::new();
        device.set_abs(AbsCode::Light.code(), 2);
        device.set_abs(AbsCode::MagAccuracy.code(), 3);
        let control = RecordingControl::new();
        let mut hub = hub_from_toml(&device, &control);

        assert_eq!(
            hub.enabled_kinds(),
            vec![SensorKind::Magnetic, SensorKind::Light]
        );
        assert!(hub.has_pending_events());

        for t in 1..=5 {
            device.push_all(mag_frame(t as i32 * 100, t * 1_000_000));
        }

        let records = drain(&mut hub, &device, 2);

        // synthetic records come first, in priority order
        assert_eq!(records[0].kind, SensorKind::Light);
        assert_eq!(records[0].timestamp, 7);
        assert_eq!(records[1].kind, SensorKind::Magnetic);
        assert_eq!(records[1].payload.status(), Some(3));

        // every magnetic frame arrives once, in order, despite the 3-event queue
        let mag: Vec<(i64, f32)> = records[2..]
            .iter()
            .filter(|r| r.kind == SensorKind::Magnetic)
            .map(|r| (r.timestamp, r.payload.values()[0]))
            .collect();
        assert_eq!(mag.len(), 5);
        for (idx, (timestamp, x)) in mag.iter().enumerate() {
            let t = idx as i64 + 1;
            assert_eq!(*timestamp, t * 1_000_000);
            assert!((x - t as f32).abs() < 1e-5, "frame {t}: {x}");
        }

        // the light slot was marked pending by sampling and re-emits on the first sync
        assert!(records[2..]
            .iter()
            .any(|r| r.kind == SensorKind::Light && r.timestamp == 1_000_000));
        assert!(!hub.has_pending_events());
        assert_eq!(device.queued(), 0);
    }

    #[test]
    fn test_metrics_aggregator_over_hub_output() {
        let device = MockInputDevice::new();
        let control = RecordingControl::new();
        let mut hub = hub_from_toml(&device, &control);
        hub.set_enable(SensorKind::StepCounter.handle(), true).unwrap();

        for t in 1..=4 {
            device.push_all([
                RawInputEvent::abs(AbsCode::StepCounter.code(), t * 10),
                RawInputEvent::sync(t as i64 * 20_000_000),
            ]);
        }

        let mut aggregator = HubMetricsAggregator::new();
        let mut buffer = vec![SensorRecord::default(); 8];
        for _ in 0..4 {
            let n = hub.read_events(&mut buffer).unwrap();
            aggregator.update(&buffer[..n]);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.kind_counts, vec![(SensorKind::StepCounter, 4)]);
        let (_, interval) = &summary.interval_ms[0];
        assert!((interval.mean - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_significant_motion_fires_once() {
        let device = MockInputDevice::new();
        let control = RecordingControl::new();
        let mut hub = hub_from_toml(&device, &control);
        hub.set_enable(SensorKind::SignificantMotion.handle(), true)
            .unwrap();

        for t in 1..=3 {
            device.push_all([
                RawInputEvent::rel(RelCode::SignificantMotion.code(), 1),
                RawInputEvent::sync(t),
            ]);
        }

        let records = drain(&mut hub, &device, 4);
        let fired: Vec<_> = records
            .iter()
            .filter(|r| r.kind == SensorKind::SignificantMotion)
            .collect();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].payload, SensorPayload::Scalar { value: 1.0 });
        assert!(!hub.is_enabled(SensorKind::SignificantMotion.handle()));
    }

    /// Two hubs on one control context never interleave their writes
    #[test]
    fn test_shared_control_across_threads() {
        let control = RecordingControl::new();
        let shared = Arc::new(HubControl::new(
            Box::new(control.clone()),
            Box::new(MemoryCalibrationStore::new()),
            HubConfig::default().calibration,
        ));

        let workers: Vec<_> = [SensorKind::Acceleration, SensorKind::Gyroscope]
            .into_iter()
            .map(|kind| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let mut hub = SensorHub::with_control(
                        HubConfig::default(),
                        Box::new(MockInputDevice::new()),
                        shared,
                        Box::new(FixedClock::new(0)),
                    )
                    .unwrap();
                    for _ in 0..50 {
                        hub.set_enable(kind.handle(), true).unwrap();
                        hub.set_delay(kind.handle(), 10_000_000).unwrap();
                        hub.set_enable(kind.handle(), false).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(control.writes().len(), 2 * 50 * 3);
        assert_eq!(control.enable_writes().len(), 2 * 50 * 2);
    }

    /// The hub is driven from a blocking task, the way the binary runs it
    #[tokio::test]
    async fn test_hub_in_blocking_task() {
        let device = MockInputDevice::new();
        let control = RecordingControl::new();
        let mut hub = hub_from_toml(&device, &control);
        hub.set_enable(SensorKind::Acceleration.handle(), true)
            .unwrap();
        device.push_all([
            RawInputEvent::abs(AbsCode::AccX.code(), 1000),
            RawInputEvent::sync(99),
        ]);

        let records = tokio::task::spawn_blocking(move || drain(&mut hub, &device, 4))
            .await
            .unwrap();
        assert!(records
            .iter()
            .any(|r| r.kind == SensorKind::Acceleration && r.timestamp == 99));

        // dropping the hub inside the task disabled everything it had enabled
        let last_writes = control.enable_writes();
        assert!(last_writes.contains(&(SensorKind::Acceleration.slot(), false)));
    }
}

#[cfg(test)]
mod sysfs_tests {
    use std::fs;

    use contracts::{CalibrationKind, HubConfig, SensorKind};
    use ingestion::{
        FileCalibrationStore, MockInputDevice, MonotonicClock, SysfsControl, DELAY_ATTRIBUTE,
        ENABLE_ATTRIBUTE,
    };
    use sync_engine::SensorHub;

    fn control_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ENABLE_ATTRIBUTE), "").unwrap();
        fs::write(dir.path().join(DELAY_ATTRIBUTE), "").unwrap();
        dir
    }

    fn config_in(sysfs: &tempfile::TempDir, data: &tempfile::TempDir) -> HubConfig {
        let mut config = HubConfig::default();
        config.device.sysfs_root = sysfs.path().to_path_buf();
        config.calibration.mag_path = data.path().join("mag.ini");
        config.calibration.acc_path = data.path().join("acc.ini");
        config
    }

    fn hub(config: HubConfig) -> SensorHub {
        let control = SysfsControl::open(&config.device.sysfs_root).unwrap();
        SensorHub::new(
            config,
            Box::new(MockInputDevice::new()),
            Box::new(control),
            Box::new(FileCalibrationStore),
            Box::new(MonotonicClock),
        )
        .unwrap()
    }

    #[test]
    fn test_calibration_loaded_at_construction() {
        let sysfs = control_dir();
        let data = tempfile::tempdir().unwrap();
        let config = config_in(&sysfs, &data);

        let mag: Vec<String> = (1..=26).map(|v| v.to_string()).collect();
        fs::write(&config.calibration.mag_path, mag.join(" ")).unwrap();
        fs::write(&config.calibration.acc_path, "0 0 0\n").unwrap();

        let _hub = hub(config);

        let device_mag = sysfs
            .path()
            .join(CalibrationKind::Magnetic.device_attribute());
        let written = fs::read_to_string(device_mag).unwrap();
        assert_eq!(written.split_whitespace().count(), 26);
        assert!(written.starts_with("1 2 3"));

        // all-zero accelerometer data is never pushed
        let device_acc = sysfs
            .path()
            .join(CalibrationKind::Accelerometer.device_attribute());
        assert!(!device_acc.exists());
    }

    #[test]
    fn test_magnetic_calibration_persisted_on_disable() {
        let sysfs = control_dir();
        let data = tempfile::tempdir().unwrap();
        let config = config_in(&sysfs, &data);
        let mag_path = config.calibration.mag_path.clone();

        let device_values: Vec<String> = (100..126).map(|v| v.to_string()).collect();
        fs::write(
            sysfs
                .path()
                .join(CalibrationKind::Magnetic.device_attribute()),
            device_values.join(" "),
        )
        .unwrap();

        let mut hub = hub(config);
        hub.set_enable(SensorKind::RotationVector.handle(), true)
            .unwrap();
        hub.set_enable(SensorKind::RotationVector.handle(), false)
            .unwrap();

        let persisted = fs::read_to_string(mag_path).unwrap();
        assert_eq!(persisted.trim(), device_values.join(" "));
    }

    #[test]
    fn test_missing_control_files_leave_sensor_disabled() {
        let sysfs = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        let mut hub = hub(config_in(&sysfs, &data));

        hub.set_enable(SensorKind::Gyroscope.handle(), true).unwrap();
        assert!(!hub.is_enabled(SensorKind::Gyroscope.handle()));
    }

    #[test]
    fn test_enable_writes_command_line() {
        let sysfs = control_dir();
        let data = tempfile::tempdir().unwrap();
        let mut hub = hub(config_in(&sysfs, &data));

        hub.set_enable(SensorKind::Light.handle(), true).unwrap();
        let enable = fs::read_to_string(sysfs.path().join(ENABLE_ATTRIBUTE)).unwrap();
        assert_eq!(enable, "3 1\n");
        assert!(hub.is_enabled(SensorKind::Light.handle()));
    }
}

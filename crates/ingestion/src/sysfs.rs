//! Hub sysfs control files and calibration persistence

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::{CalibrationKind, CalibrationStore, ControlChannel, ControlFault, HubError};
use tracing::{debug, trace};

use crate::error::{IngestionError, Result};

/// Enable / disable command file
pub const ENABLE_ATTRIBUTE: &str = "enable";
/// Sampling interval command file
pub const DELAY_ATTRIBUTE: &str = "delay_ms";

/// Control channel backed by the hub's sysfs directory
///
/// Every command opens the attribute, writes one line and closes it again.
#[derive(Debug, Clone)]
pub struct SysfsControl {
    root: PathBuf,
}

impl SysfsControl {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(IngestionError::ControlRootMissing { path: root });
        }
        debug!(root = %root.display(), "control directory opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_command(&self, attribute: &str, command: &str) -> std::result::Result<(), ControlFault> {
        let path = self.root.join(attribute);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(ControlFault::Unavailable)?;

        trace!(path = %path.display(), command = command.trim_end(), "control write");
        file.write_all(command.as_bytes())
            .map_err(ControlFault::WriteFailed)
    }
}

impl ControlChannel for SysfsControl {
    fn write_enable(&mut self, slot: usize, enabled: bool) -> std::result::Result<(), ControlFault> {
        self.write_command(ENABLE_ATTRIBUTE, &format!("{} {}\n", slot, u8::from(enabled)))
    }

    fn write_delay_ms(&mut self, slot: usize, interval_ms: i64) -> std::result::Result<(), ControlFault> {
        self.write_command(DELAY_ATTRIBUTE, &format!("{} {}\n", slot, interval_ms))
    }

    fn attribute_path(&self, attribute: &str) -> PathBuf {
        self.root.join(attribute)
    }
}

/// Calibration store over plain text files
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCalibrationStore;

impl CalibrationStore for FileCalibrationStore {
    fn read(&mut self, kind: CalibrationKind, path: &Path) -> std::result::Result<Vec<i32>, HubError> {
        let text = fs::read_to_string(path)?;
        kind.parse(&text)
    }

    fn write(
        &mut self,
        kind: CalibrationKind,
        path: &Path,
        values: &[i32],
    ) -> std::result::Result<(), HubError> {
        let text = kind.format(values)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ENABLE_ATTRIBUTE), "").unwrap();
        fs::write(dir.path().join(DELAY_ATTRIBUTE), "").unwrap();
        dir
    }

    #[test]
    fn test_enable_command_format() {
        let dir = control_dir();
        let mut control = SysfsControl::open(dir.path()).unwrap();

        control.write_enable(3, true).unwrap();
        let written = fs::read_to_string(dir.path().join(ENABLE_ATTRIBUTE)).unwrap();
        assert_eq!(written, "3 1\n");
    }

    #[test]
    fn test_delay_command_format() {
        let dir = control_dir();
        let mut control = SysfsControl::open(dir.path()).unwrap();

        control.write_delay_ms(0, 20).unwrap();
        let written = fs::read_to_string(dir.path().join(DELAY_ATTRIBUTE)).unwrap();
        assert_eq!(written, "0 20\n");
    }

    #[test]
    fn test_missing_attribute_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut control = SysfsControl::open(dir.path()).unwrap();

        let err = control.write_enable(0, true).unwrap_err();
        assert!(!err.descriptor_obtained());
    }

    #[test]
    fn test_missing_root() {
        let err = SysfsControl::open("/nonexistent/sensor_hub").unwrap_err();
        assert!(matches!(err, IngestionError::ControlRootMissing { .. }));
    }

    #[test]
    fn test_calibration_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acc.ini");
        let mut store = FileCalibrationStore;

        store
            .write(CalibrationKind::Accelerometer, &path, &[1, -2, 3])
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 -2 3\n");
        assert_eq!(
            store.read(CalibrationKind::Accelerometer, &path).unwrap(),
            vec![1, -2, 3]
        );
    }

    #[test]
    fn test_short_calibration_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mag.ini");
        fs::write(&path, "1 2 3").unwrap();

        let mut store = FileCalibrationStore;
        assert!(store.read(CalibrationKind::Magnetic, &path).is_err());
    }
}

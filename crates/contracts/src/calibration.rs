//! Calibration blob contract
//!
//! Calibration data is an ordered list of integers whose length is fixed per kind.
//! On disk it is whitespace-separated decimal text.

use serde::{Deserialize, Serialize};

use crate::HubError;

/// Calibration data kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationKind {
    Accelerometer,
    Gyroscope,
    Magnetic,
}

impl CalibrationKind {
    /// Exact number of integers this kind carries
    pub fn value_count(self) -> usize {
        match self {
            CalibrationKind::Accelerometer | CalibrationKind::Gyroscope => 3,
            CalibrationKind::Magnetic => 26,
        }
    }

    /// Device attribute holding the device-local copy
    pub fn device_attribute(self) -> &'static str {
        match self {
            CalibrationKind::Accelerometer => "calibrator_data_acc",
            CalibrationKind::Gyroscope => "calibrator_data_gyro",
            CalibrationKind::Magnetic => "calibrator_data_mag",
        }
    }

    /// Parse calibration text
    ///
    /// Takes the first `value_count()` integers; trailing tokens are ignored.
    /// Short input or a malformed token before the count is reached is rejected.
    pub fn parse(self, text: &str) -> Result<Vec<i32>, HubError> {
        let expected = self.value_count();
        let mut values = Vec::with_capacity(expected);

        for token in text.split_whitespace().take(expected) {
            let value = token.parse::<i32>().map_err(|e| {
                HubError::calibration(
                    self,
                    format!("token {} ({token:?}) is not an integer: {e}", values.len()),
                )
            })?;
            values.push(value);
        }

        if values.len() != expected {
            return Err(HubError::calibration(
                self,
                format!("expected {expected} values, got {}", values.len()),
            ));
        }

        Ok(values)
    }

    /// Render calibration text
    pub fn format(self, values: &[i32]) -> Result<String, HubError> {
        let expected = self.value_count();
        if values.len() < expected {
            return Err(HubError::calibration(
                self,
                format!("expected {expected} values, got {}", values.len()),
            ));
        }

        let mut text = values[..expected]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        text.push('\n');
        Ok(text)
    }
}

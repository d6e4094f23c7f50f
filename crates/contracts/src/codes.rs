//! Hub event codes
//!
//! Absolute-axis and relative-signal codes emitted by the sensor hub's input device.

use serde::{Deserialize, Serialize};

/// Absolute-axis code (`EV_ABS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum AbsCode {
    AccX = 0x00,
    AccY = 0x01,
    AccZ = 0x02,
    MagX = 0x03,
    MagY = 0x04,
    MagZ = 0x05,
    MagAccuracy = 0x06,
    GyroX = 0x07,
    GyroY = 0x08,
    GyroZ = 0x09,
    Light = 0x0a,
    PressureX = 0x0b,
    PressureY = 0x0c,
    PressureZ = 0x0d,
    OriX = 0x0e,
    OriY = 0x0f,
    OriZ = 0x10,
    OriAccuracy = 0x11,
    RotX = 0x12,
    RotY = 0x13,
    RotZ = 0x14,
    LinX = 0x15,
    LinY = 0x16,
    LinZ = 0x17,
    GraX = 0x18,
    GraY = 0x19,
    GraZ = 0x1a,
    MagUncalX = 0x1b,
    MagUncalY = 0x1c,
    MagUncalZ = 0x1d,
    MagUncalBiasX = 0x1e,
    MagUncalBiasY = 0x1f,
    MagUncalBiasZ = 0x20,
    GyroUncalX = 0x21,
    GyroUncalY = 0x22,
    GyroUncalZ = 0x23,
    GyroUncalBiasX = 0x24,
    GyroUncalBiasY = 0x25,
    GyroUncalBiasZ = 0x26,
    GameRotX = 0x27,
    GameRotY = 0x28,
    GameRotZ = 0x29,
    GeomagRotX = 0x2a,
    GeomagRotY = 0x2b,
    GeomagRotZ = 0x2c,
    StepDetector = 0x2d,
    StepCounter = 0x2e,
}

impl AbsCode {
    /// Every known absolute code
    pub const ALL: [AbsCode; 47] = [
        AbsCode::AccX,
        AbsCode::AccY,
        AbsCode::AccZ,
        AbsCode::MagX,
        AbsCode::MagY,
        AbsCode::MagZ,
        AbsCode::MagAccuracy,
        AbsCode::GyroX,
        AbsCode::GyroY,
        AbsCode::GyroZ,
        AbsCode::Light,
        AbsCode::PressureX,
        AbsCode::PressureY,
        AbsCode::PressureZ,
        AbsCode::OriX,
        AbsCode::OriY,
        AbsCode::OriZ,
        AbsCode::OriAccuracy,
        AbsCode::RotX,
        AbsCode::RotY,
        AbsCode::RotZ,
        AbsCode::LinX,
        AbsCode::LinY,
        AbsCode::LinZ,
        AbsCode::GraX,
        AbsCode::GraY,
        AbsCode::GraZ,
        AbsCode::MagUncalX,
        AbsCode::MagUncalY,
        AbsCode::MagUncalZ,
        AbsCode::MagUncalBiasX,
        AbsCode::MagUncalBiasY,
        AbsCode::MagUncalBiasZ,
        AbsCode::GyroUncalX,
        AbsCode::GyroUncalY,
        AbsCode::GyroUncalZ,
        AbsCode::GyroUncalBiasX,
        AbsCode::GyroUncalBiasY,
        AbsCode::GyroUncalBiasZ,
        AbsCode::GameRotX,
        AbsCode::GameRotY,
        AbsCode::GameRotZ,
        AbsCode::GeomagRotX,
        AbsCode::GeomagRotY,
        AbsCode::GeomagRotZ,
        AbsCode::StepDetector,
        AbsCode::StepCounter,
    ];

    /// Raw code value
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Decode a raw code; `None` for codes outside the table
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.get(code as usize).copied().filter(|c| c.code() == code)
    }
}

/// Relative-signal code (`EV_REL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum RelCode {
    /// Shares the kernel's `REL_WHEEL` slot
    SignificantMotion = 0x08,
    AnyMotion = 0x09,
}

impl RelCode {
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x08 => Some(RelCode::SignificantMotion),
            0x09 => Some(RelCode::AnyMotion),
            _ => None,
        }
    }
}

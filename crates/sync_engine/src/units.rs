//! Raw-to-physical unit conversion.

use contracts::ScaleFactors;

/// Light level reported when the hub has no reading
pub const LIGHT_LEVEL_UNKNOWN: i32 = -1;

/// Illuminance (lux) per hub light level
const LUX_TABLE: [f32; 10] = [
    0.0, 10.0, 40.0, 90.0, 160.0, 225.0, 320.0, 640.0, 1280.0, 2600.0,
];

/// Map a hub light level to lux
///
/// Only [`LIGHT_LEVEL_UNKNOWN`] yields `None`. Any other level outside the
/// table, negative ones included, clamps to the last entry.
pub fn lux_from_level(level: i32) -> Option<f32> {
    if level == LIGHT_LEVEL_UNKNOWN {
        return None;
    }
    let index = usize::try_from(level).map_or(LUX_TABLE.len() - 1, |i| i.min(LUX_TABLE.len() - 1));
    Some(LUX_TABLE[index])
}

/// How a raw axis value becomes a physical value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    Multiply(f32),
    Divide(f32),
    Identity,
}

impl Conversion {
    #[inline]
    pub fn apply(self, raw: i32) -> f32 {
        let raw = raw as f32;
        match self {
            Conversion::Multiply(factor) => raw * factor,
            Conversion::Divide(divisor) => raw / divisor,
            Conversion::Identity => raw,
        }
    }
}

/// Pressure conversion, shared by the demultiplexer and the initial-state query
pub fn pressure(scale: &ScaleFactors) -> Conversion {
    Conversion::Divide(scale.pressure_divisor)
}

/// Scalar quaternion component from the three vector components
///
/// Never negative: when rounding pushes the vector norm past one, the
/// component clamps to zero.
pub fn quaternion_w(x: f32, y: f32, z: f32) -> f32 {
    let w2 = 1.0 - x * x - y * y - z * z;
    if w2 > 0.0 {
        w2.sqrt()
    } else {
        0.0
    }
}

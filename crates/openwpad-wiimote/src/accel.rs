//! Accelerometer calibration constants.

use serde::{Deserialize, Serialize};

/// Raw 10-bit sample reported at rest on an axis.
pub const ACCEL_ZERO_G: u16 = 0x80 << 2;
/// Raw 10-bit sample reported under one g.
pub const ACCEL_ONE_G: u16 = 0x9A << 2;

/// Per-axis magnitude of one g, as reported by the host query
/// `acc_gravity_unit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravityUnit {
    pub acceleration: [i16; 3],
}

impl GravityUnit {
    pub const ZERO: Self = Self {
        acceleration: [0; 3],
    };

    /// Every axis reports [`ACCEL_ONE_G`].
    pub const ONE_G: Self = Self::uniform(0x9A << 2);

    pub const fn uniform(value: i16) -> Self {
        Self {
            acceleration: [value; 3],
        }
    }
}

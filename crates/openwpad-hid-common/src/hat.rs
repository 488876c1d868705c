//! D-pad hat expansion.
//!
//! Many HID gamepads report the D-pad as an 8-way hat angle: 0 is up and
//! the value increases clockwise in 45 degree steps. Values 8 and above
//! mean the pad is centred.

use serde::{Deserialize, Serialize};

/// Hat value reported when no direction is held.
pub const HAT_CENTERED: u8 = 0x08;

/// Four independent directional booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dpad {
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
}

impl Dpad {
    /// Expand a hat angle with range tests.
    ///
    /// Diagonals set both neighbouring directions. Out-of-range angles
    /// yield no direction.
    pub fn from_hat(angle: u8) -> Self {
        Self {
            up: angle == 7 || angle <= 1,
            right: (1..=3).contains(&angle),
            down: (3..=5).contains(&angle),
            left: (5..=7).contains(&angle),
        }
    }

    pub fn is_centered(self) -> bool {
        !(self.up || self.right || self.down || self.left)
    }

    /// Full-deflection 8-bit stick position `[x, y]`, centred at 0x80.
    /// Y grows upward.
    pub fn as_stick(self) -> [u8; 2] {
        let axis = |negative: bool, positive: bool| match (negative, positive) {
            (true, false) => 0x00,
            (false, true) => 0xFF,
            _ => 0x80,
        };
        [axis(self.left, self.right), axis(self.down, self.up)]
    }
}

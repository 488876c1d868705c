//! Per-kind encoders.
//!
//! Each encoder routes buttons and axes through the caller's tables and
//! packs the result with the record's own truncation rules. Stick slots
//! and turntable velocities nobody routes read centred (0x80); every other
//! slot reads zero.

use openwpad_hid_common::ButtonSet;
use openwpad_wiimote::{ClassicRecord, DrumRecord, GuitarRecord, NunchukRecord, TurntableRecord};
use serde::Serialize;

use crate::remap::{map_axes, map_buttons};

/// 1-based target axis slots for each record kind.
pub mod axis {
    pub const UNMAPPED: u8 = 0;

    pub mod nunchuk {
        pub const X: u8 = 1;
        pub const Y: u8 = 2;
        pub const COUNT: usize = 2;
    }

    pub mod classic {
        pub const LEFT_X: u8 = 1;
        pub const LEFT_Y: u8 = 2;
        pub const RIGHT_X: u8 = 3;
        pub const RIGHT_Y: u8 = 4;
        pub const COUNT: usize = 4;
    }

    pub mod guitar {
        pub const STICK_X: u8 = 1;
        pub const STICK_Y: u8 = 2;
        pub const TAP_BAR: u8 = 3;
        pub const WHAMMY_BAR: u8 = 4;
        pub const COUNT: usize = 4;
    }

    pub mod drum {
        pub const STICK_X: u8 = 1;
        pub const STICK_Y: u8 = 2;
        pub const VELOCITY_SELECTOR: u8 = 3;
        pub const VELOCITY: u8 = 4;
        pub const COUNT: usize = 4;
    }

    pub mod turntable {
        pub const STICK_X: u8 = 1;
        pub const STICK_Y: u8 = 2;
        pub const LEFT_TURNTABLE: u8 = 3;
        pub const RIGHT_TURNTABLE: u8 = 4;
        pub const CROSS_FADER: u8 = 5;
        pub const EFFECTS_DIAL: u8 = 6;
        pub const COUNT: usize = 6;
    }
}

/// Unrouted stick slots read 0x80 so the host sees a centred stick, not one pinned to the edge.
const CENTER: u8 = 0x80;

/// A family's tables for one target kind.
///
/// `wiimote` holds Wii Remote report bits for the core buttons, `buttons`
/// the extension bits and `axes` the 1-based slot routing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExtensionMapping<B: 'static = u16> {
    pub wiimote: &'static [u16],
    pub buttons: &'static [B],
    pub axes: &'static [u8],
}

pub fn encode_nunchuk(
    buttons: ButtonSet,
    button_table: &[u8],
    axes: &[u8],
    axis_table: &[u8],
    accel: [u16; 3],
) -> NunchukRecord {
    let routed = map_axes(axes, axis_table, [CENTER; axis::nunchuk::COUNT]);
    NunchukRecord::from_inputs(map_buttons(buttons, button_table), routed, accel)
}

pub fn encode_classic(
    buttons: ButtonSet,
    button_table: &[u16],
    axes: &[u8],
    axis_table: &[u8],
) -> ClassicRecord {
    let routed = map_axes(axes, axis_table, [CENTER; axis::classic::COUNT]);
    ClassicRecord::from_axes(map_buttons(buttons, button_table), routed)
}

pub fn encode_guitar(
    buttons: ButtonSet,
    button_table: &[u16],
    axes: &[u8],
    axis_table: &[u8],
) -> GuitarRecord {
    let routed = map_axes(axes, axis_table, [CENTER, CENTER, 0, 0]);
    GuitarRecord::from_axes(map_buttons(buttons, button_table), routed)
}

pub fn encode_drum(
    buttons: ButtonSet,
    button_table: &[u16],
    axes: &[u8],
    axis_table: &[u8],
) -> DrumRecord {
    let routed = map_axes(axes, axis_table, [CENTER, CENTER, 0, 0]);
    DrumRecord::from_axes(map_buttons(buttons, button_table), routed)
}

pub fn encode_turntable(
    buttons: ButtonSet,
    button_table: &[u16],
    axes: &[u8],
    axis_table: &[u8],
) -> TurntableRecord {
    let routed = map_axes(axes, axis_table, [CENTER, CENTER, CENTER, CENTER, 0, 0]);
    TurntableRecord::from_axes(map_buttons(buttons, button_table), routed)
}

//! Logical DualShock state shared by both generations, and its classic
//! controller translation.

use openwpad_button_map::{ExtensionMapping, axis, encode_classic, map_wiimote};
use openwpad_hid_common::{ButtonSet, LogicalButton};
use openwpad_wiimote::buttons::classic;
use openwpad_wiimote::{
    ClassicData, ClassicRecord, DataFormat, Extension, ExtensionData, GravityUnit, WpadData,
};
use serde::{Deserialize, Serialize};

pub const EXTENSION: Extension = Extension::Classic;
pub const DATA_FORMAT: DataFormat = DataFormat::Classic;
pub const GRAVITY_UNIT: GravityUnit = GravityUnit::ONE_G;

/// Logical DualShock buttons, in table order. Select and start cover the
/// DualShock 4's share and options buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PadButton {
    Cross,
    Circle,
    Square,
    Triangle,
    L1,
    R1,
    L2,
    R2,
    L3,
    R3,
    Select,
    Start,
    Ps,
    Up,
    Down,
    Left,
    Right,
    Touchpad,
}

impl LogicalButton for PadButton {
    fn index(self) -> u8 {
        self as u8
    }
}

/// Source axes: `[left X, left Y, right X, right Y]`.
pub const AXIS_COUNT: usize = 4;

/// DualShock to classic controller tables. The Wii Remote itself gets no
/// buttons.
pub const CLASSIC_MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[],
    buttons: &[
        classic::A,
        classic::B,
        classic::Y,
        classic::X,
        classic::ZL,
        classic::ZR,
        classic::FULL_L,
        classic::FULL_R,
        0,
        0,
        classic::MINUS,
        classic::PLUS,
        classic::HOME,
        classic::UP,
        classic::DOWN,
        classic::LEFT,
        classic::RIGHT,
        0,
    ],
    axes: &[
        axis::classic::LEFT_X,
        axis::classic::LEFT_Y,
        axis::classic::RIGHT_X,
        axis::classic::RIGHT_Y,
    ],
};

/// Host record stick value: the 8-bit axis widened to 10 bits around zero.
pub fn host_stick(value: u8) -> i16 {
    (i16::from(value) << 2) - 512
}

/// One poll's worth of DualShock input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamepadState {
    pub buttons: ButtonSet,
    pub sticks: [u8; AXIS_COUNT],
    /// Analog L2/R2 travel.
    pub triggers: [u8; 2],
}

impl GamepadState {
    pub fn extension_record(&self) -> ClassicRecord {
        encode_classic(
            self.buttons,
            CLASSIC_MAPPING.buttons,
            &self.sticks,
            CLASSIC_MAPPING.axes,
        )
    }

    pub fn wpad_data(&self) -> WpadData {
        let record = self.extension_record();
        let [lx, ly, rx, ry] = self.sticks;
        WpadData {
            buttons: map_wiimote(self.buttons, CLASSIC_MAPPING.wiimote),
            extension: EXTENSION,
            ext: ExtensionData::Classic(ClassicData {
                buttons: record.buttons,
                left_stick: [host_stick(lx), host_stick(ly)],
                right_stick: [host_stick(rx), host_stick(ry)],
                trigger: self.triggers,
            }),
            ..WpadData::default()
        }
    }
}

//! XInput DJ Hero turntable payload.
//!
//! # Payload layout
//! | Offset | Size | Field          | Encoding                                           |
//! |--------|------|----------------|----------------------------------------------------|
//! | 2      | u8   | buttons 1      | back 0x20, start 0x10, d-pad low nibble            |
//! | 3      | u8   | buttons 2      | Y/euphoria 0x80, X 0x40, B 0x20, A 0x10, guide 0x04 |
//! | 4      | u8   | left keys      | blue 0x04, red 0x02, green 0x01                    |
//! | 5      | u8   | right keys     | blue 0x04, red 0x02, green 0x01                    |
//! | 6–9    | i16  | platters       | LE velocity, left then right, 0 = stopped          |
//! | 10–11  | i16  | effects knob   | LE, wraps                                          |
//! | 12–13  | i16  | cross fader    | LE                                                 |
//!
//! A, B and X press the matching key on both decks.

use openwpad_button_map::{ExtensionMapping, axis, encode_turntable, map_wiimote};
use openwpad_hid_common::{ButtonSet, Dpad, LogicalButton};
use openwpad_wiimote::buttons::{turntable, wiimote};
use openwpad_wiimote::{ExtensionData, TurntableData, TurntableRecord, WpadData};
use serde::{Deserialize, Serialize};

use crate::subtype::Layout;
use crate::{PAYLOAD_LEN, ParseError, dpad, fixed, i16_le, offset_binary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TurntableButton {
    A,
    B,
    X,
    Euphoria,
    Back,
    Start,
    LeftGreen,
    LeftRed,
    LeftBlue,
    RightGreen,
    RightRed,
    RightBlue,
    Up,
    Down,
    Left,
    Right,
    Guide,
}

impl LogicalButton for TurntableButton {
    fn index(self) -> u8 {
        self as u8
    }
}

pub const AXIS_COUNT: usize = 6;

pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, wiimote::HOME,
    ],
    buttons: &[
        turntable::LEFT_GREEN | turntable::RIGHT_GREEN,
        turntable::LEFT_RED | turntable::RIGHT_RED,
        turntable::LEFT_BLUE | turntable::RIGHT_BLUE,
        turntable::EUPHORIA,
        turntable::MINUS,
        turntable::PLUS,
        turntable::LEFT_GREEN,
        turntable::LEFT_RED,
        turntable::LEFT_BLUE,
        turntable::RIGHT_GREEN,
        turntable::RIGHT_RED,
        turntable::RIGHT_BLUE,
        0,
        0,
        0,
        0,
        0,
    ],
    axes: &[
        axis::turntable::STICK_X,
        axis::turntable::STICK_Y,
        axis::turntable::LEFT_TURNTABLE,
        axis::turntable::RIGHT_TURNTABLE,
        axis::turntable::CROSS_FADER,
        axis::turntable::EFFECTS_DIAL,
    ],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurntableReport {
    pub buttons: ButtonSet,
    /// `[left, right]` platter velocity.
    pub platters: [i16; 2],
    pub effects: i16,
    pub cross_fader: i16,
}

pub fn parse(payload: &[u8]) -> Result<TurntableReport, ParseError> {
    let r = fixed::<PAYLOAD_LEN>(payload)?;
    let pad = dpad(r[2]);
    let mut buttons = ButtonSet::EMPTY;
    for (button, held) in [
        (TurntableButton::Up, pad.up),
        (TurntableButton::Down, pad.down),
        (TurntableButton::Left, pad.left),
        (TurntableButton::Right, pad.right),
        (TurntableButton::Start, r[2] & 0x10 != 0),
        (TurntableButton::Back, r[2] & 0x20 != 0),
        (TurntableButton::Guide, r[3] & 0x04 != 0),
        (TurntableButton::A, r[3] & 0x10 != 0),
        (TurntableButton::B, r[3] & 0x20 != 0),
        (TurntableButton::X, r[3] & 0x40 != 0),
        (TurntableButton::Euphoria, r[3] & 0x80 != 0),
        (TurntableButton::LeftGreen, r[4] & 0x01 != 0),
        (TurntableButton::LeftRed, r[4] & 0x02 != 0),
        (TurntableButton::LeftBlue, r[4] & 0x04 != 0),
        (TurntableButton::RightGreen, r[5] & 0x01 != 0),
        (TurntableButton::RightRed, r[5] & 0x02 != 0),
        (TurntableButton::RightBlue, r[5] & 0x04 != 0),
    ] {
        buttons.set(button, held);
    }
    Ok(TurntableReport {
        buttons,
        platters: [i16_le(r[6], r[7]), i16_le(r[8], r[9])],
        effects: i16_le(r[10], r[11]),
        cross_fader: i16_le(r[12], r[13]),
    })
}

/// Platter velocity as an offset-binary byte, saturating at ±127.
fn platter_axis(velocity: i16) -> u8 {
    let clamped = i8::try_from(velocity).unwrap_or(if velocity < 0 { i8::MIN } else { i8::MAX });
    clamped.to_be_bytes()[0] ^ 0x80
}

/// 6-bit record velocities `[left, right]` of the XInput platters.
///
/// The left platter is `V >> 3` with its direction in bit 4 of the shifted
/// value. The right platter is `V >> 4` and reports backward while bit 5 of
/// the shifted value is clear. Either way the direction lands in bit 5 of
/// the record field.
fn platter_velocities(platters: [i16; 2]) -> [u8; 2] {
    let [left, right] = platters;
    let left = (left >> 3).to_le_bytes()[0];
    let right = (right >> 4).to_le_bytes()[0];
    let left_sign = u8::from(left & 0x10 != 0) << 5;
    let right_sign = u8::from(right & 0x20 == 0) << 5;
    [(left & 0x1F) | left_sign, (right & 0x1F) | right_sign]
}

impl TurntableReport {
    pub fn axes(&self) -> [u8; AXIS_COUNT] {
        let [x, y] = dpad_of(self.buttons).as_stick();
        let [left, right] = self.platters.map(platter_axis);
        [
            x,
            y,
            left,
            right,
            offset_binary(self.cross_fader),
            offset_binary(self.effects),
        ]
    }

    pub fn extension_record(&self) -> TurntableRecord {
        let record = encode_turntable(self.buttons, MAPPING.buttons, &self.axes(), MAPPING.axes);
        let [left_turntable, right_turntable] = platter_velocities(self.platters);
        TurntableRecord {
            left_turntable,
            right_turntable,
            ..record
        }
    }

    pub fn wpad_data(&self) -> WpadData {
        let record = self.extension_record();
        let ltt_sign = if record.left_turntable & 0x20 != 0 {
            turntable::LTT_SIGN
        } else {
            0
        };
        let stick = |axis: u8| i16::from(axis & 0x3F) - 32;
        WpadData {
            buttons: map_wiimote(self.buttons, MAPPING.wiimote),
            extension: Layout::Turntable.extension(),
            ext: ExtensionData::Turntable(TurntableData {
                buttons: record.buttons | ltt_sign,
                stick: [stick(record.stick_x), stick(record.stick_y)],
                right_turntable: record.right_turntable & 0x1F,
                right_sign: record.right_turntable & 0x20 != 0,
                cross_fader: record.crossfade,
                effects_dial: record.effects,
                left_turntable: record.left_turntable & 0x1F,
            }),
            ..WpadData::default()
        }
    }
}

fn dpad_of(buttons: ButtonSet) -> Dpad {
    Dpad {
        up: buttons.contains(TurntableButton::Up),
        right: buttons.contains(TurntableButton::Right),
        down: buttons.contains(TurntableButton::Down),
        left: buttons.contains(TurntableButton::Left),
    }
}

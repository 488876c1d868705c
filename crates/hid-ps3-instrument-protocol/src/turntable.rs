//! DJ Hero turntable input report.
//!
//! # Report layout
//! | Offset | Size | Field          | Encoding                                           |
//! |--------|------|----------------|----------------------------------------------------|
//! | 0      | u8   | face           | euphoria 0x08, circle 0x04, cross 0x02, square 0x01 |
//! | 1      | u8   | system         | PS 0x10, start 0x02, select 0x01                   |
//! | 2      | u8   | hat            | 0 = up, clockwise, 8+ = centred                    |
//! | 5      | u8   | left platter   | offset binary, 0x80 = stopped                      |
//! | 6      | u8   | right platter  | offset binary, 0x80 = stopped                      |
//! | 15–16  | u16  | effects knob   | LE, 10-bit                                         |
//! | 17–18  | u16  | cross fader    | LE, 10-bit                                         |
//! | 19     | u8   | platter keys   | right G/R/B 0x80/0x40/0x20, left G/R/B 0x10/0x08/0x04 |
//! | 20     | u8   | platter state  | table neutral 0x40                                 |
//!
//! The face buttons double as the platter keys of both decks: cross is
//! green, circle red and square blue.

use openwpad_button_map::{ExtensionMapping, axis, encode_turntable, map_wiimote};
use openwpad_hid_common::{ButtonSet, Dpad, LogicalButton};
use openwpad_wiimote::buttons::{turntable, wiimote};
use openwpad_wiimote::{
    DataFormat, Extension, ExtensionData, GravityUnit, TurntableData, TurntableRecord, WpadData,
};
use serde::{Deserialize, Serialize};

use crate::{ParseError, fixed, host_stick};

/// Bytes of the turntable report that carry data.
pub const REPORT_LEN: usize = 23;

pub const EXTENSION: Extension = Extension::Turntable;
pub const DATA_FORMAT: DataFormat = DataFormat::Turntable;
pub const GRAVITY_UNIT: GravityUnit = GravityUnit::ZERO;

/// Logical turntable buttons, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TurntableButton {
    Square,
    Cross,
    Circle,
    Euphoria,
    Select,
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
    Ps,
}

impl LogicalButton for TurntableButton {
    fn index(self) -> u8 {
        self as u8
    }
}

/// Source axes: `[stick X, stick Y, left platter, right platter,
/// cross fader, effects knob]`.
pub const AXIS_COUNT: usize = 6;

const BOTH_GREEN: u16 = turntable::LEFT_GREEN | turntable::RIGHT_GREEN;
const BOTH_RED: u16 = turntable::LEFT_RED | turntable::RIGHT_RED;
const BOTH_BLUE: u16 = turntable::LEFT_BLUE | turntable::RIGHT_BLUE;

/// Turntable to Wii turntable extension tables.
pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, wiimote::HOME,
    ],
    buttons: &[
        BOTH_BLUE,
        BOTH_GREEN,
        BOTH_RED,
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

/// Decoded turntable report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurntableReport {
    pub square: bool,
    pub cross: bool,
    pub circle: bool,
    pub euphoria: bool,
    pub select: bool,
    pub start: bool,
    pub ps: bool,
    pub hat: u8,
    pub left_green: bool,
    pub left_red: bool,
    pub left_blue: bool,
    pub right_green: bool,
    pub right_red: bool,
    pub right_blue: bool,
    pub table_neutral: bool,
    pub left_velocity: u8,
    pub right_velocity: u8,
    /// 10 bits
    pub effects_knob: u16,
    /// 10 bits
    pub cross_fader: u16,
}

/// Parse a turntable report. Bytes past [`REPORT_LEN`] are ignored.
pub fn parse(data: &[u8]) -> Result<TurntableReport, ParseError> {
    let r = fixed::<REPORT_LEN>(data)?;
    Ok(TurntableReport {
        square: r[0] & 0x01 != 0,
        cross: r[0] & 0x02 != 0,
        circle: r[0] & 0x04 != 0,
        euphoria: r[0] & 0x08 != 0,
        select: r[1] & 0x01 != 0,
        start: r[1] & 0x02 != 0,
        ps: r[1] & 0x10 != 0,
        hat: r[2],
        left_velocity: r[5],
        right_velocity: r[6],
        effects_knob: u16::from_le_bytes([r[15], r[16]]) & 0x3FF,
        cross_fader: u16::from_le_bytes([r[17], r[18]]) & 0x3FF,
        right_green: r[19] & 0x80 != 0,
        right_red: r[19] & 0x40 != 0,
        right_blue: r[19] & 0x20 != 0,
        left_green: r[19] & 0x10 != 0,
        left_red: r[19] & 0x08 != 0,
        left_blue: r[19] & 0x04 != 0,
        table_neutral: r[20] & 0x40 != 0,
    })
}

/// Top eight bits of a 10-bit control.
fn ten_to_eight(value: u16) -> u8 {
    u8::try_from((value & 0x3FF) >> 2).unwrap_or(u8::MAX)
}

/// 6-bit two's complement platter velocity from an offset-binary axis.
///
/// Bit 5 is set while the platter spins backward.
fn signed_velocity(axis: u8) -> u8 {
    let signed = i8::from_ne_bytes([axis ^ 0x80]) >> 3;
    signed.to_ne_bytes()[0] & 0x3F
}

impl TurntableReport {
    pub fn dpad(&self) -> Dpad {
        Dpad::from_hat(self.hat)
    }

    pub fn buttons(&self) -> ButtonSet {
        let dpad = self.dpad();
        let mut set = ButtonSet::EMPTY;
        for (button, held) in [
            (TurntableButton::Square, self.square),
            (TurntableButton::Cross, self.cross),
            (TurntableButton::Circle, self.circle),
            (TurntableButton::Euphoria, self.euphoria),
            (TurntableButton::Select, self.select),
            (TurntableButton::Start, self.start),
            (TurntableButton::LeftGreen, self.left_green),
            (TurntableButton::LeftRed, self.left_red),
            (TurntableButton::LeftBlue, self.left_blue),
            (TurntableButton::RightGreen, self.right_green),
            (TurntableButton::RightRed, self.right_red),
            (TurntableButton::RightBlue, self.right_blue),
            (TurntableButton::Up, dpad.up),
            (TurntableButton::Down, dpad.down),
            (TurntableButton::Left, dpad.left),
            (TurntableButton::Right, dpad.right),
            (TurntableButton::Ps, self.ps),
        ] {
            set.set(button, held);
        }
        set
    }

    pub fn axes(&self) -> [u8; AXIS_COUNT] {
        let [x, y] = self.dpad().as_stick();
        [
            x,
            y,
            self.left_velocity,
            self.right_velocity,
            ten_to_eight(self.cross_fader),
            ten_to_eight(self.effects_knob),
        ]
    }

    /// Mapped record with the platters re-centred around 0x80.
    pub fn extension_record(&self) -> TurntableRecord {
        let record = encode_turntable(self.buttons(), MAPPING.buttons, &self.axes(), MAPPING.axes);
        TurntableRecord {
            left_turntable: signed_velocity(self.left_velocity),
            right_turntable: signed_velocity(self.right_velocity),
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
        WpadData {
            buttons: map_wiimote(self.buttons(), MAPPING.wiimote),
            extension: EXTENSION,
            ext: ExtensionData::Turntable(TurntableData {
                buttons: record.buttons | ltt_sign,
                stick: [host_stick(record.stick_x), host_stick(record.stick_y)],
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

#[cfg(test)]
mod tests {
    use super::*;
    use openwpad_hid_common::HAT_CENTERED;

    fn idle() -> [u8; REPORT_LEN] {
        let mut data = [0u8; REPORT_LEN];
        data[2] = HAT_CENTERED;
        data[5] = 0x80;
        data[6] = 0x80;
        data[15..17].copy_from_slice(&0x200u16.to_le_bytes());
        data[17..19].copy_from_slice(&0x200u16.to_le_bytes());
        data[20] = 0x40;
        data
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            parse(&[0u8; 19]),
            Err(ParseError::TooShort { got: 19, need: 23 })
        );
    }

    #[test]
    fn test_idle_report() -> Result<(), ParseError> {
        let report = parse(&idle())?;
        assert!(report.table_neutral);
        assert!(report.buttons().is_empty());
        assert_eq!(report.axes(), [0x80, 0x80, 0x80, 0x80, 0x80, 0x80]);
        let record = report.extension_record();
        assert_eq!(record.left_turntable, 0);
        assert_eq!(record.right_turntable, 0);
        assert_eq!(record.crossfade, 8);
        assert_eq!(record.effects, 16);
        Ok(())
    }

    #[test]
    fn test_face_buttons_press_both_decks() -> Result<(), ParseError> {
        let mut data = idle();
        data[0] = 0x02 | 0x08;
        let record = parse(&data)?.extension_record();
        assert_eq!(
            record.buttons,
            turntable::LEFT_GREEN | turntable::RIGHT_GREEN | turntable::EUPHORIA
        );
        Ok(())
    }

    #[test]
    fn test_platter_keys() -> Result<(), ParseError> {
        let mut data = idle();
        data[19] = 0x80 | 0x04;
        data[1] = 0x02;
        let report = parse(&data)?;
        assert!(report.right_green);
        assert!(report.left_blue);
        assert_eq!(
            report.extension_record().buttons,
            turntable::RIGHT_GREEN | turntable::LEFT_BLUE | turntable::PLUS
        );
        Ok(())
    }

    #[test]
    fn test_backward_spin_sets_sign() -> Result<(), ParseError> {
        let mut data = idle();
        // left spins backward, right forward
        data[5] = 0x70;
        data[6] = 0xA0;
        let wpad = parse(&data)?.wpad_data();
        assert_eq!(
            wpad.ext,
            ExtensionData::Turntable(TurntableData {
                buttons: turntable::LTT_SIGN,
                stick: [0, 0],
                right_turntable: 4,
                right_sign: false,
                cross_fader: 8,
                effects_dial: 16,
                left_turntable: 0x1E,
            })
        );
        Ok(())
    }

    #[test]
    fn test_platter_velocity_is_signed() -> Result<(), ParseError> {
        let mut data = idle();
        data[5] = 0xC8;
        data[6] = 0x70;
        let record = parse(&data)?.extension_record();
        assert_eq!(record.left_turntable, 9);
        assert_eq!(record.right_turntable, 0b11_1110);
        assert_eq!(signed_velocity(0x00), 0b10_0000);
        assert_eq!(signed_velocity(0xFF), 0b01_1111);
        Ok(())
    }

    #[test]
    fn test_hat_drives_stick() -> Result<(), ParseError> {
        let mut data = idle();
        data[2] = 4;
        let record = parse(&data)?.extension_record();
        assert_eq!(record.stick_x, 0x20);
        assert_eq!(record.stick_y, 0);
        Ok(())
    }
}

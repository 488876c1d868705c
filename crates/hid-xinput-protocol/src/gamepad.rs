//! XInput gamepad payload, presented as a classic controller. Subtypes
//! without a dedicated layout (wheels, arcade sticks, dance pads) decode
//! through here too.
//!
//! # Payload layout
//! | Offset | Size | Field        | Encoding                                             |
//! |--------|------|--------------|------------------------------------------------------|
//! | 2      | u8   | buttons 1    | R3 0x80, L3 0x40, back 0x20, start 0x10, d-pad low nibble |
//! | 3      | u8   | buttons 2    | Y 0x80, X 0x40, B 0x20, A 0x10, guide 0x04, RB 0x02, LB 0x01 |
//! | 4–5    | u8   | LT, RT       | analog travel                                        |
//! | 6–13   | i16  | sticks       | LE: LX, LY, RX, RY, Y grows upward                   |

use openwpad_button_map::{ExtensionMapping, axis, encode_classic, map_wiimote};
use openwpad_hid_common::{ButtonSet, LogicalButton};
use openwpad_wiimote::buttons::classic;
use openwpad_wiimote::{ClassicData, ClassicRecord, ExtensionData, WpadData};
use serde::{Deserialize, Serialize};

use crate::subtype::Layout;
use crate::{PAYLOAD_LEN, ParseError, dpad, fixed, i16_le, offset_binary};

/// Analog trigger travel at which the digital full-press bit is set.
pub const TRIGGER_CLICK: u8 = 0xE0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    Back,
    Start,
    Guide,
    LeftThumb,
    RightThumb,
    Up,
    Down,
    Left,
    Right,
}

impl LogicalButton for GamepadButton {
    fn index(self) -> u8 {
        self as u8
    }
}

pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[],
    buttons: &[
        classic::A,
        classic::B,
        classic::X,
        classic::Y,
        classic::ZL,
        classic::ZR,
        classic::FULL_L,
        classic::FULL_R,
        classic::MINUS,
        classic::PLUS,
        classic::HOME,
        0,
        0,
        classic::UP,
        classic::DOWN,
        classic::LEFT,
        classic::RIGHT,
    ],
    axes: &[
        axis::classic::LEFT_X,
        axis::classic::LEFT_Y,
        axis::classic::RIGHT_X,
        axis::classic::RIGHT_Y,
    ],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamepadReport {
    pub buttons: ButtonSet,
    pub triggers: [u8; 2],
    /// `[LX, LY, RX, RY]`
    pub sticks: [i16; 4],
}

pub fn parse(payload: &[u8]) -> Result<GamepadReport, ParseError> {
    let r = fixed::<PAYLOAD_LEN>(payload)?;
    let pad = dpad(r[2]);
    let mut buttons = ButtonSet::EMPTY;
    for (button, held) in [
        (GamepadButton::Up, pad.up),
        (GamepadButton::Down, pad.down),
        (GamepadButton::Left, pad.left),
        (GamepadButton::Right, pad.right),
        (GamepadButton::Start, r[2] & 0x10 != 0),
        (GamepadButton::Back, r[2] & 0x20 != 0),
        (GamepadButton::LeftThumb, r[2] & 0x40 != 0),
        (GamepadButton::RightThumb, r[2] & 0x80 != 0),
        (GamepadButton::LeftShoulder, r[3] & 0x01 != 0),
        (GamepadButton::RightShoulder, r[3] & 0x02 != 0),
        (GamepadButton::Guide, r[3] & 0x04 != 0),
        (GamepadButton::A, r[3] & 0x10 != 0),
        (GamepadButton::B, r[3] & 0x20 != 0),
        (GamepadButton::X, r[3] & 0x40 != 0),
        (GamepadButton::Y, r[3] & 0x80 != 0),
        (GamepadButton::LeftTrigger, r[4] >= TRIGGER_CLICK),
        (GamepadButton::RightTrigger, r[5] >= TRIGGER_CLICK),
    ] {
        buttons.set(button, held);
    }
    Ok(GamepadReport {
        buttons,
        triggers: [r[4], r[5]],
        sticks: [
            i16_le(r[6], r[7]),
            i16_le(r[8], r[9]),
            i16_le(r[10], r[11]),
            i16_le(r[12], r[13]),
        ],
    })
}

impl GamepadReport {
    pub fn axes(&self) -> [u8; 4] {
        self.sticks.map(offset_binary)
    }

    pub fn extension_record(&self) -> ClassicRecord {
        encode_classic(self.buttons, MAPPING.buttons, &self.axes(), MAPPING.axes)
    }

    /// Host sticks keep ten bits of the 16-bit axes.
    pub fn wpad_data(&self) -> WpadData {
        let [lx, ly, rx, ry] = self.sticks.map(|v| v >> 6);
        WpadData {
            buttons: map_wiimote(self.buttons, MAPPING.wiimote),
            extension: Layout::Gamepad.extension(),
            ext: ExtensionData::Classic(ClassicData {
                buttons: self.extension_record().buttons,
                left_stick: [lx, ly],
                right_stick: [rx, ry],
                trigger: self.triggers,
            }),
            ..WpadData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), ParseError>;

    fn payload(b2: u8, b3: u8, sticks: [i16; 4]) -> [u8; PAYLOAD_LEN] {
        let mut data = [0u8; PAYLOAD_LEN];
        data[1] = 0x14;
        data[2] = b2;
        data[3] = b3;
        for (chunk, v) in data[6..].chunks_exact_mut(2).zip(sticks) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_table_covers_every_button() {
        assert_eq!(MAPPING.buttons.len(), GamepadButton::Right as usize + 1);
    }

    #[test]
    fn test_face_and_system_buttons() -> TestResult {
        let report = parse(&payload(0x10 | 0x20 | 0x01, 0x10 | 0x80 | 0x04, [0; 4]))?;
        assert_eq!(
            report.extension_record().buttons,
            classic::PLUS | classic::MINUS | classic::UP | classic::A | classic::Y | classic::HOME
        );
        Ok(())
    }

    #[test]
    fn test_thumb_clicks_unmapped() -> TestResult {
        let report = parse(&payload(0xC0, 0, [0; 4]))?;
        assert!(report.buttons.contains(GamepadButton::LeftThumb));
        assert_eq!(report.extension_record().buttons, 0);
        Ok(())
    }

    #[test]
    fn test_trigger_click() -> TestResult {
        let mut data = payload(0, 0, [0; 4]);
        data[4] = 0xFF;
        data[5] = 0x40;
        let report = parse(&data)?;
        let record = report.extension_record();
        assert_eq!(record.buttons, classic::FULL_L);
        assert_eq!((record.lt, record.rt), (31, 0));
        assert_eq!(
            report.wpad_data().ext,
            ExtensionData::Classic(ClassicData {
                buttons: classic::FULL_L,
                left_stick: [0, 0],
                right_stick: [0, 0],
                trigger: [0xFF, 0x40],
            })
        );
        Ok(())
    }

    #[test]
    fn test_stick_scaling() -> TestResult {
        let report = parse(&payload(0, 0, [i16::MIN, i16::MAX, 0, -64]))?;
        assert_eq!(report.axes(), [0x00, 0xFF, 0x80, 0x7F]);
        let record = report.extension_record();
        assert_eq!((record.lx, record.ly), (0, 0x3F));
        let wpad = report.wpad_data();
        assert_eq!(wpad.extension, openwpad_wiimote::Extension::Classic);
        assert_eq!(
            wpad.ext,
            ExtensionData::Classic(ClassicData {
                buttons: 0,
                left_stick: [-512, 511],
                right_stick: [0, -1],
                trigger: [0, 0],
            })
        );
        Ok(())
    }
}

//! Taiko drum input report (27 bytes, no report ID).
//!
//! # Report layout
//! | Offset | Size | Field        | Encoding                                             |
//! |--------|------|--------------|------------------------------------------------------|
//! | 0      | u8   | buttons 1    | rim right 0x80, rim left 0x40, R 0x20, L 0x10, X 0x08, A 0x04, B 0x02, Y 0x01 |
//! | 1      | u8   | buttons 2    | capture 0x20, home 0x10, centre right 0x08, centre left 0x04, plus 0x02, minus 0x01 |
//! | 2      | u8   | hat          | 0 = up, clockwise, 8+ = centred                      |
//! | 19–20  | u16  | accel X      | LE, 10-bit                                           |
//! | 21–22  | u16  | accel Z      | LE, 10-bit                                           |
//! | 23–24  | u16  | accel Y      | LE, 10-bit                                           |
//!
//! The taiko extension has no 6-byte register record here; the drum goes
//! straight to the host record.

use openwpad_button_map::{ExtensionMapping, map_buttons, map_wiimote};
use openwpad_hid_common::{ButtonSet, Dpad, LogicalButton};
use openwpad_wiimote::buttons::{taiko, wiimote};
use openwpad_wiimote::{DataFormat, Extension, ExtensionData, GravityUnit, TaikoData, WpadData};
use serde::{Deserialize, Serialize};

use crate::{ParseError, fixed};

pub const REPORT_LEN: usize = 27;

pub const EXTENSION: Extension = Extension::Taiko;
pub const DATA_FORMAT: DataFormat = DataFormat::Taiko;
pub const GRAVITY_UNIT: GravityUnit = GravityUnit::ONE_G;

/// Logical taiko buttons, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaikoButton {
    CenterLeft,
    RimLeft,
    CenterRight,
    RimRight,
    A,
    B,
    X,
    Y,
    L,
    R,
    Minus,
    Plus,
    Home,
    Capture,
    Up,
    Down,
    Left,
    Right,
}

impl LogicalButton for TaikoButton {
    fn index(self) -> u8 {
        self as u8
    }
}

/// Drum zones go to the extension, face buttons to the Wii Remote.
pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[
        0,
        0,
        0,
        0,
        wiimote::A,
        wiimote::B,
        wiimote::ONE,
        wiimote::TWO,
        0,
        0,
        wiimote::MINUS,
        wiimote::PLUS,
        wiimote::HOME,
        0,
        wiimote::UP,
        wiimote::DOWN,
        wiimote::LEFT,
        wiimote::RIGHT,
    ],
    buttons: &[
        taiko::CENTER_LEFT,
        taiko::RIM_LEFT,
        taiko::CENTER_RIGHT,
        taiko::RIM_RIGHT,
    ],
    axes: &[],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaikoReport {
    pub buttons: ButtonSet,
    /// Raw 10-bit `[x, y, z]` samples.
    pub accel: [u16; 3],
}

/// Parse a taiko report. Bytes past [`REPORT_LEN`] are ignored.
pub fn parse(data: &[u8]) -> Result<TaikoReport, ParseError> {
    let r = fixed::<REPORT_LEN>(data)?;
    let le = |lo: u8, hi: u8| u16::from_le_bytes([lo, hi]);
    let dpad = Dpad::from_hat(r[2]);
    let mut buttons = ButtonSet::EMPTY;
    for (button, held) in [
        (TaikoButton::Y, r[0] & 0x01 != 0),
        (TaikoButton::B, r[0] & 0x02 != 0),
        (TaikoButton::A, r[0] & 0x04 != 0),
        (TaikoButton::X, r[0] & 0x08 != 0),
        (TaikoButton::L, r[0] & 0x10 != 0),
        (TaikoButton::R, r[0] & 0x20 != 0),
        (TaikoButton::RimLeft, r[0] & 0x40 != 0),
        (TaikoButton::RimRight, r[0] & 0x80 != 0),
        (TaikoButton::Minus, r[1] & 0x01 != 0),
        (TaikoButton::Plus, r[1] & 0x02 != 0),
        (TaikoButton::CenterLeft, r[1] & 0x04 != 0),
        (TaikoButton::CenterRight, r[1] & 0x08 != 0),
        (TaikoButton::Home, r[1] & 0x10 != 0),
        (TaikoButton::Capture, r[1] & 0x20 != 0),
        (TaikoButton::Up, dpad.up),
        (TaikoButton::Down, dpad.down),
        (TaikoButton::Left, dpad.left),
        (TaikoButton::Right, dpad.right),
    ] {
        buttons.set(button, held);
    }
    Ok(TaikoReport {
        buttons,
        accel: [le(r[19], r[20]), le(r[23], r[24]), le(r[21], r[22])],
    })
}

impl TaikoReport {
    /// Host accelerometer `[x, y, z]` re-centred around 511, Y and Z
    /// flipped.
    pub fn host_acceleration(&self) -> [i16; 3] {
        let [x, y, z] = self.accel.map(|raw| i16::try_from(raw & 0x3FF).unwrap_or(0));
        [x - 511, 511 - y, 511 - z]
    }

    pub fn wpad_data(&self) -> WpadData {
        WpadData {
            buttons: map_wiimote(self.buttons, MAPPING.wiimote),
            acceleration: self.host_acceleration(),
            extension: EXTENSION,
            ext: ExtensionData::Taiko(TaikoData {
                buttons: map_buttons(self.buttons, MAPPING.buttons),
            }),
            ..WpadData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwpad_wiimote::buttons::wpad_core;

    type TestResult = Result<(), ParseError>;

    fn idle() -> [u8; REPORT_LEN] {
        let mut data = [0u8; REPORT_LEN];
        data[2] = 0x0F;
        data[19..25].copy_from_slice(&[0xFF, 0x01, 0xFF, 0x01, 0xFF, 0x01]);
        data
    }

    #[test]
    fn test_tables_cover_every_button() {
        assert_eq!(MAPPING.wiimote.len(), TaikoButton::Right as usize + 1);
        assert!(MAPPING.axes.is_empty());
    }

    #[test]
    fn test_idle_is_centred() -> TestResult {
        let wpad = parse(&idle())?.wpad_data();
        assert_eq!(wpad.buttons, 0);
        assert_eq!(wpad.acceleration, [0, 0, 0]);
        assert_eq!(wpad.ext, ExtensionData::Taiko(TaikoData { buttons: 0 }));
        Ok(())
    }

    #[test]
    fn test_drum_zones() -> TestResult {
        let mut data = idle();
        data[0] = 0x80 | 0x40;
        data[1] = 0x04;
        let wpad = parse(&data)?.wpad_data();
        assert_eq!(
            wpad.ext,
            ExtensionData::Taiko(TaikoData {
                buttons: taiko::RIM_RIGHT | taiko::RIM_LEFT | taiko::CENTER_LEFT,
            })
        );
        assert_eq!(wpad.buttons, 0);
        Ok(())
    }

    #[test]
    fn test_face_buttons_drive_the_remote() -> TestResult {
        let mut data = idle();
        data[0] = 0x08 | 0x01 | 0x20;
        data[1] = 0x10 | 0x20;
        data[2] = 6;
        let wpad = parse(&data)?.wpad_data();
        assert_eq!(
            wpad.buttons,
            wpad_core::ONE | wpad_core::TWO | wpad_core::HOME | wpad_core::LEFT
        );
        Ok(())
    }

    #[test]
    fn test_acceleration_signs() -> TestResult {
        let mut data = idle();
        data[19..21].copy_from_slice(&0x0210u16.to_le_bytes());
        data[23..25].copy_from_slice(&0x0210u16.to_le_bytes());
        data[21..23].copy_from_slice(&0x01F0u16.to_le_bytes());
        let report = parse(&data)?;
        assert_eq!(report.accel, [0x210, 0x210, 0x1F0]);
        assert_eq!(report.host_acceleration(), [17, -17, 15]);
        Ok(())
    }
}

//! XInput guitar payloads.
//!
//! # Payload layout
//! | Offset | Size | Field        | Encoding                                             |
//! |--------|------|--------------|------------------------------------------------------|
//! | 2      | u8   | buttons 1    | solo 0x40 (Rock Band), back 0x20, start 0x10, strum down 0x02, strum up 0x01, left 0x04, right 0x08 |
//! | 3      | u8   | frets        | yellow 0x80, blue 0x40, red 0x20, green 0x10, guide 0x04, pedal 0x02 (Guitar Hero), orange 0x01 |
//! | 10–11  | i16  | whammy       | LE, `i16::MIN` at rest                               |
//! | 12–13  | i16  | tilt         | LE                                                   |
//!
//! Left and right on the d-pad nudge the guitar's stick; the touch strip
//! is not decoded and always reads as untouched.

use openwpad_button_map::{ExtensionMapping, axis, encode_guitar, map_wiimote};
use openwpad_hid_common::{ButtonSet, LogicalButton};
use openwpad_wiimote::buttons::{guitar, wiimote};
use openwpad_wiimote::{ExtensionData, GuitarData, GuitarRecord, WpadData};
use serde::{Deserialize, Serialize};

use crate::subtype::Layout;
use crate::{PAYLOAD_LEN, ParseError, dpad, fixed, i16_le, offset_binary};

/// Host stick deflection while left or right is held.
pub const STICK_NUDGE: i16 = 10;

/// Record axis for a nudge of [`STICK_NUDGE`]: 6-bit units, four axis
/// steps each.
const AXIS_NUDGE: u8 = 40;

/// Record tap bar axis that truncates to the untouched strip value.
const TAP_BAR_NONE_AXIS: u8 = 0x78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuitarKind {
    GuitarHero,
    RockBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GuitarButton {
    Green,
    Red,
    Yellow,
    Blue,
    Orange,
    StrumUp,
    StrumDown,
    Left,
    Right,
    Start,
    Back,
    Guide,
    Pedal,
    Solo,
}

impl LogicalButton for GuitarButton {
    fn index(self) -> u8 {
        self as u8
    }
}

pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, wiimote::HOME],
    buttons: &[
        guitar::GREEN,
        guitar::RED,
        guitar::YELLOW,
        guitar::BLUE,
        guitar::ORANGE,
        guitar::STRUM_UP,
        guitar::STRUM_DOWN,
        0,
        0,
        guitar::PLUS,
        guitar::MINUS,
        0,
        0,
        0,
    ],
    axes: &[
        axis::guitar::STICK_X,
        axis::guitar::STICK_Y,
        axis::guitar::TAP_BAR,
        axis::guitar::WHAMMY_BAR,
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuitarReport {
    pub kind: GuitarKind,
    pub buttons: ButtonSet,
    pub whammy: i16,
    pub tilt: i16,
}

pub fn parse(kind: GuitarKind, payload: &[u8]) -> Result<GuitarReport, ParseError> {
    let r = fixed::<PAYLOAD_LEN>(payload)?;
    let pad = dpad(r[2]);
    let (pedal, solo) = match kind {
        GuitarKind::GuitarHero => (r[3] & 0x02 != 0, false),
        GuitarKind::RockBand => (false, r[2] & 0x40 != 0),
    };
    let mut buttons = ButtonSet::EMPTY;
    for (button, held) in [
        (GuitarButton::StrumUp, pad.up),
        (GuitarButton::StrumDown, pad.down),
        (GuitarButton::Left, pad.left),
        (GuitarButton::Right, pad.right),
        (GuitarButton::Start, r[2] & 0x10 != 0),
        (GuitarButton::Back, r[2] & 0x20 != 0),
        (GuitarButton::Solo, solo),
        (GuitarButton::Orange, r[3] & 0x01 != 0),
        (GuitarButton::Pedal, pedal),
        (GuitarButton::Guide, r[3] & 0x04 != 0),
        (GuitarButton::Green, r[3] & 0x10 != 0),
        (GuitarButton::Red, r[3] & 0x20 != 0),
        (GuitarButton::Blue, r[3] & 0x40 != 0),
        (GuitarButton::Yellow, r[3] & 0x80 != 0),
    ] {
        buttons.set(button, held);
    }
    Ok(GuitarReport {
        kind,
        buttons,
        whammy: i16_le(r[10], r[11]),
        tilt: i16_le(r[12], r[13]),
    })
}

impl GuitarReport {
    /// Stick X from left/right, in host units.
    pub fn stick_x(&self) -> i16 {
        match (
            self.buttons.contains(GuitarButton::Left),
            self.buttons.contains(GuitarButton::Right),
        ) {
            (true, false) => -STICK_NUDGE,
            (false, true) => STICK_NUDGE,
            _ => 0,
        }
    }

    pub fn axes(&self) -> [u8; 4] {
        let x = match self.stick_x() {
            0 => 0x80,
            v if v < 0 => 0x80 - AXIS_NUDGE,
            _ => 0x80 + AXIS_NUDGE,
        };
        [x, 0x80, TAP_BAR_NONE_AXIS, offset_binary(self.whammy)]
    }

    pub fn extension_record(&self) -> GuitarRecord {
        encode_guitar(self.buttons, MAPPING.buttons, &self.axes(), MAPPING.axes)
    }

    pub fn wpad_data(&self) -> WpadData {
        let pedal = if self.buttons.contains(GuitarButton::Pedal) {
            guitar::PEDAL
        } else {
            0
        };
        WpadData {
            buttons: map_wiimote(self.buttons, MAPPING.wiimote),
            acceleration: [self.tilt >> 6, 0, 0],
            extension: Layout::GuitarHeroGuitar.extension(),
            ext: ExtensionData::Guitar(GuitarData {
                buttons: self.extension_record().buttons | pedal,
                stick: [self.stick_x(), 0],
                tap_bar: GuitarData::TAP_BAR_NONE,
                whammy: offset_binary(self.whammy).wrapping_sub(0x80),
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

    fn payload(b2: u8, b3: u8, whammy: i16, tilt: i16) -> [u8; PAYLOAD_LEN] {
        let mut data = [0u8; PAYLOAD_LEN];
        data[1] = 0x14;
        data[2] = b2;
        data[3] = b3;
        data[10..12].copy_from_slice(&whammy.to_le_bytes());
        data[12..14].copy_from_slice(&tilt.to_le_bytes());
        data
    }

    #[test]
    fn test_table_covers_every_button() {
        assert_eq!(MAPPING.buttons.len(), GuitarButton::Solo as usize + 1);
    }

    #[test]
    fn test_frets_and_strum() -> TestResult {
        let report = parse(GuitarKind::GuitarHero, &payload(0x01, 0x10 | 0x80 | 0x01, i16::MIN, 0))?;
        assert_eq!(
            report.extension_record().buttons,
            guitar::GREEN | guitar::YELLOW | guitar::ORANGE | guitar::STRUM_UP
        );
        Ok(())
    }

    #[test]
    fn test_pedal_only_on_guitar_hero() -> TestResult {
        let gh = parse(GuitarKind::GuitarHero, &payload(0, 0x02, i16::MIN, 0))?;
        assert!(gh.buttons.contains(GuitarButton::Pedal));
        assert_eq!(
            gh.wpad_data().ext,
            ExtensionData::Guitar(GuitarData {
                buttons: guitar::PEDAL,
                stick: [0, 0],
                tap_bar: GuitarData::TAP_BAR_NONE,
                whammy: 0x80,
            })
        );
        assert_eq!(gh.extension_record().buttons, 0);

        let rb = parse(GuitarKind::RockBand, &payload(0x40, 0x02, i16::MIN, 0))?;
        assert!(!rb.buttons.contains(GuitarButton::Pedal));
        assert!(rb.buttons.contains(GuitarButton::Solo));
        Ok(())
    }

    #[test]
    fn test_dpad_nudges_stick() -> TestResult {
        let left = parse(GuitarKind::RockBand, &payload(0x04, 0, i16::MIN, 0))?;
        assert_eq!(left.stick_x(), -10);
        assert_eq!(left.extension_record().stick_x, 22);
        let right = parse(GuitarKind::RockBand, &payload(0x08, 0, i16::MIN, 0))?;
        assert_eq!(right.stick_x(), 10);
        assert_eq!(right.extension_record().stick_x, 42);
        Ok(())
    }

    #[test]
    fn test_whammy_tilt_and_home() -> TestResult {
        let report = parse(GuitarKind::GuitarHero, &payload(0, 0x04, i16::MAX, 0x4000))?;
        let wpad = report.wpad_data();
        assert_eq!(wpad.buttons, wpad_core::HOME);
        assert_eq!(wpad.acceleration, [0x100, 0, 0]);
        assert_eq!(
            wpad.ext,
            ExtensionData::Guitar(GuitarData {
                buttons: 0,
                stick: [0, 0],
                tap_bar: GuitarData::TAP_BAR_NONE,
                whammy: 0x7F,
            })
        );
        assert_eq!(report.extension_record().whammy, 0x1F);
        assert_eq!(report.extension_record().tap_bar, 0x0F);
        Ok(())
    }
}

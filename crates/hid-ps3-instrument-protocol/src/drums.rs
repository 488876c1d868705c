//! Guitar Hero drum kit input report.
//!
//! The dongle reports up to its endpoint packet size; only the first 23
//! bytes carry data.
//!
//! # Report layout
//! | Offset | Size | Field          | Encoding                                           |
//! |--------|------|----------------|----------------------------------------------------|
//! | 0      | u8   | pads           | kick 0x20, orange 0x10, yellow 0x08, red 0x04, green 0x02, blue 0x01 |
//! | 1      | u8   | system         | PS 0x10, start 0x02, select 0x01                   |
//! | 2      | u8   | hat            | 0 = up, clockwise, 8+ = centred                    |
//! | 7      | u8   | yellow         | strike pressure, 0 = not struck                    |
//! | 8      | u8   | red            | strike pressure                                    |
//! | 9      | u8   | green          | strike pressure                                    |
//! | 10     | u8   | blue           | strike pressure                                    |
//! | 11     | u8   | kick           | strike pressure                                    |
//! | 12     | u8   | orange         | strike pressure                                    |
//!
//! # Velocity
//! The Wii drum reports a single struck pad per poll. When several pads
//! carry pressure in the same report the one earliest in
//! [`DrumPad::PRIORITY`] wins, independent of byte order.

use openwpad_button_map::{ExtensionMapping, axis, encode_drum, map_wiimote};
use openwpad_hid_common::{ButtonSet, Dpad, LogicalButton};
use openwpad_wiimote::buttons::{drum, drum_to_wpad, wiimote};
pub use openwpad_wiimote::DrumPad;
use openwpad_wiimote::{
    DataFormat, DrumData, DrumRecord, Extension, ExtensionData, GravityUnit, WpadData,
};
use serde::{Deserialize, Serialize};

use crate::{ParseError, fixed, host_stick};

/// Bytes of the drum report that carry data.
pub const REPORT_LEN: usize = 23;

pub const EXTENSION: Extension = Extension::Drum;
pub const DATA_FORMAT: DataFormat = DataFormat::Drum;
pub const GRAVITY_UNIT: GravityUnit = GravityUnit::ZERO;

/// Logical drum buttons, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DrumButton {
    Yellow,
    Green,
    Red,
    Blue,
    Orange,
    Up,
    Down,
    Left,
    Right,
    Kick,
    Select,
    Start,
    Ps,
}

impl LogicalButton for DrumButton {
    fn index(self) -> u8 {
        self as u8
    }
}

/// Derived axes: `[stick X, stick Y, velocity selector, velocity]`.
pub const AXIS_COUNT: usize = 4;

/// Drum kit to Wii drum extension tables. The axis table routes the
/// derived axes, not the raw pressures.
pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, wiimote::HOME],
    buttons: &[
        drum::YELLOW,
        drum::GREEN,
        drum::RED,
        drum::BLUE,
        drum::ORANGE,
        drum::UP,
        drum::DOWN,
        drum::LEFT,
        drum::RIGHT,
        drum::KICK,
        drum::MINUS,
        drum::PLUS,
        0,
    ],
    axes: &[
        axis::drum::STICK_X,
        axis::drum::STICK_Y,
        axis::drum::VELOCITY_SELECTOR,
        axis::drum::VELOCITY,
    ],
};

/// Decoded drum kit report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumReport {
    pub yellow: bool,
    pub green: bool,
    pub red: bool,
    pub blue: bool,
    pub orange: bool,
    pub kick: bool,
    pub select: bool,
    pub start: bool,
    pub ps: bool,
    pub hat: u8,
    /// Strike pressures indexed by [`DrumPad`].
    pub pressure: [u8; 6],
}

/// Parse a drum kit report. Bytes past [`REPORT_LEN`] are ignored.
pub fn parse(data: &[u8]) -> Result<DrumReport, ParseError> {
    let r = fixed::<REPORT_LEN>(data)?;
    Ok(DrumReport {
        blue: r[0] & 0x01 != 0,
        green: r[0] & 0x02 != 0,
        red: r[0] & 0x04 != 0,
        yellow: r[0] & 0x08 != 0,
        orange: r[0] & 0x10 != 0,
        kick: r[0] & 0x20 != 0,
        select: r[1] & 0x01 != 0,
        start: r[1] & 0x02 != 0,
        ps: r[1] & 0x10 != 0,
        hat: r[2],
        pressure: [r[9], r[8], r[7], r[10], r[12], r[11]],
    })
}

impl DrumReport {
    pub fn dpad(&self) -> Dpad {
        Dpad::from_hat(self.hat)
    }

    pub fn pressure(&self, pad: DrumPad) -> u8 {
        self.pressure.get(usize::from(pad as u8)).copied().unwrap_or(0)
    }

    /// The highest priority pad with non-zero pressure and its pressure.
    pub fn struck_pad(&self) -> Option<(DrumPad, u8)> {
        DrumPad::first_struck(&self.pressure)
    }

    pub fn buttons(&self) -> ButtonSet {
        let dpad = self.dpad();
        let mut set = ButtonSet::EMPTY;
        for (button, held) in [
            (DrumButton::Yellow, self.yellow),
            (DrumButton::Green, self.green),
            (DrumButton::Red, self.red),
            (DrumButton::Blue, self.blue),
            (DrumButton::Orange, self.orange),
            (DrumButton::Up, dpad.up),
            (DrumButton::Down, dpad.down),
            (DrumButton::Left, dpad.left),
            (DrumButton::Right, dpad.right),
            (DrumButton::Kick, self.kick),
            (DrumButton::Select, self.select),
            (DrumButton::Start, self.start),
            (DrumButton::Ps, self.ps),
        ] {
            set.set(button, held);
        }
        set
    }

    /// Sticks rest centred; the struck pad becomes a selector and velocity
    /// pair, both zero when nothing was hit.
    pub fn axes(&self) -> [u8; AXIS_COUNT] {
        let (selector, velocity) = self
            .struck_pad()
            .map_or((0, 0), |(pad, pressure)| (pad.selector(), pressure));
        [0x80, 0x80, selector, velocity]
    }

    pub fn extension_record(&self) -> DrumRecord {
        encode_drum(self.buttons(), MAPPING.buttons, &self.axes(), MAPPING.axes)
    }

    pub fn wpad_data(&self) -> WpadData {
        let buttons = self.buttons();
        let record = self.extension_record();
        let [_, _, selector, velocity] = self.axes();
        WpadData {
            buttons: map_wiimote(buttons, MAPPING.wiimote),
            extension: EXTENSION,
            ext: ExtensionData::Drum(DrumData {
                buttons: drum_to_wpad(record.buttons),
                stick: [host_stick(record.stick_x), host_stick(record.stick_y)],
                which: i16::from(selector),
                velocity,
                whammy: 0,
            }),
            ..WpadData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwpad_hid_common::HAT_CENTERED;
    use openwpad_wiimote::buttons::wpad_drum;

    fn idle() -> [u8; REPORT_LEN] {
        let mut data = [0u8; REPORT_LEN];
        data[2] = HAT_CENTERED;
        data
    }

    #[test]
    fn test_parse_too_short() {
        assert_eq!(
            parse(&[0u8; 8]),
            Err(ParseError::TooShort { got: 8, need: 23 })
        );
    }

    #[test]
    fn test_pressure_offsets() -> Result<(), ParseError> {
        let mut data = idle();
        data[7..13].copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        let report = parse(&data)?;
        assert_eq!(report.pressure(DrumPad::Yellow), 1);
        assert_eq!(report.pressure(DrumPad::Red), 2);
        assert_eq!(report.pressure(DrumPad::Green), 3);
        assert_eq!(report.pressure(DrumPad::Blue), 4);
        assert_eq!(report.pressure(DrumPad::Kick), 5);
        assert_eq!(report.pressure(DrumPad::Orange), 6);
        Ok(())
    }

    #[test]
    fn test_priority_beats_byte_order() -> Result<(), ParseError> {
        let mut data = idle();
        // yellow sits first in the report but red outranks it
        data[7] = 0x40;
        data[8] = 0x90;
        let report = parse(&data)?;
        assert_eq!(report.struck_pad(), Some((DrumPad::Red, 0x90)));
        assert_eq!(report.axes(), [0x80, 0x80, 0b11001, 0x90]);
        Ok(())
    }

    #[test]
    fn test_nothing_struck() -> Result<(), ParseError> {
        let report = parse(&idle())?;
        assert_eq!(report.struck_pad(), None);
        let record = report.extension_record();
        assert_eq!(record.velocity_selector, 0);
        assert_eq!(record.velocity, 0);
        assert_eq!(record.buttons, 0);
        Ok(())
    }

    #[test]
    fn test_selectors() {
        let selectors = DrumPad::PRIORITY.map(DrumPad::selector);
        assert_eq!(selectors, [0b10010, 0b11001, 0b10001, 0b01111, 0b01110, 0b11011]);
    }

    #[test]
    fn test_kick_and_host_block() -> Result<(), ParseError> {
        let mut data = idle();
        data[0] = 0x20 | 0x08;
        data[1] = 0x02;
        data[11] = 0x70;
        let report = parse(&data)?;
        let record = report.extension_record();
        assert_eq!(record.buttons, drum::KICK | drum::YELLOW | drum::PLUS);
        assert_eq!(record.velocity_selector, 0b11011);
        assert_eq!(record.velocity, 0x70 >> 5);

        let wpad = report.wpad_data();
        assert_eq!(wpad.extension, Extension::Drum);
        assert_eq!(
            wpad.ext,
            ExtensionData::Drum(DrumData {
                buttons: wpad_drum::PEDAL | wpad_drum::YELLOW | wpad_drum::PLUS,
                stick: [0, 0],
                which: 0b11011,
                velocity: 0x70,
                whammy: 0,
            })
        );
        Ok(())
    }

    #[test]
    fn test_hat_maps_to_drum_directions() -> Result<(), ParseError> {
        let mut data = idle();
        data[2] = 5;
        let record = parse(&data)?.extension_record();
        assert_eq!(record.buttons, drum::DOWN | drum::LEFT);
        Ok(())
    }
}

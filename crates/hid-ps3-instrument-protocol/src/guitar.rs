//! Guitar Hero guitar input report (27 bytes, no report ID).
//!
//! # Report layout
//! | Offset | Size | Field        | Encoding                                             |
//! |--------|------|--------------|------------------------------------------------------|
//! | 0      | u8   | frets        | pedal 0x20, orange 0x10, blue 0x08, red 0x04, green 0x02, yellow 0x01 |
//! | 1      | u8   | system       | PS 0x10, start 0x02, select 0x01                     |
//! | 2      | u8   | hat          | 0 = up, clockwise, 8+ = centred                      |
//! | 5      | u8   | whammy       | 0x7F–0x80 at rest                                    |
//! | 6      | u8   | tap bar      | slider position                                      |
//! | 19–20  | u16  | accel X      | LE, 10-bit                                           |
//! | 21–22  | u16  | accel Z      | LE, 10-bit                                           |
//! | 23–24  | u16  | accel Y      | LE, 10-bit                                           |
//! | 25–26  | u16  | gyro         | LE, 10-bit                                           |
//!
//! The hat drives both the strum bar (up/down) and the guitar's analog
//! stick, which the instrument does not have.

use openwpad_button_map::{ExtensionMapping, axis, encode_guitar, map_wiimote};
use openwpad_hid_common::{ButtonSet, Dpad, LogicalButton};
use openwpad_wiimote::buttons::{guitar, wiimote};
use openwpad_wiimote::{
    DataFormat, Extension, ExtensionData, GravityUnit, GuitarData, GuitarRecord, WpadData,
};
use serde::{Deserialize, Serialize};

use crate::{ParseError, centred_accel, fixed, host_stick};

/// Guitar input report length in bytes.
pub const REPORT_LEN: usize = 27;

pub const EXTENSION: Extension = Extension::Guitar;
pub const DATA_FORMAT: DataFormat = DataFormat::Guitar;
pub const GRAVITY_UNIT: GravityUnit = GravityUnit::ONE_G;

/// Logical guitar buttons, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GuitarButton {
    Yellow,
    Green,
    Red,
    Blue,
    Orange,
    Up,
    Down,
    Left,
    Right,
    StarPowerPedal,
    Select,
    Start,
    Ps,
}

impl LogicalButton for GuitarButton {
    fn index(self) -> u8 {
        self as u8
    }
}

/// Source axes: `[stick X, stick Y, tap bar, whammy]`.
pub const AXIS_COUNT: usize = 4;

/// Guitar to Wii guitar extension tables.
pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, wiimote::HOME],
    buttons: &[
        guitar::YELLOW,
        guitar::GREEN,
        guitar::RED,
        guitar::BLUE,
        guitar::ORANGE,
        guitar::STRUM_UP,
        guitar::STRUM_DOWN,
        0,
        0,
        0,
        guitar::MINUS,
        guitar::PLUS,
        0,
    ],
    axes: &[
        axis::guitar::STICK_X,
        axis::guitar::STICK_Y,
        axis::guitar::TAP_BAR,
        axis::guitar::WHAMMY_BAR,
    ],
};

/// Decoded guitar report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuitarReport {
    pub yellow: bool,
    pub green: bool,
    pub red: bool,
    pub blue: bool,
    pub orange: bool,
    /// Star power foot pedal jack.
    pub pedal: bool,
    pub select: bool,
    pub start: bool,
    pub ps: bool,
    pub hat: u8,
    pub whammy: u8,
    pub tap_bar: u8,
    /// Raw 10-bit `[x, y, z]` samples.
    pub accel: [u16; 3],
    pub gyro: u16,
}

/// Parse a guitar report. Bytes past [`REPORT_LEN`] are ignored.
pub fn parse(data: &[u8]) -> Result<GuitarReport, ParseError> {
    let r = fixed::<REPORT_LEN>(data)?;
    let le = |lo: u8, hi: u8| u16::from_le_bytes([lo, hi]);
    Ok(GuitarReport {
        yellow: r[0] & 0x01 != 0,
        green: r[0] & 0x02 != 0,
        red: r[0] & 0x04 != 0,
        blue: r[0] & 0x08 != 0,
        orange: r[0] & 0x10 != 0,
        pedal: r[0] & 0x20 != 0,
        select: r[1] & 0x01 != 0,
        start: r[1] & 0x02 != 0,
        ps: r[1] & 0x10 != 0,
        hat: r[2],
        whammy: r[5],
        tap_bar: r[6],
        accel: [le(r[19], r[20]), le(r[23], r[24]), le(r[21], r[22])],
        gyro: le(r[25], r[26]),
    })
}

impl GuitarReport {
    pub fn dpad(&self) -> Dpad {
        Dpad::from_hat(self.hat)
    }

    pub fn buttons(&self) -> ButtonSet {
        let dpad = self.dpad();
        let mut set = ButtonSet::EMPTY;
        for (button, held) in [
            (GuitarButton::Yellow, self.yellow),
            (GuitarButton::Green, self.green),
            (GuitarButton::Red, self.red),
            (GuitarButton::Blue, self.blue),
            (GuitarButton::Orange, self.orange),
            (GuitarButton::Up, dpad.up),
            (GuitarButton::Down, dpad.down),
            (GuitarButton::Left, dpad.left),
            (GuitarButton::Right, dpad.right),
            (GuitarButton::StarPowerPedal, self.pedal),
            (GuitarButton::Select, self.select),
            (GuitarButton::Start, self.start),
            (GuitarButton::Ps, self.ps),
        ] {
            set.set(button, held);
        }
        set
    }

    pub fn axes(&self) -> [u8; AXIS_COUNT] {
        let [x, y] = self.dpad().as_stick();
        [x, y, self.tap_bar, self.whammy]
    }

    /// Host accelerometer `[x, y, z]`: the guitar's Z, X and Y re-centred
    /// around 511 with the Wii Remote's sign convention.
    pub fn host_acceleration(&self) -> [i16; 3] {
        let [x, y, z] = self.accel;
        [
            centred_accel(z, true),
            centred_accel(x, false),
            centred_accel(y, true),
        ]
    }

    pub fn extension_record(&self) -> GuitarRecord {
        encode_guitar(self.buttons(), MAPPING.buttons, &self.axes(), MAPPING.axes)
    }

    pub fn wpad_data(&self) -> WpadData {
        let buttons = self.buttons();
        let record = self.extension_record();
        let pedal = if buttons.contains(GuitarButton::StarPowerPedal) {
            guitar::PEDAL
        } else {
            0
        };
        WpadData {
            buttons: map_wiimote(buttons, MAPPING.wiimote),
            acceleration: self.host_acceleration(),
            extension: EXTENSION,
            ext: ExtensionData::Guitar(GuitarData {
                buttons: record.buttons | pedal,
                stick: [host_stick(record.stick_x), host_stick(record.stick_y)],
                tap_bar: GuitarData::TAP_BAR_NONE,
                whammy: self.whammy.wrapping_sub(0x80),
            }),
            ..WpadData::default()
        }
    }
}

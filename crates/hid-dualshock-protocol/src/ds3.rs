//! DualShock 3 input report (report ID 0x01, 49 bytes) and output report.
//!
//! # Report layout
//! | Offset | Size | Field        | Encoding                                                   |
//! |--------|------|--------------|------------------------------------------------------------|
//! | 0      | u8   | report ID    | 0x01                                                       |
//! | 2      | u8   | buttons 1    | left 0x80, down 0x40, right 0x20, up 0x10, start 0x08, R3 0x04, L3 0x02, select 0x01 |
//! | 3      | u8   | buttons 2    | square 0x80, cross 0x40, circle 0x20, triangle 0x10, R1 0x08, L1 0x04, R2 0x02, L2 0x01 |
//! | 4      | u8   | buttons 3    | PS 0x01                                                    |
//! | 6–9    | u8   | sticks       | LX, LY, RX, RY, 0x80 centred                               |
//! | 18–19  | u8   | L2, R2       | analog travel                                              |
//! | 41–46  | u16  | accel X/Y/Z  | BE, 10-bit                                                 |
//! | 47–48  | u16  | gyro         | BE, 10-bit                                                 |
//!
//! # Output report
//! SET_REPORT(output 0x01), 48 bytes: rumble at 1–4 (right duration,
//! right power, left duration, left power), the LED mask at 9, then one
//! 5-byte blink block per LED.

use openwpad_hid_common::ControlSetup;
use openwpad_hid_common::setup::report_type;
use openwpad_hid_common::ButtonSet;
use serde::{Deserialize, Serialize};

use crate::gamepad::{GamepadState, PadButton};
use crate::{ParseError, fixed};

pub const REPORT_LEN: usize = 49;
pub const REPORT_ID: u8 = 0x01;

/// Feature report whose read switches the controller into streaming mode.
pub const ENABLE_REPORTING: ControlSetup =
    ControlSetup::get_report(report_type::FEATURE, 0xF2, 17);

pub const OUTPUT_REPORT_LEN: usize = 48;
pub const OUTPUT_SETUP: ControlSetup =
    ControlSetup::set_report(report_type::OUTPUT, REPORT_ID, OUTPUT_REPORT_LEN as u16);

/// LED masks by player number; player `n` lights pattern `n`.
pub const LED_PATTERN: [u8; 8] = [0x00, 0x02, 0x04, 0x08, 0x10, 0x12, 0x14, 0x18];

/// Per-LED blink parameters: always on.
const LED_BLOCK: [u8; 5] = [0xFF, 0x27, 0x10, 0x00, 0x32];

/// Decoded DualShock 3 report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ds3Report {
    pub buttons: ButtonSet,
    pub left_stick: [u8; 2],
    pub right_stick: [u8; 2],
    pub l2_pressure: u8,
    pub r2_pressure: u8,
    /// Raw 10-bit `[x, y, z]` samples.
    pub accel: [u16; 3],
    pub gyro: u16,
}

pub fn parse(data: &[u8]) -> Result<Ds3Report, ParseError> {
    let r = fixed::<REPORT_LEN>(data)?;
    let be = |hi: u8, lo: u8| u16::from_be_bytes([hi, lo]);
    let mut buttons = ButtonSet::EMPTY;
    for (button, byte, mask) in [
        (PadButton::Select, r[2], 0x01),
        (PadButton::L3, r[2], 0x02),
        (PadButton::R3, r[2], 0x04),
        (PadButton::Start, r[2], 0x08),
        (PadButton::Up, r[2], 0x10),
        (PadButton::Right, r[2], 0x20),
        (PadButton::Down, r[2], 0x40),
        (PadButton::Left, r[2], 0x80),
        (PadButton::L2, r[3], 0x01),
        (PadButton::R2, r[3], 0x02),
        (PadButton::L1, r[3], 0x04),
        (PadButton::R1, r[3], 0x08),
        (PadButton::Triangle, r[3], 0x10),
        (PadButton::Circle, r[3], 0x20),
        (PadButton::Cross, r[3], 0x40),
        (PadButton::Square, r[3], 0x80),
        (PadButton::Ps, r[4], 0x01),
    ] {
        buttons.set(button, byte & mask != 0);
    }
    Ok(Ds3Report {
        buttons,
        left_stick: [r[6], r[7]],
        right_stick: [r[8], r[9]],
        l2_pressure: r[18],
        r2_pressure: r[19],
        accel: [be(r[41], r[42]), be(r[43], r[44]), be(r[45], r[46])],
        gyro: be(r[47], r[48]),
    })
}

impl Ds3Report {
    pub fn gamepad(&self) -> GamepadState {
        let [lx, ly] = self.left_stick;
        let [rx, ry] = self.right_stick;
        GamepadState {
            buttons: self.buttons,
            sticks: [lx, ly, rx, ry],
            triggers: [self.l2_pressure, self.r2_pressure],
        }
    }
}

/// Rumble motor settings of the output report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rumble {
    pub duration_right: u8,
    pub power_right: u8,
    pub duration_left: u8,
    pub power_left: u8,
}

impl Rumble {
    /// The small right motor at full power while `on`.
    pub fn from_motor(on: bool) -> Self {
        Self {
            duration_right: if on { 0xFF } else { 0 },
            power_right: 0xFF,
            duration_left: 0,
            power_left: 0,
        }
    }
}

/// LED mask for a zero-based host slot.
pub fn led_mask(slot: usize) -> u8 {
    slot.checked_add(1)
        .and_then(|player| LED_PATTERN.get(player % LED_PATTERN.len()))
        .copied()
        .unwrap_or(0)
}

/// Build the LED and rumble output report.
pub fn output_report(leds: u8, rumble: Rumble) -> [u8; OUTPUT_REPORT_LEN] {
    let mut buf = [0u8; OUTPUT_REPORT_LEN];
    buf[1] = rumble.duration_right;
    buf[2] = rumble.power_right;
    buf[3] = rumble.duration_left;
    buf[4] = rumble.power_left;
    buf[9] = leds;
    let blocks = LED_BLOCK.iter().cycle().take(4 * LED_BLOCK.len());
    for (dst, src) in buf.iter_mut().skip(10).zip(blocks) {
        *dst = *src;
    }
    buf
}

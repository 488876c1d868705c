//! DualShock 4 input report (report ID 0x01) and output report 0x05.
//!
//! # Report layout
//! | Offset | Size | Field        | Encoding                                                   |
//! |--------|------|--------------|------------------------------------------------------------|
//! | 0      | u8   | report ID    | 0x01                                                       |
//! | 1–4    | u8   | sticks       | LX, LY, RX, RY, 0x80 centred                               |
//! | 5      | u8   | buttons 1    | triangle 0x80, circle 0x40, cross 0x20, square 0x10, hat in low nibble |
//! | 6      | u8   | buttons 2    | R3 0x80, L3 0x40, options 0x20, share 0x10, R2 0x08, L2 0x04, R1 0x02, L1 0x01 |
//! | 7      | u8   | buttons 3    | touchpad click 0x02, PS 0x01                               |
//! | 8–9    | u8   | L2, R2       | analog travel                                              |
//! | 35–38  |      | finger 1     | id/inactive 0x80, X lo, Y lo ‖ X hi nibble, Y hi           |
//! | 39–42  |      | finger 2     | as finger 1                                                |
//!
//! The interrupt endpoint delivers 64 bytes; everything past the second
//! finger is ignored.
//!
//! # Output report
//! Interrupt OUT `[0x05, 0x03, 0, 0, small, large, r, g, b, 0, 0]`.
//!
//! # Pointer
//! Holding PS and clicking the touchpad cycles the IR emulation mode:
//! touch points in `Direct`, the right stick in the analog modes.

use openwpad_button_map::{
    IrAxis, IrEmulationMode, IrEmulationState, SwitchMapping, map_ir_analog_axis, map_ir_direct,
};
use openwpad_hid_common::{ButtonSet, Dpad};
use openwpad_wiimote::IrDot;
use openwpad_wiimote::ir::IR_MAX_DOTS;
use serde::{Deserialize, Serialize};

use crate::gamepad::{GamepadState, PadButton};
use crate::{ParseError, fixed};

pub const POLL_LEN: usize = 64;
pub const REPORT_LEN: usize = 43;
pub const REPORT_ID: u8 = 0x01;

pub const OUTPUT_REPORT_ID: u8 = 0x05;
pub const OUTPUT_REPORT_LEN: usize = 11;

pub const TOUCHPAD_WIDTH: u16 = 1920;
pub const TOUCHPAD_HEIGHT: u16 = 940;

/// Lightbar colour by player number; player `n` shows colour `n`.
pub const LIGHTBAR: [[u8; 3]; 5] = [
    [0, 0, 0],
    [0, 0, 32],
    [32, 0, 0],
    [0, 32, 0],
    [32, 0, 32],
];

/// Small motor strength while rumble is on.
const RUMBLE_SMALL: u8 = 192;

pub const POINTER_COMBO: ButtonSet = ButtonSet::from_bits(
    (1 << PadButton::Ps as u32) | (1 << PadButton::Touchpad as u32),
);

/// Right stick drives the pointer in the analog modes.
const POINTER_AXES: [u8; 2] = [IrAxis::X as u8, IrAxis::Y as u8];

/// One active touchpad contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u8,
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    fn parse(block: [u8; 4]) -> Option<Self> {
        let [state, x_lo, mixed, y_hi] = block;
        if state & 0x80 != 0 {
            return None;
        }
        Some(Self {
            id: state & 0x7F,
            x: u16::from(x_lo) | (u16::from(mixed & 0x0F) << 8),
            y: u16::from(mixed >> 4) | (u16::from(y_hi) << 4),
        })
    }
}

/// Decoded DualShock 4 report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ds4Report {
    pub buttons: ButtonSet,
    pub left_stick: [u8; 2],
    pub right_stick: [u8; 2],
    pub l2_pressure: u8,
    pub r2_pressure: u8,
    pub touches: [Option<TouchPoint>; 2],
}

pub fn parse(data: &[u8]) -> Result<Ds4Report, ParseError> {
    let r = fixed::<REPORT_LEN>(data)?;
    let dpad = Dpad::from_hat(r[5] & 0x0F);
    let mut buttons = ButtonSet::EMPTY;
    for (button, held) in [
        (PadButton::Up, dpad.up),
        (PadButton::Right, dpad.right),
        (PadButton::Down, dpad.down),
        (PadButton::Left, dpad.left),
        (PadButton::Square, r[5] & 0x10 != 0),
        (PadButton::Cross, r[5] & 0x20 != 0),
        (PadButton::Circle, r[5] & 0x40 != 0),
        (PadButton::Triangle, r[5] & 0x80 != 0),
        (PadButton::L1, r[6] & 0x01 != 0),
        (PadButton::R1, r[6] & 0x02 != 0),
        (PadButton::L2, r[6] & 0x04 != 0),
        (PadButton::R2, r[6] & 0x08 != 0),
        (PadButton::Select, r[6] & 0x10 != 0),
        (PadButton::Start, r[6] & 0x20 != 0),
        (PadButton::L3, r[6] & 0x40 != 0),
        (PadButton::R3, r[6] & 0x80 != 0),
        (PadButton::Ps, r[7] & 0x01 != 0),
        (PadButton::Touchpad, r[7] & 0x02 != 0),
    ] {
        buttons.set(button, held);
    }
    Ok(Ds4Report {
        buttons,
        left_stick: [r[1], r[2]],
        right_stick: [r[3], r[4]],
        l2_pressure: r[8],
        r2_pressure: r[9],
        touches: [
            TouchPoint::parse([r[35], r[36], r[37], r[38]]),
            TouchPoint::parse([r[39], r[40], r[41], r[42]]),
        ],
    })
}

impl Ds4Report {
    pub fn gamepad(&self) -> GamepadState {
        let [lx, ly] = self.left_stick;
        let [rx, ry] = self.right_stick;
        GamepadState {
            buttons: self.buttons,
            sticks: [lx, ly, rx, ry],
            triggers: [self.l2_pressure, self.r2_pressure],
        }
    }

    /// Active contacts as `(x, y)`, first finger first.
    pub fn touch_coords(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.touches.iter().flatten().map(|t| (t.x, t.y))
    }
}

/// Lightbar colour for a zero-based host slot.
pub fn lightbar(slot: usize) -> [u8; 3] {
    slot.checked_add(1)
        .and_then(|player| LIGHTBAR.get(player % LIGHTBAR.len()))
        .copied()
        .unwrap_or_default()
}

pub fn output_report(colour: [u8; 3], rumble_on: bool) -> [u8; OUTPUT_REPORT_LEN] {
    let [r, g, b] = colour;
    let small = if rumble_on { RUMBLE_SMALL } else { 0 };
    [OUTPUT_REPORT_ID, 0x03, 0, 0, small, 0, r, g, b, 0, 0]
}

/// Mode the pointer combo switches to from `mode`.
pub fn next_ir_mode(mode: IrEmulationMode) -> IrEmulationMode {
    match mode {
        IrEmulationMode::None => IrEmulationMode::Direct,
        IrEmulationMode::Direct => IrEmulationMode::RelativeAnalogAxis,
        IrEmulationMode::RelativeAnalogAxis => IrEmulationMode::AbsoluteAnalogAxis,
        IrEmulationMode::AbsoluteAnalogAxis => IrEmulationMode::None,
    }
}

/// Pointer emulation carried between polls of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    mode: IrEmulationMode,
    state: IrEmulationState,
    combo: SwitchMapping,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            mode: IrEmulationMode::None,
            state: IrEmulationState::default(),
            combo: SwitchMapping::new(POINTER_COMBO),
        }
    }
}

impl Pointer {
    pub fn mode(&self) -> IrEmulationMode {
        self.mode
    }

    /// Feed one report: advance the mode on a fresh combo press, then
    /// place the dots.
    pub fn update(&mut self, report: &Ds4Report) -> [IrDot; IR_MAX_DOTS] {
        if self.combo.update(report.buttons) {
            self.mode = next_ir_mode(self.mode);
            self.state.reset();
        }
        match self.mode {
            IrEmulationMode::Direct => {
                let coords: Vec<(u16, u16)> = report.touch_coords().collect();
                map_ir_direct(&coords, TOUCHPAD_WIDTH, TOUCHPAD_HEIGHT)
            }
            mode => map_ir_analog_axis(mode, &mut self.state, &report.right_stick, &POINTER_AXES),
        }
    }
}

//! XInput drum kit payloads.
//!
//! Guitar Hero and Rock Band kits share subtype 8. Guitar Hero kits set
//! bit 0x40 of byte 2 on every report; anything else decodes as Rock Band.
//!
//! # Payload layout
//! | Offset | Size | Guitar Hero                        | Rock Band                          |
//! |--------|------|------------------------------------|------------------------------------|
//! | 2      | u8   | kit flag 0x40, start 0x20, back 0x10, d-pad low nibble | back 0x20, start 0x10, d-pad low nibble |
//! | 3      | u8   | yellow 0x80, blue 0x40, red 0x20, green 0x10, guide 0x04, orange 0x02, kick 0x01 | as Guitar Hero, cymbal flag in place of orange |
//! | 6–13   |      | u8 velocities green…kick at 8–13   | i16 LE velocities red, yellow, blue, green at 6, 8, 10, 12 |
//!
//! Rock Band velocities run towards `i16::MIN` on some pads; only the
//! magnitude is used. The kick pedal has no velocity there and reads
//! [`DIGITAL_PRESSURE`] while held.

use openwpad_button_map::{ExtensionMapping, axis, encode_drum, map_wiimote};
use openwpad_hid_common::{ButtonSet, LogicalButton};
use openwpad_wiimote::buttons::{drum, drum_to_wpad, wiimote};
use openwpad_wiimote::{DrumData, DrumPad, DrumRecord, ExtensionData, WpadData};
use serde::{Deserialize, Serialize};

use crate::subtype::Layout;
use crate::{PAYLOAD_LEN, ParseError, dpad, fixed, i16_le};

const GUITAR_HERO_FLAG: u8 = 0x40;

/// Pressure reported for pads without a velocity sensor.
pub const DIGITAL_PRESSURE: u8 = 0x7F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrumKind {
    GuitarHero,
    RockBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DrumButton {
    Green,
    Red,
    Yellow,
    Blue,
    Orange,
    Kick,
    Start,
    Back,
    Guide,
    Up,
    Down,
    Left,
    Right,
}

impl LogicalButton for DrumButton {
    fn index(self) -> u8 {
        self as u8
    }
}

pub const MAPPING: ExtensionMapping = ExtensionMapping {
    wiimote: &[0, 0, 0, 0, 0, 0, 0, 0, wiimote::HOME],
    buttons: &[
        drum::GREEN,
        drum::RED,
        drum::YELLOW,
        drum::BLUE,
        drum::ORANGE,
        drum::KICK,
        drum::PLUS,
        drum::MINUS,
        0,
        drum::UP,
        drum::DOWN,
        drum::LEFT,
        drum::RIGHT,
    ],
    axes: &[
        axis::drum::STICK_X,
        axis::drum::STICK_Y,
        axis::drum::VELOCITY_SELECTOR,
        axis::drum::VELOCITY,
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumReport {
    pub kind: DrumKind,
    pub buttons: ButtonSet,
    /// Strike pressures indexed by [`DrumPad`].
    pub pressure: [u8; 6],
}

fn magnitude(velocity: i16) -> u8 {
    u8::try_from(velocity.unsigned_abs() >> 7).unwrap_or(u8::MAX)
}

pub fn parse(payload: &[u8]) -> Result<DrumReport, ParseError> {
    let r = fixed::<PAYLOAD_LEN>(payload)?;
    let pad = dpad(r[2]);
    let kind = if r[2] & GUITAR_HERO_FLAG != 0 {
        DrumKind::GuitarHero
    } else {
        DrumKind::RockBand
    };
    let kick = r[3] & 0x01 != 0;
    let (start, back, orange, pressure) = match kind {
        DrumKind::GuitarHero => (
            r[2] & 0x20 != 0,
            r[2] & 0x10 != 0,
            r[3] & 0x02 != 0,
            [r[8], r[9], r[10], r[11], r[12], r[13]],
        ),
        DrumKind::RockBand => (
            r[2] & 0x10 != 0,
            r[2] & 0x20 != 0,
            false,
            [
                magnitude(i16_le(r[12], r[13])),
                magnitude(i16_le(r[6], r[7])),
                magnitude(i16_le(r[8], r[9])),
                magnitude(i16_le(r[10], r[11])),
                0,
                if kick { DIGITAL_PRESSURE } else { 0 },
            ],
        ),
    };
    let mut buttons = ButtonSet::EMPTY;
    for (button, held) in [
        (DrumButton::Up, pad.up),
        (DrumButton::Down, pad.down),
        (DrumButton::Left, pad.left),
        (DrumButton::Right, pad.right),
        (DrumButton::Start, start),
        (DrumButton::Back, back),
        (DrumButton::Kick, kick),
        (DrumButton::Orange, orange),
        (DrumButton::Guide, r[3] & 0x04 != 0),
        (DrumButton::Green, r[3] & 0x10 != 0),
        (DrumButton::Red, r[3] & 0x20 != 0),
        (DrumButton::Blue, r[3] & 0x40 != 0),
        (DrumButton::Yellow, r[3] & 0x80 != 0),
    ] {
        buttons.set(button, held);
    }
    Ok(DrumReport {
        kind,
        buttons,
        pressure,
    })
}

impl DrumReport {
    pub fn struck_pad(&self) -> Option<(DrumPad, u8)> {
        DrumPad::first_struck(&self.pressure)
    }

    pub fn axes(&self) -> [u8; 4] {
        let (selector, velocity) = self
            .struck_pad()
            .map_or((0, 0), |(pad, pressure)| (pad.selector(), pressure));
        [0x80, 0x80, selector, velocity]
    }

    pub fn extension_record(&self) -> DrumRecord {
        encode_drum(self.buttons, MAPPING.buttons, &self.axes(), MAPPING.axes)
    }

    pub fn wpad_data(&self) -> WpadData {
        let [_, _, selector, velocity] = self.axes();
        WpadData {
            buttons: map_wiimote(self.buttons, MAPPING.wiimote),
            extension: Layout::Drums.extension(),
            ext: ExtensionData::Drum(DrumData {
                buttons: drum_to_wpad(self.extension_record().buttons),
                stick: [0, 0],
                which: i16::from(selector),
                velocity,
                whammy: 0,
            }),
            ..WpadData::default()
        }
    }
}

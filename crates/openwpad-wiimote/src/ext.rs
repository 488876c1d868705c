//! Extension controller records.
//!
//! A real extension answers every poll with a 6-byte record. The packing is
//! fixed by the controllers themselves, so every offset below is pinned by
//! a test.
//!
//! # Record layouts
//!
//! Bits are listed MSB first. `~bt` marks the active-low button word (bytes
//! 4–5, big-endian), restricted to the kind's `ALL` mask.
//!
//! | Kind      | Byte 0        | Byte 1        | Byte 2                           | Byte 3               |
//! |-----------|---------------|---------------|----------------------------------|----------------------|
//! | Nunchuk   | SX            | SY            | AX[9:2]                          | AY[9:2]              |
//! | Classic   | RX[4:3] LX    | RX[2:1] LY    | RX[0] LT[4:3] RY                 | LT[2:0] RT           |
//! | Guitar    | 00 SX         | 00 SY         | 000 TB                           | 000 WB               |
//! | Drum      | 00 SX         | 00 SY         | HHP HV SEL[4:0] 0                | VEL[2:0] 0110 0      |
//! | Turntable | RTT[4:3] SX   | RTT[2:1] SY   | RTT[0] ED[4:3] CF[3:0] RTT[5]    | ED[2:0] LTT[4:0]     |
//!
//! The nunchuk packs `AZ[9:2]` in byte 4 and `AZ[1:0] AY[1:0] AX[1:0] ~C ~Z`
//! in byte 5 instead of a button word. The turntable carries `LTT[5]` in bit
//! 8 of its button word, outside the active-low mask.

use serde::{Deserialize, Serialize};

use crate::buttons::{classic, drum, guitar, nunchuk, turntable};
use crate::wpad::Extension;

/// Length of every extension record.
pub const EXT_RECORD_LEN: usize = 6;

/// Identification bytes read from extension register 0xFA.
pub mod id_code {
    pub const NUNCHUK: [u8; 6] = [0x00, 0x00, 0xA4, 0x20, 0x00, 0x00];
    pub const CLASSIC: [u8; 6] = [0x00, 0x00, 0xA4, 0x20, 0x01, 0x01];
    pub const CLASSIC_WIIU_PRO: [u8; 6] = [0x00, 0x00, 0xA4, 0x20, 0x01, 0x20];
    pub const GUITAR: [u8; 6] = [0x00, 0x00, 0xA4, 0x20, 0x01, 0x03];
    pub const DRUM: [u8; 6] = [0x01, 0x00, 0xA4, 0x20, 0x01, 0x03];
    pub const TURNTABLE: [u8; 6] = [0x03, 0x00, 0xA4, 0x20, 0x01, 0x03];
    pub const MOTION_PLUS: [u8; 6] = [0x00, 0x00, 0xA6, 0x20, 0x00, 0x05];
}

/// Fixed filler the drum record carries in byte 3.
const DRUM_EXTRA: u8 = 0b0110;

fn active_low(buttons: u16, all: u16) -> [u8; 2] {
    ((!buttons) & all).to_be_bytes()
}

fn held(bytes: [u8; 2], all: u16) -> u16 {
    (!u16::from_be_bytes(bytes)) & all
}

/// Nunchuk record fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NunchukRecord {
    pub stick_x: u8,
    pub stick_y: u8,
    /// 10-bit accelerometer samples.
    pub accel: [u16; 3],
    pub c: bool,
    pub z: bool,
}

impl NunchukRecord {
    /// Build from held nunchuk buttons, the `[X, Y]` axes and raw 10-bit
    /// accelerometer samples.
    pub fn from_inputs(buttons: u8, axes: [u8; 2], accel: [u16; 3]) -> Self {
        Self {
            stick_x: axes[0],
            stick_y: axes[1],
            accel: accel.map(|a| a & 0x3FF),
            c: buttons & nunchuk::C != 0,
            z: buttons & nunchuk::Z != 0,
        }
    }

    pub fn pack(&self) -> [u8; EXT_RECORD_LEN] {
        let [ax, ay, az] = self.accel;
        let low = ((az & 3) << 6) | ((ay & 3) << 4) | ((ax & 3) << 2);
        let bt = low as u8 | (u8::from(!self.c) << 1) | u8::from(!self.z);
        [
            self.stick_x,
            self.stick_y,
            (ax >> 2) as u8,
            (ay >> 2) as u8,
            (az >> 2) as u8,
            bt,
        ]
    }

    pub fn unpack(bytes: &[u8; EXT_RECORD_LEN]) -> Self {
        let [sx, sy, ax, ay, az, bt] = *bytes;
        let ten = |hi: u8, shift: u8| (u16::from(hi) << 2) | u16::from((bt >> shift) & 3);
        Self {
            stick_x: sx,
            stick_y: sy,
            accel: [ten(ax, 2), ten(ay, 4), ten(az, 6)],
            c: bt & 0x02 == 0,
            z: bt & 0x01 == 0,
        }
    }
}

/// Classic controller record fields, already truncated to field width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicRecord {
    /// 6 bits
    pub lx: u8,
    /// 6 bits
    pub ly: u8,
    /// 5 bits
    pub rx: u8,
    /// 5 bits
    pub ry: u8,
    /// 5 bits
    pub lt: u8,
    /// 5 bits
    pub rt: u8,
    /// Held buttons, [`classic`] bits.
    pub buttons: u16,
}

impl ClassicRecord {
    /// Truncate `[LX, LY, RX, RY]` 8-bit axes. Triggers read fully pressed
    /// while FULL_L/FULL_R are held.
    pub fn from_axes(buttons: u16, axes: [u8; 4]) -> Self {
        let [lx, ly, rx, ry] = axes;
        let full = |mask: u16| if buttons & mask != 0 { 31 } else { 0 };
        Self {
            lx: lx >> 2,
            ly: ly >> 2,
            rx: rx >> 3,
            ry: ry >> 3,
            lt: full(classic::FULL_L),
            rt: full(classic::FULL_R),
            buttons,
        }
    }

    pub fn pack(&self) -> [u8; EXT_RECORD_LEN] {
        let [b4, b5] = active_low(self.buttons, classic::ALL);
        [
            (((self.rx >> 3) & 3) << 6) | (self.lx & 0x3F),
            (((self.rx >> 1) & 3) << 6) | (self.ly & 0x3F),
            ((self.rx & 1) << 7) | (((self.lt >> 3) & 3) << 5) | (self.ry & 0x1F),
            ((self.lt & 7) << 5) | (self.rt & 0x1F),
            b4,
            b5,
        ]
    }

    pub fn unpack(bytes: &[u8; EXT_RECORD_LEN]) -> Self {
        let [b0, b1, b2, b3, b4, b5] = *bytes;
        Self {
            lx: b0 & 0x3F,
            ly: b1 & 0x3F,
            rx: (((b0 >> 6) & 3) << 3) | (((b1 >> 6) & 3) << 1) | ((b2 >> 7) & 1),
            ry: b2 & 0x1F,
            lt: (((b2 >> 5) & 3) << 3) | ((b3 >> 5) & 7),
            rt: b3 & 0x1F,
            buttons: held([b4, b5], classic::ALL),
        }
    }
}

/// Guitar record fields, already truncated to field width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuitarRecord {
    /// 6 bits
    pub stick_x: u8,
    /// 6 bits
    pub stick_y: u8,
    /// 5 bits
    pub tap_bar: u8,
    /// 5 bits
    pub whammy: u8,
    /// Held buttons, [`guitar`] bits.
    pub buttons: u16,
}

impl GuitarRecord {
    /// Truncate `[STICK_X, STICK_Y, TAP_BAR, WHAMMY]` 8-bit axes.
    pub fn from_axes(buttons: u16, axes: [u8; 4]) -> Self {
        let [sx, sy, tb, wb] = axes;
        Self {
            stick_x: sx >> 2,
            stick_y: sy >> 2,
            tap_bar: tb >> 3,
            whammy: wb >> 3,
            buttons,
        }
    }

    pub fn pack(&self) -> [u8; EXT_RECORD_LEN] {
        let [b4, b5] = active_low(self.buttons, guitar::ALL);
        [
            self.stick_x & 0x3F,
            self.stick_y & 0x3F,
            self.tap_bar & 0x1F,
            self.whammy & 0x1F,
            b4,
            b5,
        ]
    }

    pub fn unpack(bytes: &[u8; EXT_RECORD_LEN]) -> Self {
        let [b0, b1, b2, b3, b4, b5] = *bytes;
        Self {
            stick_x: b0 & 0x3F,
            stick_y: b1 & 0x3F,
            tap_bar: b2 & 0x1F,
            whammy: b3 & 0x1F,
            buttons: held([b4, b5], guitar::ALL),
        }
    }
}

/// Velocity-sensitive pads, in strike priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DrumPad {
    Green,
    Red,
    Yellow,
    Blue,
    Orange,
    Kick,
}

impl DrumPad {
    pub const PRIORITY: [DrumPad; 6] = [
        DrumPad::Green,
        DrumPad::Red,
        DrumPad::Yellow,
        DrumPad::Blue,
        DrumPad::Orange,
        DrumPad::Kick,
    ];

    /// 5-bit velocity selector the Wii drum uses for this pad.
    pub const fn selector(self) -> u8 {
        match self {
            DrumPad::Green => 0b10010,
            DrumPad::Red => 0b11001,
            DrumPad::Yellow => 0b10001,
            DrumPad::Blue => 0b01111,
            DrumPad::Orange => 0b01110,
            DrumPad::Kick => 0b11011,
        }
    }

    /// The highest priority pad with non-zero pressure in `pressure`,
    /// indexed by pad, and its pressure.
    pub fn first_struck(pressure: &[u8; 6]) -> Option<(DrumPad, u8)> {
        Self::PRIORITY.into_iter().find_map(|pad| {
            let value = pressure.get(usize::from(pad as u8)).copied().unwrap_or(0);
            (value != 0).then_some((pad, value))
        })
    }
}

/// Drum record fields, already truncated to field width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumRecord {
    /// 6 bits
    pub stick_x: u8,
    /// 6 bits
    pub stick_y: u8,
    /// 5-bit code naming the struck pad.
    pub velocity_selector: u8,
    /// 3 bits
    pub velocity: u8,
    /// Held buttons, [`drum`] bits.
    pub buttons: u16,
}

impl DrumRecord {
    /// Truncate `[STICK_X, STICK_Y, VELOCITY_SELECTOR, VELOCITY]` axes. The
    /// selector is a code, not a magnitude, and is kept as is.
    pub fn from_axes(buttons: u16, axes: [u8; 4]) -> Self {
        let [sx, sy, selector, velocity] = axes;
        Self {
            stick_x: sx >> 2,
            stick_y: sy >> 2,
            velocity_selector: selector & 0x1F,
            velocity: velocity >> 5,
            buttons,
        }
    }

    pub fn pack(&self) -> [u8; EXT_RECORD_LEN] {
        let [b4, b5] = active_low(self.buttons, drum::ALL);
        [
            self.stick_x & 0x3F,
            self.stick_y & 0x3F,
            (self.velocity_selector & 0x1F) << 1,
            ((self.velocity & 7) << 5) | (DRUM_EXTRA << 1),
            b4,
            b5,
        ]
    }

    pub fn unpack(bytes: &[u8; EXT_RECORD_LEN]) -> Self {
        let [b0, b1, b2, b3, b4, b5] = *bytes;
        Self {
            stick_x: b0 & 0x3F,
            stick_y: b1 & 0x3F,
            velocity_selector: (b2 >> 1) & 0x1F,
            velocity: (b3 >> 5) & 7,
            buttons: held([b4, b5], drum::ALL),
        }
    }
}

/// Turntable record fields, already truncated to field width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurntableRecord {
    /// 6 bits
    pub stick_x: u8,
    /// 6 bits
    pub stick_y: u8,
    /// 6 bits, bit 5 is the direction.
    pub left_turntable: u8,
    /// 6 bits, bit 5 is the direction.
    pub right_turntable: u8,
    /// 4 bits
    pub crossfade: u8,
    /// 5 bits
    pub effects: u8,
    /// Held buttons, [`turntable`] bits.
    pub buttons: u16,
}

impl TurntableRecord {
    /// Truncate `[STICK_X, STICK_Y, LTT, RTT, CROSSFADER, EFFECTS]` 8-bit axes.
    ///
    /// Velocities are shifted like any other axis, so bit 5 stays clear.
    /// Decoders that know their platter's sign convention overwrite the
    /// velocity fields afterwards.
    pub fn from_axes(buttons: u16, axes: [u8; 6]) -> Self {
        let [sx, sy, ltt, rtt, crossfade, effects] = axes;
        Self {
            stick_x: sx >> 2,
            stick_y: sy >> 2,
            left_turntable: ltt >> 3,
            right_turntable: rtt >> 3,
            crossfade: crossfade >> 4,
            effects: effects >> 3,
            buttons,
        }
    }

    pub fn pack(&self) -> [u8; EXT_RECORD_LEN] {
        let rtt = self.right_turntable;
        let ltt = self.left_turntable;
        let ed = self.effects;
        let ltt_sign = if ltt & 0x20 != 0 {
            turntable::LTT_SIGN
        } else {
            0
        };
        let [b4, b5] = (((!self.buttons) & turntable::ALL) | ltt_sign).to_be_bytes();
        [
            (((rtt >> 3) & 3) << 6) | (self.stick_x & 0x3F),
            (((rtt >> 1) & 3) << 6) | (self.stick_y & 0x3F),
            ((rtt & 1) << 7) | (((ed >> 3) & 3) << 5) | ((self.crossfade & 0xF) << 1) | ((rtt >> 5) & 1),
            ((ed & 7) << 5) | (ltt & 0x1F),
            b4,
            b5,
        ]
    }

    pub fn unpack(bytes: &[u8; EXT_RECORD_LEN]) -> Self {
        let [b0, b1, b2, b3, b4, b5] = *bytes;
        let word = u16::from_be_bytes([b4, b5]);
        let ltt5 = u8::from(word & turntable::LTT_SIGN != 0);
        Self {
            stick_x: b0 & 0x3F,
            stick_y: b1 & 0x3F,
            left_turntable: (ltt5 << 5) | (b3 & 0x1F),
            right_turntable: ((b2 & 1) << 5)
                | (((b0 >> 6) & 3) << 3)
                | (((b1 >> 6) & 3) << 1)
                | ((b2 >> 7) & 1),
            crossfade: (b2 >> 1) & 0xF,
            effects: (((b2 >> 5) & 3) << 3) | ((b3 >> 5) & 7),
            buttons: (!word) & turntable::ALL,
        }
    }
}

/// One translated extension record, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionRecord {
    Nunchuk(NunchukRecord),
    Classic(ClassicRecord),
    Guitar(GuitarRecord),
    Drum(DrumRecord),
    Turntable(TurntableRecord),
}

impl ExtensionRecord {
    pub fn pack(&self) -> [u8; EXT_RECORD_LEN] {
        match self {
            ExtensionRecord::Nunchuk(r) => r.pack(),
            ExtensionRecord::Classic(r) => r.pack(),
            ExtensionRecord::Guitar(r) => r.pack(),
            ExtensionRecord::Drum(r) => r.pack(),
            ExtensionRecord::Turntable(r) => r.pack(),
        }
    }

    /// Identification bytes a real controller of this kind reports.
    pub fn id_code(&self) -> [u8; 6] {
        match self {
            ExtensionRecord::Nunchuk(_) => id_code::NUNCHUK,
            ExtensionRecord::Classic(_) => id_code::CLASSIC,
            ExtensionRecord::Guitar(_) => id_code::GUITAR,
            ExtensionRecord::Drum(_) => id_code::DRUM,
            ExtensionRecord::Turntable(_) => id_code::TURNTABLE,
        }
    }

    pub fn extension(&self) -> Extension {
        match self {
            ExtensionRecord::Nunchuk(_) => Extension::Nunchuk,
            ExtensionRecord::Classic(_) => Extension::Classic,
            ExtensionRecord::Guitar(_) => Extension::Guitar,
            ExtensionRecord::Drum(_) => Extension::Drum,
            ExtensionRecord::Turntable(_) => Extension::Turntable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nunchuk_pack_offsets() {
        let record = NunchukRecord::from_inputs(nunchuk::C, [0x80, 0x7F], [0x201, 0x3FE, 0x002]);
        let bytes = record.pack();
        assert_eq!(bytes[0], 0x80);
        assert_eq!(bytes[1], 0x7F);
        assert_eq!(bytes[2], 0x80);
        assert_eq!(bytes[3], 0xFF);
        assert_eq!(bytes[4], 0x00);
        // az lsb 2, ay lsb 2, ax lsb 1, C held (0), Z released (1)
        assert_eq!(bytes[5], 0b10_10_01_0_1);
        assert_eq!(NunchukRecord::unpack(&bytes), record);
    }

    #[test]
    fn test_classic_at_rest() {
        let record = ClassicRecord::from_axes(0, [0x80; 4]);
        assert_eq!(record.pack(), [0xA0, 0x20, 0x10, 0x00, 0xFE, 0xFF]);
    }

    #[test]
    fn test_classic_split_right_x() {
        let record = ClassicRecord {
            rx: 0b10110,
            ..ClassicRecord::default()
        };
        let bytes = record.pack();
        assert_eq!(bytes[0] >> 6, 0b10);
        assert_eq!(bytes[1] >> 6, 0b11);
        assert_eq!(bytes[2] >> 7, 0);
        assert_eq!(ClassicRecord::unpack(&bytes).rx, 0b10110);
    }

    #[test]
    fn test_classic_full_triggers() {
        let record = ClassicRecord::from_axes(classic::FULL_L | classic::FULL_R, [0; 4]);
        assert_eq!(record.lt, 31);
        assert_eq!(record.rt, 31);
        let bytes = record.pack();
        assert_eq!((bytes[2] >> 5) & 3, 0b11);
        assert_eq!(bytes[3], 0xFF);
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 0xFEFF & !0x2200);
    }

    #[test]
    fn test_guitar_released_and_green() {
        let idle = GuitarRecord::from_axes(0, [0x80, 0x80, 0, 0]);
        assert_eq!(idle.pack(), [0x20, 0x20, 0x00, 0x00, 0xFE, 0xFF]);

        let green = GuitarRecord::from_axes(guitar::GREEN, [0x80, 0x80, 0, 0xFF]);
        assert_eq!(green.pack(), [0x20, 0x20, 0x00, 0x1F, 0xFE, 0xEF]);
    }

    #[test]
    fn test_drum_velocity_and_filler() {
        let record = DrumRecord::from_axes(drum::RED, [0x80, 0x80, 0b11001, 0xE0]);
        let bytes = record.pack();
        assert_eq!(bytes[2], 0b11001 << 1);
        assert_eq!(bytes[3], (0b111 << 5) | 0b0110_0);
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 0xFEFF & !drum::RED);
        assert_eq!(DrumRecord::unpack(&bytes), record);
    }

    #[test]
    fn test_turntable_field_split() {
        let record = TurntableRecord {
            stick_x: 0x20,
            stick_y: 0x20,
            left_turntable: 0b10_1010,
            right_turntable: 0b11_0101,
            crossfade: 0b1001,
            effects: 0b1_0110,
            buttons: turntable::EUPHORIA,
        };
        let bytes = record.pack();
        // rtt[4:3] = 10, rtt[2:1] = 10, rtt[0] = 1, rtt[5] = 1
        assert_eq!(bytes[0], 0b10_100000);
        assert_eq!(bytes[1], 0b10_100000);
        assert_eq!(bytes[2], 0b1_10_1001_1);
        // ed[2:0] = 110, ltt[4:0] = 01010
        assert_eq!(bytes[3], 0b110_01010);
        let word = u16::from_be_bytes([bytes[4], bytes[5]]);
        assert_eq!(word & turntable::LTT_SIGN, turntable::LTT_SIGN);
        assert_eq!(word & turntable::EUPHORIA, 0);
        assert_eq!(TurntableRecord::unpack(&bytes), record);
    }

    #[test]
    fn test_turntable_velocity_truncates() {
        let stopped = TurntableRecord::from_axes(0, [0x80; 6]);
        assert_eq!(stopped.left_turntable, 16);
        let forward = TurntableRecord::from_axes(0, [0x80, 0x80, 0xC8, 0x80, 0, 0]);
        assert_eq!(forward.left_turntable, 25);
        let backward = TurntableRecord::from_axes(0, [0x80, 0x80, 0x80, 0x70, 0, 0]);
        assert_eq!(backward.right_turntable, 14);
        let full = TurntableRecord::from_axes(0, [0xFF; 6]);
        assert_eq!(full.left_turntable & 0x20, 0);
        let word = u16::from_be_bytes([full.pack()[4], full.pack()[5]]);
        assert_eq!(word & turntable::LTT_SIGN, 0);
    }

    #[test]
    fn test_turntable_effects_and_sign_bytes() {
        let record = TurntableRecord {
            stick_x: 0,
            stick_y: 0,
            left_turntable: 0b10_0001,
            right_turntable: 0b10_0000,
            crossfade: 0,
            effects: 0b1_0110,
            buttons: 0,
        };
        // ED[4:3] = 10 in byte 2, ED[2:0] = 110 in byte 3, RTT[5] in bit 0
        // of byte 2, LTT[5] in bit 8 of the button word.
        assert_eq!(record.pack(), [0x00, 0x00, 0b0_10_0000_1, 0b110_00001, 0xFF, 0xFF]);
        let unsigned = TurntableRecord {
            left_turntable: 0b00_0001,
            right_turntable: 0,
            ..record
        };
        assert_eq!(unsigned.pack(), [0x00, 0x00, 0b0_10_0000_0, 0b110_00001, 0xFE, 0xFF]);
    }

    #[test]
    fn test_extension_record_metadata() {
        let record = ExtensionRecord::Drum(DrumRecord::default());
        assert_eq!(record.id_code(), id_code::DRUM);
        assert_eq!(record.extension(), Extension::Drum);
    }

    #[test]
    fn test_first_struck_pad_priority() {
        assert_eq!(DrumPad::first_struck(&[0; 6]), None);
        // kick, blue and red struck together: red wins
        let pressure = [0, 0x40, 0, 0x10, 0, 0x7F];
        assert_eq!(DrumPad::first_struck(&pressure), Some((DrumPad::Red, 0x40)));
        assert_eq!(DrumPad::Red.selector(), 0b11001);
    }
}

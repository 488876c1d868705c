//! WPAD host record.
//!
//! The controller subsystem hands applications one packed, big-endian
//! `WPADData` structure per remote. Its core (buttons, accelerometer, IR,
//! extension tag and status) is always present; the extension block that
//! follows is interpreted according to the extension tag and only the part
//! the active data format covers is meaningful.
//!
//! # Record layout
//!
//! | Offset | Field                    | Type                                  |
//! |--------|--------------------------|---------------------------------------|
//! | 0x00   | buttons                  | u16                                   |
//! | 0x02   | acceleration[3]          | i16                                   |
//! | 0x08   | ir[4]                    | `{x i16, y i16, size u16, id u8, pad}` |
//! | 0x28   | extension                | u8                                    |
//! | 0x29   | status                   | i8                                    |
//! | 0x2a   | extension data           | 0x30 bytes                            |

use openwpad_hid_common::{HidCommonError, HidCommonResult, ReportBuilder, ReportReader};
use serde::{Deserialize, Serialize};

use crate::buttons::turntable;
use crate::ir::{IR_MAX_DOTS, IrDot};

/// Bytes up to and including the status field.
pub const WPAD_CORE_LEN: usize = 0x2a;
/// Full record length.
pub const WPAD_DATA_LEN: usize = 0x5a;

const EXT_DATA_LEN: usize = WPAD_DATA_LEN - WPAD_CORE_LEN;

/// Data format an application selects for a remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataFormat {
    #[default]
    Core = 0,
    CoreAcc = 1,
    CoreAccIr = 2,
    Nunchuk = 3,
    NunchukAcc = 4,
    NunchukAccIr = 5,
    Classic = 6,
    ClassicAcc = 7,
    ClassicAccIr = 8,
    Train = 10,
    Guitar = 11,
    Drum = 15,
    Taiko = 17,
    Turntable = 18,
}

impl DataFormat {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Core,
            1 => Self::CoreAcc,
            2 => Self::CoreAccIr,
            3 => Self::Nunchuk,
            4 => Self::NunchukAcc,
            5 => Self::NunchukAccIr,
            6 => Self::Classic,
            7 => Self::ClassicAcc,
            8 => Self::ClassicAccIr,
            10 => Self::Train,
            11 => Self::Guitar,
            15 => Self::Drum,
            17 => Self::Taiko,
            18 => Self::Turntable,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Number of record bytes an application reading this format expects.
    pub fn record_len(self) -> usize {
        match self {
            Self::Core | Self::CoreAcc | Self::CoreAccIr => WPAD_CORE_LEN,
            Self::Nunchuk | Self::NunchukAcc | Self::NunchukAccIr => 0x32,
            Self::Classic
            | Self::ClassicAcc
            | Self::ClassicAccIr
            | Self::Guitar
            | Self::Drum
            | Self::Turntable => 0x36,
            Self::Train | Self::Taiko => WPAD_DATA_LEN,
        }
    }
}

/// Extension kind reported by `probe` and in the record's extension byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Extension {
    #[default]
    None = 0,
    Nunchuk = 1,
    Classic = 2,
    MotionPlus = 5,
    MotionPlusNunchuk = 6,
    MotionPlusClassic = 7,
    Train = 16,
    Guitar = 17,
    Drum = 18,
    Taiko = 19,
    Turntable = 20,
    ProController = 31,
    Unknown = 255,
}

impl Extension {
    /// Map an extension byte; values with no named kind become `Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Nunchuk,
            2 => Self::Classic,
            5 => Self::MotionPlus,
            6 => Self::MotionPlusNunchuk,
            7 => Self::MotionPlusClassic,
            16 => Self::Train,
            17 => Self::Guitar,
            18 => Self::Drum,
            19 => Self::Taiko,
            20 => Self::Turntable,
            31 => Self::ProController,
            _ => Self::Unknown,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Connection status of a remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum WpadStatus {
    #[default]
    Ok = 0,
    Disconnected = -1,
}

impl WpadStatus {
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    pub fn from_i8(value: i8) -> Self {
        if value == 0 {
            Self::Ok
        } else {
            Self::Disconnected
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NunchukData {
    pub acceleration: [i16; 3],
    pub stick: [u8; 2],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicData {
    pub buttons: u16,
    pub left_stick: [i16; 2],
    pub right_stick: [i16; 2],
    pub trigger: [u8; 2],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuitarData {
    pub buttons: u16,
    pub stick: [i16; 2],
    /// Touch strip position, see [`GuitarData::TAP_BAR_NONE`].
    pub tap_bar: i16,
    pub whammy: u8,
}

impl GuitarData {
    pub const TAP_BAR_GREEN: i16 = 0x80;
    pub const TAP_BAR_GREEN_RED: i16 = 0xC0;
    pub const TAP_BAR_RED: i16 = 0x140;
    pub const TAP_BAR_RED_YELLOW: i16 = 0x1A0;
    pub const TAP_BAR_NONE: i16 = 0x1E0;
    pub const TAP_BAR_YELLOW: i16 = 0x240;
    pub const TAP_BAR_YELLOW_BLUE: i16 = 0x280;
    pub const TAP_BAR_BLUE: i16 = 0x2E0;
    pub const TAP_BAR_BLUE_ORANGE: i16 = 0x340;
    pub const TAP_BAR_ORANGE: i16 = 0x3E0;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumData {
    pub buttons: u16,
    pub stick: [i16; 2],
    /// Velocity selector of the struck pad.
    pub which: i16,
    pub velocity: u8,
    pub whammy: u8,
}

/// Turntable block. The left turntable direction lives in the button word
/// as [`turntable::LTT_SIGN`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurntableData {
    pub buttons: u16,
    pub stick: [i16; 2],
    /// 5 bits
    pub right_turntable: u8,
    pub right_sign: bool,
    /// 4 bits, centred at 8.
    pub cross_fader: u8,
    /// 5 bits, centred at 16.
    pub effects_dial: u8,
    /// 5 bits
    pub left_turntable: u8,
}

impl TurntableData {
    pub fn left_sign(&self) -> bool {
        self.buttons & turntable::LTT_SIGN != 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaikoData {
    pub buttons: u16,
}

/// Interpretation of the 0x30-byte extension block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionData {
    #[default]
    None,
    Nunchuk(NunchukData),
    Classic(ClassicData),
    Guitar(GuitarData),
    Drum(DrumData),
    Turntable(TurntableData),
    Taiko(TaikoData),
}

impl ExtensionData {
    /// Extension tag that goes with this block.
    pub fn extension(&self) -> Extension {
        match self {
            Self::None => Extension::None,
            Self::Nunchuk(_) => Extension::Nunchuk,
            Self::Classic(_) => Extension::Classic,
            Self::Guitar(_) => Extension::Guitar,
            Self::Drum(_) => Extension::Drum,
            Self::Turntable(_) => Extension::Turntable,
            Self::Taiko(_) => Extension::Taiko,
        }
    }

    fn encode(&self, out: &mut ReportBuilder) {
        match self {
            Self::None => {}
            Self::Nunchuk(n) => {
                for a in n.acceleration {
                    out.write_i16_be(a);
                }
                out.write_bytes(&n.stick);
            }
            Self::Classic(c) => {
                out.write_u16_be(c.buttons);
                for v in c.left_stick.into_iter().chain(c.right_stick) {
                    out.write_i16_be(v);
                }
                out.write_bytes(&c.trigger);
            }
            Self::Guitar(g) => {
                out.write_u16_be(g.buttons)
                    .write_i16_be(g.stick[0])
                    .write_i16_be(g.stick[1])
                    .write_zeros(2)
                    .write_i16_be(g.tap_bar)
                    .write_u8(0)
                    .write_u8(g.whammy);
            }
            Self::Drum(d) => {
                out.write_u16_be(d.buttons)
                    .write_i16_be(d.stick[0])
                    .write_i16_be(d.stick[1])
                    .write_zeros(2)
                    .write_i16_be(d.which)
                    .write_u8(d.velocity)
                    .write_u8(d.whammy);
            }
            Self::Turntable(t) => {
                let rtt = u16::from(t.right_turntable & 0x1F) << 5;
                let fader = (u16::from(t.cross_fader & 0xF) << 6) | (u16::from(t.right_sign) << 5);
                out.write_u16_be(t.buttons)
                    .write_i16_be(t.stick[0])
                    .write_i16_be(t.stick[1])
                    .write_u16_be(rtt)
                    .write_u16_be(fader)
                    .write_u8((t.effects_dial & 0x1F) << 3)
                    .write_u8((t.left_turntable & 0x1F) << 3);
            }
            Self::Taiko(t) => {
                out.write_u16_be(t.buttons);
            }
        }
    }

    fn decode(extension: Extension, r: &mut ReportReader<'_>) -> HidCommonResult<Self> {
        Ok(match extension {
            Extension::Nunchuk => Self::Nunchuk(NunchukData {
                acceleration: [r.read_i16_be()?, r.read_i16_be()?, r.read_i16_be()?],
                stick: [r.read_u8()?, r.read_u8()?],
            }),
            Extension::Classic => Self::Classic(ClassicData {
                buttons: r.read_u16_be()?,
                left_stick: [r.read_i16_be()?, r.read_i16_be()?],
                right_stick: [r.read_i16_be()?, r.read_i16_be()?],
                trigger: [r.read_u8()?, r.read_u8()?],
            }),
            Extension::Guitar => {
                let buttons = r.read_u16_be()?;
                let stick = [r.read_i16_be()?, r.read_i16_be()?];
                r.skip(2);
                let tap_bar = r.read_i16_be()?;
                r.skip(1);
                Self::Guitar(GuitarData {
                    buttons,
                    stick,
                    tap_bar,
                    whammy: r.read_u8()?,
                })
            }
            Extension::Drum => {
                let buttons = r.read_u16_be()?;
                let stick = [r.read_i16_be()?, r.read_i16_be()?];
                r.skip(2);
                Self::Drum(DrumData {
                    buttons,
                    stick,
                    which: r.read_i16_be()?,
                    velocity: r.read_u8()?,
                    whammy: r.read_u8()?,
                })
            }
            Extension::Turntable => {
                let buttons = r.read_u16_be()?;
                let stick = [r.read_i16_be()?, r.read_i16_be()?];
                let rtt = r.read_u16_be()?;
                let fader = r.read_u16_be()?;
                let effects = r.read_u8()?;
                let ltt = r.read_u8()?;
                Self::Turntable(TurntableData {
                    buttons,
                    stick,
                    right_turntable: ((rtt >> 5) & 0x1F) as u8,
                    right_sign: fader & 0x20 != 0,
                    cross_fader: ((fader >> 6) & 0xF) as u8,
                    effects_dial: effects >> 3,
                    left_turntable: ltt >> 3,
                })
            }
            Extension::Taiko => Self::Taiko(TaikoData {
                buttons: r.read_u16_be()?,
            }),
            _ => Self::None,
        })
    }
}

/// One WPAD host record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpadData {
    /// Core buttons in host layout (see [`crate::buttons::wpad_core`]).
    pub buttons: u16,
    pub acceleration: [i16; 3],
    pub ir: [IrDot; IR_MAX_DOTS],
    pub extension: Extension,
    pub status: WpadStatus,
    pub ext: ExtensionData,
}

impl Default for WpadData {
    fn default() -> Self {
        Self {
            buttons: 0,
            acceleration: [0; 3],
            ir: IrDot::all_off_screen(),
            extension: Extension::None,
            status: WpadStatus::Ok,
            ext: ExtensionData::None,
        }
    }
}

impl WpadData {
    /// Copy with the extension block cleared, as seen by a reader that
    /// asked for a different format than the one being produced.
    pub fn core_only(&self) -> Self {
        Self {
            ext: ExtensionData::None,
            ..*self
        }
    }

    /// Serialise the full 0x5a-byte record.
    pub fn to_bytes(&self) -> [u8; WPAD_DATA_LEN] {
        let mut b = ReportBuilder::with_capacity(WPAD_DATA_LEN);
        b.write_u16_be(self.buttons);
        for a in self.acceleration {
            b.write_i16_be(a);
        }
        for dot in &self.ir {
            b.write_i16_be(dot.x)
                .write_i16_be(dot.y)
                .write_u16_be(dot.size)
                .write_u8(dot.id)
                .write_u8(0);
        }
        b.write_u8(self.extension.as_u8())
            .write_i8(self.status.as_i8());
        self.ext.encode(&mut b);
        b.pad_to(WPAD_DATA_LEN);

        let mut out = [0u8; WPAD_DATA_LEN];
        for (dst, src) in out.iter_mut().zip(b.as_slice()) {
            *dst = *src;
        }
        out
    }

    /// The prefix an application reading `format` receives.
    pub fn bytes_for(&self, format: DataFormat) -> Vec<u8> {
        let bytes = self.to_bytes();
        bytes
            .get(..format.record_len())
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    }

    /// Parse a record. The extension block is interpreted according to the
    /// extension byte; a record cut short at the core yields no block.
    pub fn from_bytes(data: &[u8]) -> HidCommonResult<Self> {
        let mut r = ReportReader::require(data, WPAD_CORE_LEN)?;
        let buttons = r.read_u16_be()?;
        let acceleration = [r.read_i16_be()?, r.read_i16_be()?, r.read_i16_be()?];
        let mut ir = [IrDot::default(); IR_MAX_DOTS];
        for dot in &mut ir {
            dot.x = r.read_i16_be()?;
            dot.y = r.read_i16_be()?;
            dot.size = r.read_u16_be()?;
            dot.id = r.read_u8()?;
            r.skip(1);
        }
        let extension = Extension::from_u8(r.read_u8()?);
        let status = WpadStatus::from_i8(r.read_i8()?);
        let ext = if r.remaining() == 0 {
            ExtensionData::None
        } else {
            ExtensionData::decode(extension, &mut r)?
        };
        Ok(Self {
            buttons,
            acceleration,
            ir,
            extension,
            status,
            ext,
        })
    }
}

impl TryFrom<&[u8]> for WpadData {
    type Error = HidCommonError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

const _: () = assert!(EXT_DATA_LEN == 0x30);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{guitar, wpad_core};

    #[test]
    fn test_format_sizes() {
        assert_eq!(DataFormat::Core.record_len(), 0x2a);
        assert_eq!(DataFormat::CoreAccIr.record_len(), 0x2a);
        assert_eq!(DataFormat::NunchukAcc.record_len(), 0x32);
        assert_eq!(DataFormat::Classic.record_len(), 0x36);
        assert_eq!(DataFormat::Guitar.record_len(), 0x36);
        assert_eq!(DataFormat::Drum.record_len(), 0x36);
        assert_eq!(DataFormat::Turntable.record_len(), 0x36);
        assert_eq!(DataFormat::Taiko.record_len(), 0x5a);
        assert_eq!(DataFormat::Train.record_len(), 0x5a);
    }

    #[test]
    fn test_enum_codes() {
        assert_eq!(DataFormat::from_u8(18), Some(DataFormat::Turntable));
        assert_eq!(DataFormat::from_u8(9), None);
        assert_eq!(Extension::from_u8(19), Extension::Taiko);
        assert_eq!(Extension::from_u8(42), Extension::Unknown);
        assert_eq!(Extension::ProController.as_u8(), 31);
        assert_eq!(WpadStatus::Disconnected.as_i8(), -1);
    }

    #[test]
    fn test_core_offsets() {
        let data = WpadData {
            buttons: wpad_core::HOME | wpad_core::A,
            acceleration: [-1, 2, 0x100],
            extension: Extension::Guitar,
            status: WpadStatus::Disconnected,
            ..WpadData::default()
        };
        let bytes = data.to_bytes();
        assert_eq!(&bytes[0..2], &[0x88, 0x00]);
        assert_eq!(&bytes[2..8], &[0xFF, 0xFF, 0x00, 0x02, 0x01, 0x00]);
        // first IR dot is off screen: y = 1023
        assert_eq!(&bytes[10..12], &[0x03, 0xFF]);
        assert_eq!(bytes[0x28], 17);
        assert_eq!(bytes[0x29], 0xFF);
    }

    #[test]
    fn test_guitar_block_offsets() -> Result<(), HidCommonError> {
        let data = WpadData {
            extension: Extension::Guitar,
            ext: ExtensionData::Guitar(GuitarData {
                buttons: guitar::GREEN | guitar::STRUM_DOWN,
                stick: [-32, 31],
                tap_bar: GuitarData::TAP_BAR_NONE,
                whammy: 0x50,
            }),
            ..WpadData::default()
        };
        let bytes = data.to_bytes();
        assert_eq!(&bytes[0x2a..0x36], &[
            0x40, 0x10, 0xFF, 0xE0, 0x00, 0x1F, 0x00, 0x00, 0x01, 0xE0, 0x00, 0x50
        ]);
        assert_eq!(WpadData::from_bytes(&bytes)?, data);
        Ok(())
    }

    #[test]
    fn test_turntable_block_bits() -> Result<(), HidCommonError> {
        let block = TurntableData {
            buttons: turntable::EUPHORIA | turntable::LTT_SIGN,
            stick: [0, 0],
            right_turntable: 0x1F,
            right_sign: true,
            cross_fader: 8,
            effects_dial: 16,
            left_turntable: 3,
        };
        let data = WpadData {
            extension: Extension::Turntable,
            ext: ExtensionData::Turntable(block),
            ..WpadData::default()
        };
        let bytes = data.to_bytes();
        assert_eq!(&bytes[0x30..0x36], &[0x03, 0xE0, 0x02, 0x20, 0x80, 0x18]);
        let parsed = WpadData::from_bytes(&bytes)?;
        assert_eq!(parsed, data);
        assert!(block.left_sign());
        Ok(())
    }

    #[test]
    fn test_core_prefix_parses_without_block() -> Result<(), HidCommonError> {
        let data = WpadData {
            buttons: wpad_core::PLUS,
            extension: Extension::Classic,
            ext: ExtensionData::Classic(ClassicData::default()),
            ..WpadData::default()
        };
        let prefix = data.bytes_for(DataFormat::Core);
        assert_eq!(prefix.len(), WPAD_CORE_LEN);
        let parsed = WpadData::from_bytes(&prefix)?;
        assert_eq!(parsed, data.core_only());
        Ok(())
    }

    #[test]
    fn test_too_short_is_an_error() {
        assert_eq!(
            WpadData::from_bytes(&[0; 4]),
            Err(HidCommonError::TooShort { got: 4, need: 0x2a })
        );
    }
}

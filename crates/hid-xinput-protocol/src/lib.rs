//! Xbox 360 wireless receiver protocol.
//!
//! The receiver multiplexes one wireless controller per interface behind
//! a small packet framing: link, capability and disconnect notifications,
//! and input packets carrying the same XInput payload a wired controller
//! sends. The controller kind is only known once a link packet names its
//! subtype, so a freshly bound receiver starts out provisional; see
//! [`receiver::Receiver`].
//!
//! # VID / PID
//! - Vendor ID: `0x045E` (Microsoft Corp.)
//! - Wireless receiver: `0x0291`, `0x02A9` (third party), `0x0719`
//!
//! # Payload
//! Payload offsets in this crate count from the report ID byte, which sits
//! at offset 4 of an input packet. Byte 2 holds the d-pad, start and back,
//! byte 3 the face buttons and guide.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod drums;
pub mod gamepad;
pub mod guitar;
pub mod ids;
pub mod messages;
pub mod packet;
pub mod receiver;
pub mod subtype;
pub mod turntable;

use openwpad_hid_common::Dpad;
use openwpad_wiimote::{ExtensionRecord, WpadData};
use serde::{Deserialize, Serialize};

pub use ids::{MICROSOFT_VID, RECEIVER_PIDS, is_wireless_receiver, product_name};
pub use packet::Packet;
pub use receiver::{Receiver, ReceiverEvent};
pub use subtype::{Layout, Subtype};

/// Payload bytes the decoders read.
pub const PAYLOAD_LEN: usize = 14;

/// Errors returned by the packet and payload parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The byte slice was too short to contain all required fields.
    TooShort { got: usize, need: usize },
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::TooShort { got, need } => {
                write!(f, "report too short: got {got} bytes, need {need}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub(crate) fn fixed<const N: usize>(data: &[u8]) -> Result<&[u8; N], ParseError> {
    data.get(..N)
        .and_then(|head| <&[u8; N]>::try_from(head).ok())
        .ok_or(ParseError::TooShort {
            got: data.len(),
            need: N,
        })
}

pub(crate) fn i16_le(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

/// Signed 16-bit axis reduced to an 8-bit offset-binary axis.
pub(crate) fn offset_binary(value: i16) -> u8 {
    value.to_be_bytes()[0] ^ 0x80
}

/// D-pad bits in the low nibble of payload byte 2.
pub(crate) fn dpad(byte: u8) -> Dpad {
    Dpad {
        up: byte & 0x01 != 0,
        down: byte & 0x02 != 0,
        left: byte & 0x04 != 0,
        right: byte & 0x08 != 0,
    }
}

/// A decoded payload, shaped by the controller's subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    Gamepad(gamepad::GamepadReport),
    Guitar(guitar::GuitarReport),
    Drums(drums::DrumReport),
    Turntable(turntable::TurntableReport),
}

impl Input {
    /// Decode `payload` with the layout `subtype` selects.
    pub fn decode(subtype: Subtype, payload: &[u8]) -> Result<Self, ParseError> {
        Ok(match subtype.layout() {
            Layout::Gamepad => Self::Gamepad(gamepad::parse(payload)?),
            Layout::GuitarHeroGuitar => {
                Self::Guitar(guitar::parse(guitar::GuitarKind::GuitarHero, payload)?)
            }
            Layout::RockBandGuitar => {
                Self::Guitar(guitar::parse(guitar::GuitarKind::RockBand, payload)?)
            }
            Layout::Drums => Self::Drums(drums::parse(payload)?),
            Layout::Turntable => Self::Turntable(turntable::parse(payload)?),
        })
    }

    pub fn extension_record(&self) -> ExtensionRecord {
        match self {
            Self::Gamepad(r) => ExtensionRecord::Classic(r.extension_record()),
            Self::Guitar(r) => ExtensionRecord::Guitar(r.extension_record()),
            Self::Drums(r) => ExtensionRecord::Drum(r.extension_record()),
            Self::Turntable(r) => ExtensionRecord::Turntable(r.extension_record()),
        }
    }

    pub fn wpad_data(&self) -> WpadData {
        match self {
            Self::Gamepad(r) => r.wpad_data(),
            Self::Guitar(r) => r.wpad_data(),
            Self::Drums(r) => r.wpad_data(),
            Self::Turntable(r) => r.wpad_data(),
        }
    }
}

//! PS3 rhythm-game instrument USB HID protocol.
//!
//! The Guitar Hero and DJ Hero instruments sold for the PS3 ship with a
//! USB dongle that enumerates as a plain HID gamepad under the Sony
//! instrument vendor ID. All of them share the same 27-byte report frame:
//! face buttons in bytes 0–1, a hat in byte 2, then per-instrument analog
//! fields. The Santroller firmware emulates the guitar frame once it has
//! been switched into PS3 mode.
//!
//! # VID / PID
//! - Vendor ID: `0x12BA` (Sony Computer Entertainment America, instruments)
//! - Guitar Hero guitar: `0x0100`, Guitar Hero drums: `0x0120`,
//!   DJ Hero turntable: `0x0140`
//! - Santroller: `0x1209:0x2882` (pid.codes)
//!
//! # Translation
//! Each family decodes to a logical button set and axis array and carries
//! the tables that route them into a Wii extension record
//! ([`openwpad_button_map::ExtensionMapping`]) and into the WPAD host
//! record.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod drums;
pub mod guitar;
pub mod ids;
pub mod santroller;
pub mod turntable;

pub use drums::{DrumButton, DrumPad, DrumReport};
pub use guitar::{GuitarButton, GuitarReport};
pub use ids::{
    DJ_TURNTABLE_PID, GH_DRUM_PID, GH_GUITAR_PID, SANTROLLER_PID, SANTROLLER_VID,
    SONY_INSTRUMENT_VID, is_gh_drums, is_gh_guitar, is_santroller, is_turntable, product_name,
};
pub use turntable::{TurntableButton, TurntableReport};

/// Errors returned by the report parsers.
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

/// Borrow the first `N` bytes of `data` as a fixed-size report.
pub(crate) fn fixed<const N: usize>(data: &[u8]) -> Result<&[u8; N], ParseError> {
    data.get(..N)
        .and_then(|head| <&[u8; N]>::try_from(head).ok())
        .ok_or(ParseError::TooShort {
            got: data.len(),
            need: N,
        })
}

/// Host record stick value from a 6-bit extension record stick field.
pub fn host_stick(record_axis: u8) -> i16 {
    i16::from(record_axis & 0x3F) - 32
}

/// Host record accelerometer sample from a raw 10-bit reading, with the
/// axis sign chosen by `invert`.
pub(crate) fn centred_accel(raw: u16, invert: bool) -> i16 {
    let centred = i16::try_from(raw & 0x3FF).unwrap_or(0) - 511;
    if invert { -centred } else { centred }
}

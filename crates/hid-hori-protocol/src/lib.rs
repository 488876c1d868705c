//! Hori Taiko no Tatsujin drum controller USB HID protocol.
//!
//! The drum presents as a Wii Remote with the taiko extension. Its face
//! buttons drive the Wii Remote, the four drum zones drive the extension.
//!
//! # VID / PID
//! - Vendor ID: `0x0F0D` (HORI Co., Ltd.)
//! - Taiko drum (Switch): `0x00F0`
//!
//! # Output
//! Player LEDs are set once at bind time through a SET_REPORT control
//! transfer; see [`leds`].

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod leds;
pub mod taiko;

pub use ids::{HORI_VID, TAIKO_PID, is_taiko, product_name};
pub use taiko::{TaikoButton, TaikoReport};

/// Errors returned by the report parser.
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

//! Sony DualShock USB HID protocol.
//!
//! Both generations present as a Wii classic controller: the face buttons,
//! shoulders and sticks translate one to one, the analog L2/R2 travel lands
//! in the host record's trigger bytes.
//!
//! # VID / PID
//! - Vendor ID: `0x054C` (Sony Corp.)
//! - DualShock 3 (SIXAXIS): `0x0268`
//! - DualShock 4: `0x05C4` (CUH-ZCT1), `0x09CC` (CUH-ZCT2)
//!
//! # Output
//! The DualShock 3 needs a feature GET_REPORT before it streams input and
//! takes LEDs and rumble through a SET_REPORT control transfer. The
//! DualShock 4 takes both in one interrupt OUT report.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod ds3;
pub mod ds4;
pub mod gamepad;
pub mod ids;

pub use ds3::Ds3Report;
pub use ds4::{Ds4Report, TouchPoint};
pub use gamepad::{GamepadState, PadButton};
pub use ids::{DS3_PID, DS4_PID, DS4_V2_PID, SONY_VID, is_ds3, is_ds4, product_name};

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

pub(crate) fn fixed<const N: usize>(data: &[u8]) -> Result<&[u8; N], ParseError> {
    data.get(..N)
        .and_then(|head| <&[u8; N]>::try_from(head).ok())
        .ok_or(ParseError::TooShort {
            got: data.len(),
            need: N,
        })
}

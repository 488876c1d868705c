//! Wii Remote target formats.
//!
//! Two record families live here:
//!
//! - the 6-byte **extension records** a real extension controller streams to
//!   the Wii Remote (nunchuk, classic, guitar, drum, turntable). These are
//!   bit-packed, with active-low buttons and truncated axes.
//! - the **WPAD host record** ([`WpadData`]) the controller subsystem hands
//!   to an application, a packed big-endian structure of up to 0x5a bytes.
//!
//! Everything is pure data: no I/O and no allocation on the encode path.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod accel;
pub mod buttons;
pub mod ext;
pub mod ir;
pub mod wpad;

pub use accel::{ACCEL_ONE_G, ACCEL_ZERO_G, GravityUnit};
pub use ext::{
    ClassicRecord, DrumPad, DrumRecord, EXT_RECORD_LEN, ExtensionRecord, GuitarRecord,
    NunchukRecord, TurntableRecord,
};
pub use ir::{IR_MAX_DOTS, IrDot};
pub use wpad::{
    ClassicData, DataFormat, DrumData, Extension, ExtensionData, GuitarData, NunchukData,
    TaikoData, TurntableData, WPAD_CORE_LEN, WPAD_DATA_LEN, WpadData, WpadStatus,
};

//! Mapping engine.
//!
//! Family decoders report a [`ButtonSet`] indexed by their own logical
//! buttons plus an ordered array of 8-bit axes. The functions here turn
//! that into Wii Remote records through per-family tables:
//!
//! - a button table maps logical index `i` to the target mask OR-ed in
//!   while `i` is held;
//! - an axis table maps source axis `i` to a 1-based target axis slot
//!   (0 leaves the source unused).
//!
//! Everything is pure; the only state lives in [`SwitchMapping`] and
//! [`IrEmulationState`], owned by the caller.

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod encode;
pub mod ir;
pub mod remap;
pub mod switch;

pub use encode::{
    ExtensionMapping, axis, encode_classic, encode_drum, encode_guitar, encode_nunchuk,
    encode_turntable,
};
pub use ir::{IrAxis, IrEmulationMode, IrEmulationState, map_ir_analog_axis, map_ir_direct};
pub use openwpad_hid_common::ButtonSet;
pub use remap::{map_axes, map_buttons, map_wiimote};
pub use switch::SwitchMapping;

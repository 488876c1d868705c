//! OpenWPAD engine - USB controllers presented as Wii remotes
//!
//! This crate binds USB HID devices to emulated remote slots. It owns the
//! device registry, the transport enumeration state machine, one poll
//! loop per bound slot and the slot cache the host subsystem reads.
//!
//! The engine is completion driven: every step reacts to one
//! [`openwpad_usb_hid::IosCompletion`], either handed in directly with
//! [`Bridge::handle_completion`] or received over a channel by
//! [`Bridge::run`]. Nothing blocks and nothing is polled on a timer.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod bridge;
pub mod config;
pub mod driver;
pub mod family;
pub mod host;
pub mod registry;
pub mod replay;

pub use bridge::{Bridge, BridgeState};
pub use config::{BridgeConfig, MAX_SLOTS, OutputConfig, OutputToggles};
pub use driver::{Driver, KindChange, Personality};
pub use family::{Decoded, Family};
pub use host::{EmulatedWpad, NullWpad, SlotCache, Wpad};
pub use registry::{Diff, Registry, SlotState, diff};
pub use replay::{Replay, ReplayError, ReplayEvent, Session, Step, run_session};

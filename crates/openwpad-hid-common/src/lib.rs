//! Common HID utilities for OpenWPAD device families
//!
//! This crate provides the pieces every device family decoder shares:
//! bounds-checked report readers and writers, logical button sets, D-pad
//! hat expansion, control request setups and USB device identity.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod buttons;
pub mod device_info;
pub mod hat;
pub mod report_parser;
pub mod setup;

pub use buttons::*;
pub use device_info::*;
pub use hat::*;
pub use report_parser::*;
pub use setup::ControlSetup;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidCommonError {
    #[error("report too short: got {got} bytes, need {need}")]
    TooShort { got: usize, need: usize },

    #[error("Invalid report format: {0}")]
    InvalidReport(String),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;

//! Santroller guitars.
//!
//! Santroller firmware answers the PS3 console's enable-reporting request
//! by switching into PS3 instrument mode, after which it streams the same
//! 27-byte frame as the Guitar Hero guitar dongle. The request is sent once
//! at bind time; the poll loop starts when it completes.

use openwpad_hid_common::ControlSetup;
use openwpad_hid_common::setup::report_type;

use crate::ParseError;
use crate::guitar::{self, GuitarReport};

/// Feature report the PS3 reads to enable reporting.
pub const MODE_SWITCH_REPORT_ID: u8 = 0xF2;
pub const MODE_SWITCH_LEN: u16 = 0x11;

/// GET_REPORT(feature 0xF2) that switches the firmware into PS3 mode.
pub const MODE_SWITCH: ControlSetup =
    ControlSetup::get_report(report_type::FEATURE, MODE_SWITCH_REPORT_ID, MODE_SWITCH_LEN);

pub use guitar::{DATA_FORMAT, EXTENSION, GRAVITY_UNIT, MAPPING, REPORT_LEN};

/// Parse a report received after the mode switch.
pub fn parse(data: &[u8]) -> Result<GuitarReport, ParseError> {
    guitar::parse(data)
}

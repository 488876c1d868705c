//! Player LED output report.
//!
//! `[0x01, 0x08, mask, 0, 0, 0, 0, 0]` sent with SET_REPORT(output 0x01).
//! The mask lights LED `n` for zero-based player `n`.

use openwpad_hid_common::ControlSetup;
use openwpad_hid_common::setup::report_type;

pub const REPORT_ID: u8 = 0x01;
pub const REPORT_LEN: usize = 8;

pub const SETUP: ControlSetup =
    ControlSetup::set_report(report_type::OUTPUT, REPORT_ID, REPORT_LEN as u16);

pub fn player_mask(slot: usize) -> u8 {
    u32::try_from(slot)
        .ok()
        .and_then(|shift| 1u8.checked_shl(shift))
        .unwrap_or(0)
}

pub fn report(slot: usize) -> [u8; REPORT_LEN] {
    [REPORT_ID, 0x08, player_mask(slot), 0, 0, 0, 0, 0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwpad_hid_common::setup::REQTYPE_INTERFACE_SET;

    #[test]
    fn test_setup() {
        assert_eq!(SETUP.request_type, REQTYPE_INTERFACE_SET);
        assert_eq!(SETUP.request, 0x09);
        assert_eq!(SETUP.value, 0x0201);
        assert_eq!(SETUP.length, 8);
    }

    #[test]
    fn test_player_reports() {
        assert_eq!(report(0), [0x01, 0x08, 0x01, 0, 0, 0, 0, 0]);
        assert_eq!(report(3), [0x01, 0x08, 0x08, 0, 0, 0, 0, 0]);
        assert_eq!(player_mask(8), 0);
    }
}

//! Property tests for the DualShock decoders.
//!
//! Verifies invariants across a wide range of inputs using `proptest`.

use openwpad_hid_dualshock_protocol::{ParseError, ds3, ds4, gamepad};
use openwpad_wiimote::buttons::classic;
use openwpad_wiimote::ExtensionData;
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    /// Short DualShock 3 reports are rejected with the exact lengths.
    #[test]
    fn prop_short_ds3_is_rejected(data in proptest::collection::vec(any::<u8>(), 0..49)) {
        prop_assert_eq!(
            ds3::parse(&data),
            Err(ParseError::TooShort { got: data.len(), need: 49 })
        );
    }

    /// Any full poll parses and keeps the record inside the classic mask.
    #[test]
    fn prop_ds4_buttons_in_mask(data in any::<[u8; 64]>()) {
        let report = ds4::parse(&data).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let record = report.gamepad().extension_record();
        prop_assert_eq!(record.buttons & !classic::ALL, 0);
        prop_assert_eq!(record.lx, data[1] >> 2);
        prop_assert_eq!(record.ry, data[4] >> 3);
    }

    /// Sticks widen symmetrically into the host record.
    #[test]
    fn prop_host_stick_tracks_axis(lx in any::<u8>(), ry in any::<u8>()) {
        let mut data = [0u8; ds3::REPORT_LEN];
        data[6] = lx;
        data[7] = 0x80;
        data[8] = 0x80;
        data[9] = ry;
        let report = ds3::parse(&data).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let ExtensionData::Classic(block) = report.gamepad().wpad_data().ext else {
            return Err(TestCaseError::fail("expected a classic block"));
        };
        prop_assert_eq!(block.left_stick, [gamepad::host_stick(lx), 0]);
        prop_assert_eq!(block.right_stick, [0, gamepad::host_stick(ry)]);
        prop_assert_eq!(i32::from(block.left_stick[0]) % 4, 0);
    }

    /// Inactive touch slots never yield a contact.
    #[test]
    fn prop_inactive_fingers_are_dropped(finger in any::<[u8; 4]>()) {
        let mut data = [0u8; ds4::POLL_LEN];
        data[35] = finger[0] | 0x80;
        data[36..39].copy_from_slice(&finger[1..]);
        data[39] = 0x80;
        let report = ds4::parse(&data).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(report.touch_coords().count(), 0);
    }

    /// LED and lightbar choices are defined for every slot.
    #[test]
    fn prop_slot_outputs(slot in 0usize..64, rumble in any::<bool>()) {
        let leds = ds3::led_mask(slot);
        prop_assert!(ds3::LED_PATTERN.contains(&leds));
        let out = ds4::output_report(ds4::lightbar(slot), rumble);
        prop_assert_eq!(out[0], 0x05);
        prop_assert_eq!(out[4] != 0, rumble);
    }
}

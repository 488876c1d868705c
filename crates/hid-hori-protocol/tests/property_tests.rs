//! Property tests for the taiko decoder.

use openwpad_hid_hori_protocol::{ParseError, leds, taiko};
use openwpad_wiimote::buttons::{taiko as taiko_bits, wpad_core};
use openwpad_wiimote::ExtensionData;
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    #[test]
    fn prop_short_report_is_rejected(data in proptest::collection::vec(any::<u8>(), 0..27)) {
        prop_assert_eq!(
            taiko::parse(&data),
            Err(ParseError::TooShort { got: data.len(), need: 27 })
        );
    }

    /// Any report stays inside the host masks, and acceleration inside
    /// the 10-bit range.
    #[test]
    fn prop_host_record_in_range(data in any::<[u8; 27]>()) {
        let wpad = taiko::parse(&data)
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .wpad_data();
        prop_assert_eq!(wpad.buttons & !wpad_core::ALL, 0);
        let ExtensionData::Taiko(block) = wpad.ext else {
            return Err(TestCaseError::fail("expected a taiko block"));
        };
        let zones = taiko_bits::CENTER_LEFT
            | taiko_bits::CENTER_RIGHT
            | taiko_bits::RIM_LEFT
            | taiko_bits::RIM_RIGHT;
        prop_assert_eq!(block.buttons & !zones, 0);
        for axis in wpad.acceleration {
            prop_assert!((-512..=512).contains(&axis));
        }
    }

    /// Only the first eight players get an LED.
    #[test]
    fn prop_led_mask_single_bit(slot in 0usize..16) {
        let mask = leds::player_mask(slot);
        prop_assert_eq!(mask.count_ones(), u32::from(slot < 8));
    }
}

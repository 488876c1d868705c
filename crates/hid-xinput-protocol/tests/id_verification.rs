//! Cross-reference tests for the Xbox 360 receiver VID/PID constants.
//!
//! If an assertion fails, fix `ids.rs`; the engine's family registration
//! relies on them.

use openwpad_hid_xinput_protocol::ids::{RECEIVER_PID, RECEIVER_THIRD_PARTY_PID, RECEIVER_V1_PID};
use openwpad_hid_xinput_protocol::{MICROSOFT_VID, RECEIVER_PIDS, is_wireless_receiver};

/// Microsoft Corp.
#[test]
fn vendor_id_is_045e() {
    assert_eq!(MICROSOFT_VID, 0x045E);
}

#[test]
fn receiver_pids() {
    assert_eq!(RECEIVER_V1_PID, 0x0291);
    assert_eq!(RECEIVER_THIRD_PARTY_PID, 0x02A9);
    assert_eq!(RECEIVER_PID, 0x0719);
    for pid in RECEIVER_PIDS {
        assert!(is_wireless_receiver(MICROSOFT_VID, pid));
    }
}

#[test]
fn wired_controller_is_not_a_receiver() {
    assert!(!is_wireless_receiver(MICROSOFT_VID, 0x028E));
    assert!(!is_wireless_receiver(0x0E6F, RECEIVER_PID));
}

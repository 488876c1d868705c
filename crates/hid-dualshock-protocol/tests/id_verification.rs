//! Cross-reference tests for the DualShock VID/PID constants.
//!
//! These values are what the controllers report on the bus. If an
//! assertion fails, fix `ids.rs`; the engine's family registration relies
//! on them.

use openwpad_hid_dualshock_protocol::{DS3_PID, DS4_PID, DS4_V2_PID, SONY_VID, is_ds3, is_ds4};

/// Sony Corp.
#[test]
fn vendor_id_is_054c() {
    assert_eq!(SONY_VID, 0x054C);
}

#[test]
fn ds3_pid_is_0268() {
    assert_eq!(DS3_PID, 0x0268);
}

/// CUH-ZCT1.
#[test]
fn ds4_pid_is_05c4() {
    assert_eq!(DS4_PID, 0x05C4);
}

/// CUH-ZCT2.
#[test]
fn ds4_v2_pid_is_09cc() {
    assert_eq!(DS4_V2_PID, 0x09CC);
}

#[test]
fn generations_do_not_overlap() {
    for pid in [DS3_PID, DS4_PID, DS4_V2_PID] {
        assert_ne!(is_ds3(SONY_VID, pid), is_ds4(SONY_VID, pid), "pid {pid:#06x}");
    }
}

//! Golden capture for the taiko drum.

use insta::assert_snapshot;
use openwpad_hid_hori_protocol::{leds, taiko};

/// A held, right rim and left centre struck, hat centred.
const TAIKO_A_RIM_CENTER: &str = "840408000000000000000000000000000000001002f00100020000";

fn capture(text: &str) -> Result<Vec<u8>, String> {
    hex::decode(text).map_err(|e| e.to_string())
}

#[test]
fn test_snapshot_taiko_host_record() -> Result<(), String> {
    let report = taiko::parse(&capture(TAIKO_A_RIM_CENTER)?).map_err(|e| e.to_string())?;
    let bytes = report.wpad_data().to_bytes();
    assert_snapshot!(
        format!("{:02X?}", bytes.get(..8).unwrap_or_default()),
        @"[08, 00, 00, 11, FF, FF, 00, 0F]"
    );
    assert_snapshot!(
        format!("{:02X?}", bytes.get(0x28..0x2C).unwrap_or_default()),
        @"[13, 00, 00, 48]"
    );
    Ok(())
}

#[test]
fn test_snapshot_player_leds() {
    let bytes = leds::report(1);
    assert_snapshot!(format!("{bytes:02X?}"), @"[01, 08, 02, 00, 00, 00, 00, 00]");
}

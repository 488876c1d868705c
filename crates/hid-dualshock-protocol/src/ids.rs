//! USB identifiers for DualShock controllers.

/// Sony Corp.
pub const SONY_VID: u16 = 0x054C;

/// DualShock 3 / SIXAXIS.
pub const DS3_PID: u16 = 0x0268;

/// DualShock 4, first revision.
pub const DS4_PID: u16 = 0x05C4;

/// DualShock 4, second revision.
pub const DS4_V2_PID: u16 = 0x09CC;

pub fn is_ds3(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_VID && product_id == DS3_PID
}

pub fn is_ds4(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_VID && matches!(product_id, DS4_PID | DS4_V2_PID)
}

pub fn product_name(vendor_id: u16, product_id: u16) -> Option<&'static str> {
    if vendor_id != SONY_VID {
        return None;
    }
    match product_id {
        DS3_PID => Some("DualShock 3"),
        DS4_PID => Some("DualShock 4"),
        DS4_V2_PID => Some("DualShock 4 (v2)"),
        _ => None,
    }
}

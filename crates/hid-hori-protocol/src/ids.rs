//! USB identifiers for Hori controllers.

/// HORI Co., Ltd.
pub const HORI_VID: u16 = 0x0F0D;

/// Taiko no Tatsujin drum controller for Switch.
pub const TAIKO_PID: u16 = 0x00F0;

pub fn is_taiko(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == HORI_VID && product_id == TAIKO_PID
}

pub fn product_name(vendor_id: u16, product_id: u16) -> Option<&'static str> {
    is_taiko(vendor_id, product_id).then_some("Hori Taiko Drum")
}

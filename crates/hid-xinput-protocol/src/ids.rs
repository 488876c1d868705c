//! USB identifiers for Xbox 360 wireless receivers.

/// Microsoft Corp.
pub const MICROSOFT_VID: u16 = 0x045E;

/// Xbox 360 Wireless Receiver for Windows.
pub const RECEIVER_PID: u16 = 0x0719;
/// First revision receiver.
pub const RECEIVER_V1_PID: u16 = 0x0291;
/// Third party receivers reusing Microsoft's vendor ID.
pub const RECEIVER_THIRD_PARTY_PID: u16 = 0x02A9;

pub const RECEIVER_PIDS: [u16; 3] = [RECEIVER_V1_PID, RECEIVER_THIRD_PARTY_PID, RECEIVER_PID];

pub fn is_wireless_receiver(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == MICROSOFT_VID && RECEIVER_PIDS.contains(&product_id)
}

pub fn product_name(vendor_id: u16, product_id: u16) -> Option<&'static str> {
    if vendor_id != MICROSOFT_VID {
        return None;
    }
    match product_id {
        RECEIVER_PID | RECEIVER_V1_PID => Some("Xbox 360 Wireless Receiver"),
        RECEIVER_THIRD_PARTY_PID => Some("Xbox 360 Wireless Receiver (third party)"),
        _ => None,
    }
}

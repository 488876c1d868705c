//! USB identifiers for PS3 instruments.

/// Sony Computer Entertainment America, used for the instrument dongles.
pub const SONY_INSTRUMENT_VID: u16 = 0x12BA;

/// Guitar Hero guitar dongle.
pub const GH_GUITAR_PID: u16 = 0x0100;

/// Guitar Hero World Tour drum kit dongle.
pub const GH_DRUM_PID: u16 = 0x0120;

/// DJ Hero turntable dongle.
pub const DJ_TURNTABLE_PID: u16 = 0x0140;

/// pid.codes vendor ID, shared by open-source hardware.
pub const SANTROLLER_VID: u16 = 0x1209;

/// Santroller DIY controller firmware.
pub const SANTROLLER_PID: u16 = 0x2882;

pub fn is_gh_guitar(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_INSTRUMENT_VID && product_id == GH_GUITAR_PID
}

pub fn is_gh_drums(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_INSTRUMENT_VID && product_id == GH_DRUM_PID
}

pub fn is_turntable(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_INSTRUMENT_VID && product_id == DJ_TURNTABLE_PID
}

pub fn is_santroller(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SANTROLLER_VID && product_id == SANTROLLER_PID
}

/// Returns the product name for a known instrument, or `None`.
pub fn product_name(vendor_id: u16, product_id: u16) -> Option<&'static str> {
    match (vendor_id, product_id) {
        (SONY_INSTRUMENT_VID, GH_GUITAR_PID) => Some("Guitar Hero Guitar"),
        (SONY_INSTRUMENT_VID, GH_DRUM_PID) => Some("Guitar Hero Drums"),
        (SONY_INSTRUMENT_VID, DJ_TURNTABLE_PID) => Some("DJ Hero Turntable"),
        (SANTROLLER_VID, SANTROLLER_PID) => Some("Santroller"),
        _ => None,
    }
}

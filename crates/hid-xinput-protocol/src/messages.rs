//! Commands sent to the receiver on the interrupt OUT endpoint. Each is a
//! 12-byte transfer, zero padded.

pub const MESSAGE_LEN: usize = 12;

const fn message(head: [u8; 4]) -> [u8; MESSAGE_LEN] {
    let [a, b, c, d] = head;
    [a, b, c, d, 0, 0, 0, 0, 0, 0, 0, 0]
}

/// Drops the controller's link. Controllers that were already paired
/// reconnect and send a fresh link packet.
pub const DISCONNECT: [u8; MESSAGE_LEN] = message([0x00, 0x00, 0x08, 0xC0]);

pub const CAPABILITIES_REQUEST: [u8; MESSAGE_LEN] = message([0x00, 0x00, 0x02, 0x80]);

pub const STATUS_REQUEST: [u8; MESSAGE_LEN] = message([0x08, 0x00, 0x0F, 0xC0]);

pub const STATUS_REQUEST_ALT: [u8; MESSAGE_LEN] = message([0x08, 0x00, 0x05, 0xC0]);

/// Ring light animations.
pub mod led {
    pub const ALL_BLINK: u8 = 0x01;
    /// Quadrant `n` lit, for `n` in 1..=4.
    pub const PLAYER_1: u8 = 0x06;
    pub const ROTATE: u8 = 0x0A;
}

pub fn led(pattern: u8) -> [u8; MESSAGE_LEN] {
    message([0x00, 0x00, 0x08, 0x40 | (pattern & 0x0F)])
}

/// Ring light for a zero-based host slot; slots past the fourth rotate.
pub fn player_led(slot: usize) -> [u8; MESSAGE_LEN] {
    let pattern = u8::try_from(slot)
        .ok()
        .filter(|&s| s < 4)
        .map_or(led::ROTATE, |s| led::PLAYER_1 + s);
    led(pattern)
}

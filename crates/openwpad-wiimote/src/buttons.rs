//! Button bit assignments.
//!
//! Extension record constants are the *pressed* bits; the wire stores their
//! complement restricted to the kind's `ALL` mask. Host record constants are
//! active-high.

/// Wii Remote core buttons as they appear in a Wii Remote input report.
pub mod wiimote {
    pub const TWO: u16 = 0x0001;
    pub const ONE: u16 = 0x0002;
    pub const B: u16 = 0x0004;
    pub const A: u16 = 0x0008;
    pub const MINUS: u16 = 0x0010;
    pub const HOME: u16 = 0x0080;
    pub const LEFT: u16 = 0x0100;
    pub const RIGHT: u16 = 0x0200;
    pub const DOWN: u16 = 0x0400;
    pub const UP: u16 = 0x0800;
    pub const PLUS: u16 = 0x1000;
    pub const ALL: u16 = 0x1F9F;
}

/// Wii Remote core buttons in the host record.
pub mod wpad_core {
    pub const LEFT: u16 = 0x0001;
    pub const RIGHT: u16 = 0x0002;
    pub const DOWN: u16 = 0x0004;
    pub const UP: u16 = 0x0008;
    pub const PLUS: u16 = 0x0010;
    pub const TWO: u16 = 0x0100;
    pub const ONE: u16 = 0x0200;
    pub const B: u16 = 0x0400;
    pub const A: u16 = 0x0800;
    pub const MINUS: u16 = 0x1000;
    pub const HOME: u16 = 0x8000;
    pub const ALL: u16 = 0x9F1F;
}

/// Nunchuk buttons (byte 5 of the extension record).
pub mod nunchuk {
    pub const Z: u8 = 0x01;
    pub const C: u8 = 0x02;
}

/// Classic controller buttons. The host record uses the same layout.
pub mod classic {
    pub const UP: u16 = 0x0001;
    pub const LEFT: u16 = 0x0002;
    pub const ZR: u16 = 0x0004;
    pub const X: u16 = 0x0008;
    pub const A: u16 = 0x0010;
    pub const Y: u16 = 0x0020;
    pub const B: u16 = 0x0040;
    pub const ZL: u16 = 0x0080;
    pub const FULL_R: u16 = 0x0200;
    pub const PLUS: u16 = 0x0400;
    pub const HOME: u16 = 0x0800;
    pub const MINUS: u16 = 0x1000;
    pub const FULL_L: u16 = 0x2000;
    pub const DOWN: u16 = 0x4000;
    pub const RIGHT: u16 = 0x8000;
    pub const ALL: u16 = 0xFEFF;
}

/// Guitar buttons. The host record adds [`guitar::PEDAL`].
pub mod guitar {
    pub const STRUM_UP: u16 = 0x0001;
    pub const PEDAL: u16 = 0x0004;
    pub const YELLOW: u16 = 0x0008;
    pub const GREEN: u16 = 0x0010;
    pub const BLUE: u16 = 0x0020;
    pub const RED: u16 = 0x0040;
    pub const ORANGE: u16 = 0x0080;
    pub const PLUS: u16 = 0x0400;
    pub const MINUS: u16 = 0x1000;
    pub const STRUM_DOWN: u16 = 0x4000;
    pub const ALL: u16 = 0xFEFF;
}

/// Drum buttons in the extension record.
pub mod drum {
    pub const UP: u16 = 0x0001;
    pub const LEFT: u16 = 0x0002;
    pub const KICK: u16 = 0x0004;
    pub const YELLOW: u16 = 0x0008;
    pub const GREEN: u16 = 0x0010;
    pub const BLUE: u16 = 0x0020;
    pub const RED: u16 = 0x0040;
    pub const ORANGE: u16 = 0x0080;
    pub const PLUS: u16 = 0x0400;
    pub const MINUS: u16 = 0x1000;
    pub const DOWN: u16 = 0x4000;
    pub const RIGHT: u16 = 0x8000;
    pub const ALL: u16 = 0xFEFF;
}

/// Drum buttons in the host record. Yellow and blue trade places with the
/// extension record and the kick pedal is called `PEDAL`.
pub mod wpad_drum {
    pub const PEDAL: u16 = 0x0004;
    pub const BLUE: u16 = 0x0008;
    pub const GREEN: u16 = 0x0010;
    pub const YELLOW: u16 = 0x0020;
    pub const RED: u16 = 0x0040;
    pub const ORANGE: u16 = 0x0080;
    pub const PLUS: u16 = 0x0400;
    pub const MINUS: u16 = 0x1000;
}

/// Turntable buttons. The host record uses the same layout.
pub mod turntable {
    pub const RIGHT_BLUE: u16 = 0x0004;
    pub const LEFT_GREEN: u16 = 0x0008;
    pub const EUPHORIA: u16 = 0x0010;
    pub const RIGHT_GREEN: u16 = 0x0020;
    pub const LEFT_BLUE: u16 = 0x0080;
    /// Bit 5 of the left turntable velocity.
    pub const LTT_SIGN: u16 = 0x0100;
    pub const RIGHT_RED: u16 = 0x0200;
    pub const PLUS: u16 = 0x0400;
    pub const MINUS: u16 = 0x1000;
    pub const LEFT_RED: u16 = 0x2000;
    pub const ALL: u16 = 0xFEFF;
}

/// Taiko drum pads in the host record.
pub mod taiko {
    pub const RIM_RIGHT: u16 = 0x0008;
    pub const CENTER_RIGHT: u16 = 0x0010;
    pub const RIM_LEFT: u16 = 0x0020;
    pub const CENTER_LEFT: u16 = 0x0040;
}

/// Convert Wii Remote report buttons to host record buttons.
///
/// The host layout is the report word with its bytes swapped.
pub const fn wiimote_to_wpad(buttons: u16) -> u16 {
    (buttons & wiimote::ALL).swap_bytes()
}

/// Convert held drum extension buttons to the host record layout.
///
/// Directions have no host record bits and are dropped.
pub fn drum_to_wpad(buttons: u16) -> u16 {
    const PAIRS: [(u16, u16); 8] = [
        (drum::KICK, wpad_drum::PEDAL),
        (drum::YELLOW, wpad_drum::YELLOW),
        (drum::GREEN, wpad_drum::GREEN),
        (drum::BLUE, wpad_drum::BLUE),
        (drum::RED, wpad_drum::RED),
        (drum::ORANGE, wpad_drum::ORANGE),
        (drum::PLUS, wpad_drum::PLUS),
        (drum::MINUS, wpad_drum::MINUS),
    ];
    PAIRS
        .iter()
        .filter(|(ext, _)| buttons & ext != 0)
        .fold(0, |acc, (_, host)| acc | host)
}

//! Wireless receiver packet framing.
//!
//! # Packets
//! | Bytes 0–1 | Meaning       | Body                                                  |
//! |-----------|---------------|-------------------------------------------------------|
//! | `00 01`   | input         | XInput payload from offset 4                          |
//! | `00 03`   | input         | as `00 01`                                            |
//! | `08 00`   | disconnect    | the controller left                                   |
//! | `00 0F`   | link          | 0xCC marker at 5, subtype at 25 (bit 7 masked)        |
//! | `00 05`   | capabilities  | 0x12 marker at 5, LE left/right stick X range at 10/14 |
//!
//! Anything else (status, battery, voice) is reported as [`Packet::Other`].

use crate::subtype::Subtype;
use crate::{ParseError, fixed};

pub const INPUT_PAYLOAD_OFFSET: usize = 4;

const LINK_MARKER: u8 = 0xCC;
const LINK_LEN: usize = 26;
const CAPABILITIES_MARKER: u8 = 0x12;
const CAPABILITIES_LEN: usize = 16;

/// Stick range a World Tour guitar reports for both X axes.
pub const WORLD_TOUR_STICK_RANGE: u16 = 0xFFC0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    /// XInput payload, starting at its report ID byte.
    Input(&'a [u8]),
    Disconnect,
    Link(Subtype),
    Capabilities {
        left_stick_x: u16,
        right_stick_x: u16,
    },
    Other {
        id: u8,
        kind: u8,
    },
}

impl Packet<'_> {
    /// Capabilities of a Guitar Hero World Tour guitar.
    pub fn is_world_tour(&self) -> bool {
        matches!(
            self,
            Packet::Capabilities {
                left_stick_x: WORLD_TOUR_STICK_RANGE,
                right_stick_x: WORLD_TOUR_STICK_RANGE,
            }
        )
    }
}

/// Classify one interrupt IN transfer. Link and capability packets whose
/// marker byte does not match are reported as [`Packet::Other`].
pub fn parse(data: &[u8]) -> Result<Packet<'_>, ParseError> {
    let &[id, kind] = fixed::<2>(data)?;
    Ok(match (id, kind) {
        (0x00, 0x01 | 0x03) => Packet::Input(data.get(INPUT_PAYLOAD_OFFSET..).unwrap_or_default()),
        (0x08, 0x00) => Packet::Disconnect,
        (0x00, 0x0F) => {
            let r = fixed::<LINK_LEN>(data)?;
            if r[5] == LINK_MARKER {
                Packet::Link(Subtype::from_u8(r[25] & !0x80))
            } else {
                Packet::Other { id, kind }
            }
        }
        (0x00, 0x05) => {
            let r = fixed::<CAPABILITIES_LEN>(data)?;
            if r[5] == CAPABILITIES_MARKER {
                Packet::Capabilities {
                    left_stick_x: u16::from_le_bytes([r[10], r[11]]),
                    right_stick_x: u16::from_le_bytes([r[14], r[15]]),
                }
            } else {
                Packet::Other { id, kind }
            }
        }
        _ => Packet::Other { id, kind },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), ParseError>;

    fn link(subtype: u8) -> [u8; 29] {
        let mut data = [0u8; 29];
        data[1] = 0x0F;
        data[5] = 0xCC;
        data[25] = subtype;
        data
    }

    #[test]
    fn test_input_payload_offset() -> TestResult {
        let data = [0x00, 0x01, 0x00, 0xF0, 0x00, 0x13, 0x10, 0x20];
        assert_eq!(parse(&data)?, Packet::Input(&[0x00, 0x13, 0x10, 0x20]));
        let data = [0x00, 0x03, 0x00, 0xF0, 0x00, 0x13];
        assert_eq!(parse(&data)?, Packet::Input(&[0x00, 0x13]));
        Ok(())
    }

    #[test]
    fn test_link_masks_bit7() -> TestResult {
        assert_eq!(parse(&link(0x87))?, Packet::Link(Subtype::GuitarAlternate));
        assert_eq!(parse(&link(0x01))?, Packet::Link(Subtype::Gamepad));
        Ok(())
    }

    #[test]
    fn test_link_without_marker_is_other() -> TestResult {
        let mut data = link(0x01);
        data[5] = 0x00;
        assert_eq!(parse(&data)?, Packet::Other { id: 0, kind: 0x0F });
        Ok(())
    }

    #[test]
    fn test_short_link_is_rejected() {
        assert_eq!(
            parse(&[0x00, 0x0F, 0, 0, 0, 0xCC]),
            Err(ParseError::TooShort { got: 6, need: 26 })
        );
    }

    #[test]
    fn test_capabilities_world_tour() -> TestResult {
        let mut data = [0u8; 29];
        data[1] = 0x05;
        data[5] = 0x12;
        data[10..12].copy_from_slice(&0xFFC0u16.to_le_bytes());
        data[14..16].copy_from_slice(&0xFFC0u16.to_le_bytes());
        let packet = parse(&data)?;
        assert!(packet.is_world_tour());

        data[14] = 0x00;
        assert!(!parse(&data)?.is_world_tour());
        Ok(())
    }

    #[test]
    fn test_disconnect_and_other() -> TestResult {
        assert_eq!(parse(&[0x08, 0x00])?, Packet::Disconnect);
        assert_eq!(parse(&[0x08, 0x01])?, Packet::Other { id: 8, kind: 1 });
        assert_eq!(parse(&[0x00]), Err(ParseError::TooShort { got: 1, need: 2 }));
        Ok(())
    }
}

//! Per-slot state of a wireless receiver endpoint.
//!
//! A receiver port says nothing about its controller until a link packet
//! arrives, and controllers that were already paired before the port was
//! opened never send one. The first completion therefore only asks the
//! receiver to drop the controller; it re-links and reports its subtype.
//! Input is ignored until then.

use tracing::{debug, trace};

use crate::packet::{self, Packet};
use crate::subtype::Subtype;
use crate::{Input, ParseError};

/// What the caller should do after a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverEvent {
    /// Send [`crate::messages::DISCONNECT`] on the OUT endpoint.
    SendDisconnect,
    /// A controller linked. Its extension kind is now known.
    Linked {
        subtype: Subtype,
        /// Send [`crate::messages::CAPABILITIES_REQUEST`] to tell World
        /// Tour guitars apart.
        query_capabilities: bool,
    },
    /// Capabilities upgraded the linked subtype. The layout is unchanged.
    Refined(Subtype),
    /// The linked controller went away.
    Unlinked,
    Input(Input),
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Receiver {
    disconnect_sent: bool,
    linked: Option<Subtype>,
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subtype(&self) -> Option<Subtype> {
        self.linked
    }

    /// Still waiting for a link packet.
    pub fn is_provisional(&self) -> bool {
        self.linked.is_none()
    }

    /// Feed one interrupt IN transfer.
    pub fn handle(&mut self, data: &[u8]) -> Result<ReceiverEvent, ParseError> {
        if !self.disconnect_sent {
            self.disconnect_sent = true;
            debug!("dropping any pre-paired controller");
            return Ok(ReceiverEvent::SendDisconnect);
        }
        let event = match packet::parse(data)? {
            Packet::Input(payload) => match self.linked {
                Some(subtype) => ReceiverEvent::Input(Input::decode(subtype, payload)?),
                None => ReceiverEvent::Ignored,
            },
            Packet::Link(subtype) => {
                debug!(subtype = subtype.as_u8(), "controller linked");
                self.linked = Some(subtype);
                ReceiverEvent::Linked {
                    subtype,
                    query_capabilities: subtype == Subtype::GuitarAlternate,
                }
            }
            caps @ Packet::Capabilities { .. } => {
                if caps.is_world_tour() && self.linked == Some(Subtype::GuitarAlternate) {
                    debug!("world tour guitar");
                    self.linked = Some(Subtype::GuitarWorldTour);
                    ReceiverEvent::Refined(Subtype::GuitarWorldTour)
                } else {
                    ReceiverEvent::Ignored
                }
            }
            Packet::Disconnect => match self.linked.take() {
                Some(_) => {
                    debug!("controller unlinked");
                    ReceiverEvent::Unlinked
                }
                None => ReceiverEvent::Ignored,
            },
            Packet::Other { id, kind } => {
                trace!(id, kind, "unhandled receiver packet");
                ReceiverEvent::Ignored
            }
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::GamepadReport;
    use crate::{PAYLOAD_LEN, gamepad};

    type TestResult = Result<(), ParseError>;

    fn link(subtype: u8) -> [u8; 29] {
        let mut data = [0u8; 29];
        data[1] = 0x0F;
        data[5] = 0xCC;
        data[25] = subtype;
        data
    }

    fn input(b3: u8) -> [u8; 4 + PAYLOAD_LEN] {
        let mut data = [0u8; 4 + PAYLOAD_LEN];
        data[1] = 0x01;
        data[5] = 0x13;
        data[7] = b3;
        data
    }

    fn world_tour_caps() -> [u8; 29] {
        let mut data = [0u8; 29];
        data[1] = 0x05;
        data[5] = 0x12;
        data[10..12].copy_from_slice(&0xFFC0u16.to_le_bytes());
        data[14..16].copy_from_slice(&0xFFC0u16.to_le_bytes());
        data
    }

    fn running() -> Result<Receiver, ParseError> {
        let mut rx = Receiver::new();
        assert_eq!(rx.handle(&[0x00, 0x00])?, ReceiverEvent::SendDisconnect);
        Ok(rx)
    }

    #[test]
    fn test_first_completion_sends_disconnect() -> TestResult {
        let mut rx = Receiver::new();
        assert_eq!(rx.handle(&link(1))?, ReceiverEvent::SendDisconnect);
        assert!(rx.is_provisional());
        Ok(())
    }

    #[test]
    fn test_input_ignored_until_linked() -> TestResult {
        let mut rx = running()?;
        assert_eq!(rx.handle(&input(0x10))?, ReceiverEvent::Ignored);
        assert_eq!(
            rx.handle(&link(0x81))?,
            ReceiverEvent::Linked {
                subtype: Subtype::Gamepad,
                query_capabilities: false,
            }
        );
        assert!(!rx.is_provisional());
        let expected = gamepad::parse(&input(0x10)[4..])?;
        assert_eq!(rx.handle(&input(0x10))?, ReceiverEvent::Input(Input::Gamepad(expected)));
        assert_ne!(expected, GamepadReport::default());
        Ok(())
    }

    #[test]
    fn test_world_tour_refinement() -> TestResult {
        let mut rx = running()?;
        assert_eq!(rx.handle(&world_tour_caps())?, ReceiverEvent::Ignored);
        assert_eq!(
            rx.handle(&link(7))?,
            ReceiverEvent::Linked {
                subtype: Subtype::GuitarAlternate,
                query_capabilities: true,
            }
        );
        assert_eq!(
            rx.handle(&world_tour_caps())?,
            ReceiverEvent::Refined(Subtype::GuitarWorldTour)
        );
        assert_eq!(rx.subtype(), Some(Subtype::GuitarWorldTour));
        Ok(())
    }

    #[test]
    fn test_disconnect_returns_to_provisional() -> TestResult {
        let mut rx = running()?;
        assert_eq!(rx.handle(&[0x08, 0x00])?, ReceiverEvent::Ignored);
        rx.handle(&link(23))?;
        assert_eq!(rx.handle(&[0x08, 0x00])?, ReceiverEvent::Unlinked);
        assert!(rx.is_provisional());
        assert_eq!(rx.handle(&input(0))?, ReceiverEvent::Ignored);
        Ok(())
    }

    #[test]
    fn test_short_input_is_an_error() -> TestResult {
        let mut rx = running()?;
        rx.handle(&link(1))?;
        assert_eq!(
            rx.handle(&[0x00, 0x01, 0x00, 0xF0, 0x00, 0x13]),
            Err(ParseError::TooShort { got: 2, need: PAYLOAD_LEN })
        );
        Ok(())
    }
}

//! USB control request descriptions.
//!
//! Protocol crates describe the requests a device needs (enable reporting,
//! set player LEDs) as plain values; the transport layer issues them.

use serde::{Deserialize, Serialize};

/// Class request, interface recipient, device to host.
pub const REQTYPE_INTERFACE_GET: u8 = 0xA1;
/// Class request, interface recipient, host to device.
pub const REQTYPE_INTERFACE_SET: u8 = 0x21;

pub const REQ_GET_REPORT: u8 = 0x01;
pub const REQ_SET_REPORT: u8 = 0x09;

/// HID report types, the high byte of `wValue` for GET/SET_REPORT.
pub mod report_type {
    pub const INPUT: u8 = 0x01;
    pub const OUTPUT: u8 = 0x02;
    pub const FEATURE: u8 = 0x03;
}

/// Bit 7 of `bmRequestType`: device to host.
pub const DIR_DEVICE_TO_HOST: u8 = 0x80;

/// One control transfer setup packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlSetup {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl ControlSetup {
    /// HID GET_REPORT for `report_id` of the given type.
    pub const fn get_report(kind: u8, report_id: u8, length: u16) -> Self {
        Self {
            request_type: REQTYPE_INTERFACE_GET,
            request: REQ_GET_REPORT,
            value: ((kind as u16) << 8) | report_id as u16,
            index: 0,
            length,
        }
    }

    /// HID SET_REPORT for `report_id` of the given type.
    pub const fn set_report(kind: u8, report_id: u8, length: u16) -> Self {
        Self {
            request_type: REQTYPE_INTERFACE_SET,
            request: REQ_SET_REPORT,
            value: ((kind as u16) << 8) | report_id as u16,
            index: 0,
            length,
        }
    }

    pub const fn is_device_to_host(&self) -> bool {
        self.request_type & DIR_DEVICE_TO_HOST != 0
    }

    /// The 8-byte wire form, little-endian as on the bus.
    pub fn to_bytes(&self) -> [u8; 8] {
        let [v0, v1] = self.value.to_le_bytes();
        let [i0, i1] = self.index.to_le_bytes();
        let [l0, l1] = self.length.to_le_bytes();
        [self.request_type, self.request, v0, v1, i0, i1, l0, l1]
    }
}

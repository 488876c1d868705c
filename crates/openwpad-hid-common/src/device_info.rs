//! Device identity types for USB HID devices

use core::fmt;

use serde::{Deserialize, Serialize};

/// USB vendor/product pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsbDeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbDeviceId {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Split a `vid << 16 | pid` word as the transport reports it.
    pub const fn from_packed(word: u32) -> Self {
        Self {
            vendor_id: (word >> 16) as u16,
            product_id: (word & 0xFFFF) as u16,
        }
    }

    pub const fn packed(self) -> u32 {
        ((self.vendor_id as u32) << 16) | self.product_id as u32
    }
}

impl fmt::Display for UsbDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// An interrupt endpoint discovered from the device descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub address: u8,
    pub max_packet_size: u16,
}

impl EndpointInfo {
    pub const DIRECTION_IN: u8 = 0x80;

    pub const fn is_in(self) -> bool {
        self.address & Self::DIRECTION_IN != 0
    }
}

/// A device as listed by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDeviceInfo {
    pub dev_id: u32,
    pub id: UsbDeviceId,
    pub endpoint_in: Option<EndpointInfo>,
    pub endpoint_out: Option<EndpointInfo>,
    pub product_name: Option<String>,
}

impl UsbDeviceInfo {
    pub fn new(dev_id: u32, id: UsbDeviceId) -> Self {
        Self {
            dev_id,
            id,
            endpoint_in: None,
            endpoint_out: None,
            product_name: None,
        }
    }

    pub fn with_endpoint_in(mut self, endpoint: EndpointInfo) -> Self {
        self.endpoint_in = Some(endpoint);
        self
    }

    pub fn with_endpoint_out(mut self, endpoint: EndpointInfo) -> Self {
        self.endpoint_out = Some(endpoint);
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.id.vendor_id == vendor_id && self.id.product_id == product_id
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_round_trip() {
        let id = UsbDeviceId::from_packed(0x12BA_0100);
        assert_eq!(id, UsbDeviceId::new(0x12BA, 0x0100));
        assert_eq!(id.packed(), 0x12BA_0100);
        assert_eq!(id.to_string(), "12ba:0100");
    }

    #[test]
    fn test_endpoint_direction() {
        let ep_in = EndpointInfo {
            address: 0x81,
            max_packet_size: 64,
        };
        let ep_out = EndpointInfo {
            address: 0x02,
            max_packet_size: 64,
        };
        assert!(ep_in.is_in());
        assert!(!ep_out.is_in());
    }

    #[test]
    fn test_device_info_display_name() {
        let info = UsbDeviceInfo::new(7, UsbDeviceId::new(0x054C, 0x0268));
        assert!(info.matches(0x054C, 0x0268));
        assert!(!info.matches(0x054C, 0x05C4));
        assert_eq!(info.display_name(), "054c:0268");

        let info = info.with_product_name("DualShock 3");
        assert_eq!(info.display_name(), "DualShock 3");
    }

    #[test]
    fn test_device_info_serde() -> Result<(), Box<dyn std::error::Error>> {
        let info = UsbDeviceInfo::new(3, UsbDeviceId::new(0x045E, 0x02A9)).with_endpoint_in(
            EndpointInfo {
                address: 0x81,
                max_packet_size: 32,
            },
        );
        let json = serde_json::to_string(&info)?;
        let back: UsbDeviceInfo = serde_json::from_str(&json)?;
        assert_eq!(back, info);
        Ok(())
    }
}

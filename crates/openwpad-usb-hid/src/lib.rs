//! USB HID resource manager boundary.
//!
//! The host exposes USB HID devices through a resource manager at
//! [`DEV_USB_HID_PATH`] that is driven entirely by asynchronous ioctls. Two
//! incompatible revisions exist:
//!
//! - **v4**: plain ioctls with a 32-byte request message. The device change
//!   reply carries every device's descriptors, so endpoints are known up
//!   front. See [`v4`].
//! - **v5**: vectored ioctls with a 64-byte request message. The device
//!   change reply only carries ids; new devices must be resumed and have
//!   their parameters fetched before use. See [`v5`].
//!
//! This crate only builds and parses the byte layouts. It never blocks and
//! never owns a device: the engine hands every [`IosRequest`] to an
//! [`IosHid`] implementation and later receives an [`IosCompletion`] with
//! the same [`RequestTag`].
//!
//! All multi-byte fields are big-endian, matching the host CPU.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod mock;
pub mod v4;
pub mod v5;

use openwpad_errors::TransportError;
use openwpad_hid_common::{ControlSetup, HidCommonError, UsbDeviceInfo};
use serde::{Deserialize, Serialize};

/// Resource manager node shared by both revisions.
pub const DEV_USB_HID_PATH: &str = "/dev/usb/hid";

/// Poll length used when a device did not report its IN packet size.
pub const DEFAULT_PACKET_SIZE: u16 = 128;

/// Status codes delivered by the resource manager.
pub mod status {
    pub const OK: i32 = 0;
    /// Unknown ioctl or malformed request.
    pub const EINVAL: i32 = -4;
    /// Returned for transfers addressed to a device that went away.
    pub const DEVICE_GONE: i32 = -7022;
}

/// Resource manager revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportVersion {
    V4,
    V5,
}

impl TransportVersion {
    /// Version word the revision reports when queried.
    pub const fn version_word(self) -> u32 {
        match self {
            TransportVersion::V4 => v4::VERSION,
            TransportVersion::V5 => v5::VERSION,
        }
    }

    pub fn version_request(self) -> IosRequest {
        match self {
            TransportVersion::V4 => v4::version_request(),
            TransportVersion::V5 => v5::version_request(),
        }
    }

    /// Whether a version query completion confirms this revision.
    pub fn accepts(self, completion: &IosCompletion) -> bool {
        match self {
            TransportVersion::V4 => v4::accepts_version(completion),
            TransportVersion::V5 => v5::accepts_version(completion),
        }
    }

    pub fn device_change_request(self) -> IosRequest {
        match self {
            TransportVersion::V4 => v4::device_change_request(),
            TransportVersion::V5 => v5::device_change_request(),
        }
    }

    /// Decode a successful device change completion into the attached
    /// device list.
    ///
    /// # Errors
    ///
    /// Returns [`HidCommonError::TooShort`] when the reply is truncated.
    pub fn parse_device_change(
        self,
        completion: &IosCompletion,
    ) -> Result<Vec<UsbDeviceInfo>, HidCommonError> {
        match self {
            TransportVersion::V4 => v4::parse_device_change(&completion.data),
            TransportVersion::V5 => Ok(v5::parse_device_change(&completion.data, completion.result)?
                .iter()
                .map(v5::DeviceEntry::device_info)
                .collect()),
        }
    }

    /// Encode one transfer for `device`.
    pub fn transfer_request(
        self,
        device: &UsbDeviceInfo,
        transfer: &Transfer,
        tag: RequestTag,
    ) -> IosRequest {
        match self {
            TransportVersion::V4 => v4::transfer_request(device, transfer, tag),
            TransportVersion::V5 => v5::transfer_request(device.dev_id, transfer, tag),
        }
    }

    /// Device id a transfer message is addressed to.
    pub fn message_dev_id(self, message: &[u8]) -> Option<u32> {
        match self {
            TransportVersion::V4 => v4::message_dev_id(message),
            TransportVersion::V5 => v5::message_dev_id(message),
        }
    }
}

impl core::fmt::Display for TransportVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransportVersion::V4 => f.write_str("v4"),
            TransportVersion::V5 => f.write_str("v5"),
        }
    }
}

/// Identifies which step of the engine's state machine a request serves.
///
/// Slot-scoped tags carry the slot's generation so a completion that
/// arrives after the slot was recycled can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestTag {
    Version(TransportVersion),
    DeviceChange,
    AttachFinish,
    Resume { slot: usize, generation: u32 },
    Parameters { slot: usize, generation: u32 },
    Transfer { slot: usize, generation: u32 },
}

impl RequestTag {
    pub fn slot(self) -> Option<(usize, u32)> {
        match self {
            RequestTag::Resume { slot, generation }
            | RequestTag::Parameters { slot, generation }
            | RequestTag::Transfer { slot, generation } => Some((slot, generation)),
            RequestTag::Version(_) | RequestTag::DeviceChange | RequestTag::AttachFinish => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoctlKind {
    /// One input buffer, one output buffer.
    Ioctl,
    /// Request message vector followed by a data vector.
    Ioctlv,
}

/// One request for the resource manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosRequest {
    pub tag: RequestTag,
    pub kind: IoctlKind,
    pub ioctl: u32,
    /// Request message, or the ioctl input buffer.
    pub message: Vec<u8>,
    /// Data sent to the device.
    pub payload: Vec<u8>,
    /// Bytes the resource manager may write back.
    pub response_len: usize,
    pub host_to_device: bool,
}

impl IosRequest {
    pub fn ioctl(tag: RequestTag, ioctl: u32, message: Vec<u8>, response_len: usize) -> Self {
        Self {
            tag,
            kind: IoctlKind::Ioctl,
            ioctl,
            message,
            payload: Vec::new(),
            response_len,
            host_to_device: false,
        }
    }

    /// `(input, in/out)` vector counts of a vectored request.
    pub fn vector_counts(&self) -> (u32, u32) {
        match (self.kind, self.host_to_device) {
            (IoctlKind::Ioctl, _) => (0, 0),
            (IoctlKind::Ioctlv, false) => (1, 1),
            (IoctlKind::Ioctlv, true) => (0, 2),
        }
    }
}

/// Result of a request, delivered asynchronously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosCompletion {
    pub tag: RequestTag,
    /// Negative on failure. For transfers, the byte count on success.
    pub result: i32,
    /// Bytes written back by the resource manager.
    pub data: Vec<u8>,
}

impl IosCompletion {
    pub fn new(tag: RequestTag, result: i32, data: Vec<u8>) -> Self {
        Self { tag, result, data }
    }

    pub fn is_ok(&self) -> bool {
        self.result >= 0
    }
}

/// A transfer a device family wants performed, independent of revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transfer {
    /// Control transfer on endpoint 0. `data` is sent for host-to-device
    /// requests and ignored otherwise; `setup.length` bytes are read back
    /// for device-to-host requests.
    Control { setup: ControlSetup, data: Vec<u8> },
    InterruptIn { length: u16 },
    InterruptOut { data: Vec<u8> },
}

impl Transfer {
    pub fn control_in(setup: ControlSetup) -> Self {
        Transfer::Control {
            setup,
            data: Vec::new(),
        }
    }

    pub fn control_out(setup: ControlSetup, data: impl Into<Vec<u8>>) -> Self {
        Transfer::Control {
            setup,
            data: data.into(),
        }
    }

    pub fn is_host_to_device(&self) -> bool {
        match self {
            Transfer::Control { setup, .. } => !setup.is_device_to_host(),
            Transfer::InterruptIn { .. } => false,
            Transfer::InterruptOut { .. } => true,
        }
    }

    /// Bytes moved by the transfer in either direction.
    pub fn length(&self) -> u16 {
        match self {
            Transfer::Control { setup, .. } => setup.length,
            Transfer::InterruptIn { length } => *length,
            Transfer::InterruptOut { data } => u16::try_from(data.len()).unwrap_or(u16::MAX),
        }
    }

    pub(crate) fn payload(&self) -> Vec<u8> {
        match self {
            Transfer::Control { setup, data } if !setup.is_device_to_host() => data.clone(),
            Transfer::InterruptOut { data } => data.clone(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn response_len(&self) -> usize {
        if self.is_host_to_device() {
            0
        } else {
            usize::from(self.length())
        }
    }
}

/// Asynchronous access to the USB HID resource manager.
///
/// Implementations queue requests and return immediately. A rejected
/// submission is reported synchronously; everything else arrives later as
/// an [`IosCompletion`] carrying the request's tag, through whatever
/// channel the implementation was built with.
pub trait IosHid: Send {
    /// Open the resource manager node.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::OpenFailed`] when the node is missing.
    fn open(&mut self, path: &str) -> Result<(), TransportError>;

    /// Queue one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Submit`] when the request is rejected, or
    /// [`TransportError::Closed`] when the node is not open.
    fn submit(&mut self, request: IosRequest) -> Result<(), TransportError>;

    /// Close the node. In-flight requests are abandoned.
    fn close(&mut self) {}
}

impl<T: IosHid + ?Sized> IosHid for Box<T> {
    fn open(&mut self, path: &str) -> Result<(), TransportError> {
        (**self).open(path)
    }

    fn submit(&mut self, request: IosRequest) -> Result<(), TransportError> {
        (**self).submit(request)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwpad_hid_common::setup::report_type;

    #[test]
    fn test_transfer_direction() {
        let get = Transfer::control_in(ControlSetup::get_report(report_type::FEATURE, 0xF2, 17));
        assert!(!get.is_host_to_device());
        assert_eq!(get.response_len(), 17);
        assert!(get.payload().is_empty());

        let set = Transfer::control_out(
            ControlSetup::set_report(report_type::OUTPUT, 0x01, 3),
            vec![1, 2, 3],
        );
        assert!(set.is_host_to_device());
        assert_eq!(set.response_len(), 0);
        assert_eq!(set.payload(), vec![1, 2, 3]);

        let out = Transfer::InterruptOut {
            data: vec![0; 12],
        };
        assert_eq!(out.length(), 12);
        assert_eq!(Transfer::InterruptIn { length: 64 }.response_len(), 64);
    }

    #[test]
    fn test_tag_slot() {
        assert_eq!(
            RequestTag::Transfer {
                slot: 2,
                generation: 9
            }
            .slot(),
            Some((2, 9))
        );
        assert_eq!(RequestTag::DeviceChange.slot(), None);
    }

    #[test]
    fn test_vector_counts_follow_direction() {
        let device = UsbDeviceInfo::new(5, openwpad_hid_common::UsbDeviceId::new(0x054C, 0x0268));
        let tag = RequestTag::Transfer {
            slot: 0,
            generation: 1,
        };
        let poll = TransportVersion::V5.transfer_request(
            &device,
            &Transfer::InterruptIn { length: 64 },
            tag,
        );
        assert_eq!(poll.vector_counts(), (1, 1));
        let rumble = TransportVersion::V5.transfer_request(
            &device,
            &Transfer::InterruptOut { data: vec![0; 8] },
            tag,
        );
        assert_eq!(rumble.vector_counts(), (0, 2));
        let v4_poll = TransportVersion::V4.transfer_request(
            &device,
            &Transfer::InterruptIn { length: 64 },
            tag,
        );
        assert_eq!(v4_poll.vector_counts(), (0, 0));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(TransportVersion::V4.to_string(), "v4");
        assert_eq!(TransportVersion::V5.version_word(), 0x0005_0001);
    }
}

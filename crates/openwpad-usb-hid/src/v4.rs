//! Resource manager revision 4.
//!
//! # Device change reply
//! The reply fills [`DEVICE_CHANGE_WORDS`] big-endian words with one
//! variable-length entry per attached device:
//!
//! | Word | Field                                                    |
//! |------|----------------------------------------------------------|
//! | 0    | entry length in bytes                                    |
//! | 1    | device id                                                |
//! | 2..  | descriptors, each padded to whole words                  |
//! | 4    | `vid << 16 \| pid`, inside the device descriptor         |
//!
//! A length word of [`DEVICE_CHANGE_LEN`] or more ends the list. Each
//! descriptor starts with `bLength << 24 | bDescriptorType << 16`, and the
//! walk advances by `bLength / 4 + 1` words.
//!
//! # Transfer message (32 bytes)
//! | Offset | Size | Field                                               |
//! |--------|------|-----------------------------------------------------|
//! | 0      | 16   | unused                                              |
//! | 16     | i32  | device id                                           |
//! | 20     | 8    | control: type, request, value, index, length; interrupt: endpoint u32, length u32 |
//! | 28     | u32  | data address, filled in by the transport            |

use openwpad_hid_common::{
    ControlSetup, EndpointInfo, HidCommonError, ReportBuilder, ReportReader, UsbDeviceId,
    UsbDeviceInfo,
};
use tracing::{debug, trace};

use crate::{IosCompletion, IosRequest, RequestTag, Transfer};

pub const IOCTL_GET_DEVICE_CHANGE: u32 = 0;
pub const IOCTL_CONTROL: u32 = 2;
pub const IOCTL_INTERRUPT_IN: u32 = 3;
pub const IOCTL_INTERRUPT_OUT: u32 = 4;
pub const IOCTL_GET_VERSION: u32 = 6;

pub const VERSION: u32 = 0x0004_0001;

pub const DEVICE_CHANGE_WORDS: usize = 0x180;
pub const DEVICE_CHANGE_LEN: usize = DEVICE_CHANGE_WORDS * 4;

pub const MESSAGE_LEN: usize = 32;
const DEV_ID_OFFSET: usize = 16;

pub const DESCRIPTOR_INTERFACE: u8 = 0x04;
pub const DESCRIPTOR_ENDPOINT: u8 = 0x05;
pub const HID_CLASS: u8 = 0x03;

/// The version is the ioctl's return value.
pub fn version_request() -> IosRequest {
    IosRequest::ioctl(
        RequestTag::Version(crate::TransportVersion::V4),
        IOCTL_GET_VERSION,
        Vec::new(),
        0,
    )
}

pub fn accepts_version(completion: &IosCompletion) -> bool {
    u32::try_from(completion.result).is_ok_and(|word| word == VERSION)
}

pub fn device_change_request() -> IosRequest {
    IosRequest::ioctl(
        RequestTag::DeviceChange,
        IOCTL_GET_DEVICE_CHANGE,
        Vec::new(),
        DEVICE_CHANGE_LEN,
    )
}

fn word(reader: &ReportReader<'_>, index: usize) -> Result<u32, HidCommonError> {
    reader.u32_be_at(index.saturating_mul(4))
}

/// Walk the device change reply.
///
/// Endpoints are only taken from HID class interfaces, and the walk over a
/// device stops once both an IN and an OUT endpoint were found.
///
/// # Errors
///
/// Returns [`HidCommonError::TooShort`] when an entry runs past the end of
/// `data`.
pub fn parse_device_change(data: &[u8]) -> Result<Vec<UsbDeviceInfo>, HidCommonError> {
    let reader = ReportReader::new(data);
    let mut devices = Vec::new();
    let mut start = 0usize;
    while start < DEVICE_CHANGE_WORDS {
        let entry_len = usize::try_from(word(&reader, start)?).unwrap_or(usize::MAX);
        let entry_words = entry_len / 4;
        if entry_len >= DEVICE_CHANGE_LEN || entry_words == 0 {
            break;
        }
        devices.push(parse_entry(&reader, start, entry_words)?);
        start = start.saturating_add(entry_words);
    }
    Ok(devices)
}

fn parse_entry(
    reader: &ReportReader<'_>,
    start: usize,
    entry_words: usize,
) -> Result<UsbDeviceInfo, HidCommonError> {
    let at = |offset: usize| word(reader, start.saturating_add(offset));
    let mut info = UsbDeviceInfo::new(at(1)?, UsbDeviceId::from_packed(at(4)?));
    let mut is_hid = false;
    let mut j = 2usize;
    while j < entry_words {
        let [len, kind, address, _] = at(j)?.to_be_bytes();
        trace!(kind, len, "descriptor");
        match kind {
            DESCRIPTOR_INTERFACE => {
                let [_, class, _, _] = at(j.saturating_add(1))?.to_be_bytes();
                is_hid = class == HID_CLASS;
            }
            DESCRIPTOR_ENDPOINT if is_hid => {
                let [hi, lo, _, _] = at(j.saturating_add(1))?.to_be_bytes();
                let endpoint = EndpointInfo {
                    address,
                    max_packet_size: u16::from_be_bytes([hi, lo]),
                };
                if endpoint.is_in() {
                    info.endpoint_in = Some(endpoint);
                } else {
                    info.endpoint_out = Some(endpoint);
                }
                if info.endpoint_in.is_some() && info.endpoint_out.is_some() {
                    break;
                }
            }
            _ => {}
        }
        j = j.saturating_add(usize::from(len / 4)).saturating_add(1);
    }
    debug!(
        dev_id = info.dev_id,
        id = %info.id,
        endpoint_in = ?info.endpoint_in,
        endpoint_out = ?info.endpoint_out,
        "v4 device"
    );
    Ok(info)
}

fn message(dev_id: u32, body: [u8; 8]) -> Vec<u8> {
    let mut builder = ReportBuilder::with_capacity(MESSAGE_LEN);
    builder
        .write_zeros(DEV_ID_OFFSET)
        .write_u32_be(dev_id)
        .write_bytes(&body)
        .pad_to(MESSAGE_LEN);
    builder.into_inner()
}

pub fn control_message(dev_id: u32, setup: &ControlSetup) -> Vec<u8> {
    let [v0, v1] = setup.value.to_be_bytes();
    let [i0, i1] = setup.index.to_be_bytes();
    let [l0, l1] = setup.length.to_be_bytes();
    message(
        dev_id,
        [setup.request_type, setup.request, v0, v1, i0, i1, l0, l1],
    )
}

pub fn interrupt_message(dev_id: u32, endpoint: u8, length: u16) -> Vec<u8> {
    let [e0, e1, e2, e3] = u32::from(endpoint).to_be_bytes();
    let [d0, d1, d2, d3] = u32::from(length).to_be_bytes();
    message(dev_id, [e0, e1, e2, e3, d0, d1, d2, d3])
}

/// Encode `transfer` for `device`. Interrupt transfers are addressed to the
/// endpoints found while walking the device change reply.
pub fn transfer_request(device: &UsbDeviceInfo, transfer: &Transfer, tag: RequestTag) -> IosRequest {
    let endpoint = |ep: Option<EndpointInfo>| ep.map_or(0, |ep| ep.address);
    let (ioctl, message) = match transfer {
        Transfer::Control { setup, .. } => (IOCTL_CONTROL, control_message(device.dev_id, setup)),
        Transfer::InterruptIn { length } => (
            IOCTL_INTERRUPT_IN,
            interrupt_message(device.dev_id, endpoint(device.endpoint_in), *length),
        ),
        Transfer::InterruptOut { .. } => (
            IOCTL_INTERRUPT_OUT,
            interrupt_message(
                device.dev_id,
                endpoint(device.endpoint_out),
                transfer.length(),
            ),
        ),
    };
    IosRequest {
        payload: transfer.payload(),
        host_to_device: transfer.is_host_to_device(),
        ..IosRequest::ioctl(tag, ioctl, message, transfer.response_len())
    }
}

pub fn message_dev_id(message: &[u8]) -> Option<u32> {
    ReportReader::new(message).u32_be_at(DEV_ID_OFFSET).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use openwpad_hid_common::setup::report_type;

    type TestResult = Result<(), HidCommonError>;

    fn words(words: &[u32]) -> Vec<u8> {
        let mut builder = ReportBuilder::new();
        for w in words {
            builder.write_u32_be(*w);
        }
        builder.pad_to(DEVICE_CHANGE_LEN);
        builder.into_inner()
    }

    #[test]
    fn test_version_check() {
        let ok = IosCompletion::new(RequestTag::DeviceChange, 0x0004_0001, Vec::new());
        assert!(accepts_version(&ok));
        let v5 = IosCompletion::new(RequestTag::DeviceChange, -4, Vec::new());
        assert!(!accepts_version(&v5));
    }

    #[test]
    fn test_walk_finds_hid_endpoints() -> TestResult {
        let guitar = UsbDeviceInfo::new(0x11, UsbDeviceId::new(0x12BA, 0x0100))
            .with_endpoint_in(EndpointInfo {
                address: 0x81,
                max_packet_size: 27,
            })
            .with_endpoint_out(EndpointInfo {
                address: 0x02,
                max_packet_size: 32,
            });
        let taiko = UsbDeviceInfo::new(0x22, UsbDeviceId::new(0x0F0D, 0x00F0)).with_endpoint_in(
            EndpointInfo {
                address: 0x82,
                max_packet_size: 64,
            },
        );
        let data = mock::v4_device_change(&[guitar.clone(), taiko.clone()]);
        assert_eq!(data.len(), DEVICE_CHANGE_LEN);
        assert_eq!(parse_device_change(&data)?, vec![guitar, taiko]);
        Ok(())
    }

    #[test]
    fn test_endpoints_of_other_interfaces_skipped() -> TestResult {
        let data = words(&[
            // Header, device descriptor, then a vendor interface whose
            // endpoint must be ignored.
            4 * 12,
            0x33,
            0x1201_0002,
            0x0000_0040,
            0x045E_0291,
            0,
            0x0001_0000,
            0x0904_0000,
            0x01FF_5D81,
            0,
            0x0705_8103,
            0x0020_0100,
            u32::MAX,
        ]);
        let devices = parse_device_change(&data)?;
        assert_eq!(
            devices,
            vec![UsbDeviceInfo::new(0x33, UsbDeviceId::new(0x045E, 0x0291))]
        );
        Ok(())
    }

    #[test]
    fn test_empty_reply() -> TestResult {
        assert!(parse_device_change(&words(&[u32::MAX]))?.is_empty());
        assert!(parse_device_change(&words(&[0]))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_truncated_reply_is_an_error() {
        let data = [0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(
            parse_device_change(&data),
            Err(HidCommonError::TooShort { .. })
        ));
    }

    #[test]
    fn test_control_message_layout() {
        let setup = ControlSetup::get_report(report_type::FEATURE, 0xF2, 0x11);
        let msg = control_message(0x0102_0304, &setup);
        assert_eq!(msg.len(), MESSAGE_LEN);
        assert_eq!(msg.get(..16), Some(&[0u8; 16][..]));
        assert_eq!(
            msg.get(16..),
            Some(&[1, 2, 3, 4, 0xA1, 0x01, 0x03, 0xF2, 0x00, 0x00, 0x00, 0x11, 0, 0, 0, 0][..])
        );
        assert_eq!(message_dev_id(&msg), Some(0x0102_0304));
    }

    #[test]
    fn test_interrupt_requests_use_walked_endpoints() {
        let device = UsbDeviceInfo::new(9, UsbDeviceId::new(0x054C, 0x05C4))
            .with_endpoint_in(EndpointInfo {
                address: 0x84,
                max_packet_size: 64,
            })
            .with_endpoint_out(EndpointInfo {
                address: 0x03,
                max_packet_size: 64,
            });
        let tag = RequestTag::Transfer {
            slot: 1,
            generation: 3,
        };
        let poll = transfer_request(&device, &Transfer::InterruptIn { length: 64 }, tag);
        assert_eq!(poll.ioctl, IOCTL_INTERRUPT_IN);
        assert_eq!(poll.response_len, 64);
        assert_eq!(
            poll.message.get(20..28),
            Some(&[0, 0, 0, 0x84, 0, 0, 0, 64][..])
        );

        let out = transfer_request(
            &device,
            &Transfer::InterruptOut {
                data: vec![5; 11],
            },
            tag,
        );
        assert_eq!(out.ioctl, IOCTL_INTERRUPT_OUT);
        assert!(out.host_to_device);
        assert_eq!(out.payload, vec![5; 11]);
        assert_eq!(
            out.message.get(20..28),
            Some(&[0, 0, 0, 0x03, 0, 0, 0, 11][..])
        );
    }
}

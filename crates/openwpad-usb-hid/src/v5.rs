//! Resource manager revision 5.
//!
//! Bring-up of a new device is GET_DEVICE_CHANGE, ATTACH_FINISH, then per
//! device SET_RESUME and GET_DEVICE_PARAMETERS. Only then may transfers be
//! issued. The device change reply carries no descriptors, so interrupt
//! transfers are addressed by direction rather than endpoint.
//!
//! # Device change entry (12 bytes)
//! | Offset | Size | Field              |
//! |--------|------|--------------------|
//! | 0      | u32  | device id          |
//! | 4      | u32  | `vid << 16 \| pid` |
//! | 8      | u16  | device number      |
//! | 10     | u8   | interface number   |
//! | 11     | u8   | alternate settings |
//!
//! # Transfer message (64 bytes)
//! | Offset | Size | Field                                               |
//! |--------|------|-----------------------------------------------------|
//! | 0      | u32  | device id                                           |
//! | 4      | u32  | zero                                                |
//! | 8      | 6    | control: type, request, value, index; interrupt: `out` u32 |
//!
//! The data travels in a second vector. Control transfers take their
//! direction from bit 7 of the request type.

use openwpad_hid_common::{
    ControlSetup, HidCommonError, ReportBuilder, ReportReader, UsbDeviceId, UsbDeviceInfo,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IoctlKind, IosCompletion, IosRequest, RequestTag, Transfer, TransportVersion};

pub const IOCTL_GET_VERSION: u32 = 0;
pub const IOCTL_GET_DEVICE_CHANGE: u32 = 1;
pub const IOCTL_GET_DEVICE_PARAMETERS: u32 = 3;
pub const IOCTL_ATTACH_FINISH: u32 = 6;
pub const IOCTL_SET_RESUME: u32 = 16;
pub const IOCTLV_CONTROL: u32 = 18;
pub const IOCTLV_INTERRUPT: u32 = 19;

pub const VERSION: u32 = 0x0005_0001;

pub const VERSION_LEN: usize = 0x20;
pub const MAX_DEVICES: usize = 0x20;
pub const ENTRY_LEN: usize = 12;
pub const DEVICE_CHANGE_LEN: usize = MAX_DEVICES * ENTRY_LEN;
pub const RESUME_LEN: usize = 0x20;
pub const PARAMETERS_LEN: usize = 0x60;
pub const MESSAGE_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub dev_id: u32,
    pub id: UsbDeviceId,
    pub number: u16,
    pub interface: u8,
    pub alt_settings: u8,
}

impl DeviceEntry {
    /// # Errors
    ///
    /// Returns [`HidCommonError::TooShort`] if fewer than [`ENTRY_LEN`]
    /// bytes are given.
    pub fn parse(bytes: &[u8]) -> Result<Self, HidCommonError> {
        let mut r = ReportReader::require(bytes, ENTRY_LEN)?;
        Ok(Self {
            dev_id: r.read_u32_be()?,
            id: UsbDeviceId::from_packed(r.read_u32_be()?),
            number: r.read_u16_be()?,
            interface: r.read_u8()?,
            alt_settings: r.read_u8()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut builder = ReportBuilder::with_capacity(ENTRY_LEN);
        builder
            .write_u32_be(self.dev_id)
            .write_u32_be(self.id.packed())
            .write_u16_be(self.number)
            .write_u8(self.interface)
            .write_u8(self.alt_settings);
        builder.into_inner()
    }

    pub fn device_info(&self) -> UsbDeviceInfo {
        UsbDeviceInfo::new(self.dev_id, self.id)
    }
}

/// The version is written to the first word of the reply.
pub fn version_request() -> IosRequest {
    IosRequest::ioctl(
        RequestTag::Version(TransportVersion::V5),
        IOCTL_GET_VERSION,
        Vec::new(),
        VERSION_LEN,
    )
}

pub fn accepts_version(completion: &IosCompletion) -> bool {
    completion.result == 0
        && ReportReader::new(&completion.data)
            .u32_be_at(0)
            .is_ok_and(|word| word == VERSION)
}

pub fn device_change_request() -> IosRequest {
    IosRequest::ioctl(
        RequestTag::DeviceChange,
        IOCTL_GET_DEVICE_CHANGE,
        Vec::new(),
        DEVICE_CHANGE_LEN,
    )
}

/// Decode the first `count` entries, `count` being the ioctl's result.
/// Counts outside `0..=MAX_DEVICES` are clamped.
///
/// # Errors
///
/// Returns [`HidCommonError::TooShort`] when `data` holds fewer entries
/// than `count` claims.
pub fn parse_device_change(data: &[u8], count: i32) -> Result<Vec<DeviceEntry>, HidCommonError> {
    let count = usize::try_from(count).unwrap_or(0).min(MAX_DEVICES);
    let need = count.saturating_mul(ENTRY_LEN);
    let body = data.get(..need).ok_or(HidCommonError::TooShort {
        got: data.len(),
        need,
    })?;
    let entries = body
        .chunks_exact(ENTRY_LEN)
        .map(DeviceEntry::parse)
        .collect::<Result<Vec<_>, _>>()?;
    for entry in &entries {
        debug!(dev_id = entry.dev_id, id = %entry.id, "v5 device");
    }
    Ok(entries)
}

pub fn attach_finish_request() -> IosRequest {
    IosRequest::ioctl(RequestTag::AttachFinish, IOCTL_ATTACH_FINISH, Vec::new(), 0)
}

/// `[dev_id, 0, 1, 0, 0, 0, 0, 0]` as big-endian words. Shared by
/// SET_RESUME and GET_DEVICE_PARAMETERS.
pub fn resume_message(dev_id: u32) -> Vec<u8> {
    let mut builder = ReportBuilder::with_capacity(RESUME_LEN);
    builder
        .write_u32_be(dev_id)
        .write_u32_be(0)
        .write_u32_be(1)
        .pad_to(RESUME_LEN);
    builder.into_inner()
}

pub fn resume_request(dev_id: u32, slot: usize, generation: u32) -> IosRequest {
    IosRequest::ioctl(
        RequestTag::Resume { slot, generation },
        IOCTL_SET_RESUME,
        resume_message(dev_id),
        0,
    )
}

pub fn parameters_request(dev_id: u32, slot: usize, generation: u32) -> IosRequest {
    IosRequest::ioctl(
        RequestTag::Parameters { slot, generation },
        IOCTL_GET_DEVICE_PARAMETERS,
        resume_message(dev_id),
        PARAMETERS_LEN,
    )
}

fn message(dev_id: u32, body: &[u8]) -> Vec<u8> {
    let mut builder = ReportBuilder::with_capacity(MESSAGE_LEN);
    builder
        .write_u32_be(dev_id)
        .write_u32_be(0)
        .write_bytes(body)
        .pad_to(MESSAGE_LEN);
    builder.into_inner()
}

pub fn control_message(dev_id: u32, setup: &ControlSetup) -> Vec<u8> {
    let [v0, v1] = setup.value.to_be_bytes();
    let [i0, i1] = setup.index.to_be_bytes();
    message(dev_id, &[setup.request_type, setup.request, v0, v1, i0, i1])
}

pub fn interrupt_message(dev_id: u32, out: bool) -> Vec<u8> {
    message(dev_id, &u32::from(out).to_be_bytes())
}

pub fn transfer_request(dev_id: u32, transfer: &Transfer, tag: RequestTag) -> IosRequest {
    let (ioctl, message) = match transfer {
        Transfer::Control { setup, .. } => (IOCTLV_CONTROL, control_message(dev_id, setup)),
        Transfer::InterruptIn { .. } | Transfer::InterruptOut { .. } => (
            IOCTLV_INTERRUPT,
            interrupt_message(dev_id, transfer.is_host_to_device()),
        ),
    };
    IosRequest {
        tag,
        kind: IoctlKind::Ioctlv,
        ioctl,
        message,
        payload: transfer.payload(),
        response_len: transfer.response_len(),
        host_to_device: transfer.is_host_to_device(),
    }
}

pub fn message_dev_id(message: &[u8]) -> Option<u32> {
    ReportReader::new(message).u32_be_at(0).ok()
}

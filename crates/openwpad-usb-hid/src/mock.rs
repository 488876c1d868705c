//! In-memory resource manager for tests and scripted replays.
//!
//! [`MockIosHid`] records every submitted request and can be told to refuse
//! the open or individual ioctls. [`MockBus`] plays the resource manager's
//! side: it holds the attached devices and queued input reports and turns
//! a request into the completion the real node would deliver, or leaves it
//! pending the way a blocking device change or an idle interrupt IN would.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use openwpad_errors::TransportError;
use openwpad_hid_common::{EndpointInfo, ReportBuilder, UsbDeviceInfo};
use parking_lot::Mutex;
use tracing::trace;

use crate::{IosCompletion, IosHid, IosRequest, RequestTag, TransportVersion, status, v4, v5};

#[derive(Debug, Default)]
struct MockState {
    path: Option<String>,
    open_status: Option<i32>,
    rejected: HashMap<u32, i32>,
    submitted: Vec<IosRequest>,
}

/// Recording [`IosHid`]. Clones share state, so a test can keep one handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MockIosHid {
    state: Arc<Mutex<MockState>>,
}

impl MockIosHid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next open fail with `status`.
    pub fn fail_open(&self, status: i32) {
        self.state.lock().open_status = Some(status);
    }

    /// Reject every submission of `ioctl` with `status`.
    pub fn reject(&self, ioctl: u32, status: i32) {
        self.state.lock().rejected.insert(ioctl, status);
    }

    pub fn accept(&self, ioctl: u32) {
        self.state.lock().rejected.remove(&ioctl);
    }

    pub fn opened_path(&self) -> Option<String> {
        self.state.lock().path.clone()
    }

    pub fn submitted(&self) -> Vec<IosRequest> {
        self.state.lock().submitted.clone()
    }

    /// Drain the requests submitted since the last call.
    pub fn take_submitted(&self) -> Vec<IosRequest> {
        std::mem::take(&mut self.state.lock().submitted)
    }
}

impl IosHid for MockIosHid {
    fn open(&mut self, path: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if let Some(status) = state.open_status.take() {
            return Err(TransportError::open_failed(path, status));
        }
        state.path = Some(path.to_owned());
        Ok(())
    }

    fn submit(&mut self, request: IosRequest) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.path.is_none() {
            return Err(TransportError::Closed);
        }
        if let Some(&status) = state.rejected.get(&request.ioctl) {
            return Err(TransportError::submit(request.ioctl, status));
        }
        trace!(ioctl = request.ioctl, tag = ?request.tag, "submit");
        state.submitted.push(request);
        Ok(())
    }

    fn close(&mut self) {
        self.state.lock().path = None;
    }
}

/// Simulated resource manager of one revision.
#[derive(Debug, Clone)]
pub struct MockBus {
    version: TransportVersion,
    devices: Vec<UsbDeviceInfo>,
    reports: HashMap<u32, VecDeque<Vec<u8>>>,
    changed: bool,
}

impl MockBus {
    /// The first device change request is answered immediately.
    pub fn new(version: TransportVersion) -> Self {
        Self {
            version,
            devices: Vec::new(),
            reports: HashMap::new(),
            changed: true,
        }
    }

    pub fn version(&self) -> TransportVersion {
        self.version
    }

    pub fn devices(&self) -> &[UsbDeviceInfo] {
        &self.devices
    }

    pub fn attach(&mut self, device: UsbDeviceInfo) {
        self.devices.retain(|d| d.dev_id != device.dev_id);
        self.devices.push(device);
        self.changed = true;
    }

    /// Returns false if no such device was attached.
    pub fn detach(&mut self, dev_id: u32) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.dev_id != dev_id);
        self.reports.remove(&dev_id);
        let removed = self.devices.len() != before;
        self.changed |= removed;
        removed
    }

    /// Queue one input report for the device's next interrupt IN.
    pub fn queue_report(&mut self, dev_id: u32, report: impl Into<Vec<u8>>) {
        self.reports.entry(dev_id).or_default().push_back(report.into());
    }

    pub fn queued_reports(&self, dev_id: u32) -> usize {
        self.reports.get(&dev_id).map_or(0, VecDeque::len)
    }

    fn is_attached(&self, dev_id: u32) -> bool {
        self.devices.iter().any(|d| d.dev_id == dev_id)
    }

    /// The completion the resource manager would deliver for `request`,
    /// or `None` while it would stay pending.
    pub fn answer(&mut self, request: &IosRequest) -> Option<IosCompletion> {
        let done = |result: i32, data: Vec<u8>| Some(IosCompletion::new(request.tag, result, data));
        match request.tag {
            RequestTag::Version(asked) => match (asked, self.version) {
                (TransportVersion::V4, TransportVersion::V4) => {
                    done(i32::try_from(v4::VERSION).unwrap_or(i32::MAX), Vec::new())
                }
                (TransportVersion::V5, TransportVersion::V5) => {
                    let mut data = v5::VERSION.to_be_bytes().to_vec();
                    data.resize(v5::VERSION_LEN, 0);
                    done(status::OK, data)
                }
                _ => done(status::EINVAL, Vec::new()),
            },
            RequestTag::DeviceChange => {
                if !self.changed {
                    return None;
                }
                self.changed = false;
                match self.version {
                    TransportVersion::V4 => done(status::OK, v4_device_change(&self.devices)),
                    TransportVersion::V5 => done(
                        i32::try_from(self.devices.len()).unwrap_or(i32::MAX),
                        v5_device_change(&self.devices),
                    ),
                }
            }
            RequestTag::AttachFinish | RequestTag::Resume { .. } => done(status::OK, Vec::new()),
            RequestTag::Parameters { .. } => done(status::OK, vec![0; request.response_len]),
            RequestTag::Transfer { .. } => self.answer_transfer(request),
        }
    }

    fn answer_transfer(&mut self, request: &IosRequest) -> Option<IosCompletion> {
        let done = |result: usize, data: Vec<u8>| {
            Some(IosCompletion::new(
                request.tag,
                i32::try_from(result).unwrap_or(i32::MAX),
                data,
            ))
        };
        let dev_id = self.version.message_dev_id(&request.message)?;
        if !self.is_attached(dev_id) {
            return Some(IosCompletion::new(request.tag, status::DEVICE_GONE, Vec::new()));
        }
        if request.host_to_device {
            return done(request.payload.len(), Vec::new());
        }
        let control = match self.version {
            TransportVersion::V4 => v4::IOCTL_CONTROL,
            TransportVersion::V5 => v5::IOCTLV_CONTROL,
        };
        if request.ioctl == control {
            return done(request.response_len, vec![0; request.response_len]);
        }
        let mut report = self.reports.get_mut(&dev_id)?.pop_front()?;
        report.truncate(request.response_len);
        done(report.len(), report)
    }
}

/// Encode a v4 device change reply listing `devices`, each with a device,
/// configuration, HID interface and HID descriptor followed by its
/// endpoints.
pub fn v4_device_change(devices: &[UsbDeviceInfo]) -> Vec<u8> {
    let mut builder = ReportBuilder::with_capacity(v4::DEVICE_CHANGE_LEN);
    for device in devices {
        let endpoints: Vec<EndpointInfo> = device
            .endpoint_in
            .iter()
            .chain(device.endpoint_out.iter())
            .copied()
            .collect();
        // header 2 + device 5 + config 3 + interface 3 + hid 3 + 2 per endpoint
        let entry_words = 16usize.saturating_add(endpoints.len().saturating_mul(2));
        let entry_len = u32::try_from(entry_words.saturating_mul(4)).unwrap_or(u32::MAX);
        let num_endpoints = u8::try_from(endpoints.len()).unwrap_or(u8::MAX);
        builder
            .write_u32_be(entry_len)
            .write_u32_be(device.dev_id)
            .write_bytes(&[0x12, 0x01, 0x00, 0x02])
            .write_bytes(&[0x00, 0x00, 0x00, 0x40])
            .write_u32_be(device.id.packed())
            .write_zeros(4)
            .write_bytes(&[0x00, 0x01, 0x00, 0x00])
            .write_bytes(&[0x09, 0x02, 0x00, 0x29])
            .write_bytes(&[0x01, 0x01, 0x00, 0x80])
            .write_bytes(&[0xFA, 0x00, 0x00, 0x00])
            .write_bytes(&[0x09, v4::DESCRIPTOR_INTERFACE, 0x00, 0x00])
            .write_bytes(&[num_endpoints, v4::HID_CLASS, 0x00, 0x00])
            .write_zeros(4)
            .write_bytes(&[0x09, 0x21, 0x11, 0x01])
            .write_bytes(&[0x00, 0x01, 0x22, 0x00])
            .write_zeros(4);
        for endpoint in endpoints {
            builder
                .write_bytes(&[0x07, v4::DESCRIPTOR_ENDPOINT, endpoint.address, 0x03])
                .write_u16_be(endpoint.max_packet_size)
                .write_bytes(&[0x01, 0x00]);
        }
    }
    builder.write_u32_be(u32::MAX).pad_to(v4::DEVICE_CHANGE_LEN);
    builder.into_inner()
}

/// Encode a v5 device change reply listing `devices`. The result code is
/// the device count.
pub fn v5_device_change(devices: &[UsbDeviceInfo]) -> Vec<u8> {
    let mut data = Vec::with_capacity(v5::DEVICE_CHANGE_LEN);
    for (number, device) in devices.iter().take(v5::MAX_DEVICES).enumerate() {
        let entry = v5::DeviceEntry {
            dev_id: device.dev_id,
            id: device.id,
            number: u16::try_from(number).unwrap_or(u16::MAX),
            interface: 0,
            alt_settings: 1,
        };
        data.extend(entry.to_bytes());
    }
    data.resize(v5::DEVICE_CHANGE_LEN, 0);
    data
}

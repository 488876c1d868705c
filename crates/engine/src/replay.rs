//! Scripted sessions against the mock transport.
//!
//! A [`Session`] lists device arrivals, captured input reports and host
//! calls. [`Replay`] feeds them through a [`Bridge`] backed by
//! [`MockIosHid`] and a [`MockBus`], answering every request the
//! simulated resource manager can answer, and records what the host
//! would have observed.

use std::sync::Arc;

use openwpad_errors::BridgeError;
use openwpad_hid_common::{EndpointInfo, UsbDeviceId, UsbDeviceInfo};
use openwpad_usb_hid::mock::{MockBus, MockIosHid};
use openwpad_usb_hid::{IosRequest, TransportVersion};
use openwpad_wiimote::{DataFormat, Extension, WpadData, WpadStatus};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::family::Family;
use crate::host::{EmulatedWpad, NullWpad, Wpad};

/// Rounds per settle before giving up on a device that never goes idle.
const SETTLE_LIMIT: usize = 256;

const IN_ENDPOINT: u8 = 0x81;

/// A scripted session, as read from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_transport")]
    pub transport: TransportVersion,
    /// Bridge configuration; the defaults when absent.
    #[serde(default)]
    pub config: Option<BridgeConfig>,
    pub steps: Vec<Step>,
}

fn default_transport() -> TransportVersion {
    TransportVersion::V4
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Plug a device in. Its id is `vendor_id`/`product_id` when both are
    /// given, otherwise the first id `family` claims.
    Attach {
        dev_id: u32,
        #[serde(default)]
        family: Option<Family>,
        #[serde(default)]
        vendor_id: Option<u16>,
        #[serde(default)]
        product_id: Option<u16>,
        /// Interrupt IN packet size; required for v4 polling.
        #[serde(default)]
        in_packet: Option<u16>,
    },
    Detach {
        dev_id: u32,
    },
    /// Queue one captured input report.
    Report {
        dev_id: u32,
        hex: String,
    },
    SetDataFormat {
        slot: usize,
        format: DataFormat,
    },
    ControlMotor {
        slot: usize,
        on: bool,
    },
    /// Read the slot the way the host would.
    Read {
        slot: usize,
    },
}

/// Something the host observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    Connect {
        slot: usize,
        status: WpadStatus,
    },
    Extension {
        slot: usize,
        extension: Extension,
    },
    /// A poll completed; `record` is what a reader sees in the slot's
    /// current format.
    Sample {
        slot: usize,
        record: String,
    },
    Read {
        slot: usize,
        format: DataFormat,
        record: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Step {step}: invalid report hex: {source}")]
    Hex {
        step: usize,
        source: hex::FromHexError,
    },

    #[error("Step {step}: attach needs a family or both vendor_id and product_id")]
    DeviceId { step: usize },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Raw notifications pushed by the host callbacks. Samples are resolved
/// into records right after the completion that produced them.
#[derive(Debug, Clone, Copy)]
enum Notice {
    Connect(usize, WpadStatus),
    Extension(usize, Extension),
    Sampled(usize),
}

pub struct Replay {
    bridge: Bridge<MockIosHid>,
    hid: MockIosHid,
    bus: MockBus,
    wpad: EmulatedWpad<NullWpad>,
    pending: Vec<IosRequest>,
    notices: Arc<Mutex<Vec<Notice>>>,
    events: Vec<ReplayEvent>,
}

impl core::fmt::Debug for Replay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Replay")
            .field("bridge", &self.bridge)
            .field("pending", &self.pending.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Replay {
    /// Start a bridge on a fresh simulated resource manager.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the session cannot be
    /// brought up.
    pub fn start(version: TransportVersion, config: BridgeConfig) -> Result<Self, ReplayError> {
        config
            .validate()
            .map_err(|e| BridgeError::config(format!("{e:#}")))?;

        let hid = MockIosHid::new();
        let bridge = Bridge::new(hid.clone(), config);
        let wpad = bridge.wpad(NullWpad);
        let notices = Arc::new(Mutex::new(Vec::new()));

        for slot in 0..bridge.config().slots {
            let sink = Arc::clone(&notices);
            wpad.set_connect_callback(
                slot,
                Some(Arc::new(move |slot: usize, status: WpadStatus| {
                    sink.lock().push(Notice::Connect(slot, status));
                })),
            );
            let sink = Arc::clone(&notices);
            wpad.set_extension_callback(
                slot,
                Some(Arc::new(move |slot: usize, extension: Extension| {
                    sink.lock().push(Notice::Extension(slot, extension));
                })),
            );
            let sink = Arc::clone(&notices);
            wpad.set_sampling_callback(
                slot,
                Some(Arc::new(move |slot: usize| {
                    sink.lock().push(Notice::Sampled(slot));
                })),
            );
        }

        let mut replay = Self {
            bridge,
            hid,
            bus: MockBus::new(version),
            wpad,
            pending: Vec::new(),
            notices,
            events: Vec::new(),
        };
        replay.bridge.start()?;
        replay.settle()?;
        Ok(replay)
    }

    pub fn bridge(&self) -> &Bridge<MockIosHid> {
        &self.bridge
    }

    pub fn wpad(&self) -> &EmulatedWpad<NullWpad> {
        &self.wpad
    }

    pub fn events(&self) -> &[ReplayEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ReplayEvent> {
        self.events
    }

    /// Apply one step and let the bridge catch up.
    ///
    /// # Errors
    ///
    /// Fails on malformed steps and fatal bridge errors.
    pub fn apply(&mut self, index: usize, step: &Step) -> Result<(), ReplayError> {
        debug!(step = index, ?step, "replay step");
        match step {
            Step::Attach {
                dev_id,
                family,
                vendor_id,
                product_id,
                in_packet,
            } => {
                let id = match (vendor_id, product_id, family) {
                    (Some(vid), Some(pid), _) => UsbDeviceId::new(*vid, *pid),
                    (_, _, Some(family)) => family
                        .ids()
                        .first()
                        .copied()
                        .ok_or(ReplayError::DeviceId { step: index })?,
                    _ => return Err(ReplayError::DeviceId { step: index }),
                };
                let mut device = UsbDeviceInfo::new(*dev_id, id);
                if let Some(size) = in_packet {
                    device = device.with_endpoint_in(EndpointInfo {
                        address: IN_ENDPOINT,
                        max_packet_size: *size,
                    });
                }
                self.bus.attach(device);
            }
            Step::Detach { dev_id } => {
                if !self.bus.detach(*dev_id) {
                    warn!(step = index, dev_id, "detach of a device that is not attached");
                }
            }
            Step::Report { dev_id, hex } => {
                let report = hex::decode(hex.trim())
                    .map_err(|source| ReplayError::Hex { step: index, source })?;
                self.bus.queue_report(*dev_id, report);
            }
            Step::SetDataFormat { slot, format } => {
                self.wpad.set_data_format(*slot, *format);
            }
            Step::ControlMotor { slot, on } => {
                self.wpad.control_motor(*slot, *on);
            }
            Step::Read { slot } => {
                let format = self.wpad.data_format(*slot);
                let mut record = WpadData::default();
                self.wpad.read(*slot, &mut record);
                self.events.push(ReplayEvent::Read {
                    slot: *slot,
                    format,
                    record: hex::encode(record.bytes_for(format)),
                });
            }
        }
        self.settle()
    }

    /// Answer every request the bus can answer until nothing moves.
    fn settle(&mut self) -> Result<(), ReplayError> {
        for _ in 0..SETTLE_LIMIT {
            self.pending.extend(self.hid.take_submitted());
            let mut progressed = false;
            for request in std::mem::take(&mut self.pending) {
                match self.bus.answer(&request) {
                    Some(completion) => {
                        progressed = true;
                        let result = self.bridge.handle_completion(completion);
                        self.drain_notices();
                        result?;
                    }
                    None => self.pending.push(request),
                }
            }
            if !progressed {
                return Ok(());
            }
        }
        warn!(limit = SETTLE_LIMIT, "replay did not settle");
        Ok(())
    }

    fn drain_notices(&mut self) {
        let notices = std::mem::take(&mut *self.notices.lock());
        for notice in notices {
            let event = match notice {
                Notice::Connect(slot, status) => ReplayEvent::Connect { slot, status },
                Notice::Extension(slot, extension) => ReplayEvent::Extension { slot, extension },
                Notice::Sampled(slot) => {
                    let mut record = WpadData::default();
                    self.wpad.read(slot, &mut record);
                    let format = self.wpad.data_format(slot);
                    ReplayEvent::Sample {
                        slot,
                        record: hex::encode(record.bytes_for(format)),
                    }
                }
            };
            self.events.push(event);
        }
    }
}

/// Run a whole session and return what the host observed.
///
/// # Errors
///
/// Fails on malformed steps and fatal bridge errors.
pub fn run_session(session: &Session) -> Result<Vec<ReplayEvent>, ReplayError> {
    let config = session.config.clone().unwrap_or_default();
    let mut replay = Replay::start(session.transport, config)?;
    for (index, step) in session.steps.iter().enumerate() {
        replay.apply(index, step)?;
    }
    Ok(replay.into_events())
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_session_parses_from_json() -> TestResult {
        let session: Session = serde_json::from_str(
            r#"{
                "steps": [
                    { "op": "attach", "dev_id": 16, "family": "gh-guitar", "in_packet": 64 },
                    { "op": "report", "dev_id": 16, "hex": "00" },
                    { "op": "set_data_format", "slot": 0, "format": "Guitar" },
                    { "op": "detach", "dev_id": 16 }
                ]
            }"#,
        )?;
        assert_eq!(session.transport, TransportVersion::V4);
        assert_eq!(session.config, None);
        assert_eq!(
            session.steps.first(),
            Some(&Step::Attach {
                dev_id: 16,
                family: Some(Family::GhGuitar),
                vendor_id: None,
                product_id: None,
                in_packet: Some(64),
            })
        );
        assert_eq!(session.steps.len(), 4);
        Ok(())
    }

    #[test]
    fn test_attach_and_detach_notify_host() -> TestResult {
        let session = Session {
            transport: TransportVersion::V5,
            config: None,
            steps: vec![
                Step::Attach {
                    dev_id: 1,
                    family: Some(Family::GhDrums),
                    vendor_id: None,
                    product_id: None,
                    in_packet: None,
                },
                Step::Detach { dev_id: 1 },
            ],
        };
        let events = run_session(&session)?;
        assert_eq!(
            events,
            vec![
                ReplayEvent::Connect {
                    slot: 0,
                    status: WpadStatus::Ok
                },
                ReplayEvent::Extension {
                    slot: 0,
                    extension: Extension::Drum
                },
                ReplayEvent::Connect {
                    slot: 0,
                    status: WpadStatus::Disconnected
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_report_produces_sample_in_current_format() -> TestResult {
        let mut replay = Replay::start(TransportVersion::V4, BridgeConfig::default())?;
        replay.apply(
            0,
            &Step::Attach {
                dev_id: 2,
                family: Some(Family::GhGuitar),
                vendor_id: None,
                product_id: None,
                in_packet: Some(64),
            },
        )?;
        let idle = format!("0000{}", "00".repeat(25));
        replay.apply(
            1,
            &Step::Report {
                dev_id: 2,
                hex: idle.clone(),
            },
        )?;
        replay.apply(
            2,
            &Step::SetDataFormat {
                slot: 0,
                format: DataFormat::Guitar,
            },
        )?;
        replay.apply(3, &Step::Report { dev_id: 2, hex: idle })?;

        let samples: Vec<usize> = replay
            .events()
            .iter()
            .filter_map(|e| match e {
                ReplayEvent::Sample { record, .. } => Some(record.len() / 2),
                _ => None,
            })
            .collect();
        assert_eq!(
            samples,
            vec![
                DataFormat::Core.record_len(),
                DataFormat::Guitar.record_len()
            ]
        );
        Ok(())
    }

    #[test]
    fn test_bad_steps_are_reported() -> TestResult {
        let mut replay = Replay::start(TransportVersion::V4, BridgeConfig::default())?;
        let hex = replay.apply(
            4,
            &Step::Report {
                dev_id: 2,
                hex: "zz".to_string(),
            },
        );
        assert!(matches!(hex, Err(ReplayError::Hex { step: 4, .. })));

        let id = replay.apply(
            5,
            &Step::Attach {
                dev_id: 2,
                family: None,
                vendor_id: Some(0x054C),
                product_id: None,
                in_packet: None,
            },
        );
        assert!(matches!(id, Err(ReplayError::DeviceId { step: 5 })));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = BridgeConfig {
            slots: 0,
            ..BridgeConfig::default()
        };
        let started = Replay::start(TransportVersion::V4, config);
        assert!(matches!(started, Err(ReplayError::Bridge(BridgeError::Config(_)))));
    }
}

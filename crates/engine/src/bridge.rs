//! Enumeration state machine and per-slot poll loops.
//!
//! The bridge owns the transport handle and the device registry. It only
//! ever reacts to completions: a device change completion diffs the device
//! list against the registry, and a transfer completion runs the bound
//! driver and arms that slot's next transfer.
//!
//! ```text
//!   open ─► version v4? ─no─► version v5? ─no─► Failed
//!               │ yes               │ yes
//!               ▼                   ▼
//!          device change      device change ─► attach finish
//!               │                   │
//!               ▼                   ▼
//!          diff ─► init       diff ─► resume ─► parameters ─► init
//! ```

use openwpad_errors::{BridgeError, DeviceError, TransportError};
use openwpad_hid_common::UsbDeviceInfo;
use openwpad_usb_hid::{
    DEV_USB_HID_PATH, IosCompletion, IosHid, IosRequest, RequestTag, Transfer, TransportVersion,
    status, v5,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::config::BridgeConfig;
use crate::driver::{Driver, KindChange, Reaction, SlotContext};
use crate::family::Family;
use crate::host::{EmulatedWpad, SlotCache, Wpad};
use crate::registry::{Binding, Registry, SlotState, diff};

/// Lifecycle of the transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Not started.
    Idle,
    /// Waiting for the answer to a version query.
    Detecting(TransportVersion),
    Running(TransportVersion),
    /// The session ended with a fatal transport error.
    Failed,
}

/// Drives USB devices through a [`IosHid`] transport and publishes their
/// translated state into a [`SlotCache`].
pub struct Bridge<T: IosHid> {
    hid: T,
    config: BridgeConfig,
    registry: Registry,
    cache: SlotCache,
    state: BridgeState,
    /// v5 device list held back until ATTACH_FINISH completes.
    stashed: Vec<UsbDeviceInfo>,
    /// Devices ignored until they leave the device list.
    parked: Vec<u32>,
}

impl<T: IosHid> core::fmt::Debug for Bridge<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bridge")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("parked", &self.parked)
            .finish_non_exhaustive()
    }
}

impl<T: IosHid> Bridge<T> {
    pub fn new(hid: T, config: BridgeConfig) -> Self {
        let slots = config.slots;
        Self {
            hid,
            config,
            registry: Registry::new(slots),
            cache: SlotCache::new(slots),
            state: BridgeState::Idle,
            stashed: Vec::new(),
            parked: Vec::new(),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Shared handle to the published slot state.
    pub fn cache(&self) -> SlotCache {
        self.cache.clone()
    }

    /// Host adapter over this bridge's slots, wrapping `inner`.
    pub fn wpad<W: Wpad>(&self, inner: W) -> EmulatedWpad<W> {
        EmulatedWpad::new(self.cache(), inner)
    }

    pub fn hid(&self) -> &T {
        &self.hid
    }

    fn version(&self) -> Result<TransportVersion, TransportError> {
        match self.state {
            BridgeState::Running(version) => Ok(version),
            _ => Err(TransportError::Closed),
        }
    }

    /// Open the transport and start version detection.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`TransportError`] when the node cannot be opened
    /// or the first query is rejected.
    pub fn start(&mut self) -> Result<(), BridgeError> {
        info!(path = DEV_USB_HID_PATH, slots = self.config.slots, "starting bridge");
        if let Err(e) = self.hid.open(DEV_USB_HID_PATH) {
            return Err(self.fail(e));
        }
        self.detect(TransportVersion::V4)
    }

    fn detect(&mut self, version: TransportVersion) -> Result<(), BridgeError> {
        debug!(%version, "querying transport version");
        self.state = BridgeState::Detecting(version);
        self.submit_session(version.version_request())
    }

    /// Submit a request the session cannot live without.
    fn submit_session(&mut self, request: IosRequest) -> Result<(), BridgeError> {
        let tag = request.tag;
        match self.hid.submit(request) {
            Ok(()) => Ok(()),
            Err(e) => {
                let fatal = match (tag, e) {
                    (RequestTag::DeviceChange, TransportError::Submit { status, .. }) => {
                        TransportError::DeviceChange { status }
                    }
                    (RequestTag::AttachFinish, TransportError::Submit { status, .. }) => {
                        TransportError::AttachFinish { status }
                    }
                    (_, other) => other,
                };
                Err(self.fail(fatal))
            }
        }
    }

    fn fail(&mut self, e: TransportError) -> BridgeError {
        error!(error = %e, "transport session failed");
        self.hid.close();
        self.state = BridgeState::Failed;
        BridgeError::from(e)
    }

    /// Process every completion until the channel closes.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Per-device failures are logged and
    /// handled locally.
    pub async fn run(
        &mut self,
        mut completions: mpsc::Receiver<IosCompletion>,
    ) -> Result<(), BridgeError> {
        self.start()?;
        while let Some(completion) = completions.recv().await {
            self.handle_completion(completion)?;
        }
        info!("completion channel closed, stopping bridge");
        self.hid.close();
        Ok(())
    }

    /// Advance the state machine by one completion.
    ///
    /// # Errors
    ///
    /// Only fatal transport errors are returned. They leave the bridge
    /// [`BridgeState::Failed`] with the transport closed.
    pub fn handle_completion(&mut self, completion: IosCompletion) -> Result<(), BridgeError> {
        if self.state == BridgeState::Failed {
            trace!(tag = ?completion.tag, "session failed, dropping completion");
            return Ok(());
        }
        trace!(tag = ?completion.tag, result = completion.result, "completion");

        match completion.tag {
            RequestTag::Version(version) => self.on_version(version, &completion),
            RequestTag::DeviceChange => self.on_device_change(&completion),
            RequestTag::AttachFinish => self.on_attach_finish(&completion),
            RequestTag::Resume { slot, generation } => {
                self.on_resume(slot, generation, &completion)
            }
            RequestTag::Parameters { slot, generation } => {
                self.on_parameters(slot, generation, &completion)
            }
            RequestTag::Transfer { slot, generation } => {
                self.on_transfer(slot, generation, &completion)
            }
        }
    }

    fn on_version(
        &mut self,
        version: TransportVersion,
        completion: &IosCompletion,
    ) -> Result<(), BridgeError> {
        if self.state != BridgeState::Detecting(version) {
            debug!(%version, "ignoring late version reply");
            return Ok(());
        }
        if version.accepts(completion) {
            info!(%version, "transport version detected");
            self.state = BridgeState::Running(version);
            return self.submit_session(version.device_change_request());
        }
        match version {
            TransportVersion::V4 => self.detect(TransportVersion::V5),
            TransportVersion::V5 => {
                let found = completion
                    .data
                    .first_chunk::<4>()
                    .map_or(0, |word| u32::from_be_bytes(*word));
                Err(self.fail(TransportError::VersionMismatch { found }))
            }
        }
    }

    fn on_device_change(&mut self, completion: &IosCompletion) -> Result<(), BridgeError> {
        let version = match self.version() {
            Ok(version) => version,
            Err(e) => return Err(self.fail(e)),
        };
        if !completion.is_ok() {
            return Err(self.fail(TransportError::DeviceChange {
                status: completion.result,
            }));
        }
        let devices = match version.parse_device_change(completion) {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "malformed device change reply");
                return Err(self.fail(TransportError::DeviceChange {
                    status: status::EINVAL,
                }));
            }
        };
        debug!(count = devices.len(), "device list");

        match version {
            TransportVersion::V4 => {
                self.reconcile(&devices)?;
                self.submit_session(version.device_change_request())
            }
            TransportVersion::V5 => {
                self.stashed = devices;
                self.submit_session(v5::attach_finish_request())
            }
        }
    }

    fn on_attach_finish(&mut self, completion: &IosCompletion) -> Result<(), BridgeError> {
        if !completion.is_ok() {
            return Err(self.fail(TransportError::AttachFinish {
                status: completion.result,
            }));
        }
        let devices = std::mem::take(&mut self.stashed);
        self.reconcile(&devices)?;
        self.submit_session(TransportVersion::V5.device_change_request())
    }

    /// Bring the registry in line with `listed`.
    fn reconcile(&mut self, listed: &[UsbDeviceInfo]) -> Result<(), BridgeError> {
        let listed_ids: Vec<u32> = listed.iter().map(|d| d.dev_id).collect();
        self.parked.retain(|id| listed_ids.contains(id));

        let changes = diff(&self.registry.occupied_ids(), &listed_ids);
        for dev_id in &changes.detached {
            if let Some(slot) = self.registry.find(*dev_id) {
                self.detach(slot);
            }
        }

        for slot in self.registry.suspended() {
            if self.config.auto_reconnect {
                self.reconnect(slot)?;
            } else if let Some(binding) = self.detach(slot) {
                info!(slot, dev_id = binding.device.dev_id, "parking failed device until unplugged");
                self.parked.push(binding.device.dev_id);
            }
        }

        for device in listed {
            if changes.attached.contains(&device.dev_id) && !self.parked.contains(&device.dev_id) {
                self.attach(device)?;
            }
        }
        Ok(())
    }

    fn detach(&mut self, slot: usize) -> Option<Binding> {
        let mut binding = self.registry.release(slot)?;
        binding.driver.disconnect(slot);
        self.cache.unbind(slot);
        info!(
            slot,
            dev_id = binding.device.dev_id,
            family = %binding.family,
            "device detached"
        );
        Some(binding)
    }

    fn attach(&mut self, device: &UsbDeviceInfo) -> Result<(), BridgeError> {
        let version = self.version()?;
        let id = device.id;

        let Some(family) = Family::probe(&self.config.families, id) else {
            let e = DeviceError::unsupported(id.vendor_id, id.product_id);
            debug!(dev_id = device.dev_id, error = %e, "no driver");
            self.parked.push(device.dev_id);
            return Ok(());
        };

        if version == TransportVersion::V4 && device.endpoint_in.is_none() {
            let e = DeviceError::EndpointMissing {
                dev_id: device.dev_id,
            };
            warn!(error = %e, "cannot poll device");
            self.parked.push(device.dev_id);
            return Ok(());
        }

        let cache = &self.cache;
        let Some(slot) = self.registry.free_slot(|i| cache.is_real(i)) else {
            let e = DeviceError::NoFreeSlot {
                dev_id: device.dev_id,
            };
            warn!(error = %e, "device left unbound");
            return Ok(());
        };

        info!(
            slot,
            dev_id = device.dev_id,
            vid = format_args!("{:04x}", id.vendor_id),
            pid = format_args!("{:04x}", id.product_id),
            %family,
            "device attached"
        );
        self.bring_up(slot, device.clone(), family)
    }

    /// Occupy `slot` and start the revision's bring-up sequence.
    fn bring_up(
        &mut self,
        slot: usize,
        device: UsbDeviceInfo,
        family: Family,
    ) -> Result<(), BridgeError> {
        let version = self.version()?;
        let dev_id = device.dev_id;
        let driver = Driver::new(family, &self.config.outputs);
        let generation = match self.registry.occupy(slot, Binding::new(device, family, driver)) {
            Ok(generation) => generation,
            Err(e) => {
                warn!(error = %e, "cannot occupy slot");
                return Ok(());
            }
        };

        match version {
            TransportVersion::V4 => self.init_slot(slot),
            TransportVersion::V5 => {
                let request = v5::resume_request(dev_id, slot, generation);
                self.submit_for(slot, request)
            }
        }
    }

    /// Re-initialise a suspended slot whose device is still listed.
    fn reconnect(&mut self, slot: usize) -> Result<(), BridgeError> {
        let Some(binding) = self.registry.release(slot) else {
            return Ok(());
        };
        info!(slot, dev_id = binding.device.dev_id, "reconnecting suspended device");
        self.bring_up(slot, binding.device, binding.family)
    }

    fn on_resume(
        &mut self,
        slot: usize,
        generation: u32,
        completion: &IosCompletion,
    ) -> Result<(), BridgeError> {
        let dev_id = match self.registry.current(slot, generation) {
            Ok(binding) => binding.device.dev_id,
            Err(e) => {
                debug!(error = %e, "dropping resume completion");
                return Ok(());
            }
        };
        if !completion.is_ok() {
            warn!(slot, status = completion.result, "resume failed, continuing");
        }
        self.submit_for(slot, v5::parameters_request(dev_id, slot, generation))
    }

    fn on_parameters(
        &mut self,
        slot: usize,
        generation: u32,
        completion: &IosCompletion,
    ) -> Result<(), BridgeError> {
        if let Err(e) = self.registry.current(slot, generation) {
            debug!(error = %e, "dropping parameters completion");
            return Ok(());
        }
        if !completion.is_ok() {
            warn!(slot, status = completion.result, "device parameters failed, continuing");
        }
        self.init_slot(slot)
    }

    /// Submit a bring-up request for a probing slot. A rejected request
    /// releases the slot.
    fn submit_for(&mut self, slot: usize, request: IosRequest) -> Result<(), BridgeError> {
        match self.hid.submit(request) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(self.fail(e)),
            Err(e) => {
                let e = DeviceError::init_failed(slot, e.to_string());
                warn!(error = %e, "bring-up aborted");
                self.registry.release(slot);
                Ok(())
            }
        }
    }

    /// Run the driver's init and arm its first transfer.
    fn init_slot(&mut self, slot: usize) -> Result<(), BridgeError> {
        let motor = self.cache.motor(slot);
        let Some(binding) = self.registry.binding_mut(slot) else {
            return Ok(());
        };
        let ctx = SlotContext {
            slot,
            poll_len: binding.poll_len(),
            motor,
        };
        let reaction = binding.driver.init(&ctx);

        self.cache.bind(slot);
        self.registry.set_state(slot, SlotState::Bound);
        self.apply(slot, reaction, false)
    }

    fn on_transfer(
        &mut self,
        slot: usize,
        generation: u32,
        completion: &IosCompletion,
    ) -> Result<(), BridgeError> {
        if self.registry.state(slot) != SlotState::Bound {
            debug!(slot, "completion for a slot that is not bound");
            return Ok(());
        }
        let motor = self.cache.motor(slot);
        let binding = match self.registry.current(slot, generation) {
            Ok(binding) => binding,
            Err(e) => {
                debug!(error = %e, "dropping transfer completion");
                return Ok(());
            }
        };
        let Some(done) = binding.in_flight.take() else {
            debug!(slot, "completion with nothing in flight");
            return Ok(());
        };

        if !completion.is_ok() {
            let e = DeviceError::TransferFailed {
                slot,
                status: completion.result,
            };
            warn!(error = %e, "suspending slot");
            self.suspend(slot);
            return Ok(());
        }

        let ctx = SlotContext {
            slot,
            poll_len: binding.poll_len(),
            motor,
        };
        let reaction = match binding.driver.complete(&ctx, &done, &completion.data) {
            Ok(reaction) => reaction,
            Err(e) => {
                warn!(slot, family = %binding.family, error = %e, "keeping previous record");
                Reaction {
                    record: None,
                    change: None,
                    next: binding.driver.poll(&ctx),
                }
            }
        };
        let polled = matches!(done, Transfer::InterruptIn { .. });
        self.apply(slot, reaction, polled)
    }

    /// Publish a driver step and arm its next transfer.
    fn apply(&mut self, slot: usize, reaction: Reaction, polled: bool) -> Result<(), BridgeError> {
        match reaction.change {
            Some(KindChange::Activated(personality)) => self.cache.activate(slot, personality),
            Some(KindChange::Deactivated) => self.cache.deactivate(slot),
            None => {}
        }
        if polled {
            self.cache.publish(slot, reaction.record.as_ref());
        }
        self.arm(slot, reaction.next)
    }

    fn arm(&mut self, slot: usize, transfer: Transfer) -> Result<(), BridgeError> {
        let version = self.version()?;
        let Some(generation) = self.registry.generation(slot) else {
            return Ok(());
        };
        let Some(binding) = self.registry.binding_mut(slot) else {
            return Ok(());
        };
        let tag = RequestTag::Transfer { slot, generation };
        let request = version.transfer_request(&binding.device, &transfer, tag);
        trace!(slot, ?transfer, "arming");

        match self.hid.submit(request) {
            Ok(()) => {
                binding.in_flight = Some(transfer);
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(self.fail(e)),
            Err(e) => {
                warn!(slot, error = %e, "cannot arm transfer, suspending slot");
                self.suspend(slot);
                Ok(())
            }
        }
    }

    fn suspend(&mut self, slot: usize) {
        if let Some(binding) = self.registry.binding_mut(slot) {
            binding.in_flight = None;
        }
        self.registry.set_state(slot, SlotState::Suspended);
        self.cache.unbind(slot);
    }
}

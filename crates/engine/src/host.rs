//! Host controller subsystem adapter.
//!
//! [`Wpad`] is the query surface an application uses to read remotes.
//! [`EmulatedWpad`] answers it for every slot the bridge has bound a USB
//! device to and forwards every other slot to the real subsystem it wraps.
//!
//! The bridge publishes into a [`SlotCache`]. Each publish is a single
//! structure copy under a `parking_lot::Mutex`; decoding happens before
//! the lock is taken. Callbacks are cloned out and invoked after it is
//! released.

use std::sync::Arc;

use openwpad_wiimote::{DataFormat, Extension, GravityUnit, WpadData, WpadStatus};
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::driver::Personality;

pub type ConnectCallback = Arc<dyn Fn(usize, WpadStatus) + Send + Sync>;
pub type ExtensionCallback = Arc<dyn Fn(usize, Extension) + Send + Sync>;
pub type SamplingCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Extension register DJ Hero titles write to drive the euphoria LED.
pub const EUPHORIA_LED_REGISTER: u8 = 0xFB;

/// The host controller query interface.
pub trait Wpad: Send + Sync {
    /// Copy the latest record of `slot` into `out`.
    fn read(&self, slot: usize, out: &mut WpadData);

    fn probe(&self, slot: usize) -> (WpadStatus, Extension);

    fn set_data_format(&self, slot: usize, format: DataFormat) -> WpadStatus;

    fn data_format(&self, slot: usize) -> DataFormat;

    fn set_connect_callback(&self, slot: usize, callback: Option<ConnectCallback>);

    fn set_extension_callback(&self, slot: usize, callback: Option<ExtensionCallback>);

    fn set_sampling_callback(&self, slot: usize, callback: Option<SamplingCallback>);

    /// Keep the last `count` records of `slot` in a ring. Zero disables it.
    fn set_auto_sampling_buf(&self, slot: usize, count: usize);

    fn auto_sampling_buf(&self, slot: usize) -> Vec<WpadData>;

    fn latest_index_in_buf(&self, slot: usize) -> usize;

    fn acc_gravity_unit(&self, slot: usize, extension: Extension) -> GravityUnit;

    fn control_dpd(&self, slot: usize, enable: bool) -> WpadStatus;

    fn is_dpd_enabled(&self, slot: usize) -> bool;

    fn control_motor(&self, slot: usize, on: bool);

    fn write_ext_reg(&self, slot: usize, address: u8, data: &[u8]);
}

/// A subsystem with no remotes. Stands in when nothing real is wrapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWpad;

impl Wpad for NullWpad {
    fn read(&self, _slot: usize, out: &mut WpadData) {
        *out = WpadData {
            status: WpadStatus::Disconnected,
            ..WpadData::default()
        };
    }

    fn probe(&self, _slot: usize) -> (WpadStatus, Extension) {
        (WpadStatus::Disconnected, Extension::None)
    }

    fn set_data_format(&self, _slot: usize, _format: DataFormat) -> WpadStatus {
        WpadStatus::Disconnected
    }

    fn data_format(&self, _slot: usize) -> DataFormat {
        DataFormat::Core
    }

    fn set_connect_callback(&self, _slot: usize, _callback: Option<ConnectCallback>) {}

    fn set_extension_callback(&self, _slot: usize, _callback: Option<ExtensionCallback>) {}

    fn set_sampling_callback(&self, _slot: usize, _callback: Option<SamplingCallback>) {}

    fn set_auto_sampling_buf(&self, _slot: usize, _count: usize) {}

    fn auto_sampling_buf(&self, _slot: usize) -> Vec<WpadData> {
        Vec::new()
    }

    fn latest_index_in_buf(&self, _slot: usize) -> usize {
        0
    }

    fn acc_gravity_unit(&self, _slot: usize, _extension: Extension) -> GravityUnit {
        GravityUnit::ZERO
    }

    fn control_dpd(&self, _slot: usize, _enable: bool) -> WpadStatus {
        WpadStatus::Disconnected
    }

    fn is_dpd_enabled(&self, _slot: usize) -> bool {
        false
    }

    fn control_motor(&self, _slot: usize, _on: bool) {}

    fn write_ext_reg(&self, _slot: usize, _address: u8, _data: &[u8]) {}
}

#[derive(Default)]
struct HostSlot {
    /// A USB device is bound.
    valid: bool,
    /// The wrapped subsystem reported a real remote here.
    real: bool,
    personality: Option<Personality>,
    /// Format the application asked for.
    current_format: DataFormat,
    record: WpadData,
    ring: Vec<WpadData>,
    ring_index: usize,
    dpd: bool,
    motor: bool,
    euphoria: bool,
    on_connect: Option<ConnectCallback>,
    on_extension: Option<ExtensionCallback>,
    on_sampling: Option<SamplingCallback>,
}

impl HostSlot {
    /// What a reader sees: the full record when it asked for the format
    /// being produced, otherwise only the core.
    fn view(&self) -> WpadData {
        match self.personality {
            Some(p) if p.format == self.current_format => self.record,
            _ => self.record.core_only(),
        }
    }

    fn extension(&self) -> Extension {
        self.personality.map_or(Extension::None, |p| p.extension)
    }
}

/// Per-slot state shared between the bridge and the host adapter.
#[derive(Clone, Default)]
pub struct SlotCache {
    slots: Arc<Mutex<Vec<HostSlot>>>,
}

impl core::fmt::Debug for SlotCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotCache")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl SlotCache {
    pub fn new(count: usize) -> Self {
        let mut slots = Vec::with_capacity(count);
        slots.resize_with(count, HostSlot::default);
        Self {
            slots: Arc::new(Mutex::new(slots)),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with<R>(&self, slot: usize, f: impl FnOnce(&mut HostSlot) -> R) -> Option<R> {
        self.slots.lock().get_mut(slot).map(f)
    }

    pub fn is_valid(&self, slot: usize) -> bool {
        self.with(slot, |s| s.valid).unwrap_or(false)
    }

    /// A real remote occupies the slot, so the bridge must not take it.
    pub fn is_real(&self, slot: usize) -> bool {
        self.with(slot, |s| s.real).unwrap_or(false)
    }

    pub fn motor(&self, slot: usize) -> bool {
        self.with(slot, |s| s.motor).unwrap_or(false)
    }

    pub fn personality(&self, slot: usize) -> Option<Personality> {
        self.with(slot, |s| s.personality).flatten()
    }

    /// Latest record regardless of the requested format.
    pub fn record(&self, slot: usize) -> Option<WpadData> {
        self.with(slot, |s| s.valid.then_some(s.record)).flatten()
    }

    pub fn euphoria_led(&self, slot: usize) -> bool {
        self.with(slot, |s| s.euphoria).unwrap_or(false)
    }

    /// A device now backs `slot`. Fires the connect callback.
    pub fn bind(&self, slot: usize) {
        let callback = self
            .with(slot, |s| {
                s.valid = true;
                s.personality = None;
                s.record = WpadData::default();
                s.ring_index = 0;
                s.ring.fill(WpadData::default());
                s.dpd = false;
                s.motor = false;
                s.euphoria = false;
                s.on_connect.clone()
            })
            .flatten();
        info!(slot, "remote connected");
        if let Some(callback) = callback {
            callback(slot, WpadStatus::Ok);
        }
    }

    /// The slot presents `personality`. Fires the extension callback.
    pub fn activate(&self, slot: usize, personality: Personality) {
        let callback = self
            .with(slot, |s| {
                s.personality = Some(personality);
                s.record.extension = personality.extension;
                s.on_extension.clone()
            })
            .flatten();
        info!(slot, extension = ?personality.extension, format = ?personality.format, "extension attached");
        if let Some(callback) = callback {
            callback(slot, personality.extension);
        }
    }

    /// The slot is provisional again. Fires the extension callback with
    /// [`Extension::None`].
    pub fn deactivate(&self, slot: usize) {
        let callback = self
            .with(slot, |s| {
                s.personality = None;
                s.record = WpadData::default();
                s.on_extension.clone()
            })
            .flatten();
        info!(slot, "extension detached");
        if let Some(callback) = callback {
            callback(slot, Extension::None);
        }
    }

    /// Store a fresh record, if any, and advance the sampling ring. Runs
    /// once per successful poll, so the ring also advances when a report
    /// failed to decode and the previous record stands.
    pub fn publish(&self, slot: usize, record: Option<&WpadData>) {
        let callback = self
            .with(slot, |s| {
                if let Some(record) = record {
                    s.record = *record;
                }
                if !s.ring.is_empty() {
                    let next = s.ring_index.saturating_add(1) % s.ring.len();
                    let view = s.view();
                    if let Some(entry) = s.ring.get_mut(next) {
                        *entry = view;
                    }
                    s.ring_index = next;
                }
                s.on_sampling.clone()
            })
            .flatten();
        if let Some(callback) = callback {
            callback(slot);
        }
    }

    /// The device left `slot`. Fires the connect callback with
    /// [`WpadStatus::Disconnected`].
    pub fn unbind(&self, slot: usize) {
        let callback = self
            .with(slot, |s| {
                let was_valid = std::mem::replace(&mut s.valid, false);
                s.personality = None;
                s.record = WpadData::default();
                s.motor = false;
                if was_valid { s.on_connect.clone() } else { None }
            })
            .flatten();
        info!(slot, "remote disconnected");
        if let Some(callback) = callback {
            callback(slot, WpadStatus::Disconnected);
        }
    }
}

/// [`Wpad`] over the bridge's slots, falling through to `inner`.
#[derive(Clone)]
pub struct EmulatedWpad<W> {
    cache: SlotCache,
    inner: W,
}

impl<W> core::fmt::Debug for EmulatedWpad<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EmulatedWpad")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<W: Wpad> EmulatedWpad<W> {
    pub fn new(cache: SlotCache, inner: W) -> Self {
        Self { cache, inner }
    }

    pub fn cache(&self) -> &SlotCache {
        &self.cache
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Run `emulated` under the lock when the slot is bound.
    fn bound<R>(&self, slot: usize, emulated: impl FnOnce(&mut HostSlot) -> R) -> Option<R> {
        self.cache
            .with(slot, |s| s.valid.then(|| emulated(s)))
            .flatten()
    }
}

impl<W: Wpad> Wpad for EmulatedWpad<W> {
    fn read(&self, slot: usize, out: &mut WpadData) {
        match self.bound(slot, |s| s.view()) {
            Some(view) => *out = view,
            None => self.inner.read(slot, out),
        }
    }

    fn probe(&self, slot: usize) -> (WpadStatus, Extension) {
        let (status, extension) = self.inner.probe(slot);
        if let Some(emulated) = self.bound(slot, |s| s.extension()) {
            return (WpadStatus::Ok, emulated);
        }
        self.cache.with(slot, |s| s.real = status == WpadStatus::Ok);
        (status, extension)
    }

    fn set_data_format(&self, slot: usize, format: DataFormat) -> WpadStatus {
        match self.bound(slot, |s| s.current_format = format) {
            Some(()) => {
                debug!(slot, ?format, "data format set");
                WpadStatus::Ok
            }
            None => self.inner.set_data_format(slot, format),
        }
    }

    fn data_format(&self, slot: usize) -> DataFormat {
        self.bound(slot, |s| s.current_format)
            .unwrap_or_else(|| self.inner.data_format(slot))
    }

    fn set_connect_callback(&self, slot: usize, callback: Option<ConnectCallback>) {
        let fire = self
            .cache
            .with(slot, |s| {
                s.on_connect.clone_from(&callback);
                s.valid
            })
            .unwrap_or(false);
        if fire && let Some(callback) = &callback {
            callback(slot, WpadStatus::Ok);
        }
        self.inner.set_connect_callback(slot, callback);
    }

    fn set_extension_callback(&self, slot: usize, callback: Option<ExtensionCallback>) {
        self.cache
            .with(slot, |s| s.on_extension.clone_from(&callback));
        self.inner.set_extension_callback(slot, callback);
    }

    fn set_sampling_callback(&self, slot: usize, callback: Option<SamplingCallback>) {
        self.cache
            .with(slot, |s| s.on_sampling.clone_from(&callback));
        self.inner.set_sampling_callback(slot, callback);
    }

    fn set_auto_sampling_buf(&self, slot: usize, count: usize) {
        self.inner.set_auto_sampling_buf(slot, count);
        let ring = vec![WpadData::default(); count];
        self.cache.with(slot, |s| {
            s.ring = ring;
            s.ring_index = 0;
        });
        trace!(slot, count, "auto sampling buffer");
    }

    fn auto_sampling_buf(&self, slot: usize) -> Vec<WpadData> {
        self.bound(slot, |s| s.ring.clone())
            .unwrap_or_else(|| self.inner.auto_sampling_buf(slot))
    }

    fn latest_index_in_buf(&self, slot: usize) -> usize {
        self.bound(slot, |s| s.ring_index)
            .unwrap_or_else(|| self.inner.latest_index_in_buf(slot))
    }

    /// Only the core accelerometer of a bound slot has a gravity unit.
    fn acc_gravity_unit(&self, slot: usize, extension: Extension) -> GravityUnit {
        self.bound(slot, |s| match extension {
            Extension::None => s.personality.map_or(GravityUnit::ZERO, |p| p.gravity),
            _ => GravityUnit::ZERO,
        })
        .unwrap_or_else(|| self.inner.acc_gravity_unit(slot, extension))
    }

    fn control_dpd(&self, slot: usize, enable: bool) -> WpadStatus {
        match self.bound(slot, |s| s.dpd = enable) {
            Some(()) => WpadStatus::Ok,
            None => self.inner.control_dpd(slot, enable),
        }
    }

    fn is_dpd_enabled(&self, slot: usize) -> bool {
        self.bound(slot, |s| s.dpd)
            .unwrap_or_else(|| self.inner.is_dpd_enabled(slot))
    }

    fn control_motor(&self, slot: usize, on: bool) {
        match self.bound(slot, |s| s.motor = on) {
            Some(()) => debug!(slot, on, "motor"),
            None => self.inner.control_motor(slot, on),
        }
    }

    fn write_ext_reg(&self, slot: usize, address: u8, data: &[u8]) {
        self.inner.write_ext_reg(slot, address, data);
        if let [value] = data
            && address == EUPHORIA_LED_REGISTER
            && let Some(on) = self.bound(slot, |s| {
                s.euphoria = *value != 0;
                s.euphoria
            })
        {
            info!(slot, on, "euphoria led");
        }
    }
}

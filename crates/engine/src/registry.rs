//! Fixed-size table of device slots.
//!
//! A slot moves `Empty → Probing → Bound ⇄ Suspended → Empty`. Every
//! release bumps the slot's generation, so completions addressed to an
//! earlier occupant can be told apart from current ones.

use openwpad_errors::DeviceError;
use openwpad_hid_common::UsbDeviceInfo;
use openwpad_usb_hid::{DEFAULT_PACKET_SIZE, Transfer};
use serde::{Deserialize, Serialize};

use crate::driver::Driver;
use crate::family::Family;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotState {
    #[default]
    Empty,
    /// Reserved while the transport brings the device up.
    Probing,
    Bound,
    /// The poll loop stopped after a transfer failure.
    Suspended,
}

/// What a non-empty slot is bound to.
#[derive(Debug, Clone)]
pub struct Binding {
    pub device: UsbDeviceInfo,
    pub family: Family,
    pub driver: Driver,
    /// The one transfer outstanding for this slot, if any.
    pub in_flight: Option<Transfer>,
}

impl Binding {
    pub fn new(device: UsbDeviceInfo, family: Family, driver: Driver) -> Self {
        Self {
            device,
            family,
            driver,
            in_flight: None,
        }
    }

    /// Interrupt IN length: the endpoint's packet size when known.
    pub fn poll_len(&self) -> u16 {
        self.device
            .endpoint_in
            .map_or(DEFAULT_PACKET_SIZE, |ep| ep.max_packet_size)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub state: SlotState,
    pub generation: u32,
    pub binding: Option<Binding>,
}

impl Slot {
    pub fn dev_id(&self) -> Option<u32> {
        self.binding.as_ref().map(|b| b.device.dev_id)
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<Slot>,
}

impl Registry {
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![Slot::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Slot> {
        self.slots.get(slot)
    }

    pub fn binding_mut(&mut self, slot: usize) -> Option<&mut Binding> {
        self.slots.get_mut(slot)?.binding.as_mut()
    }

    pub fn generation(&self, slot: usize) -> Option<u32> {
        self.slots.get(slot).map(|s| s.generation)
    }

    /// Slots whose poll loop stopped, in slot order.
    pub fn suspended(&self) -> Vec<usize> {
        self.iter()
            .filter(|(_, s)| s.state == SlotState::Suspended)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate()
    }

    pub fn state(&self, slot: usize) -> SlotState {
        self.slots.get(slot).map_or(SlotState::Empty, |s| s.state)
    }

    pub fn find(&self, dev_id: u32) -> Option<usize> {
        self.slots.iter().position(|s| s.dev_id() == Some(dev_id))
    }

    /// Device ids of every occupied slot, in slot order.
    pub fn occupied_ids(&self) -> Vec<u32> {
        self.slots.iter().filter_map(Slot::dev_id).collect()
    }

    /// First empty slot not rejected by `skip`.
    pub fn free_slot(&self, skip: impl Fn(usize) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .find(|(i, s)| s.state == SlotState::Empty && !skip(*i))
            .map(|(i, _)| i)
    }

    /// Occupy an empty slot. It starts out [`SlotState::Probing`].
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidSlot`] for an index past the table and
    /// [`DeviceError::NoFreeSlot`] when the slot is taken.
    pub fn occupy(&mut self, slot: usize, binding: Binding) -> Result<u32, DeviceError> {
        let entry = self.slots.get_mut(slot).ok_or(DeviceError::InvalidSlot(slot))?;
        if entry.state != SlotState::Empty {
            return Err(DeviceError::NoFreeSlot {
                dev_id: binding.device.dev_id,
            });
        }
        entry.state = SlotState::Probing;
        entry.binding = Some(binding);
        Ok(entry.generation)
    }

    pub fn set_state(&mut self, slot: usize, state: SlotState) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.state = state;
        }
    }

    /// Empty the slot and retire its generation.
    pub fn release(&mut self, slot: usize) -> Option<Binding> {
        let entry = self.slots.get_mut(slot)?;
        entry.state = SlotState::Empty;
        entry.generation = entry.generation.wrapping_add(1);
        entry.binding.take()
    }

    /// The binding a slot-scoped completion belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidSlot`] for an index past the table and
    /// [`DeviceError::StaleCompletion`] when the slot was recycled since
    /// the request was issued.
    pub fn current(&mut self, slot: usize, generation: u32) -> Result<&mut Binding, DeviceError> {
        let entry = self.slots.get_mut(slot).ok_or(DeviceError::InvalidSlot(slot))?;
        if entry.generation != generation {
            return Err(DeviceError::StaleCompletion { slot });
        }
        entry
            .binding
            .as_mut()
            .ok_or(DeviceError::StaleCompletion { slot })
    }
}

/// Result of comparing the bound device ids with a fresh device list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Bound before, absent now.
    pub detached: Vec<u32>,
    /// Listed now, not bound before.
    pub attached: Vec<u32>,
}

/// Ids present in both lists appear in neither half. Order follows the
/// input lists.
pub fn diff(bound: &[u32], listed: &[u32]) -> Diff {
    Diff {
        detached: bound
            .iter()
            .copied()
            .filter(|id| !listed.contains(id))
            .collect(),
        attached: listed
            .iter()
            .copied()
            .filter(|id| !bound.contains(id))
            .collect(),
    }
}

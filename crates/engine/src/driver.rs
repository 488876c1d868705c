//! Per-family lifecycle: init, async response and disconnect.
//!
//! A driver never touches the transport. Each step returns a [`Reaction`]
//! naming the single transfer to arm next, so a slot has at most one
//! transfer in flight and it is only ever armed from init or from the
//! slot's own completion.

use openwpad_errors::DecodeError;
use openwpad_hid_dualshock_protocol::ds3::{self, Rumble};
use openwpad_hid_dualshock_protocol::{ds4, gamepad};
use openwpad_hid_hori_protocol::{leds, taiko};
use openwpad_hid_ps3_instrument_protocol::{drums, guitar, santroller, turntable};
use openwpad_hid_xinput_protocol::{Receiver, ReceiverEvent, messages};
use openwpad_usb_hid::Transfer;
use openwpad_wiimote::{DataFormat, Extension, GravityUnit, WpadData};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{OutputConfig, OutputToggles};
use crate::family::{Family, ParseFailure};

const DS3_POLL_LEN: u16 = ds3::REPORT_LEN as u16;
const DS4_POLL_LEN: u16 = ds4::POLL_LEN as u16;

/// What a bound slot presents to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Personality {
    pub extension: Extension,
    pub format: DataFormat,
    pub gravity: GravityUnit,
}

impl Personality {
    const fn new(extension: Extension, format: DataFormat, gravity: GravityUnit) -> Self {
        Self {
            extension,
            format,
            gravity,
        }
    }
}

const GUITAR: Personality =
    Personality::new(guitar::EXTENSION, guitar::DATA_FORMAT, guitar::GRAVITY_UNIT);
const DRUMS: Personality =
    Personality::new(drums::EXTENSION, drums::DATA_FORMAT, drums::GRAVITY_UNIT);
const TURNTABLE: Personality = Personality::new(
    turntable::EXTENSION,
    turntable::DATA_FORMAT,
    turntable::GRAVITY_UNIT,
);
const TAIKO: Personality =
    Personality::new(taiko::EXTENSION, taiko::DATA_FORMAT, taiko::GRAVITY_UNIT);
const GAMEPAD: Personality = Personality::new(
    gamepad::EXTENSION,
    gamepad::DATA_FORMAT,
    gamepad::GRAVITY_UNIT,
);

/// Change of the slot's emulated kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindChange {
    Activated(Personality),
    /// A composite device lost its identity and is provisional again.
    Deactivated,
}

/// Slot facts a driver step needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotContext {
    pub slot: usize,
    /// Interrupt IN length when the family has no fixed one.
    pub poll_len: u16,
    /// Motor state last requested by the host.
    pub motor: bool,
}

/// Outcome of one driver step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Freshly translated record to publish.
    pub record: Option<WpadData>,
    pub change: Option<KindChange>,
    /// The transfer to arm next.
    pub next: Transfer,
}

impl Reaction {
    fn arm(next: Transfer) -> Self {
        Self {
            record: None,
            change: None,
            next,
        }
    }

    fn activate(personality: Personality, next: Transfer) -> Self {
        Self {
            change: Some(KindChange::Activated(personality)),
            ..Self::arm(next)
        }
    }
}

/// Which output write a poll cycle should carry instead of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Leds,
    Rumble,
}

/// Coalesces LED and rumble changes into at most one output transfer
/// per cycle. A pending LED change goes first, then a rumble change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchedule {
    toggles: OutputToggles,
    led_pending: bool,
    rumble_sent: bool,
}

impl OutputSchedule {
    pub fn new(toggles: OutputToggles) -> Self {
        Self {
            toggles,
            led_pending: false,
            rumble_sent: false,
        }
    }

    /// Ask for the player LEDs to be (re)written.
    pub fn request_leds(&mut self) {
        self.led_pending = self.toggles.leds;
    }

    /// The rumble level the device should run at for host motor `motor`.
    pub fn rumble(&self, motor: bool) -> bool {
        self.toggles.rumble && motor
    }

    pub fn leds_enabled(&self) -> bool {
        self.toggles.leds
    }

    /// Pick the output due this cycle and mark it sent. Every output
    /// report carries the current rumble level, so any write settles it.
    pub fn take(&mut self, motor: bool) -> Option<Output> {
        let rumble = self.rumble(motor);
        let due = if self.led_pending {
            Some(Output::Leds)
        } else if rumble != self.rumble_sent {
            Some(Output::Rumble)
        } else {
            None
        };
        if due.is_some() {
            self.led_pending = false;
            self.rumble_sent = rumble;
        }
        due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ds3State {
    outputs: OutputSchedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ds4State {
    outputs: OutputSchedule,
    pointer: ds4::Pointer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverState {
    receiver: Receiver,
    capabilities_pending: bool,
    led_pending: bool,
}

/// A family's driver with its per-slot scratch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Driver {
    GhGuitar,
    GhDrums,
    DjTurntable,
    Santroller,
    HoriTaiko,
    DualShock3(Ds3State),
    DualShock4(Ds4State),
    XboxReceiver(ReceiverState),
}

impl Driver {
    pub fn new(family: Family, outputs: &OutputConfig) -> Self {
        match family {
            Family::GhGuitar => Driver::GhGuitar,
            Family::GhDrums => Driver::GhDrums,
            Family::DjTurntable => Driver::DjTurntable,
            Family::Santroller => Driver::Santroller,
            Family::HoriTaiko => Driver::HoriTaiko,
            Family::DualShock3 => Driver::DualShock3(Ds3State {
                outputs: OutputSchedule::new(outputs.ds3),
            }),
            Family::DualShock4 => Driver::DualShock4(Ds4State {
                outputs: OutputSchedule::new(outputs.ds4),
                pointer: ds4::Pointer::default(),
            }),
            Family::XboxReceiver => Driver::XboxReceiver(ReceiverState::default()),
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Driver::GhGuitar => Family::GhGuitar,
            Driver::GhDrums => Family::GhDrums,
            Driver::DjTurntable => Family::DjTurntable,
            Driver::Santroller => Family::Santroller,
            Driver::HoriTaiko => Family::HoriTaiko,
            Driver::DualShock3(_) => Family::DualShock3,
            Driver::DualShock4(_) => Family::DualShock4,
            Driver::XboxReceiver(_) => Family::XboxReceiver,
        }
    }

    /// Current kind, or `None` while provisional.
    pub fn personality(&self) -> Option<Personality> {
        match self {
            Driver::GhGuitar | Driver::Santroller => Some(GUITAR),
            Driver::GhDrums => Some(DRUMS),
            Driver::DjTurntable => Some(TURNTABLE),
            Driver::HoriTaiko => Some(TAIKO),
            Driver::DualShock3(_) | Driver::DualShock4(_) => Some(GAMEPAD),
            Driver::XboxReceiver(state) => state.receiver.subtype().map(|subtype| {
                let layout = subtype.layout();
                Personality::new(layout.extension(), layout.data_format(), layout.gravity_unit())
            }),
        }
    }

    /// The input poll for this family.
    pub fn poll(&self, ctx: &SlotContext) -> Transfer {
        let length = match self {
            Driver::DualShock3(_) => DS3_POLL_LEN,
            Driver::DualShock4(_) => DS4_POLL_LEN,
            _ => ctx.poll_len,
        };
        Transfer::InterruptIn { length }
    }

    /// Bring-up. The returned transfer is the first one armed for the
    /// slot; fixed-kind families activate immediately.
    pub fn init(&mut self, ctx: &SlotContext) -> Reaction {
        let poll = self.poll(ctx);
        match self {
            Driver::GhGuitar => Reaction::activate(GUITAR, poll),
            Driver::GhDrums => Reaction::activate(DRUMS, poll),
            Driver::DjTurntable => Reaction::activate(TURNTABLE, poll),
            Driver::Santroller => {
                debug!(slot = ctx.slot, "santroller: switching to ps3 mode");
                Reaction::activate(GUITAR, Transfer::control_in(santroller::MODE_SWITCH))
            }
            Driver::HoriTaiko => Reaction::activate(
                TAIKO,
                Transfer::control_out(leds::SETUP, leds::report(ctx.slot)),
            ),
            Driver::DualShock3(state) => {
                state.outputs.request_leds();
                Reaction::activate(GAMEPAD, Transfer::control_in(ds3::ENABLE_REPORTING))
            }
            Driver::DualShock4(state) => {
                state.outputs.request_leds();
                let next = state.next(ctx).unwrap_or(poll);
                Reaction::activate(GAMEPAD, next)
            }
            Driver::XboxReceiver(state) => {
                *state = ReceiverState::default();
                debug!(slot = ctx.slot, "receiver: provisional until linked");
                Reaction::arm(poll)
            }
        }
    }

    /// Handle the completion of `done`, which returned `data`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when an input report cannot be decoded.
    /// The caller keeps the previous record and re-arms [`Driver::poll`].
    pub fn complete(
        &mut self,
        ctx: &SlotContext,
        done: &Transfer,
        data: &[u8],
    ) -> Result<Reaction, DecodeError> {
        let poll = self.poll(ctx);
        let input = matches!(done, Transfer::InterruptIn { .. });

        let reaction = match self {
            Driver::XboxReceiver(state) => {
                if input {
                    state.handle(ctx, data)?
                } else {
                    Reaction::arm(state.next(ctx.slot).unwrap_or(poll))
                }
            }
            Driver::DualShock3(state) => {
                let record = if input {
                    Some(
                        ds3::parse(data)
                            .map_err(ParseFailure::into_decode)?
                            .gamepad()
                            .wpad_data(),
                    )
                } else {
                    None
                };
                Reaction {
                    record,
                    ..Reaction::arm(state.next(ctx).unwrap_or(poll))
                }
            }
            Driver::DualShock4(state) => {
                let record = if input {
                    let report = ds4::parse(data).map_err(ParseFailure::into_decode)?;
                    let mut record = report.gamepad().wpad_data();
                    record.ir = state.pointer.update(&report);
                    Some(record)
                } else {
                    None
                };
                Reaction {
                    record,
                    ..Reaction::arm(state.next(ctx).unwrap_or(poll))
                }
            }
            simple => {
                let record = if input {
                    Some(simple.decode_fixed(data)?)
                } else {
                    None
                };
                Reaction {
                    record,
                    ..Reaction::arm(poll)
                }
            }
        };
        Ok(reaction)
    }

    /// The slot is being released.
    pub fn disconnect(&mut self, slot: usize) {
        debug!(slot, family = %self.family(), "driver disconnect");
        if let Driver::XboxReceiver(state) = self {
            *state = ReceiverState::default();
        }
    }

    /// Decode for the families without scratch state.
    fn decode_fixed(&self, data: &[u8]) -> Result<WpadData, DecodeError> {
        let record = match self {
            Driver::GhGuitar => guitar::parse(data)
                .map_err(ParseFailure::into_decode)?
                .wpad_data(),
            Driver::GhDrums => drums::parse(data)
                .map_err(ParseFailure::into_decode)?
                .wpad_data(),
            Driver::DjTurntable => turntable::parse(data)
                .map_err(ParseFailure::into_decode)?
                .wpad_data(),
            Driver::Santroller => santroller::parse(data)
                .map_err(ParseFailure::into_decode)?
                .wpad_data(),
            Driver::HoriTaiko => taiko::parse(data)
                .map_err(ParseFailure::into_decode)?
                .wpad_data(),
            Driver::DualShock3(_) | Driver::DualShock4(_) | Driver::XboxReceiver(_) => {
                return self.family().decode(data).map(|decoded| decoded.record);
            }
        };
        Ok(record)
    }
}

impl Ds3State {
    fn next(&mut self, ctx: &SlotContext) -> Option<Transfer> {
        let output = self.outputs.take(ctx.motor)?;
        trace!(slot = ctx.slot, ?output, "ds3 output");
        let leds = if self.outputs.leds_enabled() {
            ds3::led_mask(ctx.slot)
        } else {
            0
        };
        let rumble = Rumble::from_motor(self.outputs.rumble(ctx.motor));
        Some(Transfer::control_out(
            ds3::OUTPUT_SETUP,
            ds3::output_report(leds, rumble),
        ))
    }
}

impl Ds4State {
    fn next(&mut self, ctx: &SlotContext) -> Option<Transfer> {
        let output = self.outputs.take(ctx.motor)?;
        trace!(slot = ctx.slot, ?output, "ds4 output");
        let colour = if self.outputs.leds_enabled() {
            ds4::lightbar(ctx.slot)
        } else {
            [0; 3]
        };
        Some(Transfer::InterruptOut {
            data: ds4::output_report(colour, self.outputs.rumble(ctx.motor)).to_vec(),
        })
    }
}

impl ReceiverState {
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Capability query first, then the player LED.
    fn next(&mut self, slot: usize) -> Option<Transfer> {
        let message = if self.capabilities_pending {
            self.capabilities_pending = false;
            messages::CAPABILITIES_REQUEST
        } else if self.led_pending {
            self.led_pending = false;
            messages::player_led(slot)
        } else {
            return None;
        };
        Some(Transfer::InterruptOut {
            data: message.to_vec(),
        })
    }

    fn handle(&mut self, ctx: &SlotContext, data: &[u8]) -> Result<Reaction, DecodeError> {
        let poll = Transfer::InterruptIn {
            length: ctx.poll_len,
        };
        let event = self
            .receiver
            .handle(data)
            .map_err(ParseFailure::into_decode)?;
        let reaction = match event {
            ReceiverEvent::SendDisconnect => Reaction::arm(Transfer::InterruptOut {
                data: messages::DISCONNECT.to_vec(),
            }),
            ReceiverEvent::Linked {
                subtype,
                query_capabilities,
            } => {
                let layout = subtype.layout();
                debug!(slot = ctx.slot, subtype = subtype.as_u8(), ?layout, "receiver linked");
                self.capabilities_pending = query_capabilities;
                self.led_pending = true;
                let personality = Personality::new(
                    layout.extension(),
                    layout.data_format(),
                    layout.gravity_unit(),
                );
                Reaction::activate(personality, self.next(ctx.slot).unwrap_or(poll))
            }
            ReceiverEvent::Refined(subtype) => {
                debug!(slot = ctx.slot, subtype = subtype.as_u8(), "receiver subtype refined");
                Reaction::arm(self.next(ctx.slot).unwrap_or(poll))
            }
            ReceiverEvent::Unlinked => {
                self.capabilities_pending = false;
                self.led_pending = false;
                Reaction {
                    change: Some(KindChange::Deactivated),
                    ..Reaction::arm(poll)
                }
            }
            ReceiverEvent::Input(input) => Reaction {
                record: Some(input.wpad_data()),
                ..Reaction::arm(self.next(ctx.slot).unwrap_or(poll))
            },
            ReceiverEvent::Ignored => Reaction::arm(self.next(ctx.slot).unwrap_or(poll)),
        };
        Ok(reaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwpad_hid_xinput_protocol::PAYLOAD_LEN;

    type TestResult = Result<(), DecodeError>;

    fn ctx(slot: usize) -> SlotContext {
        SlotContext {
            slot,
            poll_len: 128,
            motor: false,
        }
    }

    fn defaults(family: Family) -> Driver {
        Driver::new(family, &OutputConfig::default())
    }

    fn idle_guitar() -> [u8; guitar::REPORT_LEN] {
        let mut data = [0u8; guitar::REPORT_LEN];
        data[2] = 0x08;
        data[3..7].copy_from_slice(&[0x80; 4]);
        data
    }

    fn link(subtype: u8) -> [u8; 29] {
        let mut data = [0u8; 29];
        data[1] = 0x0F;
        data[5] = 0xCC;
        data[25] = subtype;
        data
    }

    fn gamepad_input() -> [u8; 4 + PAYLOAD_LEN] {
        let mut data = [0u8; 4 + PAYLOAD_LEN];
        data[1] = 0x01;
        data[5] = 0x13;
        data
    }

    const POLL: Transfer = Transfer::InterruptIn { length: 128 };

    #[test]
    fn test_fixed_families_activate_on_init() {
        for (family, extension) in [
            (Family::GhGuitar, Extension::Guitar),
            (Family::GhDrums, Extension::Drum),
            (Family::DjTurntable, Extension::Turntable),
        ] {
            let reaction = defaults(family).init(&ctx(0));
            let change = reaction.change.map(|c| match c {
                KindChange::Activated(p) => p.extension,
                KindChange::Deactivated => Extension::None,
            });
            assert_eq!(change, Some(extension), "{family}");
            assert_eq!(reaction.next, POLL);
        }
    }

    #[test]
    fn test_santroller_switches_mode_before_polling() -> TestResult {
        let mut driver = defaults(Family::Santroller);
        let init = driver.init(&ctx(0));
        assert_eq!(init.next, Transfer::control_in(santroller::MODE_SWITCH));

        let after = driver.complete(&ctx(0), &init.next, &[0; 17])?;
        assert_eq!(after.record, None);
        assert_eq!(after.next, POLL);
        Ok(())
    }

    #[test]
    fn test_taiko_init_writes_player_leds() {
        let reaction = defaults(Family::HoriTaiko).init(&ctx(2));
        assert_eq!(
            reaction.next,
            Transfer::control_out(leds::SETUP, leds::report(2))
        );
        assert_eq!(reaction.change, Some(KindChange::Activated(TAIKO)));
    }

    #[test]
    fn test_guitar_poll_publishes_record() -> TestResult {
        let mut driver = defaults(Family::GhGuitar);
        let reaction = driver.complete(&ctx(0), &POLL, &idle_guitar())?;
        let expected = guitar::parse(&idle_guitar())
            .map_err(ParseFailure::into_decode)?
            .wpad_data();
        assert_eq!(reaction.record, Some(expected));
        assert_eq!(reaction.next, POLL);
        Ok(())
    }

    #[test]
    fn test_short_report_is_a_decode_error() {
        let mut driver = defaults(Family::GhDrums);
        assert_eq!(
            driver.complete(&ctx(0), &POLL, &[0; 4]),
            Err(DecodeError::TooShort { got: 4, need: 23 })
        );
    }

    #[test]
    fn test_ds3_enables_reporting_then_writes_leds() -> TestResult {
        let mut driver = defaults(Family::DualShock3);
        let init = driver.init(&ctx(1));
        assert_eq!(init.next, Transfer::control_in(ds3::ENABLE_REPORTING));

        let leds = driver.complete(&ctx(1), &init.next, &[0; 17])?;
        let expected = ds3::output_report(ds3::led_mask(1), Rumble::from_motor(false));
        assert_eq!(leds.next, Transfer::control_out(ds3::OUTPUT_SETUP, expected));

        let poll = driver.complete(&ctx(1), &leds.next, &[])?;
        assert_eq!(poll.next, Transfer::InterruptIn { length: 49 });
        Ok(())
    }

    #[test]
    fn test_ds3_rumble_change_defers_one_poll() -> TestResult {
        let mut driver = defaults(Family::DualShock3);
        let init = driver.init(&ctx(0));
        let leds = driver.complete(&ctx(0), &init.next, &[0; 17])?;
        driver.complete(&ctx(0), &leds.next, &[])?;

        let rumbling = SlotContext {
            motor: true,
            ..ctx(0)
        };
        let poll = Transfer::InterruptIn { length: 49 };
        let report = [0u8; ds3::REPORT_LEN];
        let first = driver.complete(&rumbling, &poll, &report)?;
        let expected = ds3::output_report(ds3::led_mask(0), Rumble::from_motor(true));
        assert_eq!(first.next, Transfer::control_out(ds3::OUTPUT_SETUP, expected));
        assert!(first.record.is_some());

        let second = driver.complete(&rumbling, &first.next, &[])?;
        assert_eq!(second.next, poll);
        Ok(())
    }

    #[test]
    fn test_ds3_rumble_disabled_never_writes() -> TestResult {
        let config = OutputConfig {
            ds3: OutputToggles {
                leds: false,
                rumble: false,
            },
            ..OutputConfig::default()
        };
        let mut driver = Driver::new(Family::DualShock3, &config);
        let init = driver.init(&ctx(0));
        let rumbling = SlotContext {
            motor: true,
            ..ctx(0)
        };
        let after = driver.complete(&rumbling, &init.next, &[0; 17])?;
        assert_eq!(after.next, Transfer::InterruptIn { length: 49 });
        Ok(())
    }

    #[test]
    fn test_ds4_init_sends_lightbar() {
        let reaction = defaults(Family::DualShock4).init(&ctx(0));
        assert_eq!(
            reaction.next,
            Transfer::InterruptOut {
                data: ds4::output_report(ds4::lightbar(0), false).to_vec(),
            }
        );
    }

    #[test]
    fn test_receiver_is_provisional_until_linked() -> TestResult {
        let mut driver = defaults(Family::XboxReceiver);
        let init = driver.init(&ctx(0));
        assert_eq!(init.change, None);
        assert_eq!(init.next, POLL);
        assert_eq!(driver.personality(), None);

        let first = driver.complete(&ctx(0), &POLL, &[0x00, 0x00])?;
        assert_eq!(
            first.next,
            Transfer::InterruptOut {
                data: messages::DISCONNECT.to_vec(),
            }
        );
        let settled = driver.complete(&ctx(0), &first.next, &[])?;
        assert_eq!(settled.next, POLL);

        let ignored = driver.complete(&ctx(0), &POLL, &gamepad_input())?;
        assert_eq!(ignored.record, None);

        let linked = driver.complete(&ctx(0), &POLL, &link(0x01))?;
        assert_eq!(linked.change, Some(KindChange::Activated(GAMEPAD)));
        assert_eq!(
            linked.next,
            Transfer::InterruptOut {
                data: messages::player_led(0).to_vec(),
            }
        );
        assert_eq!(driver.personality(), Some(GAMEPAD));

        let led_done = driver.complete(&ctx(0), &linked.next, &[])?;
        assert_eq!(led_done.next, POLL);

        let input = driver.complete(&ctx(0), &POLL, &gamepad_input())?;
        assert!(input.record.is_some_and(|r| r.extension == Extension::Classic));
        Ok(())
    }

    #[test]
    fn test_receiver_unlink_deactivates() -> TestResult {
        let mut driver = defaults(Family::XboxReceiver);
        driver.init(&ctx(0));
        driver.complete(&ctx(0), &POLL, &[0x00, 0x00])?;
        driver.complete(&ctx(0), &POLL, &link(0x01))?;
        let unlinked = driver.complete(&ctx(0), &POLL, &[0x08, 0x00])?;
        assert_eq!(unlinked.change, Some(KindChange::Deactivated));
        assert_eq!(driver.personality(), None);
        Ok(())
    }

    #[test]
    fn test_schedule_prefers_leds_over_rumble() {
        let mut schedule = OutputSchedule::new(OutputToggles::default());
        schedule.request_leds();
        assert_eq!(schedule.take(true), Some(Output::Leds));
        assert_eq!(schedule.take(true), None);
        assert_eq!(schedule.take(false), Some(Output::Rumble));
        assert_eq!(schedule.take(false), None);
    }
}

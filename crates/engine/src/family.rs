//! Device families the bridge knows how to drive.
//!
//! [`Family::ALL`] is the registration order. Probing walks the enabled
//! families in the configured order and the first whose identity table
//! contains the device wins.

use openwpad_errors::DecodeError;
use openwpad_hid_common::UsbDeviceId;
use openwpad_hid_dualshock_protocol::{self as dualshock, ds3, ds4};
use openwpad_hid_hori_protocol::{self as hori, taiko};
use openwpad_hid_ps3_instrument_protocol::{self as ps3, drums, guitar, santroller, turntable};
use openwpad_hid_xinput_protocol::{self as xinput, Input, Packet, Subtype, packet};
use openwpad_wiimote::{EXT_RECORD_LEN, WpadData};
use serde::{Deserialize, Serialize};

/// A closed set of device families, one per decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "gh-guitar")]
    GhGuitar,
    #[serde(rename = "gh-drums")]
    GhDrums,
    #[serde(rename = "dj-turntable")]
    DjTurntable,
    #[serde(rename = "santroller")]
    Santroller,
    #[serde(rename = "taiko")]
    HoriTaiko,
    #[serde(rename = "ds3")]
    DualShock3,
    #[serde(rename = "ds4")]
    DualShock4,
    #[serde(rename = "xbox360-receiver")]
    XboxReceiver,
}

const GH_GUITAR_IDS: [UsbDeviceId; 1] = [UsbDeviceId::new(
    ps3::SONY_INSTRUMENT_VID,
    ps3::GH_GUITAR_PID,
)];
const GH_DRUMS_IDS: [UsbDeviceId; 1] =
    [UsbDeviceId::new(ps3::SONY_INSTRUMENT_VID, ps3::GH_DRUM_PID)];
const DJ_TURNTABLE_IDS: [UsbDeviceId; 1] = [UsbDeviceId::new(
    ps3::SONY_INSTRUMENT_VID,
    ps3::DJ_TURNTABLE_PID,
)];
const SANTROLLER_IDS: [UsbDeviceId; 1] =
    [UsbDeviceId::new(ps3::SANTROLLER_VID, ps3::SANTROLLER_PID)];
const TAIKO_IDS: [UsbDeviceId; 1] = [UsbDeviceId::new(hori::HORI_VID, hori::TAIKO_PID)];
const DS3_IDS: [UsbDeviceId; 1] = [UsbDeviceId::new(dualshock::SONY_VID, dualshock::DS3_PID)];
const DS4_IDS: [UsbDeviceId; 2] = [
    UsbDeviceId::new(dualshock::SONY_VID, dualshock::DS4_PID),
    UsbDeviceId::new(dualshock::SONY_VID, dualshock::DS4_V2_PID),
];
const RECEIVER_IDS: [UsbDeviceId; 3] = [
    UsbDeviceId::new(xinput::MICROSOFT_VID, xinput::RECEIVER_PIDS[0]),
    UsbDeviceId::new(xinput::MICROSOFT_VID, xinput::RECEIVER_PIDS[1]),
    UsbDeviceId::new(xinput::MICROSOFT_VID, xinput::RECEIVER_PIDS[2]),
];

impl Family {
    /// Registration order.
    pub const ALL: [Family; 8] = [
        Family::GhGuitar,
        Family::GhDrums,
        Family::DjTurntable,
        Family::Santroller,
        Family::HoriTaiko,
        Family::DualShock3,
        Family::DualShock4,
        Family::XboxReceiver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::GhGuitar => "gh-guitar",
            Family::GhDrums => "gh-drums",
            Family::DjTurntable => "dj-turntable",
            Family::Santroller => "santroller",
            Family::HoriTaiko => "taiko",
            Family::DualShock3 => "ds3",
            Family::DualShock4 => "ds4",
            Family::XboxReceiver => "xbox360-receiver",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Family::GhGuitar => "Guitar Hero guitar (PS3)",
            Family::GhDrums => "Guitar Hero drums (PS3)",
            Family::DjTurntable => "DJ Hero turntable (PS3)",
            Family::Santroller => "Santroller guitar",
            Family::HoriTaiko => "Hori Taiko drum (Switch)",
            Family::DualShock3 => "DualShock 3",
            Family::DualShock4 => "DualShock 4",
            Family::XboxReceiver => "Xbox 360 wireless receiver",
        }
    }

    /// Identity table of the family.
    pub fn ids(self) -> &'static [UsbDeviceId] {
        match self {
            Family::GhGuitar => &GH_GUITAR_IDS,
            Family::GhDrums => &GH_DRUMS_IDS,
            Family::DjTurntable => &DJ_TURNTABLE_IDS,
            Family::Santroller => &SANTROLLER_IDS,
            Family::HoriTaiko => &TAIKO_IDS,
            Family::DualShock3 => &DS3_IDS,
            Family::DualShock4 => &DS4_IDS,
            Family::XboxReceiver => &RECEIVER_IDS,
        }
    }

    pub fn matches(self, id: UsbDeviceId) -> bool {
        let UsbDeviceId {
            vendor_id,
            product_id,
        } = id;
        match self {
            Family::GhGuitar => ps3::is_gh_guitar(vendor_id, product_id),
            Family::GhDrums => ps3::is_gh_drums(vendor_id, product_id),
            Family::DjTurntable => ps3::is_turntable(vendor_id, product_id),
            Family::Santroller => ps3::is_santroller(vendor_id, product_id),
            Family::HoriTaiko => hori::is_taiko(vendor_id, product_id),
            Family::DualShock3 => dualshock::is_ds3(vendor_id, product_id),
            Family::DualShock4 => dualshock::is_ds4(vendor_id, product_id),
            Family::XboxReceiver => xinput::is_wireless_receiver(vendor_id, product_id),
        }
    }

    /// First family of `order` that claims `id`.
    pub fn probe(order: &[Family], id: UsbDeviceId) -> Option<Family> {
        order.iter().copied().find(|family| family.matches(id))
    }

    /// Decode one captured input report outside of a running session.
    ///
    /// Receiver captures are whole packets and decode with the gamepad
    /// layout, since the subtype of a live link is not known here.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TooShort`] for truncated reports, and
    /// [`DecodeError::UnexpectedPacket`] for receiver packets that carry
    /// no input.
    pub fn decode(self, data: &[u8]) -> Result<Decoded, DecodeError> {
        Ok(match self {
            Family::GhGuitar => {
                let report = guitar::parse(data).map_err(ParseFailure::into_decode)?;
                Decoded::new(&report, Some(report.extension_record().pack()), report.wpad_data())
            }
            Family::GhDrums => {
                let report = drums::parse(data).map_err(ParseFailure::into_decode)?;
                Decoded::new(&report, Some(report.extension_record().pack()), report.wpad_data())
            }
            Family::DjTurntable => {
                let report = turntable::parse(data).map_err(ParseFailure::into_decode)?;
                Decoded::new(&report, Some(report.extension_record().pack()), report.wpad_data())
            }
            Family::Santroller => {
                let report = santroller::parse(data).map_err(ParseFailure::into_decode)?;
                Decoded::new(&report, Some(report.extension_record().pack()), report.wpad_data())
            }
            Family::HoriTaiko => {
                let report = taiko::parse(data).map_err(ParseFailure::into_decode)?;
                Decoded::new(&report, None, report.wpad_data())
            }
            Family::DualShock3 => {
                let pad = ds3::parse(data).map_err(ParseFailure::into_decode)?.gamepad();
                Decoded::new(&pad, Some(pad.extension_record().pack()), pad.wpad_data())
            }
            Family::DualShock4 => {
                let report = ds4::parse(data).map_err(ParseFailure::into_decode)?;
                let pad = report.gamepad();
                Decoded::new(&report, Some(pad.extension_record().pack()), pad.wpad_data())
            }
            Family::XboxReceiver => {
                let payload = match packet::parse(data).map_err(ParseFailure::into_decode)? {
                    Packet::Input(payload) => payload,
                    _ => {
                        let (id, kind) = match data {
                            [id, kind, ..] => (*id, *kind),
                            _ => (0, 0),
                        };
                        return Err(DecodeError::UnexpectedPacket { id, kind });
                    }
                };
                let input = Input::decode(Subtype::Gamepad, payload)
                    .map_err(ParseFailure::into_decode)?;
                Decoded::new(&input, Some(input.extension_record().pack()), input.wpad_data())
            }
        })
    }
}

impl core::fmt::Display for Family {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown device family '{s}'"))
    }
}

/// Result of an offline decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    /// Debug rendering of the logical state.
    pub logical: String,
    /// The 6-byte extension record, for families that have one.
    pub extension_record: Option<[u8; EXT_RECORD_LEN]>,
    pub record: WpadData,
}

impl Decoded {
    fn new(
        logical: &impl core::fmt::Debug,
        extension_record: Option<[u8; EXT_RECORD_LEN]>,
        record: WpadData,
    ) -> Self {
        Self {
            logical: format!("{logical:?}"),
            extension_record,
            record,
        }
    }
}

/// The protocol crates each carry a `TooShort`-only parse error.
pub(crate) trait ParseFailure {
    fn into_decode(self) -> DecodeError;
}

macro_rules! parse_failure {
    ($($krate:ident),+) => {
        $(impl ParseFailure for $krate::ParseError {
            fn into_decode(self) -> DecodeError {
                match self {
                    $krate::ParseError::TooShort { got, need } => DecodeError::TooShort { got, need },
                }
            }
        })+
    };
}

parse_failure!(ps3, dualshock, hori, xinput);

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), DecodeError>;

    #[test]
    fn test_registration_order() {
        let names: Vec<&str> = Family::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "gh-guitar",
                "gh-drums",
                "dj-turntable",
                "santroller",
                "taiko",
                "ds3",
                "ds4",
                "xbox360-receiver"
            ]
        );
    }

    #[test]
    fn test_every_listed_id_matches_its_family() {
        for family in Family::ALL {
            for id in family.ids() {
                assert!(family.matches(*id), "{family} should claim {id}");
                assert_eq!(Family::probe(&Family::ALL, *id), Some(family));
            }
        }
    }

    #[test]
    fn test_probe_respects_enabled_order() {
        let ds4 = UsbDeviceId::new(0x054C, 0x09CC);
        assert_eq!(Family::probe(&Family::ALL, ds4), Some(Family::DualShock4));
        assert_eq!(Family::probe(&[Family::DualShock3], ds4), None);
        assert_eq!(Family::probe(&[], ds4), None);
        assert_eq!(
            Family::probe(&Family::ALL, UsbDeviceId::new(0x1234, 0x5678)),
            None
        );
    }

    #[test]
    fn test_names_round_trip_through_serde() -> Result<(), serde_json::Error> {
        for family in Family::ALL {
            let json = serde_json::to_string(&family)?;
            assert_eq!(json, format!("\"{}\"", family.name()));
            assert_eq!(serde_json::from_str::<Family>(&json)?, family);
            assert_eq!(family.name().parse::<Family>(), Ok(family));
        }
        assert!("wiimote".parse::<Family>().is_err());
        Ok(())
    }

    #[test]
    fn test_decode_short_report() {
        assert_eq!(
            Family::GhGuitar.decode(&[0u8; 4]),
            Err(DecodeError::TooShort { got: 4, need: 27 })
        );
        assert_eq!(
            Family::DualShock3.decode(&[0u8; 10]),
            Err(DecodeError::TooShort { got: 10, need: 49 })
        );
    }

    #[test]
    fn test_decode_idle_guitar() -> TestResult {
        let mut report = [0u8; 27];
        report[2] = 0x08;
        report[3..7].copy_from_slice(&[0x80; 4]);
        let decoded = Family::GhGuitar.decode(&report)?;
        assert!(decoded.extension_record.is_some());
        assert_eq!(decoded.record.extension, guitar::EXTENSION);
        Ok(())
    }

    #[test]
    fn test_receiver_decode_needs_input_packet() {
        assert_eq!(
            Family::XboxReceiver.decode(&[0x08, 0x00]),
            Err(DecodeError::UnexpectedPacket { id: 0x08, kind: 0x00 })
        );
    }

    #[test]
    fn test_receiver_decodes_gamepad_payload() -> TestResult {
        let mut data = [0u8; 4 + xinput::PAYLOAD_LEN];
        data[1] = 0x01;
        let decoded = Family::XboxReceiver.decode(&data)?;
        assert_eq!(
            decoded.record.extension,
            openwpad_wiimote::Extension::Classic
        );
        Ok(())
    }
}

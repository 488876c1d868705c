//! XInput device subtypes and the payload layout each one uses.

use openwpad_wiimote::{DataFormat, Extension, GravityUnit};
use serde::{Deserialize, Serialize};

/// Controller subtype as reported in a link packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subtype {
    Gamepad,
    Wheel,
    ArcadeStick,
    FlightStick,
    DancePad,
    /// Rock Band guitar.
    Guitar,
    /// Guitar Hero guitar.
    GuitarAlternate,
    Drums,
    StageKit,
    GuitarBass,
    ProKeys,
    ArcadePad,
    Turntable,
    ProGuitar,
    /// Guitar Hero World Tour guitar, told apart from
    /// [`Subtype::GuitarAlternate`] by its capabilities.
    GuitarWorldTour,
    Other(u8),
}

impl Subtype {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Gamepad,
            2 => Self::Wheel,
            3 => Self::ArcadeStick,
            4 => Self::FlightStick,
            5 => Self::DancePad,
            6 => Self::Guitar,
            7 => Self::GuitarAlternate,
            8 => Self::Drums,
            9 => Self::StageKit,
            11 => Self::GuitarBass,
            15 => Self::ProKeys,
            19 => Self::ArcadePad,
            23 => Self::Turntable,
            25 => Self::ProGuitar,
            26 => Self::GuitarWorldTour,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Gamepad => 1,
            Self::Wheel => 2,
            Self::ArcadeStick => 3,
            Self::FlightStick => 4,
            Self::DancePad => 5,
            Self::Guitar => 6,
            Self::GuitarAlternate => 7,
            Self::Drums => 8,
            Self::StageKit => 9,
            Self::GuitarBass => 11,
            Self::ProKeys => 15,
            Self::ArcadePad => 19,
            Self::Turntable => 23,
            Self::ProGuitar => 25,
            Self::GuitarWorldTour => 26,
            Self::Other(raw) => raw,
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            Self::GuitarAlternate | Self::GuitarWorldTour => Layout::GuitarHeroGuitar,
            Self::Guitar | Self::GuitarBass => Layout::RockBandGuitar,
            Self::Drums => Layout::Drums,
            Self::Turntable => Layout::Turntable,
            _ => Layout::Gamepad,
        }
    }

    pub fn extension(self) -> Extension {
        self.layout().extension()
    }

    pub fn data_format(self) -> DataFormat {
        self.layout().data_format()
    }
}

/// Payload layout families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    Gamepad,
    GuitarHeroGuitar,
    RockBandGuitar,
    Drums,
    Turntable,
}

impl Layout {
    pub fn extension(self) -> Extension {
        match self {
            Self::Gamepad => Extension::Classic,
            Self::GuitarHeroGuitar | Self::RockBandGuitar => Extension::Guitar,
            Self::Drums => Extension::Drum,
            Self::Turntable => Extension::Turntable,
        }
    }

    pub fn data_format(self) -> DataFormat {
        match self {
            Self::Gamepad => DataFormat::Classic,
            Self::GuitarHeroGuitar | Self::RockBandGuitar => DataFormat::Guitar,
            Self::Drums => DataFormat::Drum,
            Self::Turntable => DataFormat::Turntable,
        }
    }

    pub fn gravity_unit(self) -> GravityUnit {
        match self {
            Self::Drums => GravityUnit::ZERO,
            _ => GravityUnit::ONE_G,
        }
    }
}

//! IR camera geometry.
//!
//! The camera reports up to four dots in a 1024x768 grid. A sensor bar
//! shows up as two dots on the same row, one either side of the pointer.

use serde::{Deserialize, Serialize};

pub const IR_MAX_DOTS: usize = 4;

pub const IR_LOW_X: u16 = 0x7F;
pub const IR_LOW_Y: u16 = 0x5D;
pub const IR_HIGH_X: u16 = 0x380;
pub const IR_HIGH_Y: u16 = 0x2A2;
pub const IR_CENTER_X: u16 = (IR_HIGH_X + IR_LOW_X) >> 1;
pub const IR_CENTER_Y: u16 = (IR_HIGH_Y + IR_LOW_Y) >> 1;

/// Half the distance between the two sensor bar dots.
pub const IR_HORIZONTAL_OFFSET: u16 = 64;
pub const IR_VERTICAL_OFFSET: u16 = 110;
pub const IR_DOT_SIZE: u16 = 4;

/// Range the pointer may travel while keeping both dots on the sensor.
pub const IR_DOT_CENTER_MIN_X: u16 = IR_LOW_X + IR_HORIZONTAL_OFFSET;
pub const IR_DOT_CENTER_MAX_X: u16 = IR_HIGH_X - IR_HORIZONTAL_OFFSET;
pub const IR_DOT_CENTER_MIN_Y: u16 = IR_LOW_Y + IR_VERTICAL_OFFSET;
pub const IR_DOT_CENTER_MAX_Y: u16 = IR_HIGH_Y - IR_VERTICAL_OFFSET;

/// Row value of a dot the camera does not see.
pub const IR_OFF_SCREEN_Y: i16 = 1023;

/// One IR dot as stored in the host record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrDot {
    pub x: i16,
    pub y: i16,
    pub size: u16,
    pub id: u8,
}

impl IrDot {
    pub const OFF_SCREEN: Self = Self {
        x: 0,
        y: IR_OFF_SCREEN_Y,
        size: 0,
        id: 0,
    };

    pub fn is_visible(&self) -> bool {
        self.y != IR_OFF_SCREEN_Y
    }

    /// All four dots hidden.
    pub const fn all_off_screen() -> [IrDot; IR_MAX_DOTS] {
        [Self::OFF_SCREEN; IR_MAX_DOTS]
    }

    /// Two sensor bar dots around a pointer position, the rest hidden.
    ///
    /// The position is clamped to the travel range first.
    pub fn sensor_bar(x: u16, y: u16) -> [IrDot; IR_MAX_DOTS] {
        let x = x.clamp(IR_DOT_CENTER_MIN_X, IR_DOT_CENTER_MAX_X);
        let y = y.clamp(IR_DOT_CENTER_MIN_Y, IR_DOT_CENTER_MAX_Y);
        let row = i16::try_from(y).unwrap_or(IR_OFF_SCREEN_Y);
        let dot = |x: u16, id: u8| IrDot {
            x: i16::try_from(x).unwrap_or(0),
            y: row,
            size: IR_DOT_SIZE,
            id,
        };
        let mut dots = Self::all_off_screen();
        dots[0] = dot(x - IR_HORIZONTAL_OFFSET, 0);
        dots[1] = dot(x + IR_HORIZONTAL_OFFSET, 1);
        dots
    }
}

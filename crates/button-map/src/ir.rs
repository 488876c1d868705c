//! IR pointer emulation.
//!
//! Devices without a camera can still steer the pointer. `Direct` places
//! dots from absolute coordinates a device reports; the analog modes move
//! a virtual sensor bar with two of the device's axes.

use openwpad_wiimote::IrDot;
use openwpad_wiimote::ir::{
    IR_CENTER_X, IR_CENTER_Y, IR_DOT_CENTER_MAX_X, IR_DOT_CENTER_MAX_Y, IR_DOT_CENTER_MIN_X,
    IR_DOT_CENTER_MIN_Y, IR_DOT_SIZE, IR_HIGH_X, IR_HIGH_Y, IR_LOW_X, IR_LOW_Y, IR_MAX_DOTS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrEmulationMode {
    #[default]
    None,
    Direct,
    RelativeAnalogAxis,
    AbsoluteAnalogAxis,
}

/// Pointer axis a source axis drives. Tables use the `u8` value, 0 meaning
/// unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum IrAxis {
    None = 0,
    X = 1,
    Y = 2,
}

/// Axis deflection from centre divided by this is the per-poll step.
const RELATIVE_STEP_DIVISOR: i32 = 8;

/// Pointer position carried between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrEmulationState {
    position: [u16; 2],
}

impl Default for IrEmulationState {
    fn default() -> Self {
        Self {
            position: [IR_CENTER_X, IR_CENTER_Y],
        }
    }
}

impl IrEmulationState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn position(&self) -> (u16, u16) {
        (self.position[0], self.position[1])
    }
}

fn scale(value: u32, max: u32, low: u16, high: u16) -> u16 {
    if max == 0 {
        return low;
    }
    let span = u32::from(high - low);
    let scaled = value.min(max) * span / max;
    low.saturating_add(u16::try_from(scaled).unwrap_or(u16::MAX))
}

/// One dot per coordinate, scaled from `0..=max` into the camera range.
/// Coordinates past the fourth are dropped; missing dots are off screen.
pub fn map_ir_direct(coords: &[(u16, u16)], max_x: u16, max_y: u16) -> [IrDot; IR_MAX_DOTS] {
    let mut dots = IrDot::all_off_screen();
    for ((dot, &(x, y)), id) in dots.iter_mut().zip(coords).zip(0u8..) {
        let x = scale(u32::from(x), u32::from(max_x), IR_LOW_X, IR_HIGH_X);
        let y = scale(u32::from(y), u32::from(max_y), IR_LOW_Y, IR_HIGH_Y);
        *dot = IrDot {
            x: i16::try_from(x).unwrap_or(i16::MAX),
            y: i16::try_from(y).unwrap_or(i16::MAX),
            size: IR_DOT_SIZE,
            id,
        };
    }
    dots
}

/// Move or place the sensor bar with the axes `axis_table` routes to
/// [`IrAxis::X`] and [`IrAxis::Y`], then report its two dots.
pub fn map_ir_analog_axis(
    mode: IrEmulationMode,
    state: &mut IrEmulationState,
    axes: &[u8],
    axis_table: &[u8],
) -> [IrDot; IR_MAX_DOTS] {
    let bounds = [
        (IR_DOT_CENTER_MIN_X, IR_DOT_CENTER_MAX_X),
        (IR_DOT_CENTER_MIN_Y, IR_DOT_CENTER_MAX_Y),
    ];
    for (&value, &target) in axes.iter().zip(axis_table) {
        let index = match target {
            t if t == IrAxis::X as u8 => 0,
            t if t == IrAxis::Y as u8 => 1,
            _ => continue,
        };
        let (Some(pos), Some(&(min, max))) = (state.position.get_mut(index), bounds.get(index))
        else {
            continue;
        };
        match mode {
            IrEmulationMode::RelativeAnalogAxis => {
                let step = (i32::from(value) - 0x80) / RELATIVE_STEP_DIVISOR;
                let moved = (i32::from(*pos) + step).clamp(i32::from(min), i32::from(max));
                *pos = u16::try_from(moved).unwrap_or(min);
            }
            IrEmulationMode::AbsoluteAnalogAxis => {
                *pos = scale(u32::from(value), u32::from(u8::MAX), min, max);
            }
            IrEmulationMode::None | IrEmulationMode::Direct => {}
        }
    }
    match mode {
        IrEmulationMode::RelativeAnalogAxis | IrEmulationMode::AbsoluteAnalogAxis => {
            let (x, y) = state.position();
            IrDot::sensor_bar(x, y)
        }
        IrEmulationMode::None | IrEmulationMode::Direct => IrDot::all_off_screen(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XY: [u8; 2] = [IrAxis::X as u8, IrAxis::Y as u8];

    #[test]
    fn test_state_starts_centred() {
        let state = IrEmulationState::default();
        assert_eq!(state.position(), (IR_CENTER_X, IR_CENTER_Y));
    }

    #[test]
    fn test_none_mode_hides_dots() {
        let mut state = IrEmulationState::default();
        let dots = map_ir_analog_axis(IrEmulationMode::None, &mut state, &[0xFF, 0xFF], &XY);
        assert!(dots.iter().all(|d| !d.is_visible()));
    }

    #[test]
    fn test_relative_moves_and_clamps() {
        let mut state = IrEmulationState::default();
        map_ir_analog_axis(IrEmulationMode::RelativeAnalogAxis, &mut state, &[0xFF, 0x80], &XY);
        assert_eq!(state.position(), (IR_CENTER_X + 15, IR_CENTER_Y));
        for _ in 0..200 {
            map_ir_analog_axis(IrEmulationMode::RelativeAnalogAxis, &mut state, &[0x00, 0x80], &XY);
        }
        assert_eq!(state.position().0, IR_DOT_CENTER_MIN_X);
    }

    #[test]
    fn test_absolute_spans_travel() {
        let mut state = IrEmulationState::default();
        let dots = map_ir_analog_axis(IrEmulationMode::AbsoluteAnalogAxis, &mut state, &[0, 0xFF], &XY);
        assert_eq!(state.position(), (IR_DOT_CENTER_MIN_X, IR_DOT_CENTER_MAX_Y));
        assert!(dots[0].is_visible());
        assert!(dots[1].is_visible());
        assert!(!dots[2].is_visible());
    }

    #[test]
    fn test_direct_scales_into_camera_range() {
        let dots = map_ir_direct(&[(0, 0), (1000, 500)], 1000, 1000);
        assert_eq!(dots[0].x, 0x7F);
        assert_eq!(dots[0].y, 0x5D);
        assert_eq!(dots[1].x, 0x380);
        assert_eq!(dots[1].id, 1);
        assert!(!dots[2].is_visible());
    }
}

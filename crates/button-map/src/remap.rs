//! Generic table-driven remapping.

use std::ops::BitOr;

use openwpad_hid_common::ButtonSet;
use openwpad_wiimote::buttons::wiimote_to_wpad;

/// OR together `table[i]` for every held logical index `i`.
///
/// Indices beyond the table contribute nothing.
pub fn map_buttons<T>(source: ButtonSet, table: &[T]) -> T
where
    T: Copy + Default + BitOr<Output = T>,
{
    table
        .iter()
        .enumerate()
        .filter(|(i, _)| u8::try_from(*i).is_ok_and(|i| source.contains_index(i)))
        .fold(T::default(), |acc, (_, &mask)| acc | mask)
}

/// Core buttons in host layout from a table written in Wii Remote report
/// bits.
pub fn map_wiimote(source: ButtonSet, table: &[u16]) -> u16 {
    wiimote_to_wpad(map_buttons(source, table))
}

/// Route source axes into `N` target slots.
///
/// `table[i]` names the 1-based target slot for `source[i]`; 0 and slots
/// past `N` are ignored. Unrouted slots keep their `defaults` value. When
/// two sources name the same slot the later one wins.
pub fn map_axes<const N: usize>(source: &[u8], table: &[u8], defaults: [u8; N]) -> [u8; N] {
    let mut out = defaults;
    for (&value, &target) in source.iter().zip(table) {
        let Some(slot) = usize::from(target)
            .checked_sub(1)
            .and_then(|i| out.get_mut(i))
        else {
            continue;
        };
        *slot = value;
    }
    out
}

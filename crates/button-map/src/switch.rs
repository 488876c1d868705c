//! Button-combo latch.

use openwpad_hid_common::ButtonSet;

/// Fires once when every button of a combo becomes held.
///
/// Holding the combo does not fire again; releasing any of its buttons
/// re-arms it. An empty combo never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchMapping {
    combo: ButtonSet,
    held: bool,
}

impl SwitchMapping {
    pub const fn new(combo: ButtonSet) -> Self {
        Self { combo, held: false }
    }

    pub fn combo(&self) -> ButtonSet {
        self.combo
    }

    /// Feed the buttons of one poll; true on the poll the combo completes.
    pub fn update(&mut self, buttons: ButtonSet) -> bool {
        let pressed = !self.combo.is_empty() && buttons.contains_all(self.combo);
        let fired = pressed && !self.held;
        self.held = pressed;
        fired
    }

    pub fn reset(&mut self) {
        self.held = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMBO: ButtonSet = ButtonSet::from_bits(0b0110);

    #[test]
    fn test_rising_edge_only() {
        let mut latch = SwitchMapping::new(COMBO);
        assert!(!latch.update(ButtonSet::from_bits(0b0010)));
        assert!(latch.update(ButtonSet::from_bits(0b0110)));
        assert!(!latch.update(ButtonSet::from_bits(0b0111)));
        assert!(!latch.update(ButtonSet::from_bits(0b0100)));
        assert!(latch.update(ButtonSet::from_bits(0b0110)));
    }

    #[test]
    fn test_empty_combo_never_fires() {
        let mut latch = SwitchMapping::new(ButtonSet::EMPTY);
        assert!(!latch.update(ButtonSet::EMPTY));
        assert!(!latch.update(ButtonSet::from_bits(u32::MAX)));
    }

    #[test]
    fn test_reset_rearms() {
        let mut latch = SwitchMapping::new(COMBO);
        assert!(latch.update(COMBO));
        latch.reset();
        assert!(latch.update(COMBO));
    }
}

//! Logical button sets.
//!
//! A family decoder reports held buttons as a bit-set indexed by its own
//! logical button enum. The index order is the family's, not the target
//! record's; the mapping engine translates between the two.

use serde::{Deserialize, Serialize};

/// Maximum number of logical buttons a family may declare.
pub const MAX_LOGICAL_BUTTONS: u8 = 32;

/// A family-specific logical button.
pub trait LogicalButton: Copy {
    /// Bit index of this button in a [`ButtonSet`].
    fn index(self) -> u8;
}

/// Set of currently held logical buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonSet(u32);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn set<B: LogicalButton>(&mut self, button: B, held: bool) {
        let mask = Self::mask(button.index());
        if held {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub fn insert<B: LogicalButton>(&mut self, button: B) {
        self.set(button, true);
    }

    #[must_use]
    pub fn with<B: LogicalButton>(mut self, button: B) -> Self {
        self.insert(button);
        self
    }

    pub fn contains<B: LogicalButton>(self, button: B) -> bool {
        self.0 & Self::mask(button.index()) != 0
    }

    pub fn contains_index(self, index: u8) -> bool {
        self.0 & Self::mask(index) != 0
    }

    /// True when every button of `other` is held.
    pub fn contains_all(self, other: ButtonSet) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn union(self, other: ButtonSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of held buttons, lowest first.
    pub fn indices(self) -> impl Iterator<Item = u8> {
        (0..MAX_LOGICAL_BUTTONS).filter(move |&i| self.contains_index(i))
    }

    fn mask(index: u8) -> u32 {
        1u32.checked_shl(u32::from(index)).unwrap_or(0)
    }
}

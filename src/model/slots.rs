use crate::error::SolverError;
use std::fmt;
use std::str::FromStr;

/// Number of letters in the time slot alphabet (`A` to `Z`).
pub const SLOT_ALPHABET: usize = 26;

/// A set of time slots, stored as one bit per letter.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Slots(u32);

impl Slots {
    /// Every slot of the alphabet, used for students who did not declare
    /// their availability.
    pub const ALL: Slots = Slots((1 << SLOT_ALPHABET) - 1);

    pub fn empty() -> Self {
        Slots(0)
    }

    pub fn insert(&mut self, slot: char) -> Result<(), SolverError> {
        let upper = slot.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(SolverError::InvalidSlot(slot));
        }
        self.0 |= 1 << (upper as u32 - 'A' as u32);
        Ok(())
    }

    pub fn contains(self, slot: char) -> bool {
        let upper = slot.to_ascii_uppercase();
        upper.is_ascii_uppercase() && self.0 & (1 << (upper as u32 - 'A' as u32)) != 0
    }

    #[must_use]
    pub fn intersection(self, other: Slots) -> Slots {
        Slots(self.0 & other.0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[allow(dead_code)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = char> {
        ('A'..='Z').filter(move |&c| self.contains(c))
    }
}

impl FromStr for Slots {
    type Err = SolverError;

    /// Parse `"A;B;C"`, `"A,B"`, `"ABC"` or `"a b"`. Separators and
    /// whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut slots = Slots::empty();
        for c in s
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, ';' | ',' | '|' | '/'))
        {
            slots.insert(c)?;
        }
        Ok(slots)
    }
}

impl fmt::Display for Slots {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

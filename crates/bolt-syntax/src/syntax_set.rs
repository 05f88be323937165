use crate::SyntaxKind;

const SIZE: usize = 1;

/// Bitset over `SyntaxKind`, usable in `const` contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet {
    bits: [u64; SIZE],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn slot_and_mask(kind: SyntaxKind) -> (usize, u64) {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;

        debug_assert!(
            slot_index < SIZE,
            "Index out of bounds. Increase the size of the bitset array."
        );

        (slot_index, 1 << (kind % Self::BITS_PER_SLOT))
    }

    pub const fn with(mut self, kind: SyntaxKind) -> Self {
        let (slot, mask) = Self::slot_and_mask(kind);
        self.bits[slot] |= mask;
        self
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.with(kinds[i]);
            i += 1;
        }

        set
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let (slot, mask) = Self::slot_and_mask(kind);
        self.bits[slot] & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn contains_only_inserted_kinds() {
        const SET: SyntaxSet = SyntaxSet::new([LEFT_BRACE, TOMBSTONE]);

        assert!(SET.contains(LEFT_BRACE));
        assert!(SET.contains(TOMBSTONE));
        assert!(!SET.contains(RIGHT_BRACE));
        assert!(!SyntaxSet::EMPTY.contains(LEFT_BRACE));
        assert_eq!(SyntaxSet::EMPTY.with(TOMBSTONE).with(LEFT_BRACE), SET);
    }
}

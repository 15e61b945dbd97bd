//! A bit vector for set operations over dense indices.
//!
//! Used wherever the SSA builder tracks sets of blocks or variables: the IDF
//! worklist's membership set, per-block use/def/live sets in liveness, and
//! the "has a phi for this variable" marks of the phi inserter.
//!
//! # Example
//!
//! ```rust,ignore
//! use jitssa::utils::BitSet;
//!
//! let mut set = BitSet::new(100);
//! assert!(set.insert(50));
//! assert!(!set.insert(50));
//! assert!(set.contains(50));
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![50]);
//! ```

/// A fixed-capacity bit vector.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    /// The bits, stored 64 per word.
    words: Vec<u64>,
    /// The number of addressable bits.
    len: usize,
}

impl BitSet {
    /// Creates a new empty bit set able to hold indices `0..capacity`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            len: capacity,
        }
    }

    /// Returns the capacity of this bit set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Sets the bit at `index`, returning `true` if it was not set before.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.len, "index out of bounds");
        let mask = 1u64 << (index % 64);
        let word = &mut self.words[index / 64];
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }

    /// Clears the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn remove(&mut self, index: usize) {
        assert!(index < self.len, "index out of bounds");
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Returns `true` if the bit at `index` is set. Out-of-range indices are never set.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Returns the number of bits set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Clears all bits.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Computes the union with another bit set in place, returning `true` if `self` changed.
    pub fn union_with(&mut self, other: &Self) -> bool {
        assert_eq!(self.len, other.len, "bit sets must have same length");
        let mut changed = false;
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            let old = *a;
            *a |= *b;
            changed |= old != *a;
        }
        changed
    }

    /// Removes every bit set in `other` from `self`, returning `true` if `self` changed.
    pub fn difference_with(&mut self, other: &Self) -> bool {
        assert_eq!(self.len, other.len, "bit sets must have same length");
        let mut changed = false;
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            let old = *a;
            *a &= !*b;
            changed |= old != *a;
        }
        changed
    }

    /// Returns an iterator over the indices of set bits in ascending order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over the set bits of a [`BitSet`].
pub struct BitSetIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    /// Remaining (not yet yielded) bits of the current word
    current: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_idx * 64 + bit);
            }
            self.word_idx += 1;
            self.current = *self.words.get(self.word_idx)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitset_basic() {
        let mut bs = BitSet::new(100);
        assert!(bs.is_empty());

        assert!(bs.insert(0));
        assert!(bs.insert(64));
        assert!(bs.insert(99));
        assert!(!bs.insert(64));

        assert_eq!(bs.count(), 3);
        assert!(bs.contains(64));
        assert!(!bs.contains(63));
        assert!(!bs.contains(1000));

        bs.remove(64);
        assert!(!bs.contains(64));
        assert_eq!(bs.iter().collect::<Vec<_>>(), vec![0, 99]);

        bs.clear();
        assert!(bs.is_empty());
    }

    #[test]
    fn test_bitset_set_operations() {
        let mut a = BitSet::new(130);
        let mut b = BitSet::new(130);
        a.insert(1);
        a.insert(128);
        b.insert(128);
        b.insert(129);

        let mut union = a.clone();
        assert!(union.union_with(&b));
        assert!(!union.union_with(&b));
        assert_eq!(union.iter().collect::<Vec<_>>(), vec![1, 128, 129]);

        assert!(a.difference_with(&b));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_bitset_empty_capacity() {
        let bs = BitSet::new(0);
        assert!(bs.is_empty());
        assert_eq!(bs.iter().count(), 0);
        assert_eq!(format!("{bs:?}"), "{}");
    }
}

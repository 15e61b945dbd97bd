//! Typed index arena.
//!
//! Phi nodes and other per-compilation objects are allocated into an [`Arena`] and
//! referenced through [`Id`]s, which are plain `u32` indices tagged with the item
//! type. Nothing is freed individually: the arena is cleared or dropped as a whole
//! when the compilation (or an SSA rebuild) starts over.
//!
//! Allocation is fallible. The arena grows with [`Vec::try_reserve`], so an
//! allocator refusal surfaces as [`Error::OutOfMemory`](crate::Error::OutOfMemory)
//! instead of aborting the process.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use crate::{Error, Result};

/// A type-safe identifier for arena-allocated items.
///
/// The type parameter keeps ids of different arenas apart. The trait impls are
/// written by hand so `Id<T>` is `Copy`/`Eq`/`Hash` whatever `T` is.
pub struct Id<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Id<T> {
    /// Creates an id from a raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Id {
            index,
            _marker: PhantomData,
        }
    }

    /// Returns the index as `usize`.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.index as usize
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// An append-only arena of homogeneous items.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Arena { items: Vec::new() }
    }

    /// Allocates `item` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the backing storage cannot grow or the index
    /// space of `u32` is exhausted.
    pub fn try_alloc(&mut self, item: T) -> Result<Id<T>> {
        let index = u32::try_from(self.items.len()).map_err(|_| Error::OutOfMemory {
            requested: 1,
            budget: 0,
        })?;
        self.items.try_reserve(1)?;
        self.items.push(item);
        Ok(Id::new(index))
    }

    /// Returns the item behind `id`, if it was allocated by this arena.
    #[must_use]
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.as_usize())
    }

    /// Returns the item behind `id` mutably, if it was allocated by this arena.
    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        self.items.get_mut(id.as_usize())
    }

    /// Returns the number of allocated items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over all items with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Id::new(i as u32), item))
    }

    /// Releases every item at once.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Id<T>> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: Id<T>) -> &Self::Output {
        &self.items[id.as_usize()]
    }
}

impl<T> IndexMut<Id<T>> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: Id<T>) -> &mut Self::Output {
        &mut self.items[id.as_usize()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_alloc_and_index() {
        let mut arena: Arena<&str> = Arena::new();
        let a = arena.try_alloc("a").unwrap();
        let b = arena.try_alloc("b").unwrap();

        assert_ne!(a, b);
        assert_eq!(arena[a], "a");
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);

        arena[b] = "bb";
        assert_eq!(arena[b], "bb");
        assert_eq!(
            arena.iter().map(|(_, v)| *v).collect::<Vec<_>>(),
            vec!["a", "bb"]
        );
    }

    #[test]
    fn test_arena_clear() {
        let mut arena: Arena<u32> = Arena::new();
        let id = arena.try_alloc(7).unwrap();
        arena.clear();

        assert!(arena.is_empty());
        assert_eq!(arena.get(id), None);
        // Ids restart from zero after a clear
        assert_eq!(arena.try_alloc(8).unwrap(), id);
    }

    #[test]
    fn test_id_formatting() {
        let id: Id<()> = Id::new(3);
        assert_eq!(format!("{id}"), "#3");
        assert_eq!(format!("{id:?}"), "#3");
    }
}

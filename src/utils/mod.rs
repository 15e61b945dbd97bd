//! Shared infrastructure: bit sets, the typed arena and the graph substrate.

mod arena;
mod bitset;

pub mod graph;

pub use arena::{Arena, Id};
pub use bitset::{BitSet, BitSetIter};

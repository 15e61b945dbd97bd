//! Edge identifiers for directed graphs.

use std::fmt;

/// A strongly-typed identifier for edges within a directed graph.
///
/// Edge IDs are handed out sequentially by
/// [`DirectedGraph::add_edge`](crate::utils::graph::DirectedGraph::add_edge). Parallel
/// edges between the same pair of nodes receive distinct ids, which matters for
/// phi nodes: a block reached twice from the same switch gets one argument slot per edge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    /// Creates a new `EdgeId` from a raw index value.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        EdgeId(index)
    }

    /// Returns the raw, 0-based index of this edge.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id_roundtrip() {
        let edge = EdgeId::new(7);
        assert_eq!(edge.index(), 7);
        assert_eq!(format!("{edge}"), "e7");
        assert_eq!(format!("{edge:?}"), "EdgeId(7)");
    }
}

//! Exception regions.
//!
//! A region pairs a protected range of blocks (the *try*) with a handler. Any
//! instruction inside the try may transfer control to the handler, so every value
//! live at such a point can reach the handler without passing through an ordinary
//! edge. For filter regions control first reaches the filter, which then decides
//! whether the handler runs; the filter entry is the region's exceptional-flow
//! target.
//!
//! Regions nest. Each protected block records only its innermost region; the
//! [`enclosing`](ExceptionRegion::enclosing) links form the chain outwards.

use std::fmt;

use strum::{Display, EnumIter};

use crate::analysis::cfg::BlockId;

/// A dense identifier of an exception region within one flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(usize);

impl RegionId {
    /// Creates a region id from its index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        RegionId(index)
    }

    /// Returns the index of this region.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EH#{}", self.0)
    }
}

/// The kind of handler attached to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RegionKind {
    /// A typed catch clause.
    Catch,
    /// A catch clause guarded by a filter block.
    Filter,
    /// A finally clause.
    Finally,
    /// A fault clause (finally that only runs on exceptions).
    Fault,
}

/// A protected range and its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRegion {
    kind: RegionKind,
    try_entry: BlockId,
    handler_entry: BlockId,
    filter_entry: Option<BlockId>,
    enclosing: Option<RegionId>,
}

impl ExceptionRegion {
    /// Creates a region without filter or enclosing region.
    ///
    /// # Arguments
    ///
    /// * `kind` - The handler kind
    /// * `try_entry` - First block of the protected range
    /// * `handler_entry` - First block of the handler
    #[must_use]
    pub const fn new(kind: RegionKind, try_entry: BlockId, handler_entry: BlockId) -> Self {
        ExceptionRegion {
            kind,
            try_entry,
            handler_entry,
            filter_entry: None,
            enclosing: None,
        }
    }

    /// Creates a filter region; exceptions reach `filter_entry` before the handler.
    #[must_use]
    pub const fn filtered(
        try_entry: BlockId,
        filter_entry: BlockId,
        handler_entry: BlockId,
    ) -> Self {
        ExceptionRegion {
            kind: RegionKind::Filter,
            try_entry,
            handler_entry,
            filter_entry: Some(filter_entry),
            enclosing: None,
        }
    }

    /// Nests this region inside `outer`.
    #[must_use]
    pub const fn within(mut self, outer: RegionId) -> Self {
        self.enclosing = Some(outer);
        self
    }

    /// Returns the handler kind.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Returns the first block of the protected range.
    #[must_use]
    pub const fn try_entry(&self) -> BlockId {
        self.try_entry
    }

    /// Returns the first block of the handler.
    #[must_use]
    pub const fn handler_entry(&self) -> BlockId {
        self.handler_entry
    }

    /// Returns the filter block, for filter regions.
    #[must_use]
    pub const fn filter_entry(&self) -> Option<BlockId> {
        self.filter_entry
    }

    /// Returns the next region outwards, if any.
    #[must_use]
    pub const fn enclosing(&self) -> Option<RegionId> {
        self.enclosing
    }

    /// Returns the block an exception raised in the try reaches first: the filter
    /// entry for filter regions, the handler entry otherwise.
    #[must_use]
    pub const fn flow_target(&self) -> BlockId {
        match self.filter_entry {
            Some(filter) => filter,
            None => self.handler_entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_target() {
        let catch = ExceptionRegion::new(RegionKind::Catch, BlockId::new(1), BlockId::new(3));
        assert_eq!(catch.flow_target(), BlockId::new(3));
        assert_eq!(catch.filter_entry(), None);

        let filter = ExceptionRegion::filtered(BlockId::new(1), BlockId::new(4), BlockId::new(5));
        assert_eq!(filter.kind(), RegionKind::Filter);
        assert_eq!(filter.flow_target(), BlockId::new(4));
        assert_eq!(filter.handler_entry(), BlockId::new(5));
    }

    #[test]
    fn test_nesting() {
        let inner = ExceptionRegion::new(RegionKind::Fault, BlockId::new(2), BlockId::new(6))
            .within(RegionId::new(0));
        assert_eq!(inner.enclosing(), Some(RegionId::new(0)));
        assert_eq!(RegionId::new(0).to_string(), "EH#0");
    }
}

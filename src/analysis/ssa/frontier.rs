//! Dominance frontiers and their iterated closure.
//!
//! The frontier of a block `B` is where `B`'s dominance ends: the blocks `W`
//! such that `B` dominates a predecessor of `W` but does not strictly dominate `W`.
//! A definition made in `B` competes with other definitions exactly there. Since a
//! phi is itself a definition, the blocks needing a phi for a variable are the
//! *iterated* dominance frontier (IDF) of its defining blocks: the smallest set
//! that contains the frontier of every defining block and the frontier of every
//! block already in the set.
//!
//! Frontiers are computed once per build over the exceptional-flow view and then
//! shared by every variable.

use log::trace;

use crate::{
    analysis::cfg::BlockId,
    utils::{
        graph::{algorithms::compute_dominance_frontiers, algorithms::DominatorTree, Predecessors},
        BitSet,
    },
};

/// The dominance frontier of every block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominanceFrontiers {
    frontiers: Vec<Vec<BlockId>>,
}

impl DominanceFrontiers {
    /// Computes the frontiers of `graph` under `dom`.
    ///
    /// `dom` must have been computed over the same graph, so that every block with a
    /// reachable predecessor is itself reachable.
    #[must_use]
    pub fn compute<G: Predecessors>(graph: &G, dom: &DominatorTree) -> Self {
        DominanceFrontiers {
            frontiers: compute_dominance_frontiers(graph, dom),
        }
    }

    /// Returns the frontier of `block`; empty for unreachable or unknown blocks.
    #[must_use]
    pub fn frontier(&self, block: BlockId) -> &[BlockId] {
        self.frontiers
            .get(block.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the number of blocks covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frontiers.len()
    }

    /// Returns `true` for a graph without blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frontiers.is_empty()
    }

    /// Computes the iterated dominance frontier of a set of defining blocks.
    ///
    /// The result is sorted by block id and free of duplicates. Blocks in `defs`
    /// appear in it only when they are in the frontier of some member of the set.
    #[must_use]
    pub fn iterated(&self, defs: &[BlockId]) -> Vec<BlockId> {
        let mut in_idf = BitSet::new(self.frontiers.len());
        let mut queued = BitSet::new(self.frontiers.len());
        let mut worklist: Vec<BlockId> = Vec::with_capacity(defs.len());

        for &block in defs {
            if block.index() < self.frontiers.len() && queued.insert(block.index()) {
                worklist.push(block);
            }
        }

        while let Some(block) = worklist.pop() {
            for &frontier in self.frontier(block) {
                if in_idf.insert(frontier.index()) {
                    trace!("IDF: {} reaches {}", block, frontier);
                    if queued.insert(frontier.index()) {
                        worklist.push(frontier);
                    }
                }
            }
        }

        in_idf.iter().map(BlockId::new).collect()
    }
}

//! Phi placement.
//!
//! For every renamed variable the inserter collects the blocks that define it
//! (the entry block counts for variables defined on entry, see
//! [`Liveness::entry_definitions`]) and places a
//! phi at:
//!
//! - every block of the iterated dominance frontier of those blocks, and
//! - the exceptional-flow target (filter or handler entry) of every region
//!   enclosing a defining block, nested regions contributing independently.
//!
//! Handler phis are definitions too, so the two rules are applied until no new
//! block turns up. A variable defined in a single block outside any try needs
//! no phi at all.
//!
//! Each phi gets one argument slot per reachable predecessor edge, in the order
//! the edges were added to its block. Slots are filled later by the rename walk.

use log::{debug, trace};

use crate::{
    analysis::{
        cfg::{BlockId, FlowGraph, OpRef},
        ssa::{DominanceFrontiers, Liveness, SsaContext, Variable},
    },
    utils::{graph::algorithms::DominatorTree, graph::EdgeId, BitSet},
    Result,
};

/// Places phi nodes into a flow graph whose SSA annotations were just reset.
pub(crate) struct PhiInserter<'a> {
    graph: &'a mut FlowGraph,
    ctx: &'a mut SsaContext,
    dom: &'a DominatorTree,
    frontiers: &'a DominanceFrontiers,
    /// Slots of the variables defined on entry
    on_entry: &'a BitSet,
    /// Present for pruned placement
    liveness: Option<&'a Liveness>,
}

impl<'a> PhiInserter<'a> {
    pub(crate) fn new(
        graph: &'a mut FlowGraph,
        ctx: &'a mut SsaContext,
        dom: &'a DominatorTree,
        frontiers: &'a DominanceFrontiers,
        on_entry: &'a BitSet,
        liveness: Option<&'a Liveness>,
    ) -> Self {
        PhiInserter {
            graph,
            ctx,
            dom,
            frontiers,
            on_entry,
            liveness,
        }
    }

    /// Inserts all phis, returning how many were created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) when the arena budget
    /// is exhausted.
    pub(crate) fn run(self) -> Result<usize> {
        let def_blocks = self.collect_def_blocks()?;
        let local_count = self.graph.local_count();
        let mut inserted = 0;

        for (slot, blocks) in def_blocks.iter().enumerate() {
            if blocks.is_empty() {
                continue;
            }
            let var = Variable::from_slot(slot, local_count);
            let protected = blocks.iter().any(|&block| {
                self.graph
                    .block(block)
                    .is_some_and(|data| data.is_protected())
            });
            if blocks.len() < 2 && !protected {
                continue;
            }

            for target in self.placement(blocks) {
                if let Some(liveness) = self.liveness {
                    if !liveness.is_live_in(target, var) {
                        trace!("Pruned phi for {} at {}", var, target);
                        continue;
                    }
                }

                let slots: Vec<(EdgeId, BlockId)> = self
                    .graph
                    .incoming(target)
                    .filter(|&(_, pred)| self.dom.is_reachable(pred))
                    .collect();
                self.ctx.charge(1 + slots.len())?;
                self.graph.insert_phi(target, var, &slots)?;
                trace!("Phi for {} at {} with {} slots", var, target, slots.len());
                inserted += 1;
            }
        }

        debug!("Inserted {} phis", inserted);
        Ok(inserted)
    }

    /// Returns, per variable slot, the sorted reachable blocks defining it.
    fn collect_def_blocks(&self) -> Result<Vec<Vec<BlockId>>> {
        let graph = &*self.graph;
        let heap_slot = graph.slot(Variable::Heap);
        let clobber = self.ctx.config().indirect_defs_clobber_heap;

        let mut def_blocks: Vec<Vec<BlockId>> = Vec::new();
        def_blocks.try_reserve(graph.variable_count())?;
        def_blocks.resize_with(graph.variable_count(), Vec::new);

        let entry = self.dom.entry();
        for slot in self.on_entry.iter() {
            if let Some(blocks) = def_blocks.get_mut(slot) {
                blocks.push(entry);
            }
        }

        for &block in self.dom.reverse_postorder() {
            let Some(data) = graph.block(block) else {
                continue;
            };
            for (index, op) in data.ops().iter().enumerate() {
                if !op.kind().writes() {
                    continue;
                }
                let var = graph.resolve_target(OpRef::new(block, index), op);
                if graph.in_ssa(var) {
                    def_blocks[graph.slot(var)].push(block);
                }
                if op.is_indirect() && !var.is_heap() && clobber {
                    def_blocks[heap_slot].push(block);
                }
            }
        }

        for blocks in &mut def_blocks {
            blocks.sort_unstable();
            blocks.dedup();
        }
        Ok(def_blocks)
    }

    /// Computes the phi blocks for one variable, sorted by block id.
    fn placement(&self, def_blocks: &[BlockId]) -> Vec<BlockId> {
        let mut placed = BitSet::new(self.graph.block_count());
        let mut seeds: Vec<BlockId> = def_blocks.to_vec();

        loop {
            let mut candidates = self.frontiers.iterated(&seeds);
            let handlers: Vec<BlockId> = seeds
                .iter()
                .chain(candidates.iter())
                .flat_map(|&block| self.graph.exceptional_targets(block))
                .collect();
            candidates.extend(handlers);

            let mut grew = false;
            for block in candidates {
                if self.dom.is_reachable(block) && placed.insert(block.index()) {
                    seeds.push(block);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        placed.iter().map(BlockId::new).collect()
    }
}

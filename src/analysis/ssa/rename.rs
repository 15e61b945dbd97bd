//! Variable renaming.
//!
//! The rename walk visits the dominator tree of the exceptional-flow view in
//! preorder, keeping one stack of SSA numbers per variable. Within a block:
//!
//! 1. each phi defines a fresh number and pushes it;
//! 2. each operation, in order, reads the top of its variable's stack (if it
//!    reads) and then defines and pushes a fresh number (if it writes), so a
//!    read-modify-write sees the old value and produces a new one;
//! 3. each real successor's phis take the current top of stack into the slot of
//!    the connecting edge;
//! 4. the [`HandlerPropagator`] hears about definitions, try entries and the block
//!    exit so handler phis collect exceptional arguments.
//!
//! After the block's dominator-tree children are done, everything the block
//! pushed is popped again. The walk uses an explicit work stack, so deep
//! dominator trees cannot overflow the call stack.
//!
//! # Empty Stacks
//!
//! Variables defined on entry (parameters, must-init locals, the heap, and
//! locals live into the entry that are written somewhere) get a definition
//! numbered [`SsaNum::FIRST`] before the walk starts. Other variables start with
//! an empty stack. A real read can then only see an empty stack when its variable
//! is never written in a reachable block, which is an error
//! ([`Error::UseBeforeDef`]). A phi slot reading an empty stack gets the
//! variable's *undefined-on-entry* value, materialised at most once per variable
//! as an extra entry definition. Handler propagation skips empty stacks.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::{
    analysis::{
        cfg::{BlockId, FlowGraph, OpRef},
        ssa::{
            handler::HandlerPropagator, DefSite, PhiId, SsaContext, SsaNum, Variable,
        },
    },
    utils::{graph::algorithms::DominatorTree, graph::EdgeId, BitSet},
    Error, Result,
};

/// Hooks into the rename walk.
///
/// Both methods see the rename stacks as they are when a block is entered (before
/// its phis are defined) and when it is left (after its own definitions and
/// those of its dominator-tree subtree have been popped). The two views of a block
/// are always identical.
pub trait RenameObserver {
    /// Called before `block` is renamed.
    fn enter_block(&mut self, _block: BlockId, _stacks: &RenameStacks) {}

    /// Called after `block` and its dominator-tree subtree are done.
    fn exit_block(&mut self, _block: BlockId, _stacks: &RenameStacks) {}
}

/// An observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RenameObserver for NoopObserver {}

/// The per-variable stacks of SSA numbers.
#[derive(Debug, Clone, Default)]
pub struct RenameStacks {
    stacks: Vec<Vec<SsaNum>>,
    /// Slots in push order, so a block's pushes can be undone
    log: Vec<usize>,
}

impl RenameStacks {
    pub(crate) fn new(variable_count: usize) -> Result<Self> {
        let mut stacks = Vec::new();
        stacks.try_reserve(variable_count)?;
        stacks.resize_with(variable_count, Vec::new);
        Ok(RenameStacks {
            stacks,
            log: Vec::new(),
        })
    }

    /// Returns the current number of `slot`, if it has one.
    #[must_use]
    pub fn top(&self, slot: usize) -> Option<SsaNum> {
        self.stacks.get(slot)?.last().copied()
    }

    /// Returns the stack depth of `slot`.
    #[must_use]
    pub fn depth(&self, slot: usize) -> usize {
        self.stacks.get(slot).map_or(0, Vec::len)
    }

    /// Returns the depth of every slot.
    #[must_use]
    pub fn depths(&self) -> Vec<usize> {
        self.stacks.iter().map(Vec::len).collect()
    }

    pub(crate) fn push(&mut self, slot: usize, num: SsaNum) -> Result<()> {
        let Some(stack) = self.stacks.get_mut(slot) else {
            return Err(malformed_error!("No rename stack for variable slot {}", slot));
        };
        stack.try_reserve(1)?;
        self.log.try_reserve(1)?;
        stack.push(num);
        self.log.push(slot);
        Ok(())
    }

    pub(crate) fn mark(&self) -> usize {
        self.log.len()
    }

    /// Pops everything pushed since `mark`.
    pub(crate) fn pop_to(&mut self, mark: usize) {
        while self.log.len() > mark {
            if let Some(slot) = self.log.pop() {
                if let Some(stack) = self.stacks.get_mut(slot) {
                    stack.pop();
                }
            }
        }
    }
}

/// What the rename walk produced besides the in-graph annotations.
pub(crate) struct Renamed {
    pub(crate) defs: Vec<Vec<DefSite>>,
    pub(crate) aliased: BitSet,
    pub(crate) indirect_heap_defs: BTreeMap<OpRef, SsaNum>,
    pub(crate) exceptional_args: usize,
}

enum Frame {
    Enter(BlockId),
    Exit(BlockId, usize),
}

/// Renames every reachable block of a flow graph whose phis are already placed.
pub(crate) struct RenameEngine<'a> {
    graph: &'a mut FlowGraph,
    ctx: &'a mut SsaContext,
    dom: &'a DominatorTree,
    /// Slots of the variables defined on entry
    on_entry: &'a BitSet,
    stacks: RenameStacks,
    handler: HandlerPropagator,
    /// Per variable slot, the site of number `n` at index `n - 1`
    defs: Vec<Vec<DefSite>>,
    /// Per variable slot, the undefined-on-entry number once materialised
    undefined: Vec<Option<SsaNum>>,
    aliased: BitSet,
    indirect_heap_defs: BTreeMap<OpRef, SsaNum>,
}

impl<'a> RenameEngine<'a> {
    pub(crate) fn new(
        graph: &'a mut FlowGraph,
        ctx: &'a mut SsaContext,
        dom: &'a DominatorTree,
        on_entry: &'a BitSet,
    ) -> Result<Self> {
        let variables = graph.variable_count();
        let stacks = RenameStacks::new(variables)?;

        let mut defs = Vec::new();
        defs.try_reserve(variables)?;
        defs.resize_with(variables, Vec::new);

        let mut undefined = Vec::new();
        undefined.try_reserve(variables)?;
        undefined.resize(variables, None);

        Ok(RenameEngine {
            aliased: BitSet::new(graph.local_count()),
            graph,
            ctx,
            dom,
            on_entry,
            stacks,
            handler: HandlerPropagator::new(),
            defs,
            undefined,
            indirect_heap_defs: BTreeMap::new(),
        })
    }

    /// Runs the walk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UseBeforeDef`] for a read without reaching definition and
    /// [`Error::OutOfMemory`] when the arena budget is exhausted.
    pub(crate) fn run<O: RenameObserver + ?Sized>(mut self, observer: &mut O) -> Result<Renamed> {
        let on_entry: Vec<usize> = self.on_entry.iter().collect();
        for slot in on_entry {
            let num = self.new_name(slot, DefSite::Entry)?;
            self.stacks.push(slot, num)?;
        }

        let mut work = vec![Frame::Enter(self.dom.entry())];
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(block) => {
                    observer.enter_block(block, &self.stacks);
                    let mark = self.stacks.mark();
                    self.rename_block(block)?;
                    work.push(Frame::Exit(block, mark));
                    for &child in self.dom.children(block).iter().rev() {
                        work.push(Frame::Enter(child));
                    }
                }
                Frame::Exit(block, mark) => {
                    self.stacks.pop_to(mark);
                    observer.exit_block(block, &self.stacks);
                }
            }
        }

        // Blocks the walk never reached still see the method's initial heap.
        let unreached: Vec<BlockId> = self
            .graph
            .block_ids()
            .filter(|&block| !self.dom.is_reachable(block))
            .collect();
        for block in unreached {
            if let Some(data) = self.graph.block_mut(block) {
                data.set_heap(SsaNum::FIRST, SsaNum::FIRST);
            }
        }

        debug!(
            "Renamed {} blocks, {} exceptional phi arguments",
            self.dom.reverse_postorder().len(),
            self.handler.contributed()
        );

        Ok(Renamed {
            defs: self.defs,
            aliased: self.aliased,
            indirect_heap_defs: self.indirect_heap_defs,
            exceptional_args: self.handler.contributed(),
        })
    }

    fn rename_block(&mut self, block: BlockId) -> Result<()> {
        let heap_slot = self.graph.slot(Variable::Heap);

        let phis: Vec<PhiId> = self
            .graph
            .block(block)
            .map(|data| data.phis().to_vec())
            .unwrap_or_default();
        for phi in phis {
            let Some(var) = self.graph.phi(phi).map(|node| node.var()) else {
                continue;
            };
            let num = self.define(var, DefSite::Phi { block, phi })?;
            if let Some(node) = self.graph.phi_mut(phi) {
                node.set_num(num);
            }
            self.handler.on_def(self.graph, self.ctx, block, var, num)?;
        }

        let heap_in = self.stacks.top(heap_slot).unwrap_or_default();
        if let Some(data) = self.graph.block_mut(block) {
            data.set_heap_in(heap_in);
        }

        let op_count = self.graph.block(block).map_or(0, |data| data.ops().len());
        for index in 0..op_count {
            self.rename_op(OpRef::new(block, index))?;
        }

        let heap_out = self.stacks.top(heap_slot).unwrap_or_default();
        if let Some(data) = self.graph.block_mut(block) {
            data.set_heap_out(heap_out);
        }

        let successors: Vec<(EdgeId, BlockId)> = self.graph.outgoing(block).collect();
        for (edge, succ) in successors {
            self.fill_phi_slots(edge, succ)?;
            self.handler
                .on_try_entry(self.graph, self.ctx, &self.stacks, block, succ)?;
        }

        self.handler
            .on_block_exit(self.graph, self.ctx, &self.stacks, block)
    }

    fn rename_op(&mut self, at: OpRef) -> Result<()> {
        let Some(op) = self.graph.operation(at).copied() else {
            return Ok(());
        };
        let var = self.graph.resolve_target(at, &op);
        let tracked = self.graph.in_ssa(var);

        if tracked && op.kind().reads() {
            let Some(num) = self.stacks.top(self.graph.slot(var)) else {
                return Err(Error::UseBeforeDef {
                    var,
                    block: at.block,
                });
            };
            if let Some(op) = self.graph.operation_mut(at) {
                op.set_use_num(num);
            }
        }

        if !op.kind().writes() {
            return Ok(());
        }

        if tracked {
            let num = self.define(var, DefSite::Op(at))?;
            if let Some(op) = self.graph.operation_mut(at) {
                op.set_def_num(num);
            }
            trace!("{} defines {}.{}", at, var, num);
            self.handler.on_def(self.graph, self.ctx, at.block, var, num)?;
        }

        if op.is_indirect() && !var.is_heap() {
            if tracked {
                self.aliased.insert(self.graph.slot(var));
            }
            if self.ctx.config().indirect_defs_clobber_heap {
                let heap = self.define(Variable::Heap, DefSite::Op(at))?;
                self.indirect_heap_defs.insert(at, heap);
                self.handler
                    .on_def(self.graph, self.ctx, at.block, Variable::Heap, heap)?;
            }
        }
        Ok(())
    }

    /// Fills the slot of `edge` in every phi of `succ`.
    fn fill_phi_slots(&mut self, edge: EdgeId, succ: BlockId) -> Result<()> {
        let phis: Vec<(PhiId, Variable)> = self
            .graph
            .phis_at(succ)
            .map(|(id, node)| (id, node.var()))
            .collect();
        for (phi, var) in phis {
            let slot = self.graph.slot(var);
            let num = match self.stacks.top(slot) {
                Some(num) => num,
                None => self.undefined_on_entry(slot)?,
            };
            if let Some(node) = self.graph.phi_mut(phi) {
                node.fill_edge(edge, num);
            }
        }
        Ok(())
    }

    /// Allocates a number for `var` at `site` and pushes it.
    fn define(&mut self, var: Variable, site: DefSite) -> Result<SsaNum> {
        let slot = self.graph.slot(var);
        let num = self.new_name(slot, site)?;
        self.stacks.push(slot, num)?;
        Ok(num)
    }

    /// Returns the undefined-on-entry number of `slot`, allocating it on first use.
    fn undefined_on_entry(&mut self, slot: usize) -> Result<SsaNum> {
        if let Some(num) = self.undefined.get(slot).copied().flatten() {
            return Ok(num);
        }
        let num = self.new_name(slot, DefSite::Entry)?;
        if let Some(entry) = self.undefined.get_mut(slot) {
            *entry = Some(num);
        }
        trace!("Slot {} is undefined on entry, numbered {}", slot, num);
        Ok(num)
    }

    /// Allocates the next number of `slot` and records its definition site.
    fn new_name(&mut self, slot: usize, site: DefSite) -> Result<SsaNum> {
        self.ctx.charge(1)?;
        let num = self.ctx.next_num(slot)?;
        let Some(sites) = self.defs.get_mut(slot) else {
            return Err(malformed_error!("No definition table for variable slot {}", slot));
        };
        sites.try_reserve(1)?;
        sites.push(site);
        Ok(num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacks_push_pop() {
        let mut stacks = RenameStacks::new(2).unwrap();
        stacks.push(0, SsaNum::new(1)).unwrap();
        let mark = stacks.mark();
        stacks.push(0, SsaNum::new(2)).unwrap();
        stacks.push(1, SsaNum::new(1)).unwrap();

        assert_eq!(stacks.top(0), Some(SsaNum::new(2)));
        assert_eq!(stacks.depths(), vec![2, 1]);

        stacks.pop_to(mark);
        assert_eq!(stacks.top(0), Some(SsaNum::new(1)));
        assert_eq!(stacks.top(1), None);
        assert_eq!(stacks.depth(1), 0);
        assert!(stacks.push(5, SsaNum::FIRST).is_err());
    }
}

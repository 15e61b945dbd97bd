//! Propagation of live values into exception handlers.
//!
//! A handler can be entered from any point inside its try, so its phis must list
//! every value a variable holds anywhere in the protected range. The rename walk
//! reports three kinds of events and the propagator turns each into exceptional
//! phi arguments:
//!
//! - a definition inside a protected block flows into the phis of every
//!   enclosing region's flow target;
//! - an edge entering a try from outside carries the values live at that edge
//!   into the try's handler (and into the handlers of outer regions that start
//!   at the same block);
//! - leaving a protected block carries the values on top of the rename stacks
//!   into every enclosing region's flow target.
//!
//! Arguments are kept unique per SSA number, so the same value reported several
//! times is recorded once.

use log::trace;

use crate::{
    analysis::{
        cfg::{BlockId, FlowGraph},
        ssa::{PhiId, RenameStacks, SsaContext, SsaNum, Variable},
    },
    Result,
};

/// Turns rename events into exceptional phi arguments.
#[derive(Debug, Default)]
pub(crate) struct HandlerPropagator {
    /// Arguments added so far
    contributed: usize,
}

impl HandlerPropagator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the number of exceptional arguments added.
    pub(crate) fn contributed(&self) -> usize {
        self.contributed
    }

    /// A definition of `var` numbered `num` happened in `block`.
    pub(crate) fn on_def(
        &mut self,
        graph: &mut FlowGraph,
        ctx: &mut SsaContext,
        block: BlockId,
        var: Variable,
        num: SsaNum,
    ) -> Result<()> {
        let phis: Vec<PhiId> = graph
            .exceptional_targets(block)
            .filter_map(|target| graph.phi_for(target, var))
            .collect();
        for phi in phis {
            self.contribute(graph, ctx, phi, block, num)?;
        }
        Ok(())
    }

    /// Control flows from `pred` into `succ` along a real edge.
    ///
    /// For every region whose try begins at `succ` and does not already cover
    /// `pred`, the current value of each variable with a phi at the region's flow
    /// target is added to that phi.
    pub(crate) fn on_try_entry(
        &mut self,
        graph: &mut FlowGraph,
        ctx: &mut SsaContext,
        stacks: &RenameStacks,
        pred: BlockId,
        succ: BlockId,
    ) -> Result<()> {
        let outside: Vec<_> = graph.region_chain(pred).map(|(id, _)| id).collect();
        let mut targets = Vec::new();
        for (id, region) in graph.region_chain(succ) {
            if region.try_entry() != succ || outside.contains(&id) {
                break;
            }
            targets.push(region.flow_target());
        }

        for target in targets {
            trace!("Try entry {} -> {} feeds handler {}", pred, succ, target);
            self.contribute_live(graph, ctx, stacks, target, pred)?;
        }
        Ok(())
    }

    /// The rename walk finished the operations of `block`.
    pub(crate) fn on_block_exit(
        &mut self,
        graph: &mut FlowGraph,
        ctx: &mut SsaContext,
        stacks: &RenameStacks,
        block: BlockId,
    ) -> Result<()> {
        let targets: Vec<BlockId> = graph.exceptional_targets(block).collect();
        for target in targets {
            self.contribute_live(graph, ctx, stacks, target, block)?;
        }
        Ok(())
    }

    /// Adds the current value of every variable with a phi at `target`.
    fn contribute_live(
        &mut self,
        graph: &mut FlowGraph,
        ctx: &mut SsaContext,
        stacks: &RenameStacks,
        target: BlockId,
        from: BlockId,
    ) -> Result<()> {
        let phis: Vec<(PhiId, Variable)> = graph
            .phis_at(target)
            .map(|(id, phi)| (id, phi.var()))
            .collect();
        for (phi, var) in phis {
            if let Some(num) = stacks.top(graph.slot(var)) {
                self.contribute(graph, ctx, phi, from, num)?;
            }
        }
        Ok(())
    }

    fn contribute(
        &mut self,
        graph: &mut FlowGraph,
        ctx: &mut SsaContext,
        phi: PhiId,
        from: BlockId,
        num: SsaNum,
    ) -> Result<()> {
        let Some(node) = graph.phi_mut(phi) else {
            return Err(malformed_error!("Dangling phi {}", phi));
        };
        if node.add_exceptional(from, num) {
            trace!("{}.{} from {} reaches handler phi {}", node.var(), num, from, phi);
            ctx.charge(1)?;
            self.contributed += 1;
        }
        Ok(())
    }
}

//! SSA construction driver for one method.
//!
//! [`SsaBuilder`] runs the phases in order over a [`FlowGraph`]:
//!
//! 1. **Reset**: drop any SSA annotations of an earlier build.
//! 2. **Validate**: reject inconsistent importer data.
//! 3. **Root**: give the graph an entry without predecessors outside any try.
//! 4. **Dominators**: iterative dominator tree of the exceptional-flow view.
//! 5. **Frontiers**: dominance frontiers of the same view.
//! 6. **Liveness**: decides which variables are defined on entry, and prunes phis
//!    under [`PhiPlacement::Pruned`].
//! 7. **Phi insertion**: IDF plus handler entries.
//! 8. **Renaming**: dominator-tree walk with handler propagation.
//!
//! Building twice over the same graph yields the same numbering: every phase is
//! deterministic and the reset restores the state the first build started from
//! (apart from the synthetic root, which the first build already added and the
//! second one finds in place).
//!
//! # Example
//!
//! ```rust,ignore
//! use jitssa::prelude::*;
//!
//! let mut ctx = SsaContext::new(SsaConfig::default());
//! let form = SsaBuilder::new(&mut ctx, &mut graph).build()?;
//! println!("{} phis", form.stats().phis);
//! ```

use log::debug;

use crate::{
    analysis::{
        cfg::{ExceptionalFlow, FlowGraph},
        ssa::{
            inserter::PhiInserter,
            rename::{NoopObserver, RenameEngine, RenameObserver},
            DominanceFrontiers, Liveness, PhiPlacement, SsaContext, SsaForm, SsaStats,
        },
    },
    utils::graph::algorithms::compute_dominators_rooted,
    Result,
};

/// Builds SSA form for one flow graph against one context.
pub struct SsaBuilder<'a> {
    ctx: &'a mut SsaContext,
    graph: &'a mut FlowGraph,
}

impl<'a> SsaBuilder<'a> {
    /// Creates a builder.
    pub fn new(ctx: &'a mut SsaContext, graph: &'a mut FlowGraph) -> Self {
        SsaBuilder { ctx, graph }
    }

    /// Builds SSA form.
    ///
    /// # Errors
    ///
    /// - [`Error::Empty`](crate::Error::Empty) for a graph without blocks
    /// - [`Error::Malformed`](crate::Error::Malformed) for inconsistent importer data
    /// - [`Error::UseBeforeDef`](crate::Error::UseBeforeDef) for a read with no
    ///   reaching definition
    /// - [`Error::OutOfMemory`](crate::Error::OutOfMemory) when the arena budget or
    ///   the allocator gives out
    pub fn build(self) -> Result<SsaForm> {
        self.build_with_observer(&mut NoopObserver)
    }

    /// Builds SSA form, reporting rename-walk events to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with_observer<O: RenameObserver + ?Sized>(
        self,
        observer: &mut O,
    ) -> Result<SsaForm> {
        let SsaBuilder { ctx, graph } = self;

        graph.reset_ssa();
        graph.validate()?;
        if let Some(root) = graph.ensure_root()? {
            debug!("Added synthetic root {}", root);
        }
        ctx.reset(graph.variable_count())?;

        let view = ExceptionalFlow::new(graph);
        let dom = compute_dominators_rooted(&view);
        graph.record_dominators(&dom);
        debug!(
            "Dominators: {} of {} blocks reachable from {}",
            dom.reverse_postorder().len(),
            graph.block_count(),
            dom.entry()
        );

        let frontiers = DominanceFrontiers::compute(&view, &dom);
        let liveness = Liveness::compute(graph, &view, &dom);
        let on_entry = liveness.entry_definitions(graph, dom.entry());
        let pruning = match ctx.config().placement {
            PhiPlacement::Pruned => Some(&liveness),
            PhiPlacement::Minimal => None,
        };

        let phis = PhiInserter::new(graph, ctx, &dom, &frontiers, &on_entry, pruning).run()?;
        let renamed = RenameEngine::new(graph, ctx, &dom, &on_entry)?.run(observer)?;

        let stats = SsaStats {
            reachable_blocks: dom.reverse_postorder().len(),
            total_blocks: graph.block_count(),
            phis,
            exceptional_args: renamed.exceptional_args,
            definitions: renamed.defs.iter().map(Vec::len).sum(),
            synthetic_root: graph.synthetic_root().is_some(),
        };
        debug!("SSA built: {:?}", stats);

        Ok(SsaForm::new(
            dom,
            graph.local_count(),
            renamed.defs,
            renamed.aliased,
            renamed.indirect_heap_defs,
            on_entry,
            stats,
        ))
    }
}

//! Live variable analysis over the exceptional-flow view.
//!
//! A variable is *live* on entry to a block if some path from there reads it
//! before writing it. Pruned phi placement consults this to skip phis whose value
//! nobody would read, and every build uses it to decide which variables hold a
//! value when the method starts (see [`Liveness::entry_definitions`]).
//!
//! # Algorithm
//!
//! Backward data flow over variable slots:
//!
//! - `USE[B]` = variables read in B before any write in B
//! - `DEF[B]` = variables written in B
//! - `EXC[B]` = ∪{IN[H] | H is an exceptional successor of B}
//! - `OUT[B]` = ∪{IN[S] | S is a real successor of B} ∪ EXC[B]
//! - `IN[B]`  = USE[B] ∪ (OUT[B] - DEF[B]) ∪ EXC[B]
//!
//! An exception can leave a protected block before any of its writes happened,
//! so handler live-ins are live on *entry* to every protected block, not only on
//! exit. The heap is treated as live everywhere.

use log::debug;

use crate::{
    analysis::{
        cfg::{BlockId, ExceptionalFlow, FlowGraph, OpRef},
        ssa::Variable,
    },
    utils::{
        graph::{algorithms::DominatorTree, Successors},
        BitSet,
    },
};

/// Per-block live-in and live-out sets.
#[derive(Debug, Clone)]
pub struct Liveness {
    local_count: usize,
    live_in: Vec<BitSet>,
    live_out: Vec<BitSet>,
    /// Slots written by some reachable block
    written: BitSet,
}

impl Liveness {
    /// Solves liveness for every reachable block of `graph`.
    ///
    /// Unreachable blocks keep empty sets.
    #[must_use]
    pub fn compute(graph: &FlowGraph, view: &ExceptionalFlow, dom: &DominatorTree) -> Self {
        let n = graph.block_count();
        let vars = graph.variable_count();
        let mut use_sets = vec![BitSet::new(vars); n];
        let mut def_sets = vec![BitSet::new(vars); n];

        for &block in dom.reverse_postorder() {
            let Some(data) = graph.block(block) else {
                continue;
            };
            let (uses, defs) = (&mut use_sets[block.index()], &mut def_sets[block.index()]);
            for (index, op) in data.ops().iter().enumerate() {
                let var = graph.resolve_target(OpRef::new(block, index), op);
                if !graph.in_ssa(var) {
                    continue;
                }
                let slot = graph.slot(var);
                if op.kind().reads() && !defs.contains(slot) {
                    uses.insert(slot);
                }
                if op.kind().writes() {
                    defs.insert(slot);
                }
            }
        }

        let mut written = BitSet::new(vars);
        for defs in &def_sets {
            written.union_with(defs);
        }

        let mut live_in = vec![BitSet::new(vars); n];
        let mut live_out = vec![BitSet::new(vars); n];
        let postorder: Vec<BlockId> = dom.reverse_postorder().iter().rev().copied().collect();

        let mut rounds = 0usize;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;
            for &block in &postorder {
                let b = block.index();

                let mut exceptional = BitSet::new(vars);
                for &handler in view.exceptional_successors(block) {
                    exceptional.union_with(&live_in[handler.index()]);
                }

                let mut out = exceptional.clone();
                for succ in view.successors(block) {
                    out.union_with(&live_in[succ.index()]);
                }

                let mut inn = out.clone();
                inn.difference_with(&def_sets[b]);
                inn.union_with(&use_sets[b]);
                inn.union_with(&exceptional);

                if inn != live_in[b] {
                    live_in[b] = inn;
                    changed = true;
                }
                if out != live_out[b] {
                    live_out[b] = out;
                    changed = true;
                }
            }
        }
        debug!(
            "Liveness converged after {} rounds over {} blocks",
            rounds,
            postorder.len()
        );

        Liveness {
            local_count: graph.local_count(),
            live_in,
            live_out,
            written,
        }
    }

    /// Returns the slots of the variables defined on method entry.
    ///
    /// Parameters, must-init locals and the heap always are. Any other renamed
    /// local is too when it is live into `entry` and written somewhere: some path
    /// reads it before the method assigns it, and the entry value is what that
    /// read sees. A local that is read but never written gets no entry
    /// definition, so the read stays an error.
    #[must_use]
    pub fn entry_definitions(&self, graph: &FlowGraph, entry: BlockId) -> BitSet {
        let mut defined = BitSet::new(graph.variable_count());
        for var in graph.variables().filter(|&var| graph.in_ssa(var)) {
            let slot = graph.slot(var);
            if graph.initialized_on_entry(var)
                || (self.is_live_in(entry, var) && self.written.contains(slot))
            {
                defined.insert(slot);
            }
        }
        defined
    }

    /// Returns `true` if `var` is live on entry to `block`.
    #[must_use]
    pub fn is_live_in(&self, block: BlockId, var: Variable) -> bool {
        var.is_heap()
            || self
                .live_in
                .get(block.index())
                .is_some_and(|set| set.contains(var.slot(self.local_count)))
    }

    /// Returns `true` if `var` is live on exit from `block`.
    #[must_use]
    pub fn is_live_out(&self, block: BlockId, var: Variable) -> bool {
        var.is_heap()
            || self
                .live_out
                .get(block.index())
                .is_some_and(|set| set.contains(var.slot(self.local_count)))
    }

    /// Iterates over the locals live on entry to `block`.
    pub fn live_in_locals(&self, block: BlockId) -> impl Iterator<Item = Variable> + '_ {
        let locals = self.local_count;
        self.live_in
            .get(block.index())
            .into_iter()
            .flat_map(BitSet::iter)
            .filter(move |&slot| slot < locals)
            .map(move |slot| Variable::from_slot(slot, locals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{
            cfg::{BasicBlock, ExceptionRegion, FlowEdgeKind, Operation, RegionKind},
            ssa::LocalVar,
        },
        utils::graph::algorithms::compute_dominators_rooted,
    };

    fn solve(graph: &FlowGraph) -> Liveness {
        let view = ExceptionalFlow::new(graph);
        let dom = compute_dominators_rooted(&view);
        Liveness::compute(graph, &view, &dom)
    }

    #[test]
    fn test_straight_line() {
        // b0: def V0 ; b1: use V0, def V1 ; b2: use V1
        let v0 = Variable::local(0);
        let v1 = Variable::local(1);
        let mut graph = FlowGraph::new(vec![LocalVar::temp(), LocalVar::temp()]);
        let b0 = graph.add_block(BasicBlock::with_ops(vec![Operation::def_of(v0)]));
        let b1 = graph.add_block(BasicBlock::with_ops(vec![
            Operation::use_of(v0),
            Operation::def_of(v1),
        ]));
        let b2 = graph.add_block(BasicBlock::with_ops(vec![Operation::use_of(v1)]));
        graph.add_edge(b0, b1, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(b1, b2, FlowEdgeKind::Unconditional).unwrap();

        let live = solve(&graph);
        assert!(!live.is_live_in(b0, v0));
        assert!(live.is_live_out(b0, v0));
        assert!(live.is_live_in(b1, v0));
        assert!(!live.is_live_in(b1, v1));
        assert!(live.is_live_in(b2, v1));
        assert!(!live.is_live_in(b2, v0));
        assert_eq!(live.live_in_locals(b1).collect::<Vec<_>>(), vec![v0]);
        assert!(live.is_live_in(b2, Variable::Heap));
    }

    #[test]
    fn test_loop_carried() {
        // b0 -> b1 <-> b2, b1 -> b3; V0 is incremented in b2 and read in b3
        let v0 = Variable::local(0);
        let mut graph = FlowGraph::new(vec![LocalVar::param()]);
        let b0 = graph.add_block(BasicBlock::new());
        let b1 = graph.add_block(BasicBlock::new());
        let b2 = graph.add_block(BasicBlock::with_ops(vec![Operation::use_def(v0)]));
        let b3 = graph.add_block(BasicBlock::with_ops(vec![Operation::use_of(v0)]));
        graph.add_edge(b0, b1, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(b1, b2, FlowEdgeKind::ConditionalTrue).unwrap();
        graph.add_edge(b2, b1, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(b1, b3, FlowEdgeKind::ConditionalFalse).unwrap();

        let live = solve(&graph);
        for block in [b0, b1, b2, b3] {
            assert!(live.is_live_in(block, v0), "V00 live into {block}");
        }
    }

    #[test]
    fn test_entry_definitions() {
        // b0 -> {b1: def V1, b2} -> b3: use V1, use V2; V0 parameter, V1 and V2 temporaries
        let (v0, v1, v2) = (Variable::local(0), Variable::local(1), Variable::local(2));
        let mut graph =
            FlowGraph::new(vec![LocalVar::param(), LocalVar::temp(), LocalVar::temp()]);
        let b0 = graph.add_block(BasicBlock::new());
        let b1 = graph.add_block(BasicBlock::with_ops(vec![Operation::def_of(v1)]));
        let b2 = graph.add_block(BasicBlock::new());
        let b3 = graph.add_block(BasicBlock::with_ops(vec![
            Operation::use_of(v1),
            Operation::use_of(v2),
        ]));
        graph.add_edge(b0, b1, FlowEdgeKind::ConditionalTrue).unwrap();
        graph.add_edge(b0, b2, FlowEdgeKind::ConditionalFalse).unwrap();
        graph.add_edge(b1, b3, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(b2, b3, FlowEdgeKind::Unconditional).unwrap();

        let live = solve(&graph);
        let defined = live.entry_definitions(&graph, b0);
        assert!(defined.contains(graph.slot(v0)));
        assert!(defined.contains(graph.slot(v1)));
        // Read but never written
        assert!(live.is_live_in(b0, v2));
        assert!(!defined.contains(graph.slot(v2)));
        assert!(defined.contains(graph.slot(Variable::Heap)));
    }

    #[test]
    fn test_handler_uses_are_live_in_try() {
        // b0 -> b1 (try: def V0) -> b3; handler b2 reads V0
        let v0 = Variable::local(0);
        let mut graph = FlowGraph::new(vec![LocalVar::param()]);
        let b0 = graph.add_block(BasicBlock::new());
        let b1 = graph.add_block(BasicBlock::with_ops(vec![Operation::def_of(v0)]));
        let b2 = graph.add_block(BasicBlock::with_ops(vec![Operation::use_of(v0)]));
        let b3 = graph.add_block(BasicBlock::new());
        graph.add_edge(b0, b1, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(b1, b3, FlowEdgeKind::Leave).unwrap();
        graph.add_edge(b2, b3, FlowEdgeKind::Leave).unwrap();
        let region = graph
            .add_region(ExceptionRegion::new(RegionKind::Catch, b1, b2))
            .unwrap();
        graph.protect(b1, region).unwrap();

        let live = solve(&graph);
        assert!(live.is_live_in(b2, v0));
        // The throw may happen before the write in b1
        assert!(live.is_live_in(b1, v0));
        assert!(live.is_live_in(b0, v0));
        assert!(!live.is_live_in(b3, v0));
    }
}

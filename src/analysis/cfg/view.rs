//! The exceptional-flow view of a flow graph.
//!
//! Exception handlers have no real predecessor edges: control reaches them from
//! any point inside the try. Dominators, frontiers and liveness must still see
//! them as reachable, and must see that a handler can be entered from every
//! protected block. [`ExceptionalFlow`] is a read-only graph over the same block
//! ids holding the real edges plus one *exceptional edge* from each protected
//! block to the flow target of every region enclosing it.
//!
//! The view is a snapshot: it copies adjacency out of the flow graph so the
//! builder can keep annotating the graph mutably while analyses walk the view.

use crate::{
    analysis::cfg::{BlockId, FlowGraph},
    utils::graph::{GraphBase, NodeId, Predecessors, RootedGraph, Successors},
};

/// Real edges plus block-to-handler edges, as an owned adjacency snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionalFlow {
    entry: BlockId,
    /// Real successors followed by exceptional ones, per block
    succs: Vec<Vec<BlockId>>,
    /// Number of leading real successors in each `succs` list
    real_succs: Vec<usize>,
    /// Predecessors over both kinds of edge, per block
    preds: Vec<Vec<BlockId>>,
}

impl ExceptionalFlow {
    /// Builds the view of `graph`.
    #[must_use]
    pub fn new(graph: &FlowGraph) -> Self {
        let n = graph.block_count();
        let mut succs: Vec<Vec<BlockId>> = vec![Vec::new(); n];
        let mut real_succs = vec![0; n];
        let mut preds: Vec<Vec<BlockId>> = vec![Vec::new(); n];

        for block in graph.block_ids() {
            for succ in graph.successors(block) {
                succs[block.index()].push(succ);
                preds[succ.index()].push(block);
            }
            real_succs[block.index()] = succs[block.index()].len();

            for target in graph.exceptional_targets(block) {
                if !succs[block.index()][real_succs[block.index()]..].contains(&target) {
                    succs[block.index()].push(target);
                    preds[target.index()].push(block);
                }
            }
        }

        ExceptionalFlow {
            entry: graph.entry(),
            succs,
            real_succs,
            preds,
        }
    }

    /// Returns the successors reached by exceptional edges only.
    #[must_use]
    pub fn exceptional_successors(&self, block: BlockId) -> &[BlockId] {
        match self.succs.get(block.index()) {
            Some(succs) => &succs[self.real_succs[block.index()]..],
            None => &[],
        }
    }

    /// Returns the successors reached by real edges only.
    #[must_use]
    pub fn real_successors(&self, block: BlockId) -> &[BlockId] {
        match self.succs.get(block.index()) {
            Some(succs) => &succs[..self.real_succs[block.index()]],
            None => &[],
        }
    }
}

impl GraphBase for ExceptionalFlow {
    fn node_count(&self) -> usize {
        self.succs.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.succs.len()).map(NodeId::new)
    }
}

impl Successors for ExceptionalFlow {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.succs[node.index()].iter().copied()
    }
}

impl Predecessors for ExceptionalFlow {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.preds[node.index()].iter().copied()
    }
}

impl RootedGraph for ExceptionalFlow {
    fn entry(&self) -> NodeId {
        self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::cfg::{BasicBlock, ExceptionRegion, FlowEdgeKind, RegionKind},
        utils::graph::algorithms::compute_dominators_rooted,
    };

    #[test]
    fn test_handler_is_reachable_in_view() {
        // entry -> try -> exit, handler -> exit, handler only reachable exceptionally
        let mut graph = FlowGraph::new(Vec::new());
        let entry = graph.add_block(BasicBlock::new());
        let try_block = graph.add_block(BasicBlock::new());
        let handler = graph.add_block(BasicBlock::new());
        let exit = graph.add_block(BasicBlock::new());
        graph.add_edge(entry, try_block, FlowEdgeKind::Unconditional).unwrap();
        graph.add_edge(try_block, exit, FlowEdgeKind::Leave).unwrap();
        graph.add_edge(handler, exit, FlowEdgeKind::Leave).unwrap();
        let region = graph
            .add_region(ExceptionRegion::new(RegionKind::Catch, try_block, handler))
            .unwrap();
        graph.protect(try_block, region).unwrap();

        let view = ExceptionalFlow::new(&graph);
        assert_eq!(view.real_successors(try_block), &[exit]);
        assert_eq!(view.exceptional_successors(try_block), &[handler]);
        assert_eq!(view.predecessors(handler).collect::<Vec<_>>(), vec![try_block]);

        let dom = compute_dominators_rooted(&view);
        assert!(dom.is_reachable(handler));
        assert_eq!(dom.immediate_dominator(handler), Some(try_block));
        assert_eq!(dom.immediate_dominator(exit), Some(try_block));
    }

    #[test]
    fn test_nested_regions_add_one_edge_each() {
        let mut graph = FlowGraph::new(Vec::new());
        let entry = graph.add_block(BasicBlock::new());
        let inner_try = graph.add_block(BasicBlock::new());
        let inner_handler = graph.add_block(BasicBlock::new());
        let outer_handler = graph.add_block(BasicBlock::new());
        graph.add_edge(entry, inner_try, FlowEdgeKind::Unconditional).unwrap();

        let outer = graph
            .add_region(ExceptionRegion::new(RegionKind::Fault, inner_try, outer_handler))
            .unwrap();
        let inner = graph
            .add_region(
                ExceptionRegion::new(RegionKind::Catch, inner_try, inner_handler).within(outer),
            )
            .unwrap();
        graph.protect(inner_try, inner).unwrap();
        graph.protect(inner_handler, outer).unwrap();

        let view = ExceptionalFlow::new(&graph);
        assert_eq!(
            view.exceptional_successors(inner_try),
            &[inner_handler, outer_handler]
        );
        assert_eq!(view.exceptional_successors(inner_handler), &[outer_handler]);
        assert!(view.exceptional_successors(entry).is_empty());
    }
}

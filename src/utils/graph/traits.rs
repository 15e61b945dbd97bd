//! Trait definitions for graph abstractions.
//!
//! Graph algorithms in [`algorithms`](crate::utils::graph::algorithms) are written
//! against these traits instead of a concrete graph type. The SSA builder relies on
//! this to run the dominator and frontier computations over an *exceptional-flow
//! view* of a flow graph (real edges plus implicit edges into exception handlers)
//! without ever materialising those implicit edges in the graph itself.
//!
//! - [`GraphBase`] - Node count and node iteration
//! - [`Successors`] - Forward edge traversal
//! - [`Predecessors`] - Backward edge traversal
//! - [`RootedGraph`] - Graphs with a designated entry node

use crate::utils::graph::NodeId;

/// Base trait providing core graph properties.
pub trait GraphBase {
    /// Returns the number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns an iterator over all node identifiers in ascending index order.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support forward edge traversal.
pub trait Successors: GraphBase {
    /// Returns an iterator over the successor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `v` is a successor of `u`. Parallel edges
    /// yield the successor once per edge.
    ///
    /// # Panics
    ///
    /// May panic if `node` is not a valid node in the graph.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support backward edge traversal.
pub trait Predecessors: GraphBase {
    /// Returns an iterator over the predecessor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `u` is a predecessor of `v`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is not a valid node in the graph.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs with a designated entry (root) node.
///
/// Dominator computation is only meaningful relative to a root; nodes that cannot be
/// reached from [`entry`](RootedGraph::entry) have no dominator.
pub trait RootedGraph: Successors + Predecessors {
    /// Returns the entry (root) node of the graph.
    fn entry(&self) -> NodeId;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Edge-list graph, just enough to exercise the default trait plumbing
    struct EdgeList {
        node_count: usize,
        edges: Vec<(NodeId, NodeId)>,
        entry: NodeId,
    }

    impl GraphBase for EdgeList {
        fn node_count(&self) -> usize {
            self.node_count
        }

        fn node_ids(&self) -> impl Iterator<Item = NodeId> {
            (0..self.node_count).map(NodeId::new)
        }
    }

    impl Successors for EdgeList {
        fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(src, _)| *src == node)
                .map(|(_, dst)| *dst)
        }
    }

    impl Predecessors for EdgeList {
        fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.edges
                .iter()
                .filter(move |(_, dst)| *dst == node)
                .map(|(src, _)| *src)
        }
    }

    impl RootedGraph for EdgeList {
        fn entry(&self) -> NodeId {
            self.entry
        }
    }

    #[test]
    fn test_adjacency_through_traits() {
        let graph = EdgeList {
            node_count: 4,
            edges: vec![
                (NodeId::new(0), NodeId::new(1)),
                (NodeId::new(0), NodeId::new(2)),
                (NodeId::new(1), NodeId::new(3)),
                (NodeId::new(2), NodeId::new(3)),
            ],
            entry: NodeId::new(0),
        };

        assert_eq!(graph.node_ids().count(), 4);
        assert_eq!(graph.entry(), NodeId::new(0));

        let succ: Vec<NodeId> = graph.successors(NodeId::new(0)).collect();
        assert_eq!(succ, vec![NodeId::new(1), NodeId::new(2)]);

        let pred: Vec<NodeId> = graph.predecessors(NodeId::new(3)).collect();
        assert_eq!(pred, vec![NodeId::new(1), NodeId::new(2)]);
        assert!(graph.predecessors(NodeId::new(0)).next().is_none());
    }
}

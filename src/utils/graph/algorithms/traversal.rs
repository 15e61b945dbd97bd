//! Graph traversal orders.
//!
//! - [`dfs`] - Iterative depth-first search (pre-order), lazily evaluated
//! - [`postorder`] - Depth-first post-order of everything reachable from a start node
//! - [`reverse_postorder`] - Reverse post-order, the iteration order of forward
//!   data-flow problems and of the iterative dominator algorithm
//!
//! All traversals are iterative so that very long block chains cannot exhaust the
//! native stack, and all of them follow successors in adjacency order so results are
//! deterministic for a given graph.

use crate::utils::graph::{NodeId, Successors};

/// Depth-first search iterator over graph nodes.
///
/// Visits each node reachable from the start node exactly once, in pre-order.
pub struct DfsIterator<'g, G: Successors> {
    graph: &'g G,
    stack: Vec<NodeId>,
    visited: Vec<bool>,
}

impl<'g, G: Successors> DfsIterator<'g, G> {
    fn new(graph: &'g G, start: NodeId) -> Self {
        let node_count = graph.node_count();
        if start.index() >= node_count {
            return DfsIterator {
                graph,
                stack: Vec::new(),
                visited: Vec::new(),
            };
        }

        let mut visited = vec![false; node_count];
        visited[start.index()] = true;

        DfsIterator {
            graph,
            stack: vec![start],
            visited,
        }
    }
}

impl<G: Successors> Iterator for DfsIterator<'_, G> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        // Reverse push so successors pop in adjacency order
        let successors: Vec<NodeId> = self.graph.successors(node).collect();
        for &succ in successors.iter().rev() {
            if !self.visited[succ.index()] {
                self.visited[succ.index()] = true;
                self.stack.push(succ);
            }
        }

        Some(node)
    }
}

/// Returns a depth-first search iterator starting from the given node.
///
/// Nodes not reachable from `start` are not visited. An out-of-range start node
/// yields an empty iterator.
///
/// # Complexity
///
/// - Time: O(V + E)
/// - Space: O(V)
pub fn dfs<G: Successors>(graph: &G, start: NodeId) -> DfsIterator<'_, G> {
    DfsIterator::new(graph, start)
}

/// Computes the postorder traversal of nodes reachable from `start`.
///
/// A node is emitted only after every successor reached through it has been emitted.
///
/// # Examples
///
/// ```rust,ignore
/// use jitssa::utils::graph::{DirectedGraph, algorithms::postorder};
///
/// let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
/// let a = graph.add_node("A");
/// let b = graph.add_node("B");
/// let c = graph.add_node("C");
/// graph.add_edge(a, b, ())?;
/// graph.add_edge(b, c, ())?;
///
/// assert_eq!(postorder(&graph, a), vec![c, b, a]);
/// # Ok::<(), jitssa::Error>(())
/// ```
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();
    if start.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut result = Vec::with_capacity(node_count);

    // Each frame holds the node and its not-yet-explored successors. Successors are
    // collected eagerly so the frame does not borrow the graph across iterations.
    let mut stack: Vec<(NodeId, std::vec::IntoIter<NodeId>)> = Vec::new();
    visited[start.index()] = true;
    stack.push((start, graph.successors(start).collect::<Vec<_>>().into_iter()));

    while let Some((node, successors)) = stack.last_mut() {
        match successors.find(|succ| !visited[succ.index()]) {
            Some(succ) => {
                visited[succ.index()] = true;
                let next = graph.successors(succ).collect::<Vec<_>>().into_iter();
                stack.push((succ, next));
            }
            None => {
                result.push(*node);
                stack.pop();
            }
        }
    }

    result
}

/// Computes the reverse postorder traversal of nodes reachable from `start`.
///
/// In reverse postorder every node precedes its successors except along back edges,
/// which is what makes it the preferred order for forward data-flow fixpoints.
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut result = postorder(graph, start);
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use crate::utils::graph::{
        algorithms::traversal::{dfs, postorder, reverse_postorder},
        DirectedGraph, NodeId,
    };

    fn create_diamond_graph() -> DirectedGraph<&'static str, ()> {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node("A");
        let b = graph.add_node("B");
        let c = graph.add_node("C");
        let d = graph.add_node("D");
        graph.add_edge(a, b, ()).unwrap();
        graph.add_edge(a, c, ()).unwrap();
        graph.add_edge(b, d, ()).unwrap();
        graph.add_edge(c, d, ()).unwrap();
        graph
    }

    #[test]
    fn test_dfs_preorder() {
        let graph = create_diamond_graph();
        let order: Vec<NodeId> = dfs(&graph, NodeId::new(0)).collect();
        assert_eq!(
            order,
            vec![NodeId::new(0), NodeId::new(1), NodeId::new(3), NodeId::new(2)]
        );
    }

    #[test]
    fn test_dfs_invalid_start() {
        let graph = create_diamond_graph();
        assert_eq!(dfs(&graph, NodeId::new(42)).count(), 0);
    }

    #[test]
    fn test_postorder_diamond() {
        let graph = create_diamond_graph();
        let order = postorder(&graph, NodeId::new(0));
        // D finishes first, A last
        assert_eq!(
            order,
            vec![NodeId::new(3), NodeId::new(1), NodeId::new(2), NodeId::new(0)]
        );
    }

    #[test]
    fn test_reverse_postorder_with_back_edge() {
        // A -> B -> C -> B (loop), C -> D
        let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
        let a = graph.add_node("A");
        let b = graph.add_node("B");
        let c = graph.add_node("C");
        let d = graph.add_node("D");
        graph.add_edge(a, b, ()).unwrap();
        graph.add_edge(b, c, ()).unwrap();
        graph.add_edge(c, b, ()).unwrap();
        graph.add_edge(c, d, ()).unwrap();

        assert_eq!(reverse_postorder(&graph, a), vec![a, b, c, d]);
    }

    #[test]
    fn test_traversal_skips_unreachable() {
        let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
        let a = graph.add_node("A");
        let b = graph.add_node("B");
        let orphan = graph.add_node("orphan");
        graph.add_edge(a, b, ()).unwrap();
        graph.add_edge(orphan, b, ()).unwrap();

        let order = reverse_postorder(&graph, a);
        assert_eq!(order, vec![a, b]);
        assert!(!order.contains(&orphan));
    }

    #[test]
    fn test_postorder_long_chain_is_iterative() {
        let mut graph: DirectedGraph<(), ()> = DirectedGraph::new();
        let mut prev = graph.add_node(());
        let first = prev;
        for _ in 0..100_000 {
            let next = graph.add_node(());
            graph.add_edge(prev, next, ()).unwrap();
            prev = next;
        }
        let order = postorder(&graph, first);
        assert_eq!(order.len(), 100_001);
        assert_eq!(order[0], prev);
    }
}

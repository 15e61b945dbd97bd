//! Dominator tree and dominance frontier computation.
//!
//! # Theory
//!
//! A node `d` **dominates** a node `n` if every path from the entry node to `n`
//! must pass through `d`. The **immediate dominator** of `n` (idom(n)) is the
//! unique node that strictly dominates `n` but does not strictly dominate any
//! other dominator of `n`. Making every node's immediate dominator its parent
//! yields the dominator tree, rooted at the entry.
//!
//! The **dominance frontier** DF(b) is the set of nodes `w` such that `b`
//! dominates a predecessor of `w` but does not strictly dominate `w`. These are
//! exactly the join points where a definition made in `b` meets competing
//! definitions, which is why SSA construction places phi nodes there.
//!
//! # Algorithm
//!
//! Immediate dominators are computed with the iterative algorithm of Cooper,
//! Harvey and Kennedy ("A Simple, Fast Dominance Algorithm"): nodes are visited
//! in reverse postorder and each node's idom is refined to the nearest common
//! ancestor (the *intersection*) of its already-processed predecessors, until a
//! full pass changes nothing. Intersection walks two fingers up the current idom
//! chains, always advancing the finger with the larger reverse-postorder number.
//!
//! Frontiers use the join-point formulation of the same paper: for every node
//! with at least two predecessors, each predecessor climbs the dominator tree
//! until it reaches the node's immediate dominator, adding the node to the
//! frontier of every block it passes.
//!
//! Nodes that are unreachable from the entry are not part of the tree: they have
//! no immediate dominator, dominate nothing, and have empty frontiers.

use crate::utils::graph::{
    algorithms::traversal::reverse_postorder, NodeId, Predecessors, RootedGraph, Successors,
};

/// Marker for nodes without a reverse-postorder number (unreachable nodes).
const UNNUMBERED: usize = usize::MAX;

/// Result of dominator tree computation.
///
/// Besides the tree itself, the result keeps the reverse-postorder numbering it
/// was computed from so that later passes (loop detection, value numbering, the
/// SSA rename walk) can reuse it instead of recomputing it.
///
/// # Examples
///
/// ```rust,ignore
/// use jitssa::utils::graph::{DirectedGraph, algorithms::compute_dominators};
///
/// // entry -> a -> b
/// let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
/// let entry = graph.add_node("entry");
/// let a = graph.add_node("a");
/// let b = graph.add_node("b");
/// graph.add_edge(entry, a, ())?;
/// graph.add_edge(a, b, ())?;
///
/// let dom_tree = compute_dominators(&graph, entry);
/// assert!(dom_tree.dominates(entry, b));
/// assert_eq!(dom_tree.immediate_dominator(b), Some(a));
/// # Ok::<(), jitssa::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorTree {
    /// The entry (root) node of the dominator tree
    entry: NodeId,
    /// Immediate dominator per node; `None` for the entry and for unreachable nodes
    idom: Vec<Option<NodeId>>,
    /// Dominator-tree children per node, in ascending node order
    children: Vec<Vec<NodeId>>,
    /// Reachable nodes in reverse postorder
    rpo: Vec<NodeId>,
    /// Position of each node in `rpo`, `UNNUMBERED` if unreachable
    rpo_number: Vec<usize>,
}

impl DominatorTree {
    /// Returns the entry (root) node of the dominator tree.
    #[inline]
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the immediate dominator of a node.
    ///
    /// `None` for the entry node and for nodes unreachable from the entry.
    ///
    /// # Panics
    ///
    /// Panics if the node index is out of bounds.
    #[inline]
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.idom[node.index()]
    }

    /// Returns `true` if `node` is reachable from the entry.
    #[inline]
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.rpo_number
            .get(node.index())
            .is_some_and(|&n| n != UNNUMBERED)
    }

    /// Checks if node `a` dominates node `b`.
    ///
    /// A reachable node dominates itself. Unreachable nodes neither dominate nor
    /// are dominated by anything.
    ///
    /// # Complexity
    ///
    /// O(depth) where depth is the depth of `b` in the dominator tree.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if !self.is_reachable(a) || !self.is_reachable(b) {
            return false;
        }

        let mut current = Some(b);
        while let Some(node) = current {
            if node == a {
                return true;
            }
            current = self.idom[node.index()];
        }
        false
    }

    /// Checks if node `a` strictly dominates node `b` (dominates and `a != b`).
    #[inline]
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Returns an iterator over all dominators of a node, from the node itself
    /// up to (and including) the entry node.
    ///
    /// Yields nothing for unreachable nodes.
    pub fn dominators(&self, node: NodeId) -> DominatorIterator<'_> {
        DominatorIterator {
            tree: self,
            current: self.is_reachable(node).then_some(node),
        }
    }

    /// Returns the depth of a node in the dominator tree (the entry has depth 0).
    #[must_use]
    pub fn depth(&self, node: NodeId) -> usize {
        self.dominators(node).count().saturating_sub(1)
    }

    /// Returns the dominator-tree children of a node, in ascending node order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.children[node.index()]
    }

    /// Returns the number of nodes of the graph the tree was computed for.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.idom.len()
    }

    /// Returns the reachable nodes in the reverse postorder used for the computation.
    #[must_use]
    pub fn reverse_postorder(&self) -> &[NodeId] {
        &self.rpo
    }

    /// Returns the reverse-postorder number of a node, `None` if it is unreachable.
    #[must_use]
    pub fn rpo_number(&self, node: NodeId) -> Option<usize> {
        self.rpo_number
            .get(node.index())
            .copied()
            .filter(|&n| n != UNNUMBERED)
    }

    /// Returns the nodes of the dominator tree in pre-order (parents before children,
    /// siblings in ascending node order).
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.rpo.len());
        if self.node_count() == 0 {
            return order;
        }
        let mut stack = vec![self.entry];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        order
    }
}

/// Iterator over dominators of a node, from the node up to the entry.
pub struct DominatorIterator<'a> {
    tree: &'a DominatorTree,
    current: Option<NodeId>,
}

impl Iterator for DominatorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = self.tree.idom[node.index()];
        Some(node)
    }
}

/// Computes the dominator tree of `graph` rooted at `entry`.
///
/// # Arguments
///
/// * `graph` - The graph to analyse
/// * `entry` - The root node; nodes not reachable from it get no dominator
///
/// # Complexity
///
/// O(N * E) in the worst case, close to linear on the reducible graphs compilers
/// usually see, where the fixpoint settles after two or three passes.
pub fn compute_dominators<G>(graph: &G, entry: NodeId) -> DominatorTree
where
    G: Successors + Predecessors,
{
    let n = graph.node_count();
    if entry.index() >= n {
        return DominatorTree {
            entry,
            idom: vec![None; n],
            children: vec![Vec::new(); n],
            rpo: Vec::new(),
            rpo_number: vec![UNNUMBERED; n],
        };
    }

    let rpo = reverse_postorder(graph, entry);
    let mut rpo_number = vec![UNNUMBERED; n];
    for (number, node) in rpo.iter().enumerate() {
        rpo_number[node.index()] = number;
    }

    // During the fixpoint the entry is its own idom, which terminates every finger walk.
    let mut idom: Vec<Option<NodeId>> = vec![None; n];
    idom[entry.index()] = Some(entry);

    let mut changed = true;
    while changed {
        changed = false;
        for &node in rpo.iter().skip(1) {
            let mut new_idom: Option<NodeId> = None;
            for pred in graph.predecessors(node) {
                if rpo_number[pred.index()] == UNNUMBERED || idom[pred.index()].is_none() {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => pred,
                    Some(current) => intersect(&idom, &rpo_number, pred, current),
                });
            }

            if new_idom.is_some() && idom[node.index()] != new_idom {
                idom[node.index()] = new_idom;
                changed = true;
            }
        }
    }

    idom[entry.index()] = None;

    let mut children = vec![Vec::new(); n];
    for (index, parent) in idom.iter().enumerate() {
        if let Some(parent) = parent {
            children[parent.index()].push(NodeId::new(index));
        }
    }

    DominatorTree {
        entry,
        idom,
        children,
        rpo,
        rpo_number,
    }
}

/// Computes the dominator tree of a rooted graph from its own entry node.
pub fn compute_dominators_rooted<G: RootedGraph>(graph: &G) -> DominatorTree {
    compute_dominators(graph, graph.entry())
}

/// Walks two fingers up the partial dominator tree until they meet.
///
/// Both inputs must already have an idom; every node on their chains was processed
/// earlier in reverse postorder and so has one too, ending at the self-dominating entry.
fn intersect(idom: &[Option<NodeId>], rpo_number: &[usize], a: NodeId, b: NodeId) -> NodeId {
    let mut finger1 = a;
    let mut finger2 = b;
    while finger1 != finger2 {
        while rpo_number[finger1.index()] > rpo_number[finger2.index()] {
            match idom[finger1.index()] {
                Some(parent) => finger1 = parent,
                None => return finger2,
            }
        }
        while rpo_number[finger2.index()] > rpo_number[finger1.index()] {
            match idom[finger2.index()] {
                Some(parent) => finger2 = parent,
                None => return finger1,
            }
        }
    }
    finger1
}

/// Computes the dominance frontier of every node.
///
/// The result is indexed by node; each frontier lists its members once, in the
/// order they were discovered. Unreachable nodes, and predecessors that are
/// unreachable, contribute nothing.
///
/// # Examples
///
/// ```rust,ignore
/// use jitssa::utils::graph::{
///     algorithms::{compute_dominance_frontiers, compute_dominators},
///     DirectedGraph,
/// };
///
/// let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
/// let entry = graph.add_node("entry");
/// let left = graph.add_node("left");
/// let right = graph.add_node("right");
/// let join = graph.add_node("join");
/// graph.add_edge(entry, left, ())?;
/// graph.add_edge(entry, right, ())?;
/// graph.add_edge(left, join, ())?;
/// graph.add_edge(right, join, ())?;
///
/// let dom_tree = compute_dominators(&graph, entry);
/// let frontiers = compute_dominance_frontiers(&graph, &dom_tree);
/// assert_eq!(frontiers[left.index()], vec![join]);
/// # Ok::<(), jitssa::Error>(())
/// ```
pub fn compute_dominance_frontiers<G>(graph: &G, dom_tree: &DominatorTree) -> Vec<Vec<NodeId>>
where
    G: Predecessors,
{
    let n = graph.node_count();
    let mut frontiers: Vec<Vec<NodeId>> = vec![Vec::new(); n];

    for &node in dom_tree.reverse_postorder() {
        if graph.predecessors(node).nth(1).is_none() {
            continue; // Not a join point
        }

        let idom_node = dom_tree.immediate_dominator(node);
        for pred in graph.predecessors(node) {
            if !dom_tree.is_reachable(pred) {
                continue;
            }

            let mut runner = Some(pred);
            while let Some(current) = runner {
                if Some(current) == idom_node {
                    break;
                }
                // Frontier entries for `node` are added consecutively, so a repeat
                // visit always finds `node` at the end of the list.
                let frontier = &mut frontiers[current.index()];
                if frontier.last() != Some(&node) {
                    frontier.push(node);
                }
                runner = dom_tree.immediate_dominator(current);
            }
        }
    }

    frontiers
}

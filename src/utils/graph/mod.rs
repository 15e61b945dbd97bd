//! Generic directed graph infrastructure.
//!
//! This module provides the graph substrate the SSA builder runs on: strongly-typed
//! node and edge identifiers, a vector-backed [`DirectedGraph`], a small set of traits
//! that let algorithms work over any adjacency source, and the algorithms themselves
//! (traversal orders and dominator computation).
//!
//! # Design Principles
//!
//! ## Index Ownership
//!
//! Nodes, edges and every per-node analysis result live in dense vectors addressed by
//! [`NodeId`] / [`EdgeId`]. There are no pointer-linked structures, so results such as
//! the dominator tree can be handed to later passes without copying or lifetimes.
//!
//! ## Views Instead of Mutation
//!
//! Algorithms only require the [`Successors`] / [`Predecessors`] traits. Callers that
//! need extra, implicit edges (exception handler entries, for instance) wrap a graph in
//! a view that adds them, leaving the real edge set untouched.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use jitssa::utils::graph::{algorithms, DirectedGraph};
//!
//! // Diamond: A -> B, A -> C, B -> D, C -> D
//! let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
//! let a = graph.add_node("A");
//! let b = graph.add_node("B");
//! let c = graph.add_node("C");
//! let d = graph.add_node("D");
//! graph.add_edge(a, b, ())?;
//! graph.add_edge(a, c, ())?;
//! graph.add_edge(b, d, ())?;
//! graph.add_edge(c, d, ())?;
//!
//! let dom = algorithms::compute_dominators(&graph, a);
//! assert_eq!(dom.immediate_dominator(d), Some(a));
//! # Ok::<(), jitssa::Error>(())
//! ```

mod directed;
mod edge;
mod node;
mod traits;

pub mod algorithms;

pub use directed::DirectedGraph;
pub use edge::EdgeId;
pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};

//! Graph algorithms for program analysis.
//!
//! ## Traversal
//!
//! - [`dfs`] - Depth-first search traversal
//! - [`postorder`] - Postorder traversal
//! - [`reverse_postorder`] - Reverse postorder traversal (forward data flow, dominators)
//!
//! ## Dominator Analysis
//!
//! - [`compute_dominators`] - Iterative (Cooper-Harvey-Kennedy) dominator tree
//! - [`compute_dominance_frontiers`] - Dominance frontiers for phi placement
//! - [`DominatorTree`] - Result of dominator computation
//!
//! | Algorithm | Time Complexity | Use Case |
//! |-----------|-----------------|----------|
//! | DFS / postorder | O(V + E) | General traversal, block ordering |
//! | Dominators | O(V * E) worst, ~O(V + E) typical | SSA construction, loop analysis |
//! | Dominance frontiers | O(V + E + size of result) | Phi placement |

mod dominators;
mod traversal;

pub use dominators::{
    compute_dominance_frontiers, compute_dominators, compute_dominators_rooted,
    DominatorIterator, DominatorTree,
};
pub use traversal::{dfs, postorder, reverse_postorder, DfsIterator};

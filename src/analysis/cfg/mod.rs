//! Flow graph model consumed by the SSA builder.
//!
//! This module provides the method representation an importer hands to
//! [`SsaBuilder`](crate::analysis::ssa::SsaBuilder): basic blocks of variable
//! accesses, real control flow edges, and exception regions.
//!
//! # Architecture
//!
//! The flow graph builds upon the generic [`crate::utils::graph::DirectedGraph`]
//! infrastructure. Blocks are graph nodes, so a [`BlockId`] is a
//! [`NodeId`](crate::utils::graph::NodeId) and every per-block analysis result is a
//! dense vector indexed by it.
//!
//! # Key Components
//!
//! - [`FlowGraph`] - Blocks, edges, regions, locals and the phi arena of one method
//! - [`BasicBlock`] - Ordered [`Operation`]s plus SSA annotations
//! - [`ExceptionRegion`] - A protected range with its handler (and filter)
//! - [`ExceptionalFlow`] - Real edges plus implicit edges into handlers
//! - [`IndirectDefs`] - Which local an indirect store writes
//!
//! # Exceptional Flow
//!
//! Handlers are not connected to their try by edges. Analyses that must treat
//! handlers as reachable (dominators, frontiers, liveness) run over
//! [`ExceptionalFlow`]; phi argument slots are reserved for real edges only.

mod block;
mod edge;
mod graph;
mod operation;
mod region;
mod view;

pub use block::BasicBlock;
pub use edge::{FlowEdge, FlowEdgeKind};
pub use graph::{FlowGraph, RegionChain};
pub use operation::{IndirectDefs, OpKind, OpRef, OpTarget, Operation};
pub use region::{ExceptionRegion, RegionId, RegionKind};
pub use view::ExceptionalFlow;

/// Blocks are the nodes of the flow graph.
pub type BlockId = crate::utils::graph::NodeId;

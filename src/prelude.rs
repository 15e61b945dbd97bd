//! # jitssa Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of
//! the library. Import it to get quick access to everything needed to describe a
//! method and build its SSA form.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jitssa operations
pub use crate::Error;

/// The result type used throughout jitssa
pub use crate::Result;

// ================================================================================================
// Flow Graph
// ================================================================================================

/// Blocks, edges, operations and exception regions
pub use crate::analysis::cfg::{
    BasicBlock, BlockId, ExceptionRegion, ExceptionalFlow, FlowEdgeKind, FlowGraph, OpKind, OpRef,
    OpTarget, Operation, RegionId, RegionKind,
};

// ================================================================================================
// SSA Construction
// ================================================================================================

/// Variables and SSA numbers
pub use crate::analysis::ssa::{LocalFlags, LocalId, LocalVar, SsaName, SsaNum, Variable};

/// The builder, its context and its result
pub use crate::analysis::ssa::{
    DefSite, PhiPlacement, SsaBuilder, SsaConfig, SsaContext, SsaForm, SsaStats,
};

/// Phi nodes and the rename walk hooks
pub use crate::analysis::ssa::{PhiArg, PhiId, PhiNode, RenameObserver, RenameStacks};

/// Consistency checks of a finished build
pub use crate::analysis::ssa::{verify, SsaViolation};

// ================================================================================================
// Graph Infrastructure
// ================================================================================================

/// Dominator tree and graph identifiers
pub use crate::utils::graph::{algorithms::DominatorTree, EdgeId, NodeId};

// ================================================================================================
// Driver
// ================================================================================================

/// Parallel compilation
pub use crate::driver::{compile_all, compile_method, Tier};

//! Program analysis infrastructure of the JIT front half.
//!
//! This module builds upon the generic graph infrastructure in
//! [`crate::utils::graph`] to provide the flow graph model and SSA construction.
//!
//! # Architecture
//!
//! - [`cfg`] - Flow graph: blocks, edges, exception regions, exceptional-flow view
//! - [`ssa`] - SSA construction over a [`cfg::FlowGraph`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use jitssa::analysis::{cfg::FlowGraph, ssa::{SsaBuilder, SsaContext}};
//!
//! let mut ctx = SsaContext::default();
//! let form = SsaBuilder::new(&mut ctx, &mut graph).build()?;
//!
//! // Dominator tree of the exceptional-flow view
//! assert!(form.dominators().dominates(graph.entry(), some_block));
//! ```

pub mod cfg;
pub mod ssa;

pub use cfg::{BasicBlock, BlockId, ExceptionRegion, FlowEdgeKind, FlowGraph, Operation};
pub use ssa::{SsaBuilder, SsaConfig, SsaContext, SsaForm, Variable};

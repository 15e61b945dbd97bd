// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # jitssa
//!
//! SSA construction for a method-at-a-time JIT compiler: dominators, dominance
//! frontiers, phi placement and variable renaming over a flow graph with
//! exception-handling regions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jitssa::prelude::*;
//!
//! // V00 is a parameter, V01 a temporary
//! let mut graph = FlowGraph::new(vec![LocalVar::param(), LocalVar::temp()]);
//! let entry = graph.add_block(BasicBlock::with_ops(vec![
//!     Operation::use_of(Variable::local(0)),
//!     Operation::def_of(Variable::local(1)),
//! ]));
//! let exit = graph.add_block(BasicBlock::with_ops(vec![Operation::use_of(Variable::local(1))]));
//! graph.add_edge(entry, exit, FlowEdgeKind::Unconditional)?;
//!
//! let mut ctx = SsaContext::new(SsaConfig::default());
//! let form = SsaBuilder::new(&mut ctx, &mut graph).build()?;
//! assert_eq!(graph.block(exit).unwrap().ops()[0].use_num(), SsaNum::FIRST);
//! # Ok::<(), jitssa::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`analysis::cfg`] - The flow graph: blocks of variable accesses, edges, exception regions
//! - [`analysis::ssa`] - Dominance frontiers, phi insertion, renaming, handler propagation
//! - [`utils::graph`] - Generic directed graph, traversals and the dominator tree
//! - [`driver`] - Compiling many methods in parallel, one context per method
//! - [`Error`] and [`Result`] - Internal compiler errors and out-of-memory
//!
//! ## Phases
//!
//! 1. An exceptional-flow view adds implicit edges from protected blocks to their
//!    handlers, so handlers are reachable for every analysis.
//! 2. Immediate dominators come from the iterative algorithm of Cooper, Harvey
//!    and Kennedy over reverse postorder.
//! 3. Phis go to the iterated dominance frontier of each variable's definitions
//!    and to the handlers of protected definitions.
//! 4. A preorder walk of the dominator tree renames definitions and uses, fills
//!    phi slots of successors, and feeds handler phis.
//!
//! ## Logging
//!
//! Phases report through the [`log`] facade: `debug!` for per-method summaries,
//! `trace!` for individual phis and definitions, `warn!` from the driver when a
//! method falls back to a lower tier. Install any `log` implementation to see them.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,ignore
/// use jitssa::prelude::*;
///
/// let mut ctx = SsaContext::new(SsaConfig::default().with_placement(PhiPlacement::Pruned));
/// let form = SsaBuilder::new(&mut ctx, &mut graph).build()?;
/// ```
pub mod prelude;

/// Flow graph model and SSA construction.
pub mod analysis;

/// Parallel compilation of many methods.
pub mod driver;

/// Shared infrastructure: graphs, bit sets, arenas.
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `jitssa` Error type
///
/// Every error is either an internal compiler error (a bug upstream, the method
/// cannot be compiled) or out-of-memory (retry at a lower tier).
///
/// # Example
///
/// ```rust,ignore
/// use jitssa::{Error, SsaBuilder};
///
/// match SsaBuilder::new(&mut ctx, &mut graph).build() {
///     Ok(form) => println!("{} phis", form.stats().phis),
///     Err(Error::UseBeforeDef { var, block }) => {
///         println!("{var} read in {block} before any write")
///     }
///     Err(e) if e.is_out_of_memory() => println!("fall back"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// The SSA builder and its per-compilation context.
pub use analysis::ssa::{SsaBuilder, SsaConfig, SsaContext, SsaForm};

/// The flow graph handed to the builder.
pub use analysis::cfg::FlowGraph;

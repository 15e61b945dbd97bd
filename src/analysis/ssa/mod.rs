//! Static Single Assignment (SSA) construction.
//!
//! This module turns a [`FlowGraph`](crate::analysis::cfg::FlowGraph) into SSA form
//! in place: every definition of a renamed variable gets its own number, every
//! use is annotated with the number of the one definition that reaches it, and
//! phi nodes merge competing definitions at join points and exception handlers.
//!
//! # Architecture
//!
//! ```text
//! FlowGraph ──► ExceptionalFlow view ──► DominatorTree ──► DominanceFrontiers
//!                                              │                  │
//!                                              ▼                  ▼
//!                                         RenameEngine ◄──── PhiInserter
//!                                              │
//!                                              ▼
//!                                     HandlerPropagator
//! ```
//!
//! # Key Components
//!
//! - [`SsaBuilder`] - Runs every phase for one method
//! - [`SsaContext`] / [`SsaConfig`] - Per-compilation state and tunables
//! - [`SsaForm`] - Dominator tree and definition-site tables of a finished build
//! - [`DominanceFrontiers`] - Frontiers and iterated frontiers
//! - [`Liveness`] - Live-in sets for pruned phi placement and entry definitions
//! - [`PhiNode`] / [`PhiArg`] - Merges at join points and handler entries
//! - [`RenameObserver`] - Hooks into the rename walk
//! - [`verify`] - Re-checks the SSA properties of a finished build
//!
//! # Variables
//!
//! Every tracked local is renamed unless it is address-exposed or untracked. All
//! memory that is not a renamed local is a single [`Variable::Heap`], renamed
//! like any other variable: stores define it, loads use it, and each block
//! records the heap number on entry and exit.
//!
//! # Exception Handling
//!
//! Handlers are entered from anywhere inside their try, so a handler's phis take
//! exceptional arguments: every number a variable held inside the try. These are
//! gathered during renaming by the handler propagator, not from predecessor
//! edges.

mod builder;
mod context;
mod form;
mod frontier;
mod handler;
mod inserter;
mod liveness;
mod phi;
mod rename;
mod variable;
mod verify;

pub use builder::SsaBuilder;
pub use context::{PhiPlacement, SsaConfig, SsaContext};
pub use form::{DefSite, SsaForm, SsaStats};
pub use frontier::DominanceFrontiers;
pub use liveness::Liveness;
pub use phi::{PhiArg, PhiId, PhiNode};
pub use rename::{NoopObserver, RenameObserver, RenameStacks};
pub use variable::{LocalFlags, LocalId, LocalVar, SsaName, SsaNum, Variable};
pub use verify::{verify, SsaViolation};

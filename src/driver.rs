//! Compiling methods in parallel.
//!
//! Each method is built against its own [`SsaContext`], so methods share no
//! mutable state and the driver can hand them to [`rayon`]'s pool directly.
//! Failures are contained per method and mapped to a [`Tier`]:
//!
//! - success yields [`Tier::Optimized`] with the SSA form;
//! - out-of-memory yields [`Tier::Minimal`]: the method should be compiled again
//!   without optimizations;
//! - any other error is an internal compiler error and yields [`Tier::Failed`].
//!
//! # Example
//!
//! ```rust,ignore
//! use jitssa::{driver::{compile_all, Tier}, SsaConfig};
//!
//! let outcomes = compile_all(&mut methods, &SsaConfig::default());
//! let optimized = outcomes.iter().filter(|t| t.is_optimized()).count();
//! ```

use log::{debug, warn};
use rayon::prelude::*;
use strum::EnumIs;

use crate::{
    analysis::{
        cfg::FlowGraph,
        ssa::{SsaBuilder, SsaConfig, SsaContext, SsaForm},
    },
    Error,
};

/// Outcome of compiling one method.
#[derive(Debug, EnumIs)]
pub enum Tier {
    /// SSA construction succeeded.
    Optimized(SsaForm),
    /// SSA construction ran out of memory; compile without optimizations.
    Minimal(Error),
    /// An internal compiler error; the method cannot be compiled.
    Failed(Error),
}

impl Tier {
    /// Returns the SSA form for optimized methods.
    #[must_use]
    pub fn form(&self) -> Option<&SsaForm> {
        match self {
            Tier::Optimized(form) => Some(form),
            Tier::Minimal(_) | Tier::Failed(_) => None,
        }
    }

    /// Returns the error for methods that were not optimized.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Tier::Optimized(_) => None,
            Tier::Minimal(error) | Tier::Failed(error) => Some(error),
        }
    }
}

/// Counts of outcomes over a batch of methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierSummary {
    /// Methods with SSA form
    pub optimized: usize,
    /// Methods to recompile without optimizations
    pub minimal: usize,
    /// Methods that hit an internal compiler error
    pub failed: usize,
}

impl TierSummary {
    /// Tallies a batch of outcomes.
    #[must_use]
    pub fn of(outcomes: &[Tier]) -> Self {
        outcomes
            .iter()
            .fold(TierSummary::default(), |mut summary, tier| {
                match tier {
                    Tier::Optimized(_) => summary.optimized += 1,
                    Tier::Minimal(_) => summary.minimal += 1,
                    Tier::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }
}

/// Builds SSA form for one method with a fresh context.
pub fn compile_method(graph: &mut FlowGraph, config: &SsaConfig) -> Tier {
    let mut ctx = SsaContext::new(config.clone());
    match SsaBuilder::new(&mut ctx, graph).build() {
        Ok(form) => Tier::Optimized(form),
        Err(error) if error.is_out_of_memory() => {
            warn!("SSA out of memory, falling back to minimal tier: {}", error);
            Tier::Minimal(error)
        }
        Err(error) => {
            warn!("SSA internal compiler error: {}", error);
            Tier::Failed(error)
        }
    }
}

/// Builds SSA form for every method in parallel.
///
/// The outcome at index `i` belongs to `graphs[i]`.
pub fn compile_all(graphs: &mut [FlowGraph], config: &SsaConfig) -> Vec<Tier> {
    let outcomes: Vec<Tier> = graphs
        .par_iter_mut()
        .map(|graph| compile_method(graph, config))
        .collect();

    let summary = TierSummary::of(&outcomes);
    debug!(
        "Compiled {} methods: {} optimized, {} minimal, {} failed",
        outcomes.len(),
        summary.optimized,
        summary.minimal,
        summary.failed
    );
    outcomes
}

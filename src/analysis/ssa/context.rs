//! Per-compilation state of the SSA builder.
//!
//! Every method compiles against its own [`SsaContext`]: the configuration, the
//! per-variable SSA number counters and the allocation budget. Nothing is shared
//! between compilations, so any number of methods can be built in parallel with one
//! context each.

use strum::{Display, EnumIter};

use crate::{Error, Result};

use super::SsaNum;

/// Where phi nodes are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum PhiPlacement {
    /// At every block of the iterated dominance frontier of a variable's
    /// definitions, plus the exception handlers of its protected definitions.
    #[default]
    Minimal,
    /// As [`Minimal`](Self::Minimal), restricted to blocks where the variable is
    /// live on entry.
    Pruned,
}

/// Tunables of the SSA builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaConfig {
    /// Phi placement strategy
    pub placement: PhiPlacement,
    /// Whether a store through an address that names a known local also defines
    /// a new heap number
    pub indirect_defs_clobber_heap: bool,
    /// Maximum number of arena entries (phis, phi arguments, definitions) one
    /// build may allocate; `None` for no limit
    pub arena_budget: Option<usize>,
}

impl Default for SsaConfig {
    fn default() -> Self {
        SsaConfig {
            placement: PhiPlacement::Minimal,
            indirect_defs_clobber_heap: true,
            arena_budget: None,
        }
    }
}

impl SsaConfig {
    /// Sets the phi placement strategy.
    #[must_use]
    pub fn with_placement(mut self, placement: PhiPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets whether indirect stores to known locals also clobber the heap.
    #[must_use]
    pub fn with_indirect_heap_clobber(mut self, clobber: bool) -> Self {
        self.indirect_defs_clobber_heap = clobber;
        self
    }

    /// Limits the number of arena entries one build may allocate.
    #[must_use]
    pub fn with_arena_budget(mut self, budget: usize) -> Self {
        self.arena_budget = Some(budget);
        self
    }
}

/// The state one SSA build runs against.
#[derive(Debug, Clone, Default)]
pub struct SsaContext {
    config: SsaConfig,
    /// Last number handed out, per variable slot
    counters: Vec<u32>,
    /// Arena entries charged so far
    charged: usize,
}

impl SsaContext {
    /// Creates a context with the given configuration.
    #[must_use]
    pub fn new(config: SsaConfig) -> Self {
        SsaContext {
            config,
            counters: Vec::new(),
            charged: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SsaConfig {
        &self.config
    }

    /// Returns the number of arena entries charged by the current build.
    #[must_use]
    pub fn charged(&self) -> usize {
        self.charged
    }

    /// Returns how many SSA numbers have been handed out for `slot`.
    #[must_use]
    pub fn numbers_allocated(&self, slot: usize) -> u32 {
        self.counters.get(slot).copied().unwrap_or(0)
    }

    /// Starts a new build over `variable_count` variable slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the counter table cannot be allocated.
    pub(crate) fn reset(&mut self, variable_count: usize) -> Result<()> {
        self.charged = 0;
        self.counters.clear();
        self.counters.try_reserve(variable_count)?;
        self.counters.resize(variable_count, 0);
        Ok(())
    }

    /// Hands out the next SSA number for `slot`, starting at [`SsaNum::FIRST`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the number space of the variable is exhausted.
    pub(crate) fn next_num(&mut self, slot: usize) -> Result<SsaNum> {
        let Some(counter) = self.counters.get_mut(slot) else {
            return Err(malformed_error!("No SSA counter for variable slot {}", slot));
        };
        *counter = counter.checked_add(1).ok_or(Error::OutOfMemory {
            requested: 1,
            budget: 0,
        })?;
        Ok(SsaNum::new(*counter))
    }

    /// Charges `entries` arena entries against the budget.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the charge would exceed
    /// [`SsaConfig::arena_budget`].
    pub(crate) fn charge(&mut self, entries: usize) -> Result<()> {
        let total = self.charged.saturating_add(entries);
        if let Some(budget) = self.config.arena_budget {
            if total > budget {
                return Err(Error::OutOfMemory {
                    requested: entries,
                    budget: budget.saturating_sub(self.charged),
                });
            }
        }
        self.charged = total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_start_at_first() {
        let mut ctx = SsaContext::new(SsaConfig::default());
        ctx.reset(2).unwrap();

        assert_eq!(ctx.next_num(0).unwrap(), SsaNum::FIRST);
        assert_eq!(ctx.next_num(0).unwrap(), SsaNum::new(2));
        assert_eq!(ctx.next_num(1).unwrap(), SsaNum::FIRST);
        assert_eq!(ctx.numbers_allocated(0), 2);
        assert!(ctx.next_num(2).is_err());

        ctx.reset(2).unwrap();
        assert_eq!(ctx.numbers_allocated(0), 0);
        assert_eq!(ctx.next_num(0).unwrap(), SsaNum::FIRST);
    }

    #[test]
    fn test_budget() {
        let mut ctx = SsaContext::new(SsaConfig::default().with_arena_budget(5));
        ctx.reset(1).unwrap();

        ctx.charge(3).unwrap();
        ctx.charge(2).unwrap();
        let err = ctx.charge(1).unwrap_err();
        assert!(err.is_out_of_memory());
        assert!(matches!(
            err,
            Error::OutOfMemory {
                requested: 1,
                budget: 0
            }
        ));
        assert_eq!(ctx.charged(), 5);
    }

    #[test]
    fn test_unlimited_budget() {
        let mut ctx = SsaContext::default();
        ctx.reset(0).unwrap();
        ctx.charge(usize::MAX).unwrap();
        ctx.charge(1).unwrap();
        assert_eq!(ctx.charged(), usize::MAX);
    }

    #[test]
    fn test_config_builders() {
        let config = SsaConfig::default()
            .with_placement(PhiPlacement::Pruned)
            .with_indirect_heap_clobber(false)
            .with_arena_budget(10);
        assert_eq!(config.placement, PhiPlacement::Pruned);
        assert!(!config.indirect_defs_clobber_heap);
        assert_eq!(config.arena_budget, Some(10));
        assert_eq!(PhiPlacement::default().to_string(), "Minimal");
    }
}

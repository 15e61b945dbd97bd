//! The result of an SSA build.
//!
//! Most of the SSA form lives in the flow graph itself: phi nodes in the graph's
//! arena, numbers on the operations, heap numbers and immediate dominators on the
//! blocks. [`SsaForm`] carries what has no natural home there: the dominator
//! tree, the table of where each SSA name is defined, the locals whose values
//! were written through addresses, and the heap numbers of indirect stores.

use std::collections::BTreeMap;

use crate::{
    analysis::{
        cfg::{BlockId, OpRef},
        ssa::{PhiId, SsaName, SsaNum, Variable},
    },
    utils::{graph::algorithms::DominatorTree, BitSet},
};

/// Where an SSA name is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefSite {
    /// The value the variable holds when the method starts (or the
    /// undefined-on-entry value of a variable read on some path before any write).
    Entry,
    /// A phi node.
    Phi {
        /// The block the phi heads
        block: BlockId,
        /// The phi itself
        phi: PhiId,
    },
    /// An operation inside a block.
    Op(OpRef),
}

impl DefSite {
    /// Returns the block containing the definition; `None` for entry values.
    #[must_use]
    pub const fn block(&self) -> Option<BlockId> {
        match self {
            DefSite::Entry => None,
            DefSite::Phi { block, .. } => Some(*block),
            DefSite::Op(op) => Some(op.block),
        }
    }
}

/// Counters describing one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SsaStats {
    /// Blocks reachable in the exceptional-flow view
    pub reachable_blocks: usize,
    /// Blocks of the graph, the synthetic root included
    pub total_blocks: usize,
    /// Phi nodes inserted
    pub phis: usize,
    /// Phi arguments contributed by exceptional flow
    pub exceptional_args: usize,
    /// SSA names defined, entry values and phis included
    pub definitions: usize,
    /// Whether this build added a synthetic root block
    pub synthetic_root: bool,
}

/// The side tables of a finished SSA build.
#[derive(Debug, Clone)]
pub struct SsaForm {
    dominators: DominatorTree,
    local_count: usize,
    /// Per variable slot, the definition of number `n` at index `n - 1`
    defs: Vec<Vec<DefSite>>,
    /// Locals defined through an address
    aliased: BitSet,
    /// Heap numbers defined by indirect stores to known locals
    indirect_heap_defs: BTreeMap<OpRef, SsaNum>,
    /// Slots of the variables defined on entry
    on_entry: BitSet,
    stats: SsaStats,
}

impl SsaForm {
    pub(crate) fn new(
        dominators: DominatorTree,
        local_count: usize,
        defs: Vec<Vec<DefSite>>,
        aliased: BitSet,
        indirect_heap_defs: BTreeMap<OpRef, SsaNum>,
        on_entry: BitSet,
        stats: SsaStats,
    ) -> Self {
        SsaForm {
            dominators,
            local_count,
            defs,
            aliased,
            indirect_heap_defs,
            on_entry,
            stats,
        }
    }

    /// Returns the dominator tree of the exceptional-flow view.
    #[must_use]
    pub fn dominators(&self) -> &DominatorTree {
        &self.dominators
    }

    /// Returns where `var`'s number `num` is defined.
    #[must_use]
    pub fn def_site(&self, var: Variable, num: SsaNum) -> Option<DefSite> {
        let index = (num.value() as usize).checked_sub(1)?;
        self.defs.get(var.slot(self.local_count))?.get(index).copied()
    }

    /// Returns where the given SSA name is defined.
    #[must_use]
    pub fn def_of(&self, name: SsaName) -> Option<DefSite> {
        self.def_site(name.var, name.num)
    }

    /// Returns the number of SSA names defined for `var`.
    #[must_use]
    pub fn def_count(&self, var: Variable) -> usize {
        self.defs.get(var.slot(self.local_count)).map_or(0, Vec::len)
    }

    /// Iterates over the definitions of `var` in number order.
    pub fn defs_of(&self, var: Variable) -> impl Iterator<Item = (SsaNum, DefSite)> + '_ {
        self.defs
            .get(var.slot(self.local_count))
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(index, site)| (SsaNum::new(index as u32 + 1), *site))
    }

    /// Returns `true` if `var` was written through an address somewhere.
    #[must_use]
    pub fn is_aliased(&self, var: Variable) -> bool {
        self.aliased.contains(var.slot(self.local_count))
    }

    /// Iterates over the locals written through an address.
    pub fn aliased(&self) -> impl Iterator<Item = Variable> + '_ {
        let locals = self.local_count;
        self.aliased
            .iter()
            .map(move |slot| Variable::from_slot(slot, locals))
    }

    /// Returns the heap number defined by the indirect store at `op`.
    ///
    /// Only indirect stores to known locals have one, and only when heap clobbering
    /// is enabled; a store without a known target defines the heap through its
    /// ordinary definition number instead.
    #[must_use]
    pub fn indirect_heap_def(&self, op: OpRef) -> Option<SsaNum> {
        self.indirect_heap_defs.get(&op).copied()
    }

    /// Returns `true` if `var` got a definition numbered [`SsaNum::FIRST`] before
    /// the method's first block.
    #[must_use]
    pub fn is_defined_on_entry(&self, var: Variable) -> bool {
        self.on_entry.contains(var.slot(self.local_count))
    }

    /// Returns the build counters.
    #[must_use]
    pub fn stats(&self) -> &SsaStats {
        &self.stats
    }

    /// Consumes the form, keeping only the dominator tree.
    #[must_use]
    pub fn into_dominators(self) -> DominatorTree {
        self.dominators
    }
}

//! Operations: the variable accesses inside a block.
//!
//! The SSA builder does not look at expression trees. An importer lowers each
//! statement to the ordered list of accesses it performs on renameable storage,
//! and the builder annotates every access with the SSA number it reads or writes.
//!
//! An [`OpKind::UseDef`] access models a partial or read-modify-write store: it reads
//! the prior value of its variable and then defines a new one. Its use is always
//! resolved before its definition is pushed, so the two numbers differ.

use std::{collections::BTreeMap, fmt};

use strum::Display;

use crate::analysis::{
    cfg::BlockId,
    ssa::{SsaNum, Variable},
};

/// What an operation does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OpKind {
    /// Reads the current value.
    Use,
    /// Writes a new value.
    Def,
    /// Reads the current value, then writes a new one.
    UseDef,
}

impl OpKind {
    /// Returns `true` if the operation reads its target.
    #[must_use]
    pub const fn reads(self) -> bool {
        matches!(self, OpKind::Use | OpKind::UseDef)
    }

    /// Returns `true` if the operation writes its target.
    #[must_use]
    pub const fn writes(self) -> bool {
        matches!(self, OpKind::Def | OpKind::UseDef)
    }
}

/// The storage an operation accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTarget {
    /// A variable named directly.
    Var(Variable),
    /// A store through an address.
    ///
    /// The stored-to variable is recorded in the flow graph's
    /// [`IndirectDefs`](crate::analysis::cfg::IndirectDefs) side table when the
    /// address is a known local; without an entry the store defines the heap.
    Indirect,
}

/// A single variable access with its SSA annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    kind: OpKind,
    target: OpTarget,
    use_num: SsaNum,
    def_num: SsaNum,
}

impl Operation {
    /// Creates an unannotated operation.
    #[must_use]
    pub const fn new(kind: OpKind, target: OpTarget) -> Self {
        Operation {
            kind,
            target,
            use_num: SsaNum::RESERVED,
            def_num: SsaNum::RESERVED,
        }
    }

    /// A read of `var`.
    #[must_use]
    pub const fn use_of(var: Variable) -> Self {
        Self::new(OpKind::Use, OpTarget::Var(var))
    }

    /// A full definition of `var`.
    #[must_use]
    pub const fn def_of(var: Variable) -> Self {
        Self::new(OpKind::Def, OpTarget::Var(var))
    }

    /// A read-modify-write of `var`.
    #[must_use]
    pub const fn use_def(var: Variable) -> Self {
        Self::new(OpKind::UseDef, OpTarget::Var(var))
    }

    /// A store through an address.
    #[must_use]
    pub const fn indirect_def() -> Self {
        Self::new(OpKind::Def, OpTarget::Indirect)
    }

    /// Returns the access kind.
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        self.kind
    }

    /// Returns the accessed storage.
    #[must_use]
    pub const fn target(&self) -> OpTarget {
        self.target
    }

    /// Returns `true` for stores through an address.
    #[must_use]
    pub const fn is_indirect(&self) -> bool {
        matches!(self.target, OpTarget::Indirect)
    }

    /// The SSA number this operation reads, or [`SsaNum::RESERVED`].
    #[must_use]
    pub const fn use_num(&self) -> SsaNum {
        self.use_num
    }

    /// The SSA number this operation defines, or [`SsaNum::RESERVED`].
    #[must_use]
    pub const fn def_num(&self) -> SsaNum {
        self.def_num
    }

    pub(crate) fn set_use_num(&mut self, num: SsaNum) {
        self.use_num = num;
    }

    pub(crate) fn set_def_num(&mut self, num: SsaNum) {
        self.def_num = num;
    }

    pub(crate) fn clear_annotations(&mut self) {
        self.use_num = SsaNum::RESERVED;
        self.def_num = SsaNum::RESERVED;
    }
}

/// The position of an operation: its block and its index in that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpRef {
    /// The containing block
    pub block: BlockId,
    /// Index into the block's operation list
    pub index: usize,
}

impl OpRef {
    /// Creates a new operation reference.
    #[must_use]
    pub const fn new(block: BlockId, index: usize) -> Self {
        OpRef { block, index }
    }
}

impl fmt::Display for OpRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.block, self.index)
    }
}

/// Side table naming the local an indirect store writes to.
///
/// Filled by the importer when it can prove where an [`OpTarget::Indirect`] store
/// lands (typically a struct copy into a promoted local). An indirect store with no
/// entry is treated as a heap definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndirectDefs {
    entries: BTreeMap<OpRef, Variable>,
}

impl IndirectDefs {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the store at `op` defines `var`, returning the previous entry.
    pub fn insert(&mut self, op: OpRef, var: Variable) -> Option<Variable> {
        self.entries.insert(op, var)
    }

    /// Returns the variable the store at `op` defines, if it is known.
    #[must_use]
    pub fn get(&self, op: OpRef) -> Option<Variable> {
        self.entries.get(&op).copied()
    }

    /// Returns the number of recorded stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no store has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the recorded stores in operation order.
    pub fn iter(&self) -> impl Iterator<Item = (OpRef, Variable)> + '_ {
        self.entries.iter().map(|(op, var)| (*op, *var))
    }
}

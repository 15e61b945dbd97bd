//! Basic blocks of the flow graph.

use crate::analysis::{
    cfg::{BlockId, Operation, RegionId},
    ssa::{PhiId, SsaNum},
};

/// A basic block: an ordered list of operations plus its SSA annotations.
///
/// The importer fills in the operations and the innermost protecting region. The
/// SSA builder owns everything else: the phi list, the immediate dominator and the
/// heap numbers live on entry and exit. All of these are cleared when SSA is
/// rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    /// The variable accesses of this block, in execution order
    ops: Vec<Operation>,
    /// Phi nodes at the head of this block, in creation order
    phis: Vec<PhiId>,
    /// Innermost exception region protecting this block
    try_region: Option<RegionId>,
    /// Immediate dominator in the exceptional-flow view
    idom: Option<BlockId>,
    /// SSA number of the heap on entry
    heap_in: SsaNum,
    /// SSA number of the heap on exit
    heap_out: SsaNum,
}

impl BasicBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a block with the given operations.
    #[must_use]
    pub fn with_ops(ops: Vec<Operation>) -> Self {
        BasicBlock {
            ops,
            ..Self::default()
        }
    }

    /// Appends an operation.
    pub fn push(&mut self, op: Operation) {
        self.ops.push(op);
    }

    /// Returns the operations of this block.
    #[must_use]
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    /// Returns the operation at `index`.
    #[must_use]
    pub fn op(&self, index: usize) -> Option<&Operation> {
        self.ops.get(index)
    }

    pub(crate) fn op_mut(&mut self, index: usize) -> Option<&mut Operation> {
        self.ops.get_mut(index)
    }

    /// Returns the phi nodes at the head of this block.
    #[must_use]
    pub fn phis(&self) -> &[PhiId] {
        &self.phis
    }

    /// Returns the innermost region protecting this block.
    #[must_use]
    pub fn try_region(&self) -> Option<RegionId> {
        self.try_region
    }

    /// Returns `true` if the block lies inside a try.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.try_region.is_some()
    }

    /// Returns the immediate dominator computed by the last SSA build.
    #[must_use]
    pub fn idom(&self) -> Option<BlockId> {
        self.idom
    }

    /// Returns the heap's SSA number on entry to this block.
    #[must_use]
    pub fn heap_in(&self) -> SsaNum {
        self.heap_in
    }

    /// Returns the heap's SSA number on exit from this block.
    #[must_use]
    pub fn heap_out(&self) -> SsaNum {
        self.heap_out
    }

    pub(crate) fn set_try_region(&mut self, region: Option<RegionId>) {
        self.try_region = region;
    }

    pub(crate) fn set_idom(&mut self, idom: Option<BlockId>) {
        self.idom = idom;
    }

    pub(crate) fn set_heap(&mut self, heap_in: SsaNum, heap_out: SsaNum) {
        self.heap_in = heap_in;
        self.heap_out = heap_out;
    }

    pub(crate) fn set_heap_in(&mut self, num: SsaNum) {
        self.heap_in = num;
    }

    pub(crate) fn set_heap_out(&mut self, num: SsaNum) {
        self.heap_out = num;
    }

    pub(crate) fn push_phi(&mut self, phi: PhiId) {
        self.phis.push(phi);
    }

    /// Drops every SSA annotation, leaving the importer's view of the block.
    pub(crate) fn clear_ssa(&mut self) {
        self.phis.clear();
        self.idom = None;
        self.heap_in = SsaNum::RESERVED;
        self.heap_out = SsaNum::RESERVED;
        for op in &mut self.ops {
            op.clear_annotations();
        }
    }
}

//! Phi nodes.
//!
//! A phi at the head of block `B` merges the values of one variable flowing into
//! `B`. It has one argument slot per real predecessor edge, reserved by the phi
//! inserter in incoming-edge order and filled in by the rename walk when it leaves
//! the predecessor. Phis at exception-handler entries additionally collect
//! *exceptional* arguments: the numbers a variable held anywhere inside the try.
//! Those are appended on the fly and kept unique by SSA number.

use std::fmt;

use crate::{
    analysis::{
        cfg::BlockId,
        ssa::{SsaName, SsaNum, Variable},
    },
    utils::{graph::EdgeId, Id},
};

/// Identifier of a phi node in the flow graph's phi arena.
pub type PhiId = Id<PhiNode>;

/// One argument of a phi node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhiArg {
    /// The block the value flows in from
    pub pred: BlockId,
    /// The SSA number of the incoming value, [`SsaNum::RESERVED`] until renamed
    pub num: SsaNum,
    /// The predecessor edge owning this slot; `None` for exceptional arguments
    pub edge: Option<EdgeId>,
}

impl PhiArg {
    /// Returns `true` if the argument was contributed by exceptional flow.
    #[must_use]
    pub const fn is_exceptional(&self) -> bool {
        self.edge.is_none()
    }
}

/// A phi node for one variable at the head of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiNode {
    var: Variable,
    block: BlockId,
    num: SsaNum,
    args: Vec<PhiArg>,
}

impl PhiNode {
    /// Creates a phi with one unresolved slot per `(edge, predecessor)` pair.
    #[must_use]
    pub fn new(var: Variable, block: BlockId, slots: &[(EdgeId, BlockId)]) -> Self {
        PhiNode {
            var,
            block,
            num: SsaNum::RESERVED,
            args: slots
                .iter()
                .map(|&(edge, pred)| PhiArg {
                    pred,
                    num: SsaNum::RESERVED,
                    edge: Some(edge),
                })
                .collect(),
        }
    }

    /// Returns the merged variable.
    #[must_use]
    pub const fn var(&self) -> Variable {
        self.var
    }

    /// Returns the block this phi heads.
    #[must_use]
    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// Returns the SSA number this phi defines.
    #[must_use]
    pub const fn num(&self) -> SsaNum {
        self.num
    }

    /// Returns the name this phi defines.
    #[must_use]
    pub const fn name(&self) -> SsaName {
        SsaName::new(self.var, self.num)
    }

    /// Returns all arguments: edge slots first, exceptional arguments after them.
    #[must_use]
    pub fn args(&self) -> &[PhiArg] {
        &self.args
    }

    /// Returns the arguments owned by predecessor edges.
    pub fn edge_args(&self) -> impl Iterator<Item = &PhiArg> {
        self.args.iter().filter(|arg| !arg.is_exceptional())
    }

    /// Returns the arguments contributed by exceptional flow.
    pub fn exceptional_args(&self) -> impl Iterator<Item = &PhiArg> {
        self.args.iter().filter(|arg| arg.is_exceptional())
    }

    /// Returns `true` once every argument slot holds an SSA number.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.args.iter().all(|arg| !arg.num.is_reserved())
    }

    pub(crate) fn set_num(&mut self, num: SsaNum) {
        self.num = num;
    }

    /// Fills the slot of `edge`. Returns `false` if no such slot exists.
    pub(crate) fn fill_edge(&mut self, edge: EdgeId, num: SsaNum) -> bool {
        match self.args.iter_mut().find(|arg| arg.edge == Some(edge)) {
            Some(arg) => {
                arg.num = num;
                true
            }
            None => false,
        }
    }

    /// Adds an exceptional argument unless one with the same number is present.
    ///
    /// Returns `true` if the argument was added.
    pub(crate) fn add_exceptional(&mut self, pred: BlockId, num: SsaNum) -> bool {
        if self
            .args
            .iter()
            .any(|arg| arg.is_exceptional() && arg.num == num)
        {
            return false;
        }
        self.args.push(PhiArg {
            pred,
            num,
            edge: None,
        });
        true
    }
}

impl fmt::Display for PhiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = phi(", self.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}.{} from {}", self.var, arg.num, arg.pred)?;
            if arg.is_exceptional() {
                write!(f, " (eh)")?;
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_slot_phi() -> PhiNode {
        PhiNode::new(
            Variable::local(1),
            BlockId::new(3),
            &[(EdgeId::new(0), BlockId::new(1)), (EdgeId::new(1), BlockId::new(2))],
        )
    }

    #[test]
    fn test_phi_slots() {
        let mut phi = two_slot_phi();
        assert_eq!(phi.args().len(), 2);
        assert!(!phi.is_complete());

        assert!(phi.fill_edge(EdgeId::new(1), SsaNum::new(4)));
        assert!(!phi.fill_edge(EdgeId::new(7), SsaNum::new(4)));
        assert!(phi.fill_edge(EdgeId::new(0), SsaNum::new(2)));
        assert!(phi.is_complete());
        assert_eq!(phi.args()[1].num, SsaNum::new(4));
    }

    #[test]
    fn test_exceptional_args_are_unique() {
        let mut phi = PhiNode::new(Variable::local(0), BlockId::new(5), &[]);
        assert!(phi.add_exceptional(BlockId::new(1), SsaNum::new(1)));
        assert!(!phi.add_exceptional(BlockId::new(2), SsaNum::new(1)));
        assert!(phi.add_exceptional(BlockId::new(2), SsaNum::new(2)));

        assert_eq!(phi.exceptional_args().count(), 2);
        assert_eq!(phi.edge_args().count(), 0);
    }

    #[test]
    fn test_phi_display() {
        let mut phi = two_slot_phi();
        phi.set_num(SsaNum::new(5));
        phi.fill_edge(EdgeId::new(0), SsaNum::new(2));
        phi.fill_edge(EdgeId::new(1), SsaNum::new(3));
        assert_eq!(
            phi.to_string(),
            "V01.5 = phi(V01.2 from n1, V01.3 from n2)"
        );
    }
}

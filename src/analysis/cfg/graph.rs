//! The flow graph handed to the SSA builder.
//!
//! [`FlowGraph`] wraps a [`DirectedGraph`] of [`BasicBlock`]s and owns everything
//! the builder reads or annotates for one method: the local table, the exception
//! regions, the indirect-definition side table and the phi arena. The graph
//! structure itself is the importer's; the builder only ever appends (a synthetic
//! root block, phi nodes) and annotates.

use crate::{
    analysis::{
        cfg::{
            BasicBlock, BlockId, ExceptionRegion, FlowEdge, FlowEdgeKind, IndirectDefs, OpRef,
            OpTarget, Operation, RegionId, RegionKind,
        },
        ssa::{LocalVar, PhiId, PhiNode, Variable},
    },
    utils::{
        graph::{
            algorithms::DominatorTree, DirectedGraph, EdgeId, GraphBase, NodeId, Predecessors,
            RootedGraph, Successors,
        },
        Arena,
    },
    Error, Result,
};

/// A method body as seen by the SSA builder.
///
/// # Construction
///
/// ```rust,ignore
/// use jitssa::analysis::{cfg::*, ssa::*};
///
/// let mut graph = FlowGraph::new(vec![LocalVar::param(), LocalVar::temp()]);
/// let entry = graph.add_block(BasicBlock::with_ops(vec![Operation::def_of(Variable::local(1))]));
/// let exit = graph.add_block(BasicBlock::with_ops(vec![Operation::use_of(Variable::local(1))]));
/// graph.add_edge(entry, exit, FlowEdgeKind::Unconditional)?;
/// ```
///
/// The first block added is the entry unless [`set_entry`](Self::set_entry) says
/// otherwise.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    /// Blocks and real edges
    graph: DirectedGraph<BasicBlock, FlowEdge>,
    /// The entry block
    entry: BlockId,
    /// Exception regions, indexed by [`RegionId`]
    regions: Vec<ExceptionRegion>,
    /// Tracked locals, indexed by [`LocalId`](crate::analysis::ssa::LocalId)
    locals: Vec<LocalVar>,
    /// Known targets of indirect stores
    indirect_defs: IndirectDefs,
    /// Phi nodes of the current SSA form
    phis: Arena<PhiNode>,
    /// The root block added by [`ensure_root`](Self::ensure_root), if any
    synthetic_root: Option<BlockId>,
}

impl FlowGraph {
    /// Creates an empty flow graph over the given locals.
    #[must_use]
    pub fn new(locals: Vec<LocalVar>) -> Self {
        FlowGraph {
            graph: DirectedGraph::new(),
            entry: NodeId::new(0),
            regions: Vec::new(),
            locals,
            indirect_defs: IndirectDefs::new(),
            phis: Arena::new(),
            synthetic_root: None,
        }
    }

    /// Appends a block and returns its id.
    pub fn add_block(&mut self, block: BasicBlock) -> BlockId {
        self.graph.add_node(block)
    }

    /// Adds a real control flow edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if either block does not exist.
    pub fn add_edge(
        &mut self,
        from: BlockId,
        to: BlockId,
        kind: impl Into<FlowEdge>,
    ) -> Result<EdgeId> {
        self.graph.add_edge(from, to, kind.into())
    }

    /// Registers an exception region.
    ///
    /// Protected blocks are attached separately with [`protect`](Self::protect).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the region names a block or enclosing region
    /// that does not exist.
    pub fn add_region(&mut self, region: ExceptionRegion) -> Result<RegionId> {
        self.check_region(&region)?;
        let id = RegionId::new(self.regions.len());
        self.regions.push(region);
        Ok(id)
    }

    /// Marks `block` as protected, with `region` as its innermost region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the block or region does not exist.
    pub fn protect(&mut self, block: BlockId, region: RegionId) -> Result<()> {
        if region.index() >= self.regions.len() {
            return Err(malformed_error!("Unknown region {} for block {}", region, block));
        }
        let Some(data) = self.graph.node_mut(block) else {
            return Err(malformed_error!("Cannot protect missing block {}", block));
        };
        data.set_try_region(Some(region));
        Ok(())
    }

    /// Records that the indirect store at `op` defines `var`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if `op` is not an indirect store.
    pub fn set_indirect_def(&mut self, op: OpRef, var: Variable) -> Result<()> {
        match self.operation(op) {
            Some(operation) if operation.is_indirect() => {
                self.indirect_defs.insert(op, var);
                Ok(())
            }
            Some(_) => Err(malformed_error!("Operation {} is not an indirect store", op)),
            None => Err(malformed_error!("Operation {} does not exist", op)),
        }
    }

    /// Overrides the entry block.
    pub fn set_entry(&mut self, entry: BlockId) {
        self.entry = entry;
    }

    /// Returns the entry block.
    #[must_use]
    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// Returns the root block added by [`ensure_root`](Self::ensure_root), if any.
    #[must_use]
    pub fn synthetic_root(&self) -> Option<BlockId> {
        self.synthetic_root
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the block with the given id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.graph.node(id)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.graph.node_mut(id)
    }

    /// Iterates over all blocks with their ids.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BasicBlock)> + '_ {
        self.graph.nodes()
    }

    /// Returns the block ids in ascending order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.node_ids()
    }

    /// Returns the operation at `op`.
    #[must_use]
    pub fn operation(&self, op: OpRef) -> Option<&Operation> {
        self.graph.node(op.block)?.op(op.index)
    }

    pub(crate) fn operation_mut(&mut self, op: OpRef) -> Option<&mut Operation> {
        self.graph.node_mut(op.block)?.op_mut(op.index)
    }

    /// Returns the real successors of `block`.
    pub fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.successors(block)
    }

    /// Returns the real predecessors of `block`.
    pub fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.predecessors(block)
    }

    /// Returns the outgoing edges of `block` with their targets.
    pub fn outgoing(&self, block: BlockId) -> impl Iterator<Item = (EdgeId, BlockId)> + '_ {
        self.graph
            .outgoing_edges(block)
            .filter_map(|(edge, _)| Some((edge, self.graph.edge_endpoints(edge)?.1)))
    }

    /// Returns the incoming edges of `block` with their sources, in insertion order.
    pub fn incoming(&self, block: BlockId) -> impl Iterator<Item = (EdgeId, BlockId)> + '_ {
        self.graph
            .incoming_edges(block)
            .filter_map(|(edge, _)| Some((edge, self.graph.edge_endpoints(edge)?.0)))
    }

    /// Returns the kind of an edge.
    #[must_use]
    pub fn edge_kind(&self, edge: EdgeId) -> Option<FlowEdgeKind> {
        self.graph.edge(edge).map(FlowEdge::kind)
    }

    /// Returns the number of real edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the region with the given id.
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&ExceptionRegion> {
        self.regions.get(id.index())
    }

    /// Returns all regions, indexed by [`RegionId`].
    #[must_use]
    pub fn regions(&self) -> &[ExceptionRegion] {
        &self.regions
    }

    /// Iterates over the regions protecting `block`, innermost first.
    pub fn region_chain(&self, block: BlockId) -> RegionChain<'_> {
        RegionChain {
            regions: &self.regions,
            next: self.block(block).and_then(BasicBlock::try_region),
            remaining: self.regions.len(),
        }
    }

    /// Iterates over the exceptional-flow targets reachable from `block`, innermost
    /// region first.
    pub fn exceptional_targets(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.region_chain(block)
            .map(|(_, region)| region.flow_target())
    }

    /// Returns the local table.
    #[must_use]
    pub fn locals(&self) -> &[LocalVar] {
        &self.locals
    }

    /// Returns the number of tracked locals.
    #[must_use]
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Returns the number of renameable variables: every local plus the heap.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.locals.len() + 1
    }

    /// Iterates over every variable, locals in slot order followed by the heap.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        let locals = self.locals.len();
        (0..=locals).map(move |slot| Variable::from_slot(slot, locals))
    }

    /// Returns the dense slot of `var`.
    #[must_use]
    pub fn slot(&self, var: Variable) -> usize {
        var.slot(self.locals.len())
    }

    /// Returns `true` if `var` is renamed. The heap always is.
    #[must_use]
    pub fn in_ssa(&self, var: Variable) -> bool {
        match var {
            Variable::Heap => true,
            Variable::Local(id) => self.locals.get(id.index()).is_some_and(LocalVar::in_ssa),
        }
    }

    /// Returns `true` if `var` holds a value when the method starts. The heap always does.
    #[must_use]
    pub fn initialized_on_entry(&self, var: Variable) -> bool {
        match var {
            Variable::Heap => true,
            Variable::Local(id) => self
                .locals
                .get(id.index())
                .is_some_and(LocalVar::initialized_on_entry),
        }
    }

    /// Returns the side table of indirect stores.
    #[must_use]
    pub fn indirect_defs(&self) -> &IndirectDefs {
        &self.indirect_defs
    }

    /// Returns the variable an operation accesses.
    ///
    /// Indirect stores resolve through the side table and fall back to the heap.
    #[must_use]
    pub fn resolve_target(&self, at: OpRef, op: &Operation) -> Variable {
        match op.target() {
            OpTarget::Var(var) => var,
            OpTarget::Indirect => self.indirect_defs.get(at).unwrap_or(Variable::Heap),
        }
    }

    /// Returns the phi node with the given id.
    #[must_use]
    pub fn phi(&self, id: PhiId) -> Option<&PhiNode> {
        self.phis.get(id)
    }

    pub(crate) fn phi_mut(&mut self, id: PhiId) -> Option<&mut PhiNode> {
        self.phis.get_mut(id)
    }

    /// Returns the total number of phi nodes.
    #[must_use]
    pub fn phi_count(&self) -> usize {
        self.phis.len()
    }

    /// Iterates over the phis heading `block`, in creation order.
    pub fn phis_at(&self, block: BlockId) -> impl Iterator<Item = (PhiId, &PhiNode)> + '_ {
        self.block(block)
            .map(BasicBlock::phis)
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| Some((id, self.phis.get(id)?)))
    }

    /// Returns the phi for `var` heading `block`, if there is one.
    #[must_use]
    pub fn phi_for(&self, block: BlockId, var: Variable) -> Option<PhiId> {
        self.phis_at(block)
            .find(|(_, phi)| phi.var() == var)
            .map(|(id, _)| id)
    }

    /// Allocates a phi for `var` at the head of `block`.
    pub(crate) fn insert_phi(
        &mut self,
        block: BlockId,
        var: Variable,
        slots: &[(EdgeId, BlockId)],
    ) -> Result<PhiId> {
        let id = self.phis.try_alloc(PhiNode::new(var, block, slots))?;
        let Some(data) = self.graph.node_mut(block) else {
            return Err(malformed_error!("Phi placed in missing block {}", block));
        };
        data.push_phi(id);
        Ok(id)
    }

    /// Drops every SSA annotation so the builder can run again from scratch.
    ///
    /// The synthetic root, if one was added, stays: it is part of the graph now.
    pub fn reset_ssa(&mut self) {
        self.phis.clear();
        for (_, block) in self.graph.nodes_mut() {
            block.clear_ssa();
        }
    }

    /// Copies immediate dominators onto the blocks.
    pub(crate) fn record_dominators(&mut self, dom: &DominatorTree) {
        for (id, block) in self.graph.nodes_mut() {
            block.set_idom(dom.immediate_dominator(id));
        }
    }

    /// Makes sure the entry block has no predecessors and is not protected.
    ///
    /// Otherwise a fresh, empty, unprotected block is added with a single edge to
    /// the old entry and becomes the new entry. Returns the new block, or `None` if
    /// the entry was already suitable. Calling this again after it succeeded is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for a graph without blocks.
    pub fn ensure_root(&mut self) -> Result<Option<BlockId>> {
        let Some(entry_block) = self.graph.node(self.entry) else {
            return Err(Error::Empty);
        };
        if !entry_block.is_protected() && self.graph.in_degree(self.entry) == 0 {
            return Ok(None);
        }

        let old_entry = self.entry;
        let root = self.graph.add_node(BasicBlock::new());
        self.graph
            .add_edge(root, old_entry, FlowEdge::new(FlowEdgeKind::Synthetic))?;
        self.entry = root;
        self.synthetic_root = Some(root);
        Ok(Some(root))
    }

    /// Checks the importer's data for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for a graph without blocks and [`Error::Malformed`]
    /// for dangling block, region or local references, cyclic region nesting, a
    /// filter region without filter block (or the reverse), a try entry that its
    /// own region does not protect, and side-table entries on ordinary operations.
    pub fn validate(&self) -> Result<()> {
        if self.graph.is_empty() {
            return Err(Error::Empty);
        }
        if !self.graph.contains_node(self.entry) {
            return Err(malformed_error!("Entry block {} does not exist", self.entry));
        }

        for (index, region) in self.regions.iter().enumerate() {
            let id = RegionId::new(index);
            self.check_region(region)?;

            let mut depth = 0;
            let mut outer = region.enclosing();
            while let Some(current) = outer {
                depth += 1;
                if depth > self.regions.len() {
                    return Err(malformed_error!("Region {} is nested in itself", id));
                }
                outer = self.regions.get(current.index()).and_then(ExceptionRegion::enclosing);
            }

            if !self.region_chain(region.try_entry()).any(|(r, _)| r == id) {
                return Err(malformed_error!(
                    "Try entry {} of region {} is not protected by it",
                    region.try_entry(),
                    id
                ));
            }
        }

        for (id, block) in self.graph.nodes() {
            if let Some(region) = block.try_region() {
                if region.index() >= self.regions.len() {
                    return Err(malformed_error!(
                        "Block {} names unknown region {}",
                        id,
                        region
                    ));
                }
            }
            for (index, op) in block.ops().iter().enumerate() {
                if let OpTarget::Var(Variable::Local(local)) = op.target() {
                    if local.index() >= self.locals.len() {
                        return Err(malformed_error!(
                            "Operation {} names unknown local {}",
                            OpRef::new(id, index),
                            local
                        ));
                    }
                }
            }
        }

        for (at, var) in self.indirect_defs.iter() {
            match self.operation(at) {
                Some(op) if op.is_indirect() => {}
                _ => {
                    return Err(malformed_error!(
                        "Indirect definition entry {} does not name an indirect store",
                        at
                    ))
                }
            }
            if let Variable::Local(local) = var {
                if local.index() >= self.locals.len() {
                    return Err(malformed_error!(
                        "Indirect store {} names unknown local {}",
                        at,
                        local
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_region(&self, region: &ExceptionRegion) -> Result<()> {
        let blocks = [
            Some(region.try_entry()),
            Some(region.handler_entry()),
            region.filter_entry(),
        ];
        for block in blocks.into_iter().flatten() {
            if !self.graph.contains_node(block) {
                return Err(malformed_error!("Region names missing block {}", block));
            }
        }
        if (region.kind() == RegionKind::Filter) != region.filter_entry().is_some() {
            return Err(malformed_error!(
                "{} region with filter entry {:?}",
                region.kind(),
                region.filter_entry()
            ));
        }
        if let Some(outer) = region.enclosing() {
            if outer.index() >= self.regions.len() {
                return Err(malformed_error!("Region names unknown enclosing region {}", outer));
            }
        }
        Ok(())
    }
}

/// Iterator over the regions protecting a block, innermost first.
///
/// Stops after visiting every region once, so a malformed cyclic nesting cannot
/// loop forever; [`FlowGraph::validate`] reports such cycles.
pub struct RegionChain<'a> {
    regions: &'a [ExceptionRegion],
    next: Option<RegionId>,
    remaining: usize,
}

impl<'a> Iterator for RegionChain<'a> {
    type Item = (RegionId, &'a ExceptionRegion);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let region = self.regions.get(id.index())?;
        self.remaining -= 1;
        self.next = region.enclosing();
        Some((id, region))
    }
}

impl GraphBase for FlowGraph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.graph.node_ids()
    }
}

impl Successors for FlowGraph {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.successors(node)
    }
}

impl Predecessors for FlowGraph {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.predecessors(node)
    }
}

impl RootedGraph for FlowGraph {
    fn entry(&self) -> NodeId {
        self.entry
    }
}

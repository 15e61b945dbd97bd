use crate::analysis::{
    cfg::{BasicBlock, BlockId, ExceptionRegion, FlowEdgeKind, FlowGraph, Operation, RegionKind},
    ssa::{LocalVar, Variable},
};

/// A flow graph and its blocks in creation order.
pub(crate) struct Shape {
    pub graph: FlowGraph,
    pub blocks: Vec<BlockId>,
}

impl Shape {
    fn new(locals: Vec<LocalVar>) -> Self {
        Shape {
            graph: FlowGraph::new(locals),
            blocks: Vec::new(),
        }
    }

    fn block(&mut self, ops: Vec<Operation>) -> BlockId {
        let id = self.graph.add_block(BasicBlock::with_ops(ops));
        self.blocks.push(id);
        id
    }

    fn edge(&mut self, from: usize, to: usize) {
        self.edge_of(from, to, FlowEdgeKind::Unconditional);
    }

    fn edge_of(&mut self, from: usize, to: usize, kind: FlowEdgeKind) {
        self.graph
            .add_edge(self.blocks[from], self.blocks[to], kind)
            .unwrap();
    }
}

pub(crate) fn v(index: u32) -> Variable {
    Variable::local(index)
}

/// `n0 -> n1 -> n2`; V00 parameter, V01 temporary.
///
/// ```text
/// n0: use V00; def V01
/// n1: use V01; use-def V01
/// n2: use V01
/// ```
pub(crate) fn straight_line() -> Shape {
    let mut shape = Shape::new(vec![LocalVar::param(), LocalVar::temp()]);
    shape.block(vec![Operation::use_of(v(0)), Operation::def_of(v(1))]);
    shape.block(vec![Operation::use_of(v(1)), Operation::use_def(v(1))]);
    shape.block(vec![Operation::use_of(v(1))]);
    shape.edge(0, 1);
    shape.edge(1, 2);
    shape
}

/// If/else writing V01 on both arms; V00 parameter, V01 temporary.
///
/// ```text
///        n0: use V00
///       /          \
/// n1: def V01   n2: def V01
///       \          /
///        n3: use V01 (if `use_at_join`)
/// ```
pub(crate) fn diamond(use_at_join: bool) -> Shape {
    let mut shape = Shape::new(vec![LocalVar::param(), LocalVar::temp()]);
    shape.block(vec![Operation::use_of(v(0))]);
    shape.block(vec![Operation::def_of(v(1))]);
    shape.block(vec![Operation::def_of(v(1))]);
    let join = if use_at_join {
        vec![Operation::use_of(v(1))]
    } else {
        Vec::new()
    };
    shape.block(join);
    shape.edge_of(0, 1, FlowEdgeKind::ConditionalTrue);
    shape.edge_of(0, 2, FlowEdgeKind::ConditionalFalse);
    shape.edge(1, 3);
    shape.edge(2, 3);
    shape
}

/// A diamond writing V00 on one arm only; V00 temporary. With `later_def`, an
/// extra block after the join writes V00 again.
///
/// ```text
///        n0
///       /   \
/// n1: def V00   n2
///       \   /
///        n3: use V00 -> n4: def V00 (if `later_def`)
/// ```
pub(crate) fn half_defined_diamond(later_def: bool) -> Shape {
    let mut shape = Shape::new(vec![LocalVar::temp()]);
    shape.block(Vec::new());
    shape.block(vec![Operation::def_of(v(0))]);
    shape.block(Vec::new());
    shape.block(vec![Operation::use_of(v(0))]);
    shape.edge_of(0, 1, FlowEdgeKind::ConditionalTrue);
    shape.edge_of(0, 2, FlowEdgeKind::ConditionalFalse);
    shape.edge(1, 3);
    shape.edge(2, 3);
    if later_def {
        shape.block(vec![Operation::def_of(v(0))]);
        shape.edge(3, 4);
    }
    shape
}

/// A counting loop; V00 parameter (the bound), V01 temporary (the counter).
///
/// ```text
/// n0: def V01
/// n1: use V01; use V00        <- loop header
/// n2: use-def V01             -> n1
/// n3: use V01
/// ```
pub(crate) fn counting_loop() -> Shape {
    let mut shape = Shape::new(vec![LocalVar::param(), LocalVar::temp()]);
    shape.block(vec![Operation::def_of(v(1))]);
    shape.block(vec![Operation::use_of(v(1)), Operation::use_of(v(0))]);
    shape.block(vec![Operation::use_def(v(1))]);
    shape.block(vec![Operation::use_of(v(1))]);
    shape.edge(0, 1);
    shape.edge_of(1, 2, FlowEdgeKind::ConditionalTrue);
    shape.edge_of(1, 3, FlowEdgeKind::ConditionalFalse);
    shape.edge(2, 1);
    shape
}

/// A try that writes V00 and a catch handler that reads it; V00 temporary.
///
/// ```text
/// n0 (pre) -> n1 (try: def V00) -> n2 (after: use V00)
///                    ~~> n3 (catch: use V00)
/// ```
pub(crate) fn try_catch() -> Shape {
    let mut shape = Shape::new(vec![LocalVar::temp()]);
    shape.block(Vec::new());
    shape.block(vec![Operation::def_of(v(0))]);
    shape.block(vec![Operation::use_of(v(0))]);
    shape.block(vec![Operation::use_of(v(0))]);
    shape.edge(0, 1);
    shape.edge(1, 2);
    let region = shape
        .graph
        .add_region(ExceptionRegion::new(RegionKind::Catch, shape.blocks[1], shape.blocks[3]))
        .unwrap();
    shape.graph.protect(shape.blocks[1], region).unwrap();
    shape
}

/// A try nested in another; V00 temporary.
///
/// ```text
/// n0 -> n1 (outer try: def V00) -> n2 (inner try: def V00) -> n5
///                                      ~~> n3 (inner catch, inside outer try) -> n5
///       n1, n2, n3 ~~> n4 (outer catch: use V00)
/// ```
pub(crate) fn nested_try() -> Shape {
    let mut shape = Shape::new(vec![LocalVar::temp()]);
    shape.block(Vec::new());
    shape.block(vec![Operation::def_of(v(0))]);
    shape.block(vec![Operation::def_of(v(0))]);
    shape.block(vec![Operation::use_of(v(0))]);
    shape.block(vec![Operation::use_of(v(0))]);
    shape.block(Vec::new());
    shape.edge(0, 1);
    shape.edge(1, 2);
    shape.edge_of(2, 5, FlowEdgeKind::Leave);
    shape.edge_of(3, 5, FlowEdgeKind::Leave);

    let b = shape.blocks.clone();
    let outer = shape
        .graph
        .add_region(ExceptionRegion::new(RegionKind::Catch, b[1], b[4]))
        .unwrap();
    let inner = shape
        .graph
        .add_region(ExceptionRegion::new(RegionKind::Catch, b[2], b[3]).within(outer))
        .unwrap();
    shape.graph.protect(b[1], outer).unwrap();
    shape.graph.protect(b[2], inner).unwrap();
    shape.graph.protect(b[3], outer).unwrap();
    shape
}

/// A filtered try; V00 temporary.
///
/// ```text
/// n0: def V00 -> n1 (try: def V00)
///                   ~~> n2 (filter: use V00) -> n3 (handler)
/// ```
pub(crate) fn filtered_try() -> Shape {
    let mut shape = Shape::new(vec![LocalVar::temp()]);
    shape.block(vec![Operation::def_of(v(0))]);
    shape.block(vec![Operation::def_of(v(0))]);
    shape.block(vec![Operation::use_of(v(0))]);
    shape.block(Vec::new());
    shape.edge(0, 1);
    shape.edge(2, 3);
    let b = shape.blocks.clone();
    let region = shape
        .graph
        .add_region(ExceptionRegion::filtered(b[1], b[2], b[3]))
        .unwrap();
    shape.graph.protect(b[1], region).unwrap();
    shape
}

/// A method whose first block is a loop header; V00 parameter.
///
/// ```text
/// n0: use-def V00 <-> n1
/// ```
pub(crate) fn entry_loop() -> Shape {
    let mut shape = Shape::new(vec![LocalVar::param()]);
    shape.block(vec![Operation::use_def(v(0))]);
    shape.block(Vec::new());
    shape.edge(1, 0);
    shape.edge(0, 1);
    shape
}

//! Consistency checks for a built SSA form.
//!
//! [`verify`] re-reads the annotated flow graph and reports every place where the
//! SSA properties do not hold:
//!
//! - **single assignment**: each SSA name is defined by exactly one site, and
//!   that site is the one recorded in [`SsaForm`];
//! - **resolved uses**: every reachable read of a renamed variable carries a
//!   number with a known definition;
//! - **dominance**: the definition of every used name dominates the use (a phi
//!   argument counts as a use at the end of its predecessor);
//! - **phi completeness**: each phi has exactly one filled slot per reachable
//!   predecessor edge;
//! - **heap numbering**: every block has heap numbers on entry and exit.
//!
//! It is meant for debug builds of a compiler and for tests. An empty result
//! means the form is consistent.

use std::{collections::HashMap, fmt};

use crate::analysis::{
    cfg::{BlockId, FlowGraph, OpRef},
    ssa::{DefSite, SsaForm, SsaName, SsaNum, Variable},
};

/// One violated SSA property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaViolation {
    /// The property that does not hold
    pub property: &'static str,
    /// Where the problem was found
    pub location: String,
    /// What was found there
    pub detail: String,
}

impl SsaViolation {
    fn new(property: &'static str, location: impl fmt::Display, detail: impl Into<String>) -> Self {
        SsaViolation {
            property,
            location: location.to_string(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SsaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.property, self.location, self.detail)
    }
}

/// Checks `graph` against the SSA properties, using the tables of `form`.
#[must_use]
pub fn verify(graph: &FlowGraph, form: &SsaForm) -> Vec<SsaViolation> {
    let mut checker = Checker {
        graph,
        form,
        seen: HashMap::new(),
        violations: Vec::new(),
    };
    checker.check_definitions();
    checker.check_uses();
    checker.check_phis();
    checker.check_heap();
    checker.violations
}

struct Checker<'a> {
    graph: &'a FlowGraph,
    form: &'a SsaForm,
    seen: HashMap<SsaName, DefSite>,
    violations: Vec<SsaViolation>,
}

impl Checker<'_> {
    fn report(
        &mut self,
        property: &'static str,
        location: impl fmt::Display,
        detail: impl Into<String>,
    ) {
        self.violations
            .push(SsaViolation::new(property, location, detail));
    }

    fn reachable(&self, block: BlockId) -> bool {
        self.form.dominators().is_reachable(block)
    }

    /// Records a definition found in the graph and compares it with the table.
    fn define(&mut self, name: SsaName, site: DefSite, location: impl fmt::Display) {
        if name.num.is_reserved() {
            self.report("single assignment", location, format!("{} has no number", name.var));
            return;
        }
        if let Some(previous) = self.seen.insert(name, site) {
            self.report(
                "single assignment",
                location,
                format!("{name} also defined at {previous:?}"),
            );
            return;
        }
        if self.form.def_of(name) != Some(site) {
            self.report(
                "single assignment",
                location,
                format!("{name} recorded at {:?}", self.form.def_of(name)),
            );
        }
    }

    fn check_definitions(&mut self) {
        let (graph, form) = (self.graph, self.form);
        for &block in form.dominators().reverse_postorder() {
            for (phi, node) in graph.phis_at(block) {
                self.define(node.name(), DefSite::Phi { block, phi }, block);
            }

            let Some(data) = graph.block(block) else {
                continue;
            };
            for (index, op) in data.ops().iter().enumerate() {
                let at = OpRef::new(block, index);
                let var = graph.resolve_target(at, op);
                if op.kind().writes() && graph.in_ssa(var) {
                    self.define(SsaName::new(var, op.def_num()), DefSite::Op(at), at);
                }
                if let Some(heap) = form.indirect_heap_def(at) {
                    self.define(SsaName::new(Variable::Heap, heap), DefSite::Op(at), at);
                }
            }
        }

        for var in graph.variables() {
            for (num, site) in form.defs_of(var) {
                let name = SsaName::new(var, num);
                if site != DefSite::Entry && !self.seen.contains_key(&name) {
                    self.report(
                        "single assignment",
                        name,
                        format!("recorded at {site:?} but not found in the graph"),
                    );
                }
            }
        }
    }

    /// Checks that `name`, used at the end of `block` or before operation `index`
    /// of it, is defined by a dominating site.
    fn check_dominated(
        &mut self,
        name: SsaName,
        block: BlockId,
        index: Option<usize>,
        location: impl fmt::Display,
    ) {
        let Some(site) = self.form.def_of(name) else {
            self.report("resolved uses", location, format!("{name} has no definition"));
            return;
        };
        let dominated = match site {
            DefSite::Entry => true,
            DefSite::Phi { block: def, .. } => self.form.dominators().dominates(def, block),
            DefSite::Op(def) if def.block == block => match index {
                Some(index) => def.index < index,
                None => true,
            },
            DefSite::Op(def) => self.form.dominators().dominates(def.block, block),
        };
        if !dominated {
            self.report(
                "dominance",
                location,
                format!("{name} defined at {site:?} does not dominate its use"),
            );
        }
    }

    fn check_uses(&mut self) {
        let (graph, form) = (self.graph, self.form);
        for &block in form.dominators().reverse_postorder() {
            let Some(data) = graph.block(block) else {
                continue;
            };
            for (index, op) in data.ops().iter().enumerate() {
                let at = OpRef::new(block, index);
                let var = graph.resolve_target(at, op);
                if !op.kind().reads() || !graph.in_ssa(var) {
                    continue;
                }
                if op.use_num().is_reserved() {
                    self.report("resolved uses", at, format!("read of {var} has no number"));
                    continue;
                }
                self.check_dominated(SsaName::new(var, op.use_num()), block, Some(index), at);
            }
        }

        for (block, data) in graph.blocks() {
            if self.reachable(block) {
                continue;
            }
            if data
                .ops()
                .iter()
                .any(|op| !op.use_num().is_reserved() || !op.def_num().is_reserved())
            {
                self.report("resolved uses", block, "unreachable block was renamed");
            }
        }
    }

    fn check_phis(&mut self) {
        let (graph, form) = (self.graph, self.form);
        for &block in form.dominators().reverse_postorder() {
            let expected = graph
                .incoming(block)
                .filter(|&(_, pred)| self.reachable(pred))
                .count();
            for (_, node) in graph.phis_at(block) {
                let location = node.name();
                let slots = node.edge_args().count();
                if slots != expected {
                    self.report(
                        "phi completeness",
                        location,
                        format!("{slots} slots for {expected} reachable predecessor edges"),
                    );
                }
                for arg in node.args() {
                    if arg.num.is_reserved() {
                        self.report(
                            "phi completeness",
                            location,
                            format!("slot from {} was never filled", arg.pred),
                        );
                        continue;
                    }
                    let name = SsaName::new(node.var(), arg.num);
                    if arg.is_exceptional() {
                        if self.form.def_of(name).is_none() {
                            self.report(
                                "resolved uses",
                                location,
                                format!("{name} has no definition"),
                            );
                        }
                    } else {
                        self.check_dominated(name, arg.pred, None, location);
                    }
                }
            }
        }
    }

    fn check_heap(&mut self) {
        let graph = self.graph;
        for (block, data) in graph.blocks() {
            if data.heap_in() == SsaNum::RESERVED || data.heap_out() == SsaNum::RESERVED {
                self.report("heap numbering", block, "heap number missing on entry or exit");
            }
        }
    }
}

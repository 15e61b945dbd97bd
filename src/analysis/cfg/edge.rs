//! Control flow edge types for the flow graph.
//!
//! Edges carry the semantic kind of the transfer between two blocks. The SSA
//! builder itself only cares about edge *identity*: every real predecessor edge of
//! a join block owns one argument slot of each phi there. Exceptional transfers
//! are not edges at all; they are derived from the exception regions (see
//! [`ExceptionalFlow`](crate::analysis::cfg::ExceptionalFlow)).

use strum::{Display, EnumIs};

/// The kind of control flow represented by an edge.
///
/// # Examples
///
/// ```rust,ignore
/// use jitssa::analysis::cfg::FlowEdgeKind;
///
/// assert!(FlowEdgeKind::ConditionalTrue.is_conditional());
/// assert!(!FlowEdgeKind::Unconditional.is_conditional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum FlowEdgeKind {
    /// Unconditional control flow: a direct jump or a fall-through.
    Unconditional,

    /// The "true" branch of a conditional.
    ConditionalTrue,

    /// The "false" branch of a conditional, usually the fall-through.
    ConditionalFalse,

    /// A switch case edge.
    Switch {
        /// The case value that selects this edge, or `None` for the default case.
        case_value: Option<i32>,
    },

    /// Normal exit from a protected region (`leave`) or from a handler.
    Leave,

    /// The edge from a synthetic root block to the original entry.
    Synthetic,
}

impl FlowEdgeKind {
    /// Returns `true` for [`ConditionalTrue`](Self::ConditionalTrue) and
    /// [`ConditionalFalse`](Self::ConditionalFalse).
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::ConditionalTrue | Self::ConditionalFalse)
    }
}

/// An edge of the flow graph.
///
/// The endpoints live in the underlying
/// [`DirectedGraph`](crate::utils::graph::DirectedGraph); this is the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowEdge {
    kind: FlowEdgeKind,
}

impl FlowEdge {
    /// Creates an edge of the given kind.
    #[must_use]
    pub const fn new(kind: FlowEdgeKind) -> Self {
        Self { kind }
    }

    /// Creates an unconditional edge.
    #[must_use]
    pub const fn unconditional() -> Self {
        Self::new(FlowEdgeKind::Unconditional)
    }

    /// Returns the kind of control flow this edge represents.
    #[must_use]
    pub const fn kind(&self) -> FlowEdgeKind {
        self.kind
    }
}

impl From<FlowEdgeKind> for FlowEdge {
    fn from(kind: FlowEdgeKind) -> Self {
        FlowEdge::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_kind_predicates() {
        assert!(FlowEdgeKind::ConditionalTrue.is_conditional());
        assert!(FlowEdgeKind::ConditionalFalse.is_conditional());
        assert!(!FlowEdgeKind::Leave.is_conditional());
        assert!(FlowEdgeKind::Switch { case_value: None }.is_switch());
        assert!(FlowEdgeKind::Synthetic.is_synthetic());
    }

    #[test]
    fn test_edge_kind_display() {
        assert_eq!(FlowEdgeKind::Unconditional.to_string(), "Unconditional");
        assert_eq!(
            FlowEdge::from(FlowEdgeKind::Leave).kind(),
            FlowEdgeKind::Leave
        );
    }
}

use thiserror::Error;

use crate::{analysis::ssa::Variable, utils::graph::NodeId};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// SSA construction is a total function of a well-formed flow graph, so every error reported
/// here falls into one of two kinds the compilation driver cares about:
///
/// # Error Categories
///
/// ## Internal Compiler Errors
/// - [`Error::Malformed`] - The flow graph handed in by the importer is inconsistent
/// - [`Error::UseBeforeDef`] - A use is reachable without any definition of its variable
/// - [`Error::GraphError`] - A graph mutation referenced nodes that do not exist
/// - [`Error::Empty`] - The method has no blocks at all
///
/// ## Resource Exhaustion
/// - [`Error::OutOfMemory`] - The per-compilation arena could not satisfy a reservation
///
/// Internal compiler errors abort the compilation of the current method only. Out-of-memory
/// errors ask the driver to fall back to a minimal (non-optimizing) compilation instead.
///
/// # Examples
///
/// ```rust,ignore
/// use jitssa::{Error, FlowGraph, SsaBuilder, SsaContext};
///
/// match SsaBuilder::new(&mut ctx, &mut graph).build() {
///     Ok(form) => println!("{} phis", form.stats().phis),
///     Err(e) if e.is_out_of_memory() => println!("fall back to minimal tier"),
///     Err(e) => eprintln!("internal compiler error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The flow graph is structurally inconsistent.
    ///
    /// Raised for importer bugs such as exception regions naming blocks that do not
    /// exist, operations referring to unknown locals, or indirect-definition entries
    /// that point at ordinary nodes. The error carries the source location where the
    /// problem was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A use of a variable was reached while its rename stack was empty.
    ///
    /// The variable has no definition on at least one path from the entry block and
    /// is neither a parameter nor a must-init local.
    #[error("Use of {var} in block {block} has no reaching definition")]
    UseBeforeDef {
        /// The variable that was read
        var: Variable,
        /// The block containing the offending use
        block: NodeId,
    },

    /// The per-compilation arena could not satisfy a reservation.
    ///
    /// Either the configured arena budget was exceeded or the allocator refused to grow
    /// a table. The enclosing compilation should retry at a lower optimization tier.
    #[error("Out of memory - requested {requested} entries with {budget} remaining")]
    OutOfMemory {
        /// Number of entries the failing reservation asked for
        requested: usize,
        /// Entries that were still available when the reservation failed
        budget: usize,
    },

    /// The flow graph has no blocks.
    #[error("Provided flow graph was empty")]
    Empty,

    /// Graph construction error.
    ///
    /// Raised by [`DirectedGraph::add_edge`](crate::utils::graph::DirectedGraph::add_edge)
    /// when an endpoint does not exist.
    #[error("{0}")]
    GraphError(String),
}

impl Error {
    /// Returns `true` for errors that indicate a bug in an upstream compiler phase.
    ///
    /// These abort the current method; retrying at another tier will not help.
    #[must_use]
    pub fn is_internal_compiler_error(&self) -> bool {
        !self.is_out_of_memory()
    }

    /// Returns `true` if the error is a resource-exhaustion failure.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory {
            requested: 0,
            budget: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ssa::LocalId;

    #[test]
    fn test_malformed_macro_captures_location() {
        let err = malformed_error!("region {} names block {}", 3, 17);
        match &err {
            Error::Malformed {
                message,
                file,
                line,
            } => {
                assert_eq!(message, "region 3 names block 17");
                assert!(file.ends_with("error.rs"));
                assert!(*line > 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.is_internal_compiler_error());
    }

    #[test]
    fn test_error_kinds() {
        let oom = Error::OutOfMemory {
            requested: 8,
            budget: 2,
        };
        assert!(oom.is_out_of_memory());
        assert!(!oom.is_internal_compiler_error());

        let ubd = Error::UseBeforeDef {
            var: Variable::Local(LocalId::new(4)),
            block: NodeId::new(2),
        };
        assert!(ubd.is_internal_compiler_error());
        assert_eq!(
            ubd.to_string(),
            "Use of V04 in block n2 has no reaching definition"
        );
    }
}

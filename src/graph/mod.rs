//! Operator graph: wiring, validation and per-block evaluation.
//!
//! A graph is assembled with [`GraphBuilder`] on the control thread, checked
//! once by `build`, and then evaluated every block in a fixed topological
//! order. The topology never changes after `build`.

/// Graph assembly and validation.
pub mod builder;
/// Fixed-order block evaluation.
pub mod evaluate;

use std::fmt;

pub use builder::GraphBuilder;
pub use evaluate::OperatorGraph;

/// Handle to an operator inside one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(usize);

impl OperatorId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

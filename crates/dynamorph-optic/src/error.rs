//! Navigation error taxonomy (spec §7, navigation half).

use crate::node::Node;
use dynamorph_value::ValueKind;

/// A reverse-built trace of navigation nodes, collected as an error bubbles
/// up through enclosing path segments. By the time it reaches the caller it
/// reads root-to-leaf.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trace(pub Vec<Node>);

impl Trace {
    pub fn new() -> Self {
        Trace(Vec::new())
    }

    pub fn prepend(mut self, node: Node) -> Self {
        self.0.insert(0, node);
        self
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for node in &self.0 {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Errors raised while navigating a [`crate::DynamicOptic`] over a
/// [`dynamorph_value::DynamicValue`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavigationError {
    #[error("at {trace}: missing field '{name}'")]
    MissingField { trace: Trace, name: String },

    #[error("at {trace}: missing map key '{key}'")]
    MissingKey { trace: Trace, key: String },

    #[error("at {trace}: index {index} out of bounds for {kind} of length {len}")]
    OutOfBounds {
        trace: Trace,
        kind: String,
        index: i64,
        len: usize,
    },

    #[error("at {trace}: expected {expected}, found {actual}")]
    StructuralMismatch {
        trace: Trace,
        expected: String,
        actual: ValueKind,
    },

    #[error("at {trace}: expected case '{expected}', found '{actual}'")]
    CaseMismatch {
        trace: Trace,
        expected: String,
        actual: String,
    },

    #[error("at {trace}: unsupported navigation node {node}")]
    UnsupportedNode { trace: Trace, node: String },

    #[error("at {trace}: search pattern matched no subvalues")]
    NoMatches { trace: Trace },

    #[error("at {trace}: expected exactly one match, found {count}")]
    NotSingleMatch { trace: Trace, count: usize },
}

impl NavigationError {
    /// Prepends `node` to this error's trace — called by each enclosing
    /// recursive navigation frame as the error bubbles up.
    pub fn with_prefix(self, node: Node) -> Self {
        match self {
            NavigationError::MissingField { trace, name } => NavigationError::MissingField {
                trace: trace.prepend(node),
                name,
            },
            NavigationError::OutOfBounds { trace, kind, index, len } => NavigationError::OutOfBounds {
                trace: trace.prepend(node),
                kind,
                index,
                len,
            },
            NavigationError::StructuralMismatch { trace, expected, actual } => {
                NavigationError::StructuralMismatch {
                    trace: trace.prepend(node),
                    expected,
                    actual,
                }
            }
            NavigationError::CaseMismatch { trace, expected, actual } => NavigationError::CaseMismatch {
                trace: trace.prepend(node),
                expected,
                actual,
            },
            NavigationError::UnsupportedNode { trace, node: n } => NavigationError::UnsupportedNode {
                trace: trace.prepend(node),
                node: n,
            },
            NavigationError::NoMatches { trace } => NavigationError::NoMatches {
                trace: trace.prepend(node),
            },
            NavigationError::NotSingleMatch { trace, count } => NavigationError::NotSingleMatch {
                trace: trace.prepend(node),
                count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_renders_root_to_leaf_after_prepending() {
        let err = NavigationError::MissingField {
            trace: Trace::new(),
            name: "age".into(),
        }
        .with_prefix(Node::Field("data".into()));
        match &err {
            NavigationError::MissingField { trace, .. } => {
                assert_eq!(trace.to_string(), ".data");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_field_display() {
        let err = NavigationError::MissingField {
            trace: Trace(vec![Node::Field("data".into())]),
            name: "age".into(),
        };
        assert_eq!(err.to_string(), "at .data: missing field 'age'");
    }
}

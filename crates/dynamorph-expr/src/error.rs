//! `Resolved` evaluation error taxonomy (spec §7, `EvaluationError` half).

use dynamorph_optic::NavigationError;
use dynamorph_value::{ValueError, ValueKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("expression requires an input value but none was given")]
    MissingInput,

    #[error("expression requires a root value but none was given")]
    MissingRoot,

    #[error("expected a record with field '{name}'")]
    MissingField { name: String },

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("cannot convert '{from}' to '{to}': {reason}")]
    ConversionFailed { from: String, to: String, reason: String },

    #[error("expected {expected}, found {actual}")]
    StructuralMismatch { expected: String, actual: ValueKind },

    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("expected a non-empty sequence")]
    EmptySequence,

    #[error("{0}")]
    Failed(String),

    #[error("Coalesce over an empty alternative list")]
    EmptyCoalesce,

    #[error("every alternative in Coalesce failed or was None")]
    CoalesceExhausted,

    #[error(transparent)]
    Value(#[from] ValueError),
}

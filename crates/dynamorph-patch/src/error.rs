//! Patch-application error taxonomy (spec §7, patch half).

use dynamorph_optic::{NavigationError, Trace};
use dynamorph_value::ValueKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("at {trace}: expected {expected}, found {actual}")]
    StructuralMismatch {
        trace: Trace,
        expected: String,
        actual: ValueKind,
    },

    #[error("at {trace}: primitive delta kind does not match the value's primitive kind")]
    OpKindMismatch { trace: Trace },

    #[error("at {trace}: numeric delta overflowed")]
    NumericOverflow { trace: Trace },

    #[error("at {trace}: string edit index {index} out of bounds for length {len}")]
    StringOutOfBounds { trace: Trace, index: usize, len: usize },

    #[error("at {trace}: sequence edit index {index} out of bounds for length {len}")]
    SeqOutOfBounds { trace: Trace, index: usize, len: usize },

    #[error("at {trace}: map key already present for Add")]
    MapKeyExists { trace: Trace },

    #[error("at {trace}: map key not found")]
    MapKeyMissing { trace: Trace },
}

impl PatchError {
    pub fn structural(expected: &str, actual: &dynamorph_value::DynamicValue) -> Self {
        PatchError::StructuralMismatch {
            trace: Trace::new(),
            expected: expected.to_string(),
            actual: actual.kind(),
        }
    }

    pub fn overflow() -> Self {
        PatchError::NumericOverflow { trace: Trace::new() }
    }
}

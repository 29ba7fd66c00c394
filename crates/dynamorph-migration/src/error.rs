//! Top-level error taxonomy for the migration core (spec §7).
//!
//! `SchemaError` is the umbrella every fallible migration operation returns,
//! composing the navigation, evaluation, and value-construction error types
//! via `#[from]` the same way `AutomapperError` composes
//! `edifact_parser::ParseError`.

use dynamorph_expr::EvalError;
use dynamorph_optic::{NavigationError, Trace};
use dynamorph_value::ValueError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("at {trace}: field '{name}' already exists")]
    FieldExists { trace: Trace, name: String },

    #[error("at {trace}: field '{name}' not found")]
    FieldMissing { trace: Trace, name: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no migration path found from schema '{from}' to schema '{to}'")]
    Planner { from: String, to: String },

    #[error("expected the last node of path '{path}' to be a named field")]
    NotAFieldPath { path: String },

    #[error("splitter produced {produced} values but {expected} target paths were given")]
    ArityMismatch { produced: usize, expected: usize },
}

impl SchemaError {
    pub fn field_exists(name: impl Into<String>) -> Self {
        SchemaError::FieldExists { trace: Trace::new(), name: name.into() }
    }

    pub fn field_missing(name: impl Into<String>) -> Self {
        SchemaError::FieldMissing { trace: Trace::new(), name: name.into() }
    }
}

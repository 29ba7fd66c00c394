//! Errors raised while decoding a [`dynamorph_value::DynamicValue`] back into
//! a typed schema (spec §6.1, `fromDynamic`).

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected}, found {actual}")]
    UnexpectedShape { expected: String, actual: String },

    #[error("missing required field '{name}'")]
    MissingField { name: String },

    #[error("unknown variant case '{case}' for {type_name}")]
    UnknownCase { type_name: String, case: String },

    #[error("failed to parse '{value}' as {type_name}: {reason}")]
    InvalidPrimitive { type_name: String, value: String, reason: String },

    #[error("{0}")]
    Custom(String),
}

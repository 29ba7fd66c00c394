//! The `Resolved` expression algebra (spec §3.5, §4.5).
//!
//! `Resolved` is a closed, serializable, pure-data tree. It carries no
//! executable code — every variant is a tagged constructor that the
//! evaluator in [`crate::eval`] interprets against an optional input value
//! and an optional root value. Migration actions (`dynamorph-migration`)
//! embed `Resolved` wherever the spec calls for a default, transform,
//! combiner, or splitter.

use dynamorph_optic::DynamicOptic;
use dynamorph_value::DynamicValue;
use serde::{Deserialize, Serialize};

/// `DefaultValue`'s payload: either a concrete value or an error message to
/// raise when evaluated (spec §3.5: "either<msg, value>").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultSpec {
    Value(DynamicValue),
    Error(String),
}

/// A pure value-transformation expression.
///
/// Every variant is evaluable via [`crate::eval::eval_with_root`] on
/// `(input: Option<&DynamicValue>, root: Option<&DynamicValue>)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolved {
    /// A constant, ignoring input.
    Literal(DynamicValue),
    /// Requires input; returns it unchanged.
    Identity,
    /// Evaluates `inner` (expecting a record), then extracts field `name`.
    FieldAccess(String, Box<Resolved>),
    /// Evaluates `inner`, then navigates `path` against the result,
    /// requiring exactly one match.
    OpticAccess(DynamicOptic, Box<Resolved>),
    /// Requires the root argument; returns the single match at `path`.
    RootAccess(DynamicOptic),
    /// Ignores input; either a literal value or an always-failing message.
    DefaultValue(DefaultSpec),
    /// Evaluates `inner`, then converts its primitive kind by name.
    Convert { from: String, to: String, inner: Box<Resolved> },
    /// Evaluates every part, coerces to canonical string form, joins with
    /// `sep`. Not reversible.
    Concat { parts: Vec<Resolved>, sep: String },
    /// Splits a string-valued `inner` into a `Sequence` of string
    /// primitives on the literal separator `sep`.
    SplitString { sep: String, inner: Box<Resolved> },
    /// Indexes into a sequence-valued `inner`.
    At { index: usize, inner: Box<Resolved> },
    /// Wraps `inner`'s value as `Some`.
    WrapSome(Box<Resolved>),
    /// Unwraps `Some`, or evaluates `fallback` on `None`/`Null`.
    UnwrapOption { inner: Box<Resolved>, fallback: Box<Resolved> },
    /// `outer` applied to the result of `inner` (`outer ∘ inner`).
    Compose { outer: Box<Resolved>, inner: Box<Resolved> },
    /// Always fails with `msg`.
    Fail(String),
    /// Builds a record from named field expressions, each evaluated against
    /// the same input/root.
    Construct(Vec<(String, Resolved)>),
    /// Builds a sequence from element expressions.
    ConstructSeq(Vec<Resolved>),
    /// First element of a sequence-valued `inner`.
    Head(Box<Resolved>),
    /// Joins a sequence of string primitives with `sep`.
    JoinStrings { sep: String, inner: Box<Resolved> },
    /// Tries each alternative in order; the first one that evaluates to a
    /// non-`None` value (without failing) wins.
    Coalesce(Vec<Resolved>),
    /// Unwraps `Some`/non-option `primary`; falls back to `fallback` on
    /// `None`, `Null`, or evaluation failure.
    GetOrElse { primary: Box<Resolved>, fallback: Box<Resolved> },
}

impl Resolved {
    /// True if evaluating this expression would ever reach an [`Resolved::Identity`]
    /// node — i.e. it needs an input value. Used to decide whether `Concat`
    /// (and any other expression) can legally evaluate with no input at all
    /// (spec §9 open question, resolved in SPEC_FULL §5: legal iff every
    /// part is input-free).
    pub fn requires_input(&self) -> bool {
        match self {
            Resolved::Literal(_) => false,
            Resolved::Identity => true,
            Resolved::FieldAccess(_, inner) => inner.requires_input(),
            Resolved::OpticAccess(_, inner) => inner.requires_input(),
            Resolved::RootAccess(_) => false,
            Resolved::DefaultValue(_) => false,
            Resolved::Convert { inner, .. } => inner.requires_input(),
            Resolved::Concat { parts, .. } => parts.iter().any(Resolved::requires_input),
            Resolved::SplitString { inner, .. } => inner.requires_input(),
            Resolved::At { inner, .. } => inner.requires_input(),
            Resolved::WrapSome(inner) => inner.requires_input(),
            Resolved::UnwrapOption { inner, fallback } => {
                inner.requires_input() || fallback.requires_input()
            }
            Resolved::Compose { outer, inner } => outer.requires_input() || inner.requires_input(),
            Resolved::Fail(_) => false,
            Resolved::Construct(fields) => fields.iter().any(|(_, e)| e.requires_input()),
            Resolved::ConstructSeq(elements) => elements.iter().any(Resolved::requires_input),
            Resolved::Head(inner) => inner.requires_input(),
            Resolved::JoinStrings { inner, .. } => inner.requires_input(),
            Resolved::Coalesce(alts) => alts.iter().any(Resolved::requires_input),
            Resolved::GetOrElse { primary, fallback } => {
                primary.requires_input() || fallback.requires_input()
            }
        }
    }

    pub fn literal(value: DynamicValue) -> Self {
        Resolved::Literal(value)
    }

    pub fn field(name: impl Into<String>, inner: Resolved) -> Self {
        Resolved::FieldAccess(name.into(), Box::new(inner))
    }

    pub fn optic_access(path: DynamicOptic, inner: Resolved) -> Self {
        Resolved::OpticAccess(path, Box::new(inner))
    }

    pub fn root_access(path: DynamicOptic) -> Self {
        Resolved::RootAccess(path)
    }

    pub fn convert(from: impl Into<String>, to: impl Into<String>, inner: Resolved) -> Self {
        Resolved::Convert { from: from.into(), to: to.into(), inner: Box::new(inner) }
    }

    pub fn concat(parts: Vec<Resolved>, sep: impl Into<String>) -> Self {
        Resolved::Concat { parts, sep: sep.into() }
    }

    pub fn compose(outer: Resolved, inner: Resolved) -> Self {
        Resolved::Compose { outer: Box::new(outer), inner: Box::new(inner) }
    }

    pub fn get_or_else(primary: Resolved, fallback: Resolved) -> Self {
        Resolved::GetOrElse { primary: Box::new(primary), fallback: Box::new(fallback) }
    }
}

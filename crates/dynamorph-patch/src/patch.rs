//! Patch data model (spec §3.3): `Patch`, `Operation`, and the per-kind
//! sub-operation types.

use bigdecimal::BigDecimal;
use dynamorph_optic::DynamicOptic;
use dynamorph_value::temporal::{ExactDuration, Period};
use dynamorph_value::DynamicValue;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// An ordered sequence of path-scoped operations. Concatenation (`++`/`Add`)
/// is associative with `Patch::empty()` as identity (spec §3.3, invariant 4).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub ops: Vec<PatchOp>,
}

impl Patch {
    pub fn empty() -> Self {
        Patch { ops: Vec::new() }
    }

    pub fn new(ops: Vec<PatchOp>) -> Self {
        Patch { ops }
    }

    pub fn single(path: DynamicOptic, operation: Operation) -> Self {
        Patch {
            ops: vec![PatchOp { path, operation }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, path: DynamicOptic, operation: Operation) {
        self.ops.push(PatchOp { path, operation });
    }
}

impl std::ops::Add for Patch {
    type Output = Patch;
    fn add(mut self, rhs: Patch) -> Patch {
        self.ops.extend(rhs.ops);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub path: DynamicOptic,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Set(DynamicValue),
    PrimitiveDelta(PrimitiveOp),
    SequenceEdit(Vec<SeqOp>),
    MapEdit(Vec<MapOp>),
    /// A nested patch, rooted at this operation's path; `Patch`'s own op
    /// paths are relative to that root.
    Patch(Box<Patch>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveOp {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    StringEdit(Vec<StringOp>),
    InstantDelta(ExactDuration),
    DurationDelta(ExactDuration),
    LocalDateDelta(Period),
    LocalDateTimeDelta(Period),
    PeriodDelta(Period),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StringOp {
    Insert(usize, String),
    Delete(usize, usize),
    Append(String),
    Modify(usize, usize, String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeqOp {
    Insert(usize, Vec<DynamicValue>),
    Append(Vec<DynamicValue>),
    Delete(usize, usize),
    Modify(usize, Box<Operation>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapOp {
    Add(DynamicValue, DynamicValue),
    Remove(DynamicValue),
    Modify(DynamicValue, Box<Patch>),
}

//! Differ (spec §4.3, component C4): the dual of the patch engine.
//!
//! `diff(old, new)` produces a minimal [`Patch`] that, applied to `old`
//! under [`crate::PatchMode::Strict`], reconstructs `new` (spec §8,
//! invariant 5). Dispatch is on the `(old, new)` type pair; primitives
//! prefer a typed delta over `Set` when one is available and cheaper.

use dynamorph_optic::{DynamicOptic, Node};
use dynamorph_value::primitive::PrimitiveValue;
use dynamorph_value::temporal::Period;
use dynamorph_value::DynamicValue;

use crate::patch::{MapOp, Operation, Patch, PatchOp, PrimitiveOp, SeqOp, StringOp};

/// Computes the minimal patch transforming `old` into `new`.
pub fn diff(old: &DynamicValue, new: &DynamicValue) -> Patch {
    diff_rooted(old, new)
}

/// Prefixes every op path in `patch` with a single leading `node`, used to
/// lift a recursive sub-diff (of a field, case payload, …) back up to its
/// parent's path.
fn single_at(node: Node, patch: Patch) -> Patch {
    Patch {
        ops: patch
            .ops
            .into_iter()
            .map(|op| PatchOp {
                path: DynamicOptic::root().append(node.clone()).concat(op.path),
                operation: op.operation,
            })
            .collect(),
    }
}

fn diff_rooted(old: &DynamicValue, new: &DynamicValue) -> Patch {
    if old == new {
        return Patch::empty();
    }
    match (old, new) {
        (DynamicValue::Primitive(a), DynamicValue::Primitive(b)) if a.kind_name() == b.kind_name() => {
            diff_primitive(a, b)
        }
        (DynamicValue::Record(a), DynamicValue::Record(b)) => diff_record(a, b),
        (DynamicValue::Sequence(a), DynamicValue::Sequence(b)) => diff_sequence(a, b),
        (DynamicValue::Map(a), DynamicValue::Map(b)) => diff_map(a, b),
        (DynamicValue::Variant(ca, pa), DynamicValue::Variant(cb, pb)) if ca == cb => {
            single_at(Node::Case(ca.clone()), diff_rooted(pa, pb))
        }
        _ => Patch::single(DynamicOptic::root(), Operation::Set(new.clone())),
    }
}

fn set_new(new: &DynamicValue) -> Patch {
    Patch::single(DynamicOptic::root(), Operation::Set(new.clone()))
}

fn diff_primitive(old: &PrimitiveValue, new: &PrimitiveValue) -> Patch {
    if old.is_nan() || new.is_nan() {
        return set_new(&DynamicValue::Primitive(new.clone()));
    }
    let delta = match (old, new) {
        (PrimitiveValue::I8(a), PrimitiveValue::I8(b)) => b.checked_sub(*a).map(PrimitiveOp::I8),
        (PrimitiveValue::I16(a), PrimitiveValue::I16(b)) => b.checked_sub(*a).map(PrimitiveOp::I16),
        (PrimitiveValue::I32(a), PrimitiveValue::I32(b)) => b.checked_sub(*a).map(PrimitiveOp::I32),
        (PrimitiveValue::I64(a), PrimitiveValue::I64(b)) => b.checked_sub(*a).map(PrimitiveOp::I64),
        (PrimitiveValue::F32(a), PrimitiveValue::F32(b)) => Some(PrimitiveOp::F32(b - a)),
        (PrimitiveValue::F64(a), PrimitiveValue::F64(b)) => Some(PrimitiveOp::F64(b - a)),
        (PrimitiveValue::BigInt(a), PrimitiveValue::BigInt(b)) => Some(PrimitiveOp::BigInt(b - a)),
        (PrimitiveValue::BigDecimal(a), PrimitiveValue::BigDecimal(b)) => Some(PrimitiveOp::BigDecimal(b - a)),
        (PrimitiveValue::String(a), PrimitiveValue::String(b)) => return diff_string(a, b),
        (PrimitiveValue::Instant(a), PrimitiveValue::Instant(b)) => {
            let delta = *b - *a;
            let secs = delta.num_seconds();
            let sub_nanos = (delta - chrono::Duration::seconds(secs)).num_nanoseconds().unwrap_or(0) as i32;
            Some(PrimitiveOp::InstantDelta(dynamorph_value::temporal::ExactDuration::new(secs, sub_nanos)))
        }
        (PrimitiveValue::Duration(a), PrimitiveValue::Duration(b)) => {
            let nanos = (b.secs - a.secs) * 1_000_000_000 + (b.nanos as i64 - a.nanos as i64);
            let secs = nanos.div_euclid(1_000_000_000);
            let sub = nanos.rem_euclid(1_000_000_000) as i32;
            Some(PrimitiveOp::DurationDelta(dynamorph_value::temporal::ExactDuration::new(secs, sub)))
        }
        (PrimitiveValue::LocalDate(a), PrimitiveValue::LocalDate(b)) => {
            let days = (*b - *a).num_days();
            Some(PrimitiveOp::LocalDateDelta(Period::new(0, 0, days as i32)))
        }
        (PrimitiveValue::LocalDateTime(a), PrimitiveValue::LocalDateTime(b)) => {
            if a.time() == b.time() {
                let days = (b.date() - a.date()).num_days();
                Some(PrimitiveOp::LocalDateTimeDelta(Period::new(0, 0, days as i32)))
            } else {
                None
            }
        }
        (PrimitiveValue::Period(a), PrimitiveValue::Period(b)) => {
            b.checked_add(Period::new(-a.years, -a.months, -a.days)).map(PrimitiveOp::PeriodDelta)
        }
        _ => None,
    };
    match delta {
        Some(op) => Patch::single(DynamicOptic::root(), Operation::PrimitiveDelta(op)),
        None => set_new(&DynamicValue::Primitive(new.clone())),
    }
}

/// String-edit cost per spec §4.3: inserted characters, one per delete
/// (regardless of run length), appended characters, and modified
/// (replacement) characters. `StringEdit` wins only if this cost is
/// strictly less than `new`'s length (SPEC_FULL §5, resolved open question).
fn diff_string(old: &str, new: &str) -> Patch {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let pairs = dynamorph_lcs::indices_lcs(&old_chars, &new_chars, |a, b| a == b);

    let mut ops = Vec::new();
    let mut cost = 0usize;
    let mut cursor = 0usize;
    let mut current_len = old_chars.len();
    let mut old_cursor = 0usize;
    let mut new_cursor = 0usize;

    let mut emit_gap = |old_gap: &[char], new_gap: &[char], ops: &mut Vec<StringOp>, cost: &mut usize, cursor: &mut usize, current_len: &mut usize| {
        match (old_gap.is_empty(), new_gap.is_empty()) {
            (true, true) => {}
            (true, false) => {
                let text: String = new_gap.iter().collect();
                *cost += new_gap.len();
                if *cursor == *current_len {
                    ops.push(StringOp::Append(text));
                } else {
                    ops.push(StringOp::Insert(*cursor, text));
                }
                *cursor += new_gap.len();
                *current_len += new_gap.len();
            }
            (false, true) => {
                ops.push(StringOp::Delete(*cursor, old_gap.len()));
                *cost += 1;
                *current_len -= old_gap.len();
            }
            (false, false) => {
                let text: String = new_gap.iter().collect();
                *cost += new_gap.len();
                ops.push(StringOp::Modify(*cursor, old_gap.len(), text));
                *cursor += new_gap.len();
                *current_len = *current_len - old_gap.len() + new_gap.len();
            }
        }
    };

    for (i, j) in &pairs {
        emit_gap(&old_chars[old_cursor..*i], &new_chars[new_cursor..*j], &mut ops, &mut cost, &mut cursor, &mut current_len);
        cursor += 1;
        old_cursor = i + 1;
        new_cursor = j + 1;
    }
    emit_gap(&old_chars[old_cursor..], &new_chars[new_cursor..], &mut ops, &mut cost, &mut cursor, &mut current_len);

    if cost < new_chars.len() {
        Patch::single(DynamicOptic::root(), Operation::PrimitiveDelta(PrimitiveOp::StringEdit(ops)))
    } else {
        set_new(&DynamicValue::string(new))
    }
}

/// Record diff only recurses field-by-field when `old` and `new` carry the
/// exact same ordered field names — a `Patch` has no way to add or remove a
/// record field (that is `dynamorph-migration`'s job), nor to reorder one,
/// so any structural field difference falls back to replacing the whole
/// record. This keeps `diff(a,b).apply(a,Strict) == b` sound in every case
/// (spec §8 invariant 5), not just the common same-shape case the spec's
/// §4.3 prose describes.
fn diff_record(old: &[(String, DynamicValue)], new: &[(String, DynamicValue)]) -> Patch {
    let same_shape = old.len() == new.len() && old.iter().zip(new).all(|((a, _), (b, _))| a == b);
    if !same_shape {
        return set_new(&DynamicValue::record_unchecked(new.to_vec()));
    }
    let mut patch = Patch::empty();
    for ((name, old_val), (_, new_val)) in old.iter().zip(new) {
        if old_val == new_val {
            continue;
        }
        patch = patch + single_at(Node::Field(name.clone()), diff_rooted(old_val, new_val));
    }
    patch
}

fn diff_sequence(old: &[DynamicValue], new: &[DynamicValue]) -> Patch {
    let pairs = dynamorph_lcs::indices_lcs(old, new, |a, b| a == b);
    let mut ops = Vec::new();
    let mut cursor = 0usize;
    let mut current_len = old.len();
    let mut old_cursor = 0usize;
    let mut new_cursor = 0usize;

    let mut emit_gap = |old_gap: &[DynamicValue], new_gap: &[DynamicValue], ops: &mut Vec<SeqOp>, cursor: &mut usize, current_len: &mut usize| {
        if !old_gap.is_empty() {
            ops.push(SeqOp::Delete(*cursor, old_gap.len()));
            *current_len -= old_gap.len();
        }
        if !new_gap.is_empty() {
            if *cursor == *current_len {
                ops.push(SeqOp::Append(new_gap.to_vec()));
            } else {
                ops.push(SeqOp::Insert(*cursor, new_gap.to_vec()));
            }
            *cursor += new_gap.len();
            *current_len += new_gap.len();
        }
    };

    for (i, j) in &pairs {
        emit_gap(&old[old_cursor..*i], &new[new_cursor..*j], &mut ops, &mut cursor, &mut current_len);
        cursor += 1;
        old_cursor = i + 1;
        new_cursor = j + 1;
    }
    emit_gap(&old[old_cursor..], &new[new_cursor..], &mut ops, &mut cursor, &mut current_len);

    if ops.is_empty() {
        Patch::empty()
    } else {
        Patch::single(DynamicOptic::root(), Operation::SequenceEdit(ops))
    }
}

fn diff_map(old: &[(DynamicValue, DynamicValue)], new: &[(DynamicValue, DynamicValue)]) -> Patch {
    let mut ops = Vec::new();
    for (key, _) in old {
        if !new.iter().any(|(k, _)| k == key) {
            ops.push(MapOp::Remove(key.clone()));
        }
    }
    for (key, new_val) in new {
        match old.iter().find(|(k, _)| k == key) {
            None => ops.push(MapOp::Add(key.clone(), new_val.clone())),
            Some((_, old_val)) if old_val != new_val => {
                ops.push(MapOp::Modify(key.clone(), Box::new(diff_rooted(old_val, new_val))));
            }
            Some(_) => {}
        }
    }
    if ops.is_empty() {
        Patch::empty()
    } else {
        Patch::single(DynamicOptic::root(), Operation::MapEdit(ops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply;
    use crate::PatchMode;
    use proptest::prelude::*;

    #[test]
    fn identical_values_yield_empty_patch() {
        let v = DynamicValue::i32(5);
        assert!(diff(&v, &v).is_empty());
    }

    #[test]
    fn numeric_delta_round_trips() {
        let old = DynamicValue::i32(42);
        let new = DynamicValue::i32(52);
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    #[test]
    fn record_and_sequence_diff_round_trip_scenario() {
        let old = DynamicValue::record(vec![
            ("name".into(), DynamicValue::string("Alice")),
            ("age".into(), DynamicValue::i32(30)),
            (
                "tags".into(),
                DynamicValue::sequence(vec![DynamicValue::string("a"), DynamicValue::string("b"), DynamicValue::string("c")]),
            ),
        ])
        .unwrap();
        let new = DynamicValue::record(vec![
            ("name".into(), DynamicValue::string("Alice")),
            ("age".into(), DynamicValue::i32(31)),
            (
                "tags".into(),
                DynamicValue::sequence(vec![
                    DynamicValue::string("a"),
                    DynamicValue::string("X"),
                    DynamicValue::string("b"),
                    DynamicValue::string("c"),
                ]),
            ),
        ])
        .unwrap();
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    #[test]
    fn added_field_falls_back_to_whole_record_set() {
        let old = DynamicValue::record(vec![("a".into(), DynamicValue::i32(1))]).unwrap();
        let new = DynamicValue::record(vec![("a".into(), DynamicValue::i32(1)), ("b".into(), DynamicValue::i32(2))]).unwrap();
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    #[test]
    fn map_add_remove_modify_round_trip() {
        let old = DynamicValue::map(vec![
            (DynamicValue::string("a"), DynamicValue::i32(1)),
            (DynamicValue::string("b"), DynamicValue::i32(2)),
        ])
        .unwrap();
        let new = DynamicValue::map(vec![
            (DynamicValue::string("a"), DynamicValue::i32(9)),
            (DynamicValue::string("c"), DynamicValue::i32(3)),
        ])
        .unwrap();
        let patch = diff(&old, &new);
        let result = apply::apply(&old, &patch, PatchMode::Strict).unwrap();
        let result_map = result.as_map().unwrap();
        assert_eq!(result_map.len(), 2);
        assert!(result_map.contains(&(DynamicValue::string("a"), DynamicValue::i32(9))));
        assert!(result_map.contains(&(DynamicValue::string("c"), DynamicValue::i32(3))));
    }

    #[test]
    fn variant_same_case_recurses() {
        let old = DynamicValue::variant("Active", DynamicValue::i32(1));
        let new = DynamicValue::variant("Active", DynamicValue::i32(2));
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    #[test]
    fn variant_different_case_is_set() {
        let old = DynamicValue::variant("Active", DynamicValue::unit());
        let new = DynamicValue::variant("Retired", DynamicValue::unit());
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    #[test]
    fn sequence_empty_to_nonempty_is_single_append() {
        let old = DynamicValue::sequence(vec![]);
        let new = DynamicValue::sequence(vec![DynamicValue::i32(1), DynamicValue::i32(2)]);
        let patch = diff(&old, &new);
        assert_eq!(patch.ops.len(), 1);
        assert!(matches!(patch.ops[0].operation, Operation::SequenceEdit(ref ops) if matches!(ops[0], SeqOp::Append(_))));
    }

    #[test]
    fn sequence_nonempty_to_empty_is_single_delete() {
        let old = DynamicValue::sequence(vec![DynamicValue::i32(1), DynamicValue::i32(2)]);
        let new = DynamicValue::sequence(vec![]);
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    #[test]
    fn nan_forces_set_not_delta() {
        let old = DynamicValue::Primitive(PrimitiveValue::F64(1.0));
        let new = DynamicValue::Primitive(PrimitiveValue::F64(f64::NAN));
        let patch = diff(&old, &new);
        assert!(matches!(patch.ops[0].operation, Operation::Set(_)));
    }

    #[test]
    fn string_edit_used_when_cheaper_than_set() {
        let old = DynamicValue::string("Hello World");
        let new = DynamicValue::string("WorldGolem");
        let patch = diff(&old, &new);
        assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
    }

    proptest! {
        #[test]
        fn differ_soundness_for_records(
            a_age in 0i32..100, b_age in 0i32..100,
            a_name in "[a-z]{1,8}", b_name in "[a-z]{1,8}"
        ) {
            let old = DynamicValue::record(vec![
                ("name".into(), DynamicValue::string(a_name)),
                ("age".into(), DynamicValue::i32(a_age)),
            ]).unwrap();
            let new = DynamicValue::record(vec![
                ("name".into(), DynamicValue::string(b_name)),
                ("age".into(), DynamicValue::i32(b_age)),
            ]).unwrap();
            let patch = diff(&old, &new);
            prop_assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
        }

        #[test]
        fn differ_soundness_for_sequences(
            a in prop::collection::vec(0..20i32, 0..10),
            b in prop::collection::vec(0..20i32, 0..10)
        ) {
            let old = DynamicValue::sequence(a.into_iter().map(DynamicValue::i32).collect());
            let new = DynamicValue::sequence(b.into_iter().map(DynamicValue::i32).collect());
            let patch = diff(&old, &new);
            prop_assert_eq!(apply::apply(&old, &patch, PatchMode::Strict).unwrap(), new);
        }
    }
}

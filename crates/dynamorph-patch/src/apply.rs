//! Patch-application engine (spec §4.4, component C5).
//!
//! `apply` folds a [`Patch`]'s operations over a [`DynamicValue`] in
//! declared order. Each operation navigates via [`DynamicOptic`] and then
//! rewrites the value it finds there. The three [`PatchMode`]s govern what
//! happens when navigation or rewriting fails for one operation — they do
//! not change how sub-operations within a single `SequenceEdit`/`MapEdit`
//! are applied to each other (those are always atomic: the first failing
//! sub-operation fails the whole enclosing operation, and *that* failure is
//! then handled per-mode).

use std::cell::RefCell;

use dynamorph_optic::NavigationError;
use dynamorph_value::primitive::PrimitiveValue;
use dynamorph_value::temporal::{ExactDuration, Period};
use dynamorph_value::DynamicValue;

use crate::error::PatchError;
use crate::patch::{MapOp, Operation, Patch, PrimitiveOp, SeqOp, StringOp};
use crate::PatchMode;

/// Applies `patch` to `value` under `mode`, producing a new tree.
///
/// * **Strict** — the first operation that errors aborts the whole patch;
///   `value` as last successfully produced is not returned, the error is.
/// * **Lenient** — an erroring operation is skipped; the fold continues
///   from the state produced by prior operations.
/// * **Clobber** — like Lenient, except a handful of coercion paths (see
///   module docs on [`apply_operation`]) turn what would be an error into a
///   successful, best-effort rewrite.
pub fn apply(value: &DynamicValue, patch: &Patch, mode: PatchMode) -> Result<DynamicValue, PatchError> {
    let mut current = value.clone();
    for op in &patch.ops {
        match apply_one(&current, op, mode) {
            Ok(next) => current = next,
            Err(_) if mode != PatchMode::Strict => {
                // Lenient/Clobber: skip this operation, keep the pre-error state.
            }
            Err(e) => return Err(e),
        }
    }
    Ok(current)
}

// `DynamicOptic::update`'s callback signature is pinned to
// `NavigationError` — it has no knowledge of `PatchError`. We stash the
// real error here when the callback fails for a patch-specific reason (not
// a navigation reason) and recover it once `update` returns, so callers see
// the precise `PatchError` variant rather than a lossy conversion.
thread_local! {
    static LEAF_ERROR: RefCell<Option<PatchError>> = const { RefCell::new(None) };
}

fn apply_one(value: &DynamicValue, op: &crate::patch::PatchOp, mode: PatchMode) -> Result<DynamicValue, PatchError> {
    let operation = op.operation.clone();
    LEAF_ERROR.with(|cell| *cell.borrow_mut() = None);
    let result = op.path.update(value, mode, &mut |leaf| {
        apply_operation(leaf, &operation, mode).map_err(|e| {
            let sentinel = NavigationError::UnsupportedNode {
                trace: dynamorph_optic::Trace::new(),
                node: "<patch-operation>".to_string(),
            };
            LEAF_ERROR.with(|cell| *cell.borrow_mut() = Some(e));
            sentinel
        })
    });
    match result {
        Ok(v) => Ok(v),
        Err(nav_err) => match LEAF_ERROR.with(|cell| cell.borrow_mut().take()) {
            Some(leaf_err) => Err(leaf_err),
            None => Err(PatchError::from(nav_err)),
        },
    }
}

/// Rewrites the single value selected by a patch op's path.
fn apply_operation(leaf: &DynamicValue, operation: &Operation, mode: PatchMode) -> Result<DynamicValue, PatchError> {
    match operation {
        Operation::Set(v) => Ok(v.clone()),
        Operation::PrimitiveDelta(op) => apply_primitive_delta(leaf, op),
        Operation::SequenceEdit(ops) => apply_sequence_edit(leaf, ops, mode),
        Operation::MapEdit(ops) => apply_map_edit(leaf, ops, mode),
        Operation::Patch(inner) => crate::apply::apply(leaf, inner, mode).map_err(Into::into),
    }
}

fn apply_primitive_delta(leaf: &DynamicValue, op: &PrimitiveOp) -> Result<DynamicValue, PatchError> {
    let DynamicValue::Primitive(p) = leaf else {
        return Err(PatchError::structural("primitive", leaf));
    };
    let prim = match (p, op) {
        (PrimitiveValue::I8(n), PrimitiveOp::I8(d)) => PrimitiveValue::I8(
            n.checked_add(*d).ok_or_else(PatchError::overflow)?,
        ),
        (PrimitiveValue::I16(n), PrimitiveOp::I16(d)) => PrimitiveValue::I16(
            n.checked_add(*d).ok_or_else(PatchError::overflow)?,
        ),
        (PrimitiveValue::I32(n), PrimitiveOp::I32(d)) => PrimitiveValue::I32(
            n.checked_add(*d).ok_or_else(PatchError::overflow)?,
        ),
        (PrimitiveValue::I64(n), PrimitiveOp::I64(d)) => PrimitiveValue::I64(
            n.checked_add(*d).ok_or_else(PatchError::overflow)?,
        ),
        (PrimitiveValue::F32(n), PrimitiveOp::F32(d)) => PrimitiveValue::F32(n + d),
        (PrimitiveValue::F64(n), PrimitiveOp::F64(d)) => PrimitiveValue::F64(n + d),
        (PrimitiveValue::BigInt(n), PrimitiveOp::BigInt(d)) => PrimitiveValue::BigInt(n + d),
        (PrimitiveValue::BigDecimal(n), PrimitiveOp::BigDecimal(d)) => PrimitiveValue::BigDecimal(n + d),
        (PrimitiveValue::String(s), PrimitiveOp::StringEdit(ops)) => {
            PrimitiveValue::String(apply_string_edits(s, ops)?)
        }
        (PrimitiveValue::Instant(t), PrimitiveOp::InstantDelta(d)) => {
            PrimitiveValue::Instant(*t + chrono_duration(*d))
        }
        (PrimitiveValue::Duration(d0), PrimitiveOp::DurationDelta(d)) => {
            PrimitiveValue::Duration(d0.checked_add(*d).ok_or_else(PatchError::overflow)?)
        }
        (PrimitiveValue::LocalDate(d0), PrimitiveOp::LocalDateDelta(p)) => {
            PrimitiveValue::LocalDate(apply_period_to_date(*d0, *p)?)
        }
        (PrimitiveValue::LocalDateTime(d0), PrimitiveOp::LocalDateTimeDelta(p)) => {
            let date = apply_period_to_date(d0.date(), *p)?;
            PrimitiveValue::LocalDateTime(date.and_time(d0.time()))
        }
        (PrimitiveValue::Period(p0), PrimitiveOp::PeriodDelta(p)) => {
            PrimitiveValue::Period(p0.checked_add(*p).ok_or_else(PatchError::overflow)?)
        }
        _ => return Err(PatchError::OpKindMismatch { trace: Default::default() }),
    };
    Ok(DynamicValue::Primitive(prim))
}

fn chrono_duration(d: ExactDuration) -> chrono::Duration {
    chrono::Duration::seconds(d.secs) + chrono::Duration::nanoseconds(d.nanos as i64)
}

fn apply_period_to_date(date: chrono::NaiveDate, p: Period) -> Result<chrono::NaiveDate, PatchError> {
    use chrono::Datelike;
    let total_months = date.year() as i64 * 12 + (date.month() as i64 - 1) + p.years as i64 * 12 + p.months as i64;
    let year = (total_months.div_euclid(12)) as i32;
    let month = (total_months.rem_euclid(12)) as u32 + 1;
    let day = date.day();
    let base = find_valid_date(year, month, day).ok_or_else(PatchError::overflow)?;
    base.checked_add_signed(chrono::Duration::days(p.days as i64))
        .ok_or_else(PatchError::overflow)
}

fn find_valid_date(year: i32, month: u32, day: u32) -> Option<chrono::NaiveDate> {
    // Clamp day-of-month overflow (e.g. Jan 31 + 1 month -> Feb 28/29),
    // matching how calendar-period arithmetic is usually defined.
    for d in (1..=day).rev() {
        if let Some(date) = chrono::NaiveDate::from_ymd_opt(year, month, d) {
            return Some(date);
        }
    }
    None
}

fn apply_string_edits(s: &str, ops: &[StringOp]) -> Result<String, PatchError> {
    let mut chars: Vec<char> = s.chars().collect();
    for op in ops {
        match op {
            StringOp::Insert(idx, text) => {
                if *idx > chars.len() {
                    return Err(PatchError::StringOutOfBounds {
                        trace: Default::default(),
                        index: *idx,
                        len: chars.len(),
                    });
                }
                chars.splice(*idx..*idx, text.chars());
            }
            StringOp::Delete(idx, len) => {
                let end = idx.checked_add(*len).ok_or_else(PatchError::overflow)?;
                if end > chars.len() {
                    return Err(PatchError::StringOutOfBounds {
                        trace: Default::default(),
                        index: *idx,
                        len: chars.len(),
                    });
                }
                chars.splice(*idx..end, std::iter::empty());
            }
            StringOp::Append(text) => chars.extend(text.chars()),
            StringOp::Modify(idx, len, text) => {
                let end = idx.checked_add(*len).ok_or_else(PatchError::overflow)?;
                if end > chars.len() {
                    return Err(PatchError::StringOutOfBounds {
                        trace: Default::default(),
                        index: *idx,
                        len: chars.len(),
                    });
                }
                chars.splice(*idx..end, text.chars());
            }
        }
    }
    Ok(chars.into_iter().collect())
}

fn apply_sequence_edit(leaf: &DynamicValue, ops: &[SeqOp], mode: PatchMode) -> Result<DynamicValue, PatchError> {
    let DynamicValue::Sequence(items) = leaf else {
        return Err(PatchError::structural("sequence", leaf));
    };
    let mut items = items.clone();
    for op in ops {
        match op {
            SeqOp::Insert(idx, values) => {
                let at = resolve_insert_index(*idx, items.len(), mode)?;
                items.splice(at..at, values.iter().cloned());
            }
            SeqOp::Append(values) => items.extend(values.iter().cloned()),
            SeqOp::Delete(idx, count) => {
                let (start, end) = resolve_delete_range(*idx, *count, items.len(), mode)?;
                items.splice(start..end, std::iter::empty());
            }
            SeqOp::Modify(idx, inner) => {
                let at = resolve_existing_index(*idx, items.len(), mode)?;
                items[at] = apply_operation(&items[at], inner, mode)?;
            }
        }
    }
    Ok(DynamicValue::Sequence(items))
}

fn resolve_insert_index(idx: usize, len: usize, mode: PatchMode) -> Result<usize, PatchError> {
    if idx <= len {
        Ok(idx)
    } else if mode == PatchMode::Clobber {
        Ok(len)
    } else {
        Err(PatchError::SeqOutOfBounds { trace: Default::default(), index: idx, len })
    }
}

fn resolve_existing_index(idx: usize, len: usize, mode: PatchMode) -> Result<usize, PatchError> {
    if idx < len {
        Ok(idx)
    } else if mode == PatchMode::Clobber && len > 0 {
        Ok(len - 1)
    } else {
        Err(PatchError::SeqOutOfBounds { trace: Default::default(), index: idx, len })
    }
}

fn resolve_delete_range(idx: usize, count: usize, len: usize, mode: PatchMode) -> Result<(usize, usize), PatchError> {
    let end = idx.saturating_add(count);
    if idx <= len && end <= len {
        Ok((idx, end))
    } else if mode == PatchMode::Clobber {
        let start = idx.min(len);
        Ok((start, len))
    } else {
        Err(PatchError::SeqOutOfBounds { trace: Default::default(), index: idx, len })
    }
}

fn apply_map_edit(leaf: &DynamicValue, ops: &[MapOp], mode: PatchMode) -> Result<DynamicValue, PatchError> {
    let DynamicValue::Map(entries) = leaf else {
        return Err(PatchError::structural("map", leaf));
    };
    let mut entries = entries.clone();
    for op in ops {
        match op {
            MapOp::Add(key, value) => match entries.iter().position(|(k, _)| k == key) {
                Some(pos) if mode == PatchMode::Clobber => entries[pos].1 = value.clone(),
                Some(_) => return Err(PatchError::MapKeyExists { trace: Default::default() }),
                None => entries.push((key.clone(), value.clone())),
            },
            MapOp::Remove(key) => match entries.iter().position(|(k, _)| k == key) {
                Some(pos) => {
                    entries.remove(pos);
                }
                None if mode == PatchMode::Clobber => {}
                None => return Err(PatchError::MapKeyMissing { trace: Default::default() }),
            },
            MapOp::Modify(key, inner) => match entries.iter().position(|(k, _)| k == key) {
                Some(pos) => {
                    entries[pos].1 = crate::apply::apply(&entries[pos].1, inner, mode)?;
                }
                None => return Err(PatchError::MapKeyMissing { trace: Default::default() }),
            },
        }
    }
    Ok(DynamicValue::Map(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_optic::DynamicOptic;

    #[test]
    fn numeric_delta_at_root() {
        let value = DynamicValue::i32(42);
        let patch = Patch::single(DynamicOptic::root(), Operation::PrimitiveDelta(PrimitiveOp::I32(10)));
        assert_eq!(apply(&value, &patch, PatchMode::Strict).unwrap(), DynamicValue::i32(52));
    }

    #[test]
    fn string_edit_delete_then_append() {
        let value = DynamicValue::string("Hello World");
        let patch = Patch::single(
            DynamicOptic::root(),
            Operation::PrimitiveDelta(PrimitiveOp::StringEdit(vec![
                StringOp::Delete(0, 6),
                StringOp::Append("Golem".to_string()),
            ])),
        );
        assert_eq!(
            apply(&value, &patch, PatchMode::Strict).unwrap(),
            DynamicValue::string("WorldGolem")
        );
    }

    #[test]
    fn nested_record_sequence_map_delta() {
        let value = DynamicValue::record(vec![(
            "data".into(),
            DynamicValue::sequence(vec![DynamicValue::map(vec![(
                DynamicValue::string("value"),
                DynamicValue::i32(100),
            )])
            .unwrap()]),
        )])
        .unwrap();
        let path = DynamicOptic::root()
            .field("data")
            .at_index(0)
            .at_key(DynamicValue::string("value"));
        let patch = Patch::single(path.clone(), Operation::PrimitiveDelta(PrimitiveOp::I32(50)));
        let result = apply(&value, &patch, PatchMode::Strict).unwrap();
        let leaf = path.select_one(&result, dynamorph_optic::NavigateMode::Strict).unwrap();
        assert_eq!(leaf, &DynamicValue::i32(150));
    }

    #[test]
    fn mode_semantics_on_missing_field() {
        let value = DynamicValue::record(vec![("age".into(), DynamicValue::i32(30))]).unwrap();
        let patch = Patch::single(DynamicOptic::root().field("missing"), Operation::Set(DynamicValue::i32(99)));
        assert!(apply(&value, &patch, PatchMode::Strict).is_err());
        assert_eq!(apply(&value, &patch, PatchMode::Lenient).unwrap(), value);
        assert_eq!(apply(&value, &patch, PatchMode::Clobber).unwrap(), value);
    }

    #[test]
    fn sequence_insert_append_delete() {
        let value = DynamicValue::sequence(vec![DynamicValue::i32(1), DynamicValue::i32(2)]);
        let patch = Patch::single(
            DynamicOptic::root(),
            Operation::SequenceEdit(vec![
                SeqOp::Insert(1, vec![DynamicValue::i32(9)]),
                SeqOp::Append(vec![DynamicValue::i32(4)]),
            ]),
        );
        let result = apply(&value, &patch, PatchMode::Strict).unwrap();
        assert_eq!(
            result,
            DynamicValue::sequence(vec![
                DynamicValue::i32(1),
                DynamicValue::i32(9),
                DynamicValue::i32(2),
                DynamicValue::i32(4),
            ])
        );
    }

    #[test]
    fn sequence_delete_out_of_range_clamped_under_clobber() {
        let value = DynamicValue::sequence(vec![DynamicValue::i32(1), DynamicValue::i32(2)]);
        let patch = Patch::single(DynamicOptic::root(), Operation::SequenceEdit(vec![SeqOp::Delete(1, 10)]));
        assert!(apply(&value, &patch, PatchMode::Strict).is_err());
        let result = apply(&value, &patch, PatchMode::Clobber).unwrap();
        assert_eq!(result, DynamicValue::sequence(vec![DynamicValue::i32(1)]));
    }

    #[test]
    fn map_add_overwrite_under_clobber_only() {
        let value = DynamicValue::map(vec![(DynamicValue::string("k"), DynamicValue::i32(1))]).unwrap();
        let patch = Patch::single(
            DynamicOptic::root(),
            Operation::MapEdit(vec![MapOp::Add(DynamicValue::string("k"), DynamicValue::i32(2))]),
        );
        assert!(apply(&value, &patch, PatchMode::Strict).is_err());
        let result = apply(&value, &patch, PatchMode::Clobber).unwrap();
        assert_eq!(
            result,
            DynamicValue::map(vec![(DynamicValue::string("k"), DynamicValue::i32(2))]).unwrap()
        );
    }

    #[test]
    fn map_remove_missing_is_noop_under_clobber() {
        let value = DynamicValue::map(vec![]).unwrap();
        let patch = Patch::single(DynamicOptic::root(), Operation::MapEdit(vec![MapOp::Remove(DynamicValue::string("k"))]));
        assert!(apply(&value, &patch, PatchMode::Strict).is_err());
        assert_eq!(apply(&value, &patch, PatchMode::Clobber).unwrap(), value);
    }

    #[test]
    fn nested_patch_operation() {
        let value = DynamicValue::record(vec![("count".into(), DynamicValue::i32(1))]).unwrap();
        let inner = Patch::single(DynamicOptic::root().field("count"), Operation::PrimitiveDelta(PrimitiveOp::I32(5)));
        let patch = Patch::single(DynamicOptic::root(), Operation::Patch(Box::new(inner)));
        let result = apply(&value, &patch, PatchMode::Strict).unwrap();
        assert_eq!(result.field("count"), Some(&DynamicValue::i32(6)));
    }

    #[test]
    fn op_kind_mismatch_errors() {
        let value = DynamicValue::i32(1);
        let patch = Patch::single(DynamicOptic::root(), Operation::PrimitiveDelta(PrimitiveOp::F64(1.0)));
        let err = apply(&value, &patch, PatchMode::Strict).unwrap_err();
        assert!(matches!(err, PatchError::OpKindMismatch { .. }));
    }

    #[test]
    fn empty_patch_is_identity() {
        let value = DynamicValue::string("unchanged");
        assert_eq!(apply(&value, &Patch::empty(), PatchMode::Strict).unwrap(), value);
    }
}

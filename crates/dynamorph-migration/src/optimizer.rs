//! Migration optimizer (spec §4.9, component C11).
//!
//! A fixed pipeline of semantics-preserving rewrite passes over an action
//! list, run in order. Each pass is a pure `Vec<MigrationAction> ->
//! Vec<MigrationAction>` function so the pipeline itself stays a simple
//! fold, mirroring the pass-list style of `mig-assembly`'s tree-assembly
//! pipeline (a fixed sequence of transforms applied to one artifact).

use dynamorph_expr::Resolved;

use crate::action::MigrationAction;

/// Outcome of running the optimizer: the action counts before and after,
/// plus how many were removed and the resulting percentage reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationReport {
    pub original: Vec<MigrationAction>,
    pub optimized: Vec<MigrationAction>,
    pub removed: usize,
    pub percent_reduction: f64,
}

/// Runs the fixed optimizer pipeline over `actions` (spec §4.9).
///
/// `merge_sequential_transforms` toggles pass 5, which collapses adjacent
/// `TransformValue`s on the same path into a single `Compose` — the spec
/// marks this pass optional "for debuggability", so callers who want to
/// keep per-step transforms visible in the optimized program can skip it.
pub fn optimize(actions: &[MigrationAction], merge_sequential_transforms: bool) -> OptimizationReport {
    let original = actions.to_vec();
    let mut current = original.clone();

    current = remove_noop_renames(current);
    current = collapse_rename_chains(current);
    current = remove_add_then_drop(current);
    current = rewrite_drop_then_add(current);
    if merge_sequential_transforms {
        current = merge_sequential_transform_values(current);
    }

    let removed = original.len().saturating_sub(current.len());
    let percent_reduction = if original.is_empty() { 0.0 } else { removed as f64 / original.len() as f64 * 100.0 };

    OptimizationReport { original, optimized: current, removed, percent_reduction }
}

/// Pass 1: drop `Rename { from, to }` where `from == to`.
fn remove_noop_renames(actions: Vec<MigrationAction>) -> Vec<MigrationAction> {
    actions.into_iter().filter(|a| !matches!(a, MigrationAction::Rename { from, to, .. } if from == to)).collect()
}

/// Pass 2: collapse `A→B` immediately followed by `B→C` at the same `at`
/// into `A→C`; a chain that returns to its start (`A→B` then `B→A`)
/// collapses to nothing.
fn collapse_rename_chains(actions: Vec<MigrationAction>) -> Vec<MigrationAction> {
    let mut result: Vec<MigrationAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if let MigrationAction::Rename { at, from, to } = &action {
            if let Some(MigrationAction::Rename { at: prev_at, from: prev_from, to: prev_to }) = result.last() {
                if prev_at == at && prev_to == from {
                    let collapsed_from = prev_from.clone();
                    let collapsed_to = to.clone();
                    result.pop();
                    if collapsed_from != collapsed_to {
                        result.push(MigrationAction::Rename {
                            at: at.clone(),
                            from: collapsed_from,
                            to: collapsed_to,
                        });
                    }
                    continue;
                }
            }
        }
        result.push(action);
    }
    result
}

/// Pass 3: remove an `AddField(p, n, _)` immediately followed by a
/// `DropField(p, n, _)` — the field never observably existed.
fn remove_add_then_drop(actions: Vec<MigrationAction>) -> Vec<MigrationAction> {
    let mut result: Vec<MigrationAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if let MigrationAction::DropField { at, name, .. } = &action {
            if let Some(MigrationAction::AddField { at: prev_at, name: prev_name, .. }) = result.last() {
                if prev_at == at && prev_name == name {
                    result.pop();
                    continue;
                }
            }
        }
        result.push(action);
    }
    result
}

/// Pass 4: rewrite `DropField(p, n, _)` then `AddField(p, n, d)` into a
/// single `TransformValue` at `p.n` carrying `d` as its transform and
/// `Identity` as its reverse.
fn rewrite_drop_then_add(actions: Vec<MigrationAction>) -> Vec<MigrationAction> {
    let mut result: Vec<MigrationAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if let MigrationAction::AddField { at, name, default } = &action {
            if let Some(MigrationAction::DropField { at: prev_at, name: prev_name, .. }) = result.last() {
                if prev_at == at && prev_name == name {
                    result.pop();
                    result.push(MigrationAction::TransformValue {
                        at: at.clone().field(name.clone()),
                        transform: default.clone(),
                        reverse_transform: Some(Resolved::Identity),
                    });
                    continue;
                }
            }
        }
        result.push(action);
    }
    result
}

/// Pass 5 (optional): merge adjacent `TransformValue` actions at the same
/// path into one `Compose`, folding their reverse transforms in the
/// opposite order.
fn merge_sequential_transform_values(actions: Vec<MigrationAction>) -> Vec<MigrationAction> {
    let mut result: Vec<MigrationAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if let MigrationAction::TransformValue { at, transform, reverse_transform } = &action {
            if let Some(MigrationAction::TransformValue {
                at: prev_at,
                transform: prev_transform,
                reverse_transform: prev_reverse,
            }) = result.last()
            {
                if prev_at == at {
                    let merged_transform = Resolved::compose(transform.clone(), prev_transform.clone());
                    let merged_reverse = match (reverse_transform, prev_reverse) {
                        (Some(r), Some(pr)) => Some(Resolved::compose(pr.clone(), r.clone())),
                        _ => None,
                    };
                    result.pop();
                    result.push(MigrationAction::TransformValue {
                        at: at.clone(),
                        transform: merged_transform,
                        reverse_transform: merged_reverse,
                    });
                    continue;
                }
            }
        }
        result.push(action);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_optic::DynamicOptic;
    use dynamorph_value::DynamicValue;

    fn root() -> DynamicOptic {
        DynamicOptic::root()
    }

    #[test]
    fn noop_rename_is_removed() {
        let actions = vec![MigrationAction::Rename { at: root(), from: "a".into(), to: "a".into() }];
        let report = optimize(&actions, false);
        assert!(report.optimized.is_empty());
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn rename_chain_collapses() {
        let actions = vec![
            MigrationAction::Rename { at: root(), from: "a".into(), to: "b".into() },
            MigrationAction::Rename { at: root(), from: "b".into(), to: "c".into() },
        ];
        let report = optimize(&actions, false);
        assert_eq!(
            report.optimized,
            vec![MigrationAction::Rename { at: root(), from: "a".into(), to: "c".into() }]
        );
    }

    #[test]
    fn rename_cycle_collapses_to_nothing() {
        let actions = vec![
            MigrationAction::Rename { at: root(), from: "a".into(), to: "b".into() },
            MigrationAction::Rename { at: root(), from: "b".into(), to: "a".into() },
        ];
        let report = optimize(&actions, false);
        assert!(report.optimized.is_empty());
    }

    #[test]
    fn add_then_drop_cancels() {
        let actions = vec![
            MigrationAction::AddField {
                at: root(),
                name: "temp".into(),
                default: Resolved::literal(DynamicValue::i32(0)),
            },
            MigrationAction::DropField { at: root(), name: "temp".into(), default_for_reverse: None },
        ];
        let report = optimize(&actions, false);
        assert!(report.optimized.is_empty());
    }

    #[test]
    fn drop_then_add_becomes_transform() {
        let actions = vec![
            MigrationAction::DropField { at: root(), name: "x".into(), default_for_reverse: None },
            MigrationAction::AddField {
                at: root(),
                name: "x".into(),
                default: Resolved::literal(DynamicValue::i32(1)),
            },
        ];
        let report = optimize(&actions, false);
        assert_eq!(report.optimized.len(), 1);
        assert!(matches!(report.optimized[0], MigrationAction::TransformValue { .. }));
    }

    #[test]
    fn sequential_transforms_merge_when_requested() {
        let actions = vec![
            MigrationAction::TransformValue { at: root(), transform: Resolved::Identity, reverse_transform: None },
            MigrationAction::TransformValue { at: root(), transform: Resolved::Identity, reverse_transform: None },
        ];
        let merged = optimize(&actions, true);
        assert_eq!(merged.optimized.len(), 1);
        let untouched = optimize(&actions, false);
        assert_eq!(untouched.optimized.len(), 2);
    }
}

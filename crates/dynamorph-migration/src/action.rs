//! The migration action set (spec §3.4, component C7).
//!
//! Every action carries a path `at` and supports `reverse()`, satisfying
//! `a.reverse().reverse() == a` whenever the action's reverse is losslessly
//! defined. Defaults, transforms, combiners, and splitters all embed
//! `dynamorph_expr::Resolved` rather than executable code, so the whole
//! action set stays a closed, serializable tagged union — no open
//! polymorphism (spec §9).

use dynamorph_expr::Resolved;
use dynamorph_optic::DynamicOptic;
use serde::{Deserialize, Serialize};

/// One schema-evolution step over a dynamic-value tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationAction {
    /// Inserts `name` into the record at `at`, evaluating `default` in the
    /// record's own context for the new value.
    AddField { at: DynamicOptic, name: String, default: Resolved },
    /// Removes `name` from the record at `at`. `default_for_reverse`, if
    /// present, becomes the default embedded in the `AddField` this action
    /// reverses to.
    DropField { at: DynamicOptic, name: String, default_for_reverse: Option<Resolved> },
    /// Renames a field in place, preserving its position.
    Rename { at: DynamicOptic, from: String, to: String },
    /// Replaces the value at `at` with `transform.eval(currentValue, root)`.
    TransformValue { at: DynamicOptic, transform: Resolved, reverse_transform: Option<Resolved> },
    /// Unwraps `Some(_)` in place, or substitutes `default` for `None`/`Null`.
    Mandate { at: DynamicOptic, default: Resolved },
    /// Wraps the current value at `at` in `Some`.
    Optionalize { at: DynamicOptic },
    /// Combines `source_paths` (siblings, read relative to the whole
    /// document) via `combiner` and places the result at `at`, then removes
    /// every source path that names a field.
    Join { at: DynamicOptic, source_paths: Vec<DynamicOptic>, combiner: Resolved, splitter: Option<Resolved> },
    /// Splits the value at `at` via `splitter` (which must yield a
    /// `Sequence`) across `target_paths` in order, then removes `at`.
    Split { at: DynamicOptic, target_paths: Vec<DynamicOptic>, splitter: Resolved, combiner: Option<Resolved> },
    /// Replaces the primitive at `at` with `converter.eval(currentValue, root)`.
    ChangeType { at: DynamicOptic, converter: Resolved, reverse_converter: Option<Resolved> },
    /// Renames a variant's case at `at` when it matches `from`; otherwise a
    /// no-op (spec §4.6 leaves non-matching cases untouched).
    RenameCase { at: DynamicOptic, from: String, to: String },
    /// Runs `nested` against the payload of the variant at `at` when its
    /// case equals `case_name`; otherwise a no-op.
    TransformCase { at: DynamicOptic, case_name: String, nested: Vec<MigrationAction> },
    /// Maps every element of the sequence at `at` through `transform`.
    TransformElements { at: DynamicOptic, transform: Resolved, reverse: Option<Resolved> },
    /// Maps every key of the map at `at` through `transform`.
    TransformKeys { at: DynamicOptic, transform: Resolved, reverse: Option<Resolved> },
    /// Maps every value of the map at `at` through `transform`.
    TransformValues { at: DynamicOptic, transform: Resolved, reverse: Option<Resolved> },
}

impl MigrationAction {
    /// The path this action is scoped to.
    pub fn at(&self) -> &DynamicOptic {
        match self {
            MigrationAction::AddField { at, .. }
            | MigrationAction::DropField { at, .. }
            | MigrationAction::Rename { at, .. }
            | MigrationAction::TransformValue { at, .. }
            | MigrationAction::Mandate { at, .. }
            | MigrationAction::Optionalize { at }
            | MigrationAction::Join { at, .. }
            | MigrationAction::Split { at, .. }
            | MigrationAction::ChangeType { at, .. }
            | MigrationAction::RenameCase { at, .. }
            | MigrationAction::TransformCase { at, .. }
            | MigrationAction::TransformElements { at, .. }
            | MigrationAction::TransformKeys { at, .. }
            | MigrationAction::TransformValues { at, .. } => at,
        }
    }

    /// Builds the reverse action (spec §4.6 "Reversal"). Where the forward
    /// action doesn't carry enough information to invert losslessly (a drop
    /// with no default-for-reverse, a split with no combiner, a type change
    /// with no reverse converter, `Optionalize`'s discarded default), the
    /// reverse is built around `Resolved::Fail` — when the engine later runs
    /// it, evaluation itself fails with the embedded message, exactly as
    /// spec §4.6 describes lossy reversal: "propagate `Fail` on reverse."
    pub fn reverse(&self) -> MigrationAction {
        match self {
            MigrationAction::AddField { at, name, default } => MigrationAction::DropField {
                at: at.clone(),
                name: name.clone(),
                default_for_reverse: Some(default.clone()),
            },
            MigrationAction::DropField { at, name, default_for_reverse } => MigrationAction::AddField {
                at: at.clone(),
                name: name.clone(),
                default: default_for_reverse.clone().unwrap_or_else(|| {
                    Resolved::Fail(format!("DropField({name}) has no default-for-reverse"))
                }),
            },
            MigrationAction::Rename { at, from, to } => {
                MigrationAction::Rename { at: at.clone(), from: to.clone(), to: from.clone() }
            }
            MigrationAction::TransformValue { at, transform, reverse_transform } => {
                MigrationAction::TransformValue {
                    at: at.clone(),
                    transform: reverse_transform.clone().unwrap_or_else(|| {
                        Resolved::Fail("TransformValue has no reverse_transform".to_string())
                    }),
                    reverse_transform: Some(transform.clone()),
                }
            }
            MigrationAction::Mandate { at, .. } => MigrationAction::Optionalize { at: at.clone() },
            MigrationAction::Optionalize { at } => MigrationAction::Mandate {
                at: at.clone(),
                default: Resolved::Fail("Optionalize's reverse has no recoverable default".to_string()),
            },
            MigrationAction::Join { at, source_paths, combiner, splitter } => MigrationAction::Split {
                at: at.clone(),
                target_paths: source_paths.clone(),
                splitter: splitter.clone().unwrap_or_else(|| {
                    Resolved::Fail("Join has no splitter to reverse into".to_string())
                }),
                combiner: Some(combiner.clone()),
            },
            MigrationAction::Split { at, target_paths, splitter, combiner } => MigrationAction::Join {
                at: at.clone(),
                source_paths: target_paths.clone(),
                combiner: combiner.clone().unwrap_or_else(|| {
                    Resolved::Fail("Split has no combiner to reverse into".to_string())
                }),
                splitter: Some(splitter.clone()),
            },
            MigrationAction::ChangeType { at, converter, reverse_converter } => MigrationAction::ChangeType {
                at: at.clone(),
                converter: reverse_converter.clone().unwrap_or_else(|| {
                    Resolved::Fail("ChangeType has no reverse_converter".to_string())
                }),
                reverse_converter: Some(converter.clone()),
            },
            MigrationAction::RenameCase { at, from, to } => {
                MigrationAction::RenameCase { at: at.clone(), from: to.clone(), to: from.clone() }
            }
            MigrationAction::TransformCase { at, case_name, nested } => MigrationAction::TransformCase {
                at: at.clone(),
                case_name: case_name.clone(),
                nested: nested.iter().rev().map(MigrationAction::reverse).collect(),
            },
            MigrationAction::TransformElements { at, transform, reverse } => {
                MigrationAction::TransformElements {
                    at: at.clone(),
                    transform: reverse.clone().unwrap_or_else(|| {
                        Resolved::Fail("TransformElements has no reverse".to_string())
                    }),
                    reverse: Some(transform.clone()),
                }
            }
            MigrationAction::TransformKeys { at, transform, reverse } => MigrationAction::TransformKeys {
                at: at.clone(),
                transform: reverse.clone().unwrap_or_else(|| {
                    Resolved::Fail("TransformKeys has no reverse".to_string())
                }),
                reverse: Some(transform.clone()),
            },
            MigrationAction::TransformValues { at, transform, reverse } => MigrationAction::TransformValues {
                at: at.clone(),
                transform: reverse.clone().unwrap_or_else(|| {
                    Resolved::Fail("TransformValues has no reverse".to_string())
                }),
                reverse: Some(transform.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_value::DynamicValue;
    use test_case::test_case;

    fn root() -> DynamicOptic {
        DynamicOptic::root()
    }

    #[test]
    fn add_field_reverse_round_trips() {
        let action = MigrationAction::AddField {
            at: root(),
            name: "age".into(),
            default: Resolved::literal(DynamicValue::i32(0)),
        };
        assert_eq!(action.reverse().reverse(), action);
    }

    #[test]
    fn rename_reverse_round_trips() {
        let action = MigrationAction::Rename { at: root(), from: "firstName".into(), to: "first".into() };
        assert_eq!(action.reverse().reverse(), action);
    }

    #[test]
    fn drop_field_without_default_is_lossy() {
        let action = MigrationAction::DropField { at: root(), name: "age".into(), default_for_reverse: None };
        let reversed = action.reverse();
        match &reversed {
            MigrationAction::AddField { default, .. } => {
                assert!(matches!(default, Resolved::Fail(_)));
            }
            _ => panic!("expected AddField"),
        }
        // Reversing the lossy reverse does not recover the original action.
        assert_ne!(reversed.reverse(), action);
    }

    #[test_case(MigrationAction::RenameCase { at: root(), from: "A".into(), to: "B".into() })]
    #[test_case(MigrationAction::TransformValue {
        at: root(),
        transform: Resolved::Identity,
        reverse_transform: Some(Resolved::Identity),
    })]
    fn lossless_actions_round_trip(action: MigrationAction) {
        assert_eq!(action.reverse().reverse(), action);
    }
}

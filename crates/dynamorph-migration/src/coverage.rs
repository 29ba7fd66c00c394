//! Shape validator (spec §4.7, component C9).
//!
//! Computes source/target `SchemaShape`s, folds a migration's actions over
//! a `MigrationCoverage` accumulator the same way
//! `EdifactValidator::validate` folds AHB/structure rule checks into a
//! `ValidationReport` (`automapper-validation/validator/validate.rs`):
//! classify what each action touches, then report what's left over.

use std::collections::HashSet;

use dynamorph_optic::DynamicOptic;
use dynamorph_schema::SchemaShape;

use crate::action::MigrationAction;
use crate::engine::Migration;

/// Running coverage state threaded through a migration's action list.
///
/// Field-level actions record precisely which source paths they consumed
/// and which target paths they provided; collection/key/value/case
/// traversals (`TransformElements`, `TransformKeys`, `TransformValues`,
/// `TransformCase`) are recorded as non-field coverage events at their own
/// `at` path — the spec (§4.7) treats them as "touched" without tracking
/// per-element provenance, since elements don't have stable individual
/// paths in a `SchemaShape`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationCoverage {
    pub handled: Vec<DynamicOptic>,
    pub provided: Vec<DynamicOptic>,
    pub renamed: Vec<(DynamicOptic, DynamicOptic)>,
    pub dropped: Vec<DynamicOptic>,
    pub added: Vec<DynamicOptic>,
}

impl MigrationCoverage {
    fn mark_handled(&mut self, path: DynamicOptic) {
        if !self.handled.iter().any(|p| p == &path) {
            self.handled.push(path);
        }
    }

    fn mark_provided(&mut self, path: DynamicOptic) {
        if !self.provided.iter().any(|p| p == &path) {
            self.provided.push(path);
        }
    }
}

/// Result of validating a migration's action list against a source/target
/// shape pair (spec §4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageReport {
    Complete,
    Incomplete { unhandled: Vec<DynamicOptic>, missing: Vec<DynamicOptic>, coverage: MigrationCoverage },
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        matches!(self, CoverageReport::Complete)
    }

    /// A multi-line, human-readable rendering of the gaps, grouped by path
    /// depth, with a corrective-action hint per entry (spec §4.7: "rendered
    /// by depth level ... plus hints for the corrective builder calls").
    pub fn render(&self) -> String {
        match self {
            CoverageReport::Complete => "migration is complete: every source and target path is covered".to_string(),
            CoverageReport::Incomplete { unhandled, missing, .. } => {
                let mut lines = vec!["migration coverage is incomplete:".to_string()];
                for path in sorted_by_depth(unhandled) {
                    lines.push(format!(
                        "  unhandled source path {path} — add DropField/Rename/TransformValue at this path"
                    ));
                }
                for path in sorted_by_depth(missing) {
                    lines.push(format!("  missing target path {path} — add AddField/Join/Split to provide it"));
                }
                lines.join("\n")
            }
        }
    }
}

fn sorted_by_depth(paths: &[DynamicOptic]) -> Vec<&DynamicOptic> {
    let mut sorted: Vec<&DynamicOptic> = paths.iter().collect();
    sorted.sort_by_key(|p| p.nodes().len());
    sorted
}

/// Runs the shape validator: computes coverage by folding `migration`'s
/// actions, then compares against `source_shape`/`target_shape` (spec §4.7).
pub fn validate(source_shape: &SchemaShape, target_shape: &SchemaShape, migration: &Migration) -> CoverageReport {
    let coverage = fold_coverage(&migration.actions);

    let implicitly_kept: Vec<&DynamicOptic> = source_shape
        .paths
        .iter()
        .filter(|p| target_shape.contains_path(p))
        .filter(|p| !coverage.handled.iter().any(|h| h == *p) && !coverage.provided.iter().any(|pr| pr == *p))
        .collect();

    let unhandled: Vec<DynamicOptic> = source_shape
        .paths
        .iter()
        .filter(|p| !coverage.handled.iter().any(|h| h == *p))
        .filter(|p| !implicitly_kept.contains(p))
        .cloned()
        .collect();

    let missing: Vec<DynamicOptic> = target_shape
        .paths
        .iter()
        .filter(|p| !coverage.provided.iter().any(|pr| pr == *p))
        .filter(|p| !implicitly_kept.contains(p))
        .cloned()
        .collect();

    if unhandled.is_empty() && missing.is_empty() {
        CoverageReport::Complete
    } else {
        CoverageReport::Incomplete { unhandled, missing, coverage }
    }
}

fn fold_coverage(actions: &[MigrationAction]) -> MigrationCoverage {
    let mut coverage = MigrationCoverage::default();
    for action in actions {
        record_action(&mut coverage, action);
    }
    coverage
}

fn record_action(coverage: &mut MigrationCoverage, action: &MigrationAction) {
    match action {
        MigrationAction::AddField { at, name, .. } => {
            let target = at.clone().field(name.clone());
            coverage.mark_provided(target.clone());
            coverage.added.push(target);
        }
        MigrationAction::DropField { at, name, .. } => {
            let source = at.clone().field(name.clone());
            coverage.mark_handled(source.clone());
            coverage.dropped.push(source);
        }
        MigrationAction::Rename { at, from, to } => {
            let source = at.clone().field(from.clone());
            let target = at.clone().field(to.clone());
            coverage.mark_handled(source.clone());
            coverage.mark_provided(target.clone());
            coverage.renamed.push((source, target));
        }
        MigrationAction::TransformValue { at, .. } | MigrationAction::ChangeType { at, .. } => {
            coverage.mark_handled(at.clone());
            coverage.mark_provided(at.clone());
        }
        MigrationAction::Mandate { at, .. } => {
            coverage.mark_handled(at.clone());
            coverage.mark_provided(at.clone());
        }
        MigrationAction::Optionalize { at } => {
            coverage.mark_handled(at.clone());
            coverage.mark_provided(at.clone());
        }
        MigrationAction::Join { at, source_paths, .. } => {
            coverage.mark_provided(at.clone());
            for path in source_paths {
                coverage.mark_handled(path.clone());
            }
        }
        MigrationAction::Split { at, target_paths, .. } => {
            coverage.mark_handled(at.clone());
            for path in target_paths {
                coverage.mark_provided(path.clone());
            }
        }
        MigrationAction::RenameCase { at, .. } => {
            coverage.mark_handled(at.clone());
            coverage.mark_provided(at.clone());
        }
        MigrationAction::TransformCase { at, nested, .. } => {
            coverage.mark_handled(at.clone());
            coverage.mark_provided(at.clone());
            // Nested actions are scoped under the matched case's payload, not
            // addressable against the outer shape's paths directly — they
            // still count as having "touched" `at` as a whole.
            let _ = nested;
        }
        MigrationAction::TransformElements { at, .. }
        | MigrationAction::TransformKeys { at, .. }
        | MigrationAction::TransformValues { at, .. } => {
            coverage.mark_handled(at.clone());
            coverage.mark_provided(at.clone());
        }
    }
}

/// Every path reachable in `shape` that also exists, unchanged, in `other` —
/// convenience for callers building reports outside [`validate`].
pub fn shared_paths(shape: &SchemaShape, other: &SchemaShape) -> HashSet<String> {
    shape
        .paths
        .iter()
        .filter(|p| other.contains_path(p))
        .map(|p| p.render())
        .collect()
}

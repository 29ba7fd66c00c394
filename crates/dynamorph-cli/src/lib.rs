//! Command-line round-trip demonstrator for the patch and migration algebra
//! (spec component C12, ambient CLI/logging surface).
//!
//! Each subcommand in [`crate::main`] is a thin wrapper over one library
//! call here: [`diff_command`] (C4), [`patch_command`] (C5), plus
//! [`migrate_command`] and [`plan_command`] (C8/C10). This crate holds no
//! algebra of its own — it is JSON in, JSON out, matching `fixture-renderer`'s
//! shape of a small `clap` front end over a library crate.

pub mod config;
pub mod error;
pub mod mode;
pub mod planner_io;

use dynamorph_migration::{Migration, SchemaError};
use dynamorph_patch::{Patch, PatchError, PatchMode};
use dynamorph_value::DynamicValue;

/// Computes the minimal patch from `old` to `new` (component C4).
pub fn diff_command(old: &DynamicValue, new: &DynamicValue) -> Patch {
    dynamorph_patch::diff(old, new)
}

/// Applies `patch` to `value` under `mode` (component C5).
pub fn patch_command(value: &DynamicValue, patch: &Patch, mode: PatchMode) -> Result<DynamicValue, PatchError> {
    dynamorph_patch::apply(value, patch, mode)
}

/// Runs `migration` over `value`, or its reverse when `reverse` is set
/// (component C8).
pub fn migrate_command(value: &DynamicValue, migration: &Migration, reverse: bool) -> Result<DynamicValue, SchemaError> {
    if reverse {
        dynamorph_migration::run(value, &migration.reverse())
    } else {
        dynamorph_migration::run(value, migration)
    }
}

/// Composes a registered migration path from `from` to `to` (component C10).
pub fn plan_command(
    planner: &dynamorph_migration::MigrationPlanner,
    from: &str,
    to: &str,
) -> Option<Migration> {
    planner.plan(from, to)
}

//! Schema-evolution actions, the migration engine, shape validator, planner,
//! and optimizer over dynamic-value trees (spec components C7–C11).
//!
//! [`action::MigrationAction`] is the tagged, reversible action set;
//! [`engine::run`] folds a [`engine::Migration`]'s actions over a
//! [`dynamorph_value::DynamicValue`]; [`coverage::validate`] checks an
//! action list's total coverage of a source/target [`dynamorph_schema::SchemaShape`]
//! pair; [`planner::MigrationPlanner`] composes registered schema-id edges
//! into a single migration via BFS; [`optimizer::optimize`] runs the fixed
//! no-op-collapsing pass pipeline. [`batch`] supplements the spec's §5
//! concurrency note with a rayon-parallel batch runner.

pub mod action;
pub mod batch;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod optimizer;
pub mod planner;

pub use action::MigrationAction;
pub use batch::{migrate_batch, migrate_sequential};
pub use coverage::{validate, CoverageReport, MigrationCoverage};
pub use engine::{run, Migration};
pub use error::SchemaError;
pub use optimizer::{optimize, OptimizationReport};
pub use planner::MigrationPlanner;

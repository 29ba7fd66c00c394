//! Differ and patch-application engine over dynamic-value trees
//! (spec components C4 and C5).
//!
//! [`patch::Patch`] is the data model; [`apply::apply`] runs one under a
//! [`dynamorph_optic::NavigateMode`]; [`differ::diff`] produces the minimal
//! patch between two [`dynamorph_value::DynamicValue`]s; [`render`] gives
//! every patch a deterministic debug string (spec §6.3, never a wire format).

pub mod apply;
pub mod differ;
pub mod error;
pub mod patch;
pub mod render;

pub use apply::apply;
pub use differ::diff;
pub use error::PatchError;
pub use patch::{MapOp, Operation, Patch, PatchOp, PrimitiveOp, SeqOp, StringOp};

/// The three patch-application modes (spec §6.5). Shared with the optic
/// engine's navigation modes since patch application is navigation plus a
/// per-operation apply step — there's nothing patch-specific to the mode
/// besides the name by which the spec refers to it.
pub type PatchMode = dynamorph_optic::NavigateMode;

//! The schema-reflection contract (C14) and structural shape projection
//! (schema half of C9) the migration core consumes.
//!
//! This crate deliberately knows nothing about migration actions, patches, or
//! `Resolved` expressions — it is the narrow seam spec §1 carves out between
//! "the core" and "the underlying schema reflection system": four methods
//! ([`SchemaReflect`]) and one structural type ([`SchemaShape`]).

pub mod error;
pub mod reflect;
pub mod shape;

pub use error::DecodeError;
pub use reflect::SchemaReflect;
pub use shape::{walk, SchemaShape, ShapeNode};

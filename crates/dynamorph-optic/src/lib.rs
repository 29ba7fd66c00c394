//! Path language and navigation over dynamic-value trees.
//!
//! [`DynamicOptic`] is an ordered list of [`Node`] steps; [`select`] and
//! [`update`] walk one over a [`dynamorph_value::DynamicValue`] under a
//! chosen [`NavigateMode`]. [`parser::parse`] reads the path-string syntax
//! back into a `DynamicOptic`.

mod error;
mod node;
mod optic;
mod parser;

pub use error::{NavigationError, Trace};
pub use node::{shape_matches, Node, ShapePattern};
pub use optic::{DynamicOptic, NavigateMode};
pub use parser::{parse, ParseError};

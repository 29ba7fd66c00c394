//! Structural shape projection of a typed schema (spec §3.6, §9 cyclic note).
//!
//! [`ShapeNode`] is the tree a [`crate::SchemaReflect::shape`] implementation
//! builds by hand (or derives); [`walk`] flattens it into the [`SchemaShape`]
//! the migration core's shape validator actually consumes: a set of
//! hierarchical paths plus optional/variant-case marks.

use std::collections::HashSet;
use std::rc::Rc;

use dynamorph_optic::DynamicOptic;

/// One level of a schema's structural description.
///
/// Mirrors [`dynamorph_value::ValueKind`] one level up the abstraction: where
/// `DynamicValue` carries actual data, `ShapeNode` carries only the shape a
/// schema promises to produce.
#[derive(Clone)]
pub enum ShapeNode {
    /// A leaf scalar, named the way `PrimitiveValue::kind_name()` names it.
    Primitive(String),
    /// A record: ordered named fields.
    Record(Vec<(String, ShapeNode)>),
    /// A variant: named cases, each with a payload shape (`Primitive("unit")`
    /// for a case with no payload).
    Variant(Vec<(String, ShapeNode)>),
    /// An optional wrapper (`Option<T>` on the typed side).
    Optional(Box<ShapeNode>),
    /// A homogeneous sequence.
    Sequence(Box<ShapeNode>),
    /// A homogeneous map, key shape then value shape.
    Map(Box<ShapeNode>, Box<ShapeNode>),
    /// A deferred reference to another schema's shape, identified by `name`.
    ///
    /// Used for cyclic/self-referential schemas (spec §9: `Node(value,
    /// next: Option<Node>)`). `name` should be stable per referenced schema
    /// (e.g. its type name) so [`walk`]'s visited-set guard can recognize a
    /// repeat visit and stop recursing instead of evaluating the thunk again.
    Lazy(String, Rc<dyn Fn() -> ShapeNode>),
}

impl std::fmt::Debug for ShapeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeNode::Primitive(name) => f.debug_tuple("Primitive").field(name).finish(),
            ShapeNode::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            ShapeNode::Variant(cases) => f.debug_tuple("Variant").field(cases).finish(),
            ShapeNode::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            ShapeNode::Sequence(inner) => f.debug_tuple("Sequence").field(inner).finish(),
            ShapeNode::Map(k, v) => f.debug_tuple("Map").field(k).field(v).finish(),
            ShapeNode::Lazy(name, _) => f.debug_tuple("Lazy").field(name).finish(),
        }
    }
}

impl ShapeNode {
    pub fn primitive(name: impl Into<String>) -> Self {
        ShapeNode::Primitive(name.into())
    }

    pub fn lazy(name: impl Into<String>, thunk: impl Fn() -> ShapeNode + 'static) -> Self {
        ShapeNode::Lazy(name.into(), Rc::new(thunk))
    }
}

/// The flattened, consumer-facing projection of a [`ShapeNode`] tree (spec
/// §3.6: "a set of hierarchical paths plus marks for optional and
/// variant-case locations").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaShape {
    /// Every path reachable by walking the schema tree, including the root
    /// (`DynamicOptic::root()`) itself.
    pub paths: Vec<DynamicOptic>,
    /// The subset of `paths` that are optional (nested under an
    /// `Optional` node).
    pub optional_paths: Vec<DynamicOptic>,
    /// For each path that is a variant, the case names present there.
    pub variant_cases: Vec<(DynamicOptic, Vec<String>)>,
}

impl SchemaShape {
    pub fn contains_path(&self, path: &DynamicOptic) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn is_optional(&self, path: &DynamicOptic) -> bool {
        self.optional_paths.iter().any(|p| p == path)
    }

    pub fn cases_at(&self, path: &DynamicOptic) -> Option<&[String]> {
        self.variant_cases
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, cases)| cases.as_slice())
    }
}

/// Flattens a [`ShapeNode`] tree into a [`SchemaShape`], starting at
/// `DynamicOptic::root()`.
///
/// Cyclic schemas are guarded with a visited set keyed by the `Lazy` node's
/// name (spec §9): the first visit expands the thunk and records its
/// reachable sub-paths; a repeat visit to the same name stops without
/// recursing further, since the thunk would otherwise re-expand the same
/// subtree forever. Dynamic values themselves are always finite trees, so
/// this guard only ever fires while reflecting over the (possibly
/// self-referential) schema, never while walking actual data.
pub fn walk(root: &ShapeNode) -> SchemaShape {
    let mut shape = SchemaShape::default();
    let mut visited = HashSet::new();
    walk_into(root, DynamicOptic::root(), &mut visited, &mut shape);
    shape
}

fn walk_into(
    node: &ShapeNode,
    at: DynamicOptic,
    visited: &mut HashSet<String>,
    shape: &mut SchemaShape,
) {
    shape.paths.push(at.clone());

    match node {
        ShapeNode::Primitive(_) => {}
        ShapeNode::Record(fields) => {
            for (name, field_shape) in fields {
                walk_into(field_shape, at.clone().field(name.clone()), visited, shape);
            }
        }
        ShapeNode::Variant(cases) => {
            let names = cases.iter().map(|(name, _)| name.clone()).collect();
            shape.variant_cases.push((at.clone(), names));
            for (name, case_shape) in cases {
                walk_into(case_shape, at.clone().case_of(name.clone()), visited, shape);
            }
        }
        ShapeNode::Optional(inner) => {
            shape.optional_paths.push(at.clone());
            walk_into(inner, at.wrapped(), visited, shape);
        }
        ShapeNode::Sequence(inner) => {
            walk_into(inner, at.elements(), visited, shape);
        }
        ShapeNode::Map(_, value) => {
            walk_into(value, at.map_values(), visited, shape);
        }
        ShapeNode::Lazy(name, thunk) => {
            if visited.contains(name) {
                return;
            }
            visited.insert(name.clone());
            let expanded = thunk();
            walk_into(&expanded, at, visited, shape);
        }
    }
}

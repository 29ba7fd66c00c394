//! Navigation nodes and structural shape patterns (spec §3.2).

use dynamorph_value::DynamicValue;
use serde::{Deserialize, Serialize};

/// One step of a [`crate::DynamicOptic`] path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Descend into a record's named field.
    Field(String),
    /// Descend into a variant's payload if its case matches.
    Case(String),
    /// Descend into a sequence element by index.
    AtIndex(usize),
    /// Multi-selection over several sequence indices (read-only contexts).
    AtIndices(Vec<usize>),
    /// Apply to every sequence element.
    Elements,
    /// Descend into a map value by key.
    AtMapKey(DynamicValue),
    /// Multi-selection over several map keys (read-only contexts).
    AtMapKeys(Vec<DynamicValue>),
    /// Traversal over every key in a map.
    MapKeys,
    /// Traversal over every value in a map.
    MapValues,
    /// Transparent pass-through wrapper.
    Wrapped,
    /// Descend into every subvalue whose structural shape matches `pattern`.
    SearchSchema(ShapePattern),
    /// Like `SearchSchema`, but matches a named nominal type. Requires
    /// schema context the dynamic-value tree alone cannot provide.
    TypeSearch(String),
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Field(name) => write!(f, ".{name}"),
            Node::Case(name) => write!(f, "/{name}"),
            Node::AtIndex(i) => write!(f, "[{i}]"),
            Node::AtIndices(is) => {
                let parts: Vec<String> = is.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(","))
            }
            Node::Elements => write!(f, "[*]"),
            Node::AtMapKey(k) => write!(f, "@{}", render_key(k)),
            Node::AtMapKeys(ks) => {
                let parts: Vec<String> = ks.iter().map(render_key).collect();
                write!(f, "@[{}]", parts.join(","))
            }
            Node::MapKeys => write!(f, "@keys"),
            Node::MapValues => write!(f, "@values"),
            Node::Wrapped => write!(f, "~"),
            Node::SearchSchema(pattern) => write!(f, "#{pattern}"),
            Node::TypeSearch(name) => write!(f, "#{name}"),
        }
    }
}

fn render_key(k: &DynamicValue) -> String {
    match k {
        DynamicValue::Primitive(p) => match p {
            dynamorph_value::PrimitiveValue::String(s) => format!("\"{}\"", escape_string(s)),
            dynamorph_value::PrimitiveValue::Char(c) => format!("'{c}'"),
            dynamorph_value::PrimitiveValue::Bool(b) => b.to_string(),
            other => other.to_canonical_string(),
        },
        other => format!("{other:?}"),
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// A structural pattern matched against a [`DynamicValue`]'s shape by
/// [`Node::SearchSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapePattern {
    Primitive(String),
    Record(Vec<(String, ShapePattern)>),
    Variant(Vec<String>),
    Optional(Box<ShapePattern>),
    Sequence(Box<ShapePattern>),
    Map(Box<ShapePattern>, Box<ShapePattern>),
    Nominal(String),
    Wildcard,
}

impl std::fmt::Display for ShapePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapePattern::Primitive(name) => write!(f, "{name}"),
            ShapePattern::Record(fields) => {
                let parts: Vec<String> = fields.iter().map(|(n, p)| format!("{n}:{p}")).collect();
                write!(f, "{{{}}}", parts.join(","))
            }
            ShapePattern::Variant(cases) => write!(f, "<{}>", cases.join("|")),
            ShapePattern::Optional(inner) => write!(f, "{inner}?"),
            ShapePattern::Sequence(inner) => write!(f, "[{inner}]"),
            ShapePattern::Map(k, v) => write!(f, "{{{k}:{v}}}"),
            ShapePattern::Nominal(name) => write!(f, "{name}"),
            ShapePattern::Wildcard => write!(f, "*"),
        }
    }
}

/// Does `value`'s structural shape match `pattern`?
///
/// `Nominal(_)` never matches in pure dynamic-value context — resolving it
/// requires schema awareness the core does not have (spec §9 open question).
pub fn shape_matches(value: &DynamicValue, pattern: &ShapePattern) -> bool {
    match pattern {
        ShapePattern::Wildcard => true,
        ShapePattern::Nominal(_) => false,
        ShapePattern::Primitive(name) => {
            matches!(value, DynamicValue::Primitive(p) if p.kind_name() == name)
        }
        ShapePattern::Record(fields) => match value {
            DynamicValue::Record(actual) => fields.iter().all(|(name, pat)| {
                actual
                    .iter()
                    .find(|(n, _)| n == name)
                    .is_some_and(|(_, v)| shape_matches(v, pat))
            }),
            _ => false,
        },
        ShapePattern::Variant(cases) => {
            matches!(value, DynamicValue::Variant(case, _) if cases.contains(case))
        }
        ShapePattern::Optional(inner) => match value {
            DynamicValue::Null => true,
            DynamicValue::Variant(case, _) if case == "None" => true,
            DynamicValue::Variant(case, payload) if case == "Some" => payload
                .field("value")
                .map(|v| shape_matches(v, inner))
                .unwrap_or(false),
            other => shape_matches(other, inner),
        },
        ShapePattern::Sequence(inner) => match value {
            DynamicValue::Sequence(items) => items.iter().all(|v| shape_matches(v, inner)),
            _ => false,
        },
        ShapePattern::Map(k, v) => match value {
            DynamicValue::Map(entries) => entries
                .iter()
                .all(|(key, val)| shape_matches(key, k) && shape_matches(val, v)),
            _ => false,
        },
    }
}

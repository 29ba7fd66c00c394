//! The universal dynamic-value tree (spec §3.1).

use serde::{Deserialize, Serialize};

use crate::primitive::PrimitiveValue;

/// Structural kind of a [`DynamicValue`], used for error reporting
/// (`StructuralMismatch`'s `actualKind`) and `SearchSchema` pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Primitive,
    Record,
    Sequence,
    Map,
    Variant,
    Null,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Primitive => "primitive",
            ValueKind::Record => "record",
            ValueKind::Sequence => "sequence",
            ValueKind::Map => "map",
            ValueKind::Variant => "variant",
            ValueKind::Null => "null",
        };
        write!(f, "{s}")
    }
}

/// Raised when a constructor would violate a [`DynamicValue`] invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("duplicate field name '{0}' in record")]
    DuplicateField(String),
    #[error("duplicate key in map")]
    DuplicateKey,
}

/// The universal tagged tree representation of any typed value.
///
/// Field order in [`DynamicValue::Record`] and entry order in
/// [`DynamicValue::Map`] are observable and preserved across all
/// transformations that do not explicitly add or remove entries (spec §5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DynamicValue {
    Primitive(PrimitiveValue),
    Record(Vec<(String, DynamicValue)>),
    Sequence(Vec<DynamicValue>),
    Map(Vec<(DynamicValue, DynamicValue)>),
    Variant(String, Box<DynamicValue>),
    Null,
}

impl DynamicValue {
    pub fn unit() -> Self {
        DynamicValue::Primitive(PrimitiveValue::Unit)
    }

    pub fn bool(b: bool) -> Self {
        DynamicValue::Primitive(PrimitiveValue::Bool(b))
    }

    pub fn i32(n: i32) -> Self {
        DynamicValue::Primitive(PrimitiveValue::I32(n))
    }

    pub fn i64(n: i64) -> Self {
        DynamicValue::Primitive(PrimitiveValue::I64(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        DynamicValue::Primitive(PrimitiveValue::String(s.into()))
    }

    /// Builds a record, checking the field-name-uniqueness invariant.
    pub fn record(fields: Vec<(String, DynamicValue)>) -> Result<Self, ValueError> {
        let mut seen = std::collections::HashSet::with_capacity(fields.len());
        for (name, _) in &fields {
            if !seen.insert(name.clone()) {
                return Err(ValueError::DuplicateField(name.clone()));
            }
        }
        Ok(DynamicValue::Record(fields))
    }

    /// Builds a record without checking invariants. Only use when the
    /// caller already guarantees uniqueness (e.g. copying an existing record
    /// field-for-field).
    pub fn record_unchecked(fields: Vec<(String, DynamicValue)>) -> Self {
        DynamicValue::Record(fields)
    }

    pub fn sequence(elements: Vec<DynamicValue>) -> Self {
        DynamicValue::Sequence(elements)
    }

    /// Builds a map, checking the key-uniqueness invariant.
    pub fn map(entries: Vec<(DynamicValue, DynamicValue)>) -> Result<Self, ValueError> {
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                if entries[i].0 == entries[j].0 {
                    return Err(ValueError::DuplicateKey);
                }
            }
        }
        Ok(DynamicValue::Map(entries))
    }

    pub fn map_unchecked(entries: Vec<(DynamicValue, DynamicValue)>) -> Self {
        DynamicValue::Map(entries)
    }

    pub fn variant(case: impl Into<String>, payload: DynamicValue) -> Self {
        DynamicValue::Variant(case.into(), Box::new(payload))
    }

    /// The option-as-variant encoding used throughout the spec: `Some(v)`.
    pub fn some(value: DynamicValue) -> Self {
        DynamicValue::variant("Some", DynamicValue::record_unchecked(vec![("value".into(), value)]))
    }

    /// The option-as-variant encoding's `None` case.
    pub fn none() -> Self {
        DynamicValue::variant("None", DynamicValue::Null)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            DynamicValue::Primitive(_) => ValueKind::Primitive,
            DynamicValue::Record(_) => ValueKind::Record,
            DynamicValue::Sequence(_) => ValueKind::Sequence,
            DynamicValue::Map(_) => ValueKind::Map,
            DynamicValue::Variant(_, _) => ValueKind::Variant,
            DynamicValue::Null => ValueKind::Null,
        }
    }

    pub fn as_record(&self) -> Option<&[(String, DynamicValue)]> {
        match self {
            DynamicValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(DynamicValue, DynamicValue)]> {
        match self {
            DynamicValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<(&str, &DynamicValue)> {
        match self {
            DynamicValue::Variant(case, payload) => Some((case.as_str(), payload)),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            DynamicValue::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Looks up a field in a record by name.
    pub fn field(&self, name: &str) -> Option<&DynamicValue> {
        self.as_record()?.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// True if this value is the `Some`/`None` option-as-variant encoding.
    pub fn is_option_encoding(&self) -> bool {
        matches!(self, DynamicValue::Variant(case, _) if case == "Some" || case == "None")
    }
}

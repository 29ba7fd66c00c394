//! The schema-reflection contract the migration core depends on (spec §6.1,
//! component C14).
//!
//! The core never sees a typed schema directly; everything it needs crosses
//! this trait's four methods. Grounded on `mig-types::traits::PidTree` — a
//! small, purely behavioral trait with no data of its own, one method per
//! capability the rest of the crate needs from a generated type.

use dynamorph_value::DynamicValue;

use crate::error::DecodeError;
use crate::shape::SchemaShape;

/// Implemented once per typed schema `S` the migration core needs to read,
/// write, default, or validate coverage against.
///
/// The core depends only on these four methods (spec §6.1); it never touches
/// `S`'s fields, constructors, or register layout directly.
pub trait SchemaReflect: Sized {
    /// Projects a value of this schema into a dynamic tree.
    fn to_dynamic(&self) -> DynamicValue;

    /// Attempts to reconstruct a value of this schema from a dynamic tree.
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DecodeError>;

    /// This schema's default value, if it has one.
    fn default_value() -> Option<Self>;

    /// The structural shape this schema projects to (spec §3.6).
    fn shape() -> SchemaShape;

    /// `default_value()`, projected to a dynamic tree (spec §6.1:
    /// `toDynamicValue(defaultValue)`). Derived from the two methods above;
    /// not a separate contract point.
    fn default_dynamic() -> Option<DynamicValue> {
        Self::default_value().map(|v| v.to_dynamic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{walk, ShapeNode};
    use dynamorph_value::ValueError;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: i32,
    }

    impl SchemaReflect for Person {
        fn to_dynamic(&self) -> DynamicValue {
            DynamicValue::record(vec![
                ("name".to_string(), DynamicValue::string(self.name.clone())),
                ("age".to_string(), DynamicValue::i32(self.age)),
            ])
            .expect("fixed, non-duplicate field set")
        }

        fn from_dynamic(value: &DynamicValue) -> Result<Self, DecodeError> {
            let record = value.as_record().ok_or_else(|| DecodeError::UnexpectedShape {
                expected: "record".into(),
                actual: value.kind().to_string(),
            })?;
            let name = record
                .iter()
                .find(|(name, _)| name == "name")
                .and_then(|(_, v)| v.as_primitive())
                .and_then(|p| match p {
                    dynamorph_value::PrimitiveValue::String(s) => Some(s.clone()),
                    _ => None,
                })
                .ok_or_else(|| DecodeError::MissingField { name: "name".into() })?;
            let age = record
                .iter()
                .find(|(name, _)| name == "age")
                .and_then(|(_, v)| v.as_primitive())
                .and_then(|p| match p {
                    dynamorph_value::PrimitiveValue::I32(i) => Some(*i),
                    _ => None,
                })
                .ok_or_else(|| DecodeError::MissingField { name: "age".into() })?;
            Ok(Person { name, age })
        }

        fn default_value() -> Option<Self> {
            Some(Person { name: String::new(), age: 0 })
        }

        fn shape() -> SchemaShape {
            walk(&ShapeNode::Record(vec![
                ("name".into(), ShapeNode::primitive("string")),
                ("age".into(), ShapeNode::primitive("i32")),
            ]))
        }
    }

    #[test]
    fn round_trips_through_dynamic() {
        let person = Person { name: "Ada".into(), age: 30 };
        let dv = person.to_dynamic();
        let back = Person::from_dynamic(&dv).unwrap();
        assert_eq!(person, back);
    }

    #[test]
    fn default_dynamic_is_derived_from_default_value() {
        let expected = Person::default_value().unwrap().to_dynamic();
        assert_eq!(Person::default_dynamic(), Some(expected));
    }

    #[test]
    fn from_dynamic_rejects_wrong_shape() {
        let err = Person::from_dynamic(&DynamicValue::i32(1)).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedShape { .. }));
    }

    #[test]
    fn shape_reports_both_fields() {
        let shape = Person::shape();
        assert!(shape.contains_path(&dynamorph_optic::DynamicOptic::root().field("name")));
        assert!(shape.contains_path(&dynamorph_optic::DynamicOptic::root().field("age")));
    }

    #[test]
    fn value_error_is_reachable_from_this_crate() {
        // Sanity check that dynamorph-value's error type is usable alongside
        // DecodeError in downstream crates without an extra dependency edge.
        let err = ValueError::DuplicateField("x".into());
        assert!(err.to_string().contains('x'));
    }
}

//! Migration engine (spec §4.6, component C8).
//!
//! `run` folds a migration's actions left-to-right over a `DynamicValue`,
//! short-circuiting on the first error. Every action navigates via
//! `dynamorph_optic::DynamicOptic`, evaluates embedded `Resolved`
//! expressions against the document as it stands *before* this action ran,
//! and dispatches per spec §4.6's per-action contract. All navigation inside
//! the migration core runs under `NavigateMode::Strict` — patch modes are a
//! `dynamorph-patch` concept; schema evolution has no "best effort" mode.

use std::cell::RefCell;

use dynamorph_expr::{eval_with_root, Resolved};
use dynamorph_optic::{DynamicOptic, NavigateMode, NavigationError, Node};
use dynamorph_value::DynamicValue;

use crate::action::MigrationAction;
use crate::error::SchemaError;

/// An ordered list of schema-evolution actions (spec §3.4/§4.6).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Migration {
    pub actions: Vec<MigrationAction>,
}

impl Migration {
    pub fn new(actions: Vec<MigrationAction>) -> Self {
        Migration { actions }
    }

    pub fn empty() -> Self {
        Migration { actions: Vec::new() }
    }

    /// The migration that undoes this one, in reverse action order.
    pub fn reverse(&self) -> Migration {
        Migration { actions: self.actions.iter().rev().map(MigrationAction::reverse).collect() }
    }
}

/// Runs `migration`'s actions over `document` in declared order, returning
/// the transformed tree or the first action's error.
pub fn run(document: &DynamicValue, migration: &Migration) -> Result<DynamicValue, SchemaError> {
    let mut current = document.clone();
    for action in &migration.actions {
        current = apply_action(&current, action)?;
    }
    Ok(current)
}

// `DynamicOptic::update`'s callback is pinned to `NavigationError`; stash the
// richer `SchemaError` here when a leaf closure fails for a non-navigation
// reason, mirroring `dynamorph_patch::apply`'s bridging pattern.
thread_local! {
    static LEAF_ERROR: RefCell<Option<SchemaError>> = const { RefCell::new(None) };
}

fn sentinel() -> NavigationError {
    NavigationError::UnsupportedNode { trace: dynamorph_optic::Trace::new(), node: "<migration-action>".to_string() }
}

fn update_at(
    document: &DynamicValue,
    at: &DynamicOptic,
    f: impl Fn(&DynamicValue) -> Result<DynamicValue, SchemaError>,
) -> Result<DynamicValue, SchemaError> {
    LEAF_ERROR.with(|cell| *cell.borrow_mut() = None);
    let result = at.update(document, NavigateMode::Strict, &mut |leaf| {
        f(leaf).map_err(|e| {
            LEAF_ERROR.with(|cell| *cell.borrow_mut() = Some(e));
            sentinel()
        })
    });
    match result {
        Ok(v) => Ok(v),
        Err(nav_err) => match LEAF_ERROR.with(|cell| cell.borrow_mut().take()) {
            Some(leaf_err) => Err(leaf_err),
            None => Err(SchemaError::from(nav_err)),
        },
    }
}

/// Splits `path` into its parent optic and trailing field name, required by
/// any action that names a field it is about to insert or remove (`at` +
/// `name` pairs already come pre-split; `Join`/`Split`'s single-path sides
/// need this to find where a new field belongs).
fn split_parent(path: &DynamicOptic) -> Result<(DynamicOptic, String), SchemaError> {
    let nodes = path.nodes();
    match nodes.last() {
        Some(Node::Field(name)) => {
            let parent = DynamicOptic(nodes[..nodes.len() - 1].to_vec());
            Ok((parent, name.clone()))
        }
        _ => Err(SchemaError::NotAFieldPath { path: path.render() }),
    }
}

fn require_record(value: &DynamicValue) -> Result<Vec<(String, DynamicValue)>, SchemaError> {
    value
        .as_record()
        .map(|fields| fields.to_vec())
        .ok_or_else(|| SchemaError::Validation(format!("expected a record, found {}", value.kind())))
}

fn insert_field(
    document: &DynamicValue,
    parent: &DynamicOptic,
    name: &str,
    value: DynamicValue,
) -> Result<DynamicValue, SchemaError> {
    update_at(document, parent, |leaf| {
        let mut fields = require_record(leaf)?;
        if fields.iter().any(|(n, _)| n == name) {
            return Err(SchemaError::field_exists(name));
        }
        fields.push((name.to_string(), value.clone()));
        Ok(DynamicValue::record_unchecked(fields))
    })
}

fn remove_field(document: &DynamicValue, parent: &DynamicOptic, name: &str) -> Result<DynamicValue, SchemaError> {
    update_at(document, parent, |leaf| {
        let fields = require_record(leaf)?;
        if !fields.iter().any(|(n, _)| n == name) {
            return Err(SchemaError::field_missing(name));
        }
        Ok(DynamicValue::record_unchecked(fields.into_iter().filter(|(n, _)| n != name).collect()))
    })
}

fn eval(expr: &Resolved, input: Option<&DynamicValue>, root: &DynamicValue) -> Result<DynamicValue, SchemaError> {
    eval_with_root(expr, input, Some(root)).map_err(SchemaError::from)
}

fn apply_action(document: &DynamicValue, action: &MigrationAction) -> Result<DynamicValue, SchemaError> {
    match action {
        MigrationAction::AddField { at, name, default } => {
            let record = at.select_one(document, NavigateMode::Strict)?.clone();
            require_record(&record)?;
            if record.field(name).is_some() {
                return Err(SchemaError::field_exists(name.clone()));
            }
            let value = eval(default, Some(&record), document)?;
            insert_field(document, at, name, value)
        }
        MigrationAction::DropField { at, name, .. } => remove_field(document, at, name),
        MigrationAction::Rename { at, from, to } => update_at(document, at, |leaf| {
            let fields = require_record(leaf)?;
            if !fields.iter().any(|(n, _)| n == from) {
                return Err(SchemaError::field_missing(from.clone()));
            }
            if fields.iter().any(|(n, _)| n == to) {
                return Err(SchemaError::field_exists(to.clone()));
            }
            let renamed = fields
                .into_iter()
                .map(|(n, v)| if n == *from { (to.clone(), v) } else { (n, v) })
                .collect();
            Ok(DynamicValue::record_unchecked(renamed))
        }),
        MigrationAction::TransformValue { at, transform, .. } => update_at(document, at, |leaf| {
            eval(transform, Some(leaf), document)
        }),
        MigrationAction::Mandate { at, default } => update_at(document, at, |leaf| match leaf.as_variant() {
            Some(("Some", payload)) => payload
                .field("value")
                .cloned()
                .ok_or_else(|| SchemaError::Validation("malformed Some encoding: missing 'value'".into())),
            Some(("None", _)) => eval(default, None, document),
            Some(_) => Err(SchemaError::Validation(format!("Mandate expected Some/None, found case '{}'", leaf.kind()))),
            None if leaf.is_null() => eval(default, None, document),
            None => Err(SchemaError::Validation(format!("Mandate expected Some/None/Null, found {}", leaf.kind()))),
        }),
        MigrationAction::Optionalize { at } => update_at(document, at, |leaf| Ok(DynamicValue::some(leaf.clone()))),
        MigrationAction::Join { at, source_paths, combiner, .. } => {
            let mut projected = Vec::with_capacity(source_paths.len());
            for path in source_paths {
                let (_, name) = split_parent(path)?;
                let value = path.select_one(document, NavigateMode::Strict)?.clone();
                projected.push((name, value));
            }
            let projected_record = DynamicValue::record_unchecked(projected);
            let result = eval(combiner, Some(&projected_record), document)?;
            let (parent, name) = split_parent(at)?;
            let mut next = insert_field(document, &parent, &name, result)?;
            for path in source_paths {
                let (src_parent, src_name) = split_parent(path)?;
                next = remove_field(&next, &src_parent, &src_name)?;
            }
            Ok(next)
        }
        MigrationAction::Split { at, target_paths, splitter, .. } => {
            let source = at.select_one(document, NavigateMode::Strict)?.clone();
            let result = eval(splitter, Some(&source), document)?;
            let elements = result
                .as_sequence()
                .ok_or_else(|| SchemaError::Validation(format!("splitter must yield a sequence, found {}", result.kind())))?
                .to_vec();
            if elements.len() != target_paths.len() {
                return Err(SchemaError::ArityMismatch { produced: elements.len(), expected: target_paths.len() });
            }
            let mut next = document.clone();
            for (path, value) in target_paths.iter().zip(elements) {
                let (parent, name) = split_parent(path)?;
                next = insert_field(&next, &parent, &name, value)?;
            }
            let (parent, name) = split_parent(at)?;
            remove_field(&next, &parent, &name)
        }
        MigrationAction::ChangeType { at, converter, .. } => update_at(document, at, |leaf| {
            eval(converter, Some(leaf), document)
        }),
        MigrationAction::RenameCase { at, from, to } => update_at(document, at, |leaf| match leaf.as_variant() {
            Some((case, payload)) if case == from => Ok(DynamicValue::variant(to.clone(), payload.clone())),
            Some(_) => Ok(leaf.clone()),
            None => Err(SchemaError::Validation(format!("RenameCase expected a variant, found {}", leaf.kind()))),
        }),
        MigrationAction::TransformCase { at, case_name, nested } => update_at(document, at, |leaf| {
            match leaf.as_variant() {
                Some((case, payload)) if case == case_name => {
                    let nested_migration = Migration::new(nested.clone());
                    let transformed = run(payload, &nested_migration)?;
                    Ok(DynamicValue::variant(case_name.clone(), transformed))
                }
                Some(_) => Ok(leaf.clone()),
                None => Err(SchemaError::Validation(format!(
                    "TransformCase expected a variant, found {}",
                    leaf.kind()
                ))),
            }
        }),
        MigrationAction::TransformElements { at, transform, .. } => update_at(document, at, |leaf| {
            let elements = leaf
                .as_sequence()
                .ok_or_else(|| SchemaError::Validation(format!("expected a sequence, found {}", leaf.kind())))?;
            let transformed = elements
                .iter()
                .map(|e| eval(transform, Some(e), document))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynamicValue::sequence(transformed))
        }),
        MigrationAction::TransformKeys { at, transform, .. } => update_at(document, at, |leaf| {
            let entries = leaf
                .as_map()
                .ok_or_else(|| SchemaError::Validation(format!("expected a map, found {}", leaf.kind())))?;
            let transformed = entries
                .iter()
                .map(|(k, v)| eval(transform, Some(k), document).map(|nk| (nk, v.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynamicValue::map(transformed)?)
        }),
        MigrationAction::TransformValues { at, transform, .. } => update_at(document, at, |leaf| {
            let entries = leaf
                .as_map()
                .ok_or_else(|| SchemaError::Validation(format!("expected a map, found {}", leaf.kind())))?;
            let transformed = entries
                .iter()
                .map(|(k, v)| eval(transform, Some(v), document).map(|nv| (k.clone(), nv)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynamicValue::map(transformed)?)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_value::DynamicValue;

    fn root() -> DynamicOptic {
        DynamicOptic::root()
    }

    #[test]
    fn add_field_appends_and_reverses() {
        let source = DynamicValue::record(vec![("name".into(), DynamicValue::string("Alice"))]).unwrap();
        let migration = Migration::new(vec![MigrationAction::AddField {
            at: root(),
            name: "age".into(),
            default: Resolved::literal(DynamicValue::i32(0)),
        }]);
        let migrated = run(&source, &migration).unwrap();
        let expected =
            DynamicValue::record(vec![("name".into(), DynamicValue::string("Alice")), ("age".into(), DynamicValue::i32(0))])
                .unwrap();
        assert_eq!(migrated, expected);

        let back = run(&migrated, &migration.reverse()).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn rename_then_noop_convert() {
        let source = DynamicValue::record(vec![
            ("firstName".into(), DynamicValue::string("Alice")),
            ("lastName".into(), DynamicValue::string("Smith")),
        ])
        .unwrap();
        let migration = Migration::new(vec![
            MigrationAction::Rename { at: root(), from: "firstName".into(), to: "first".into() },
            MigrationAction::Rename { at: root(), from: "lastName".into(), to: "last".into() },
            MigrationAction::TransformValue {
                at: root().field("first"),
                transform: Resolved::convert("String", "String", Resolved::Identity),
                reverse_transform: None,
            },
        ]);
        let migrated = run(&source, &migration).unwrap();
        let expected = DynamicValue::record(vec![
            ("first".into(), DynamicValue::string("Alice")),
            ("last".into(), DynamicValue::string("Smith")),
        ])
        .unwrap();
        assert_eq!(migrated, expected);
    }

    #[test]
    fn join_then_split_round_trips() {
        let source = DynamicValue::record(vec![
            ("first".into(), DynamicValue::string("Alice")),
            ("last".into(), DynamicValue::string("Smith")),
        ])
        .unwrap();
        let combiner = Resolved::concat(
            vec![
                Resolved::field("first", Resolved::Identity),
                Resolved::field("last", Resolved::Identity),
            ],
            " ",
        );
        let splitter = Resolved::SplitString { sep: " ".to_string(), inner: Box::new(Resolved::Identity) };
        let join = MigrationAction::Join {
            at: root().field("full"),
            source_paths: vec![root().field("first"), root().field("last")],
            combiner,
            splitter: Some(splitter),
        };
        let migration = Migration::new(vec![join]);
        let migrated = run(&source, &migration).unwrap();
        let expected = DynamicValue::record(vec![("full".into(), DynamicValue::string("Alice Smith"))]).unwrap();
        assert_eq!(migrated, expected);

        let back = run(&migrated, &migration.reverse()).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn drop_field_errors_when_missing() {
        let source = DynamicValue::record(vec![("name".into(), DynamicValue::string("Alice"))]).unwrap();
        let migration = Migration::new(vec![MigrationAction::DropField {
            at: root(),
            name: "missing".into(),
            default_for_reverse: None,
        }]);
        assert!(run(&source, &migration).is_err());
    }

    #[test]
    fn transform_elements_maps_every_item() {
        let source = DynamicValue::record(vec![(
            "tags".into(),
            DynamicValue::sequence(vec![DynamicValue::string("a"), DynamicValue::string("b")]),
        )])
        .unwrap();
        let migration = Migration::new(vec![MigrationAction::TransformElements {
            at: root().field("tags"),
            transform: Resolved::concat(vec![Resolved::Identity, Resolved::literal(DynamicValue::string("!"))], ""),
            reverse: None,
        }]);
        let migrated = run(&source, &migration).unwrap();
        let tags = migrated.field("tags").unwrap().as_sequence().unwrap();
        assert_eq!(tags, &[DynamicValue::string("a!"), DynamicValue::string("b!")]);
    }

    #[test]
    fn mandate_unwraps_some_and_defaults_on_none() {
        let with_some = DynamicValue::record(vec![("nick".into(), DynamicValue::some(DynamicValue::string("Al")))]).unwrap();
        let migration = Migration::new(vec![MigrationAction::Mandate {
            at: root().field("nick"),
            default: Resolved::literal(DynamicValue::string("anon")),
        }]);
        let migrated = run(&with_some, &migration).unwrap();
        assert_eq!(migrated.field("nick"), Some(&DynamicValue::string("Al")));

        let with_none = DynamicValue::record(vec![("nick".into(), DynamicValue::none())]).unwrap();
        let migrated = run(&with_none, &migration).unwrap();
        assert_eq!(migrated.field("nick"), Some(&DynamicValue::string("anon")));
    }
}

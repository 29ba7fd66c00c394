//! `DynamicOptic`: an ordered path of [`Node`]s, and the navigation
//! functions (`select`, `update`) that walk one over a
//! [`DynamicValue`] (spec §3, §4.4).

use crate::error::{NavigationError, Trace};
use crate::node::{shape_matches, Node, ShapePattern};
use dynamorph_value::DynamicValue;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// How navigation treats structurally-ambiguous steps. Shared between the
/// optic engine, the patch engine and (in `Strict` only) the migration
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigateMode {
    /// Any structural surprise is an error.
    #[default]
    Strict,
    /// Best-effort: surprises are skipped rather than failed.
    Lenient,
    /// Like `Lenient`, but out-of-bounds sequence indices clamp into range
    /// instead of being skipped.
    Clobber,
}

/// An ordered path of navigation steps over a [`DynamicValue`] tree.
///
/// The empty optic (`DynamicOptic::root()`) denotes the value itself and
/// serializes as a bare `{}` rather than `[]`, matching how schema tooling
/// represents "no path" (spec §6.4).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicOptic(pub Vec<Node>);

impl DynamicOptic {
    pub fn root() -> Self {
        DynamicOptic(Vec::new())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn prepend(mut self, node: Node) -> Self {
        self.0.insert(0, node);
        self
    }

    pub fn append(mut self, node: Node) -> Self {
        self.0.push(node);
        self
    }

    pub fn concat(mut self, other: DynamicOptic) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        self.append(Node::Field(name.into()))
    }

    pub fn case_of(self, name: impl Into<String>) -> Self {
        self.append(Node::Case(name.into()))
    }

    pub fn at_index(self, index: usize) -> Self {
        self.append(Node::AtIndex(index))
    }

    pub fn at_indices(self, indices: Vec<usize>) -> Self {
        self.append(Node::AtIndices(indices))
    }

    pub fn elements(self) -> Self {
        self.append(Node::Elements)
    }

    pub fn at_key(self, key: DynamicValue) -> Self {
        self.append(Node::AtMapKey(key))
    }

    pub fn at_keys(self, keys: Vec<DynamicValue>) -> Self {
        self.append(Node::AtMapKeys(keys))
    }

    pub fn map_keys(self) -> Self {
        self.append(Node::MapKeys)
    }

    pub fn map_values(self) -> Self {
        self.append(Node::MapValues)
    }

    pub fn wrapped(self) -> Self {
        self.append(Node::Wrapped)
    }

    pub fn search_schema(self, pattern: ShapePattern) -> Self {
        self.append(Node::SearchSchema(pattern))
    }

    pub fn type_search(self, name: impl Into<String>) -> Self {
        self.append(Node::TypeSearch(name.into()))
    }

    /// Renders this optic back to the path-string syntax (spec §6.2).
    pub fn render(&self) -> String {
        self.0.iter().map(|n| n.to_string()).collect()
    }

    pub fn select<'a>(
        &self,
        value: &'a DynamicValue,
        mode: NavigateMode,
    ) -> Result<Vec<&'a DynamicValue>, NavigationError> {
        select_rec(value, &self.0, mode)
    }

    pub fn select_one<'a>(
        &self,
        value: &'a DynamicValue,
        mode: NavigateMode,
    ) -> Result<&'a DynamicValue, NavigationError> {
        let matches = self.select(value, mode)?;
        match matches.len() {
            1 => Ok(matches[0]),
            count => Err(NavigationError::NotSingleMatch {
                trace: Trace::new(),
                count,
            }),
        }
    }

    pub fn update(
        &self,
        value: &DynamicValue,
        mode: NavigateMode,
        f: &mut dyn FnMut(&DynamicValue) -> Result<DynamicValue, NavigationError>,
    ) -> Result<DynamicValue, NavigationError> {
        update_rec(value, &self.0, mode, f)
    }
}

impl std::ops::Add for DynamicOptic {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.concat(rhs)
    }
}

impl fmt::Display for DynamicOptic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

// Empty optics serialize as `{}`; non-empty ones as a JSON array of nodes.
impl Serialize for DynamicOptic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.is_empty() {
            let map = serializer.serialize_map(Some(0))?;
            serde::ser::SerializeMap::end(map)
        } else {
            let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
            for node in &self.0 {
                seq.serialize_element(node)?;
            }
            seq.end()
        }
    }
}

impl<'de> Deserialize<'de> for DynamicOptic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OpticVisitor;

        impl<'de> Visitor<'de> for OpticVisitor {
            type Value = DynamicOptic;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an empty object for the root optic, or an array of nodes")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                if map.next_entry::<String, serde_json_value_placeholder::Ignored>()?.is_some() {
                    return Err(de::Error::custom("root optic must serialize as an empty object"));
                }
                Ok(DynamicOptic::root())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut nodes = Vec::new();
                while let Some(node) = seq.next_element()? {
                    nodes.push(node);
                }
                Ok(DynamicOptic(nodes))
            }
        }

        deserializer.deserialize_any(OpticVisitor)
    }
}

// A minimal ignored-value type so the map visitor above doesn't need to pull
// in `serde_json` as a non-dev dependency just to discard unexpected entries.
mod serde_json_value_placeholder {
    use serde::de::{Deserialize, Deserializer, IgnoredAny};

    pub struct Ignored;

    impl<'de> Deserialize<'de> for Ignored {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            IgnoredAny::deserialize(deserializer).map(|_| Ignored)
        }
    }
}

fn select_rec<'a>(
    value: &'a DynamicValue,
    nodes: &[Node],
    mode: NavigateMode,
) -> Result<Vec<&'a DynamicValue>, NavigationError> {
    let Some((node, rest)) = nodes.split_first() else {
        return Ok(vec![value]);
    };

    match node {
        Node::Field(name) => match value {
            DynamicValue::Record(fields) => match fields.iter().find(|(n, _)| n == name) {
                Some((_, v)) => select_rec(v, rest, mode).map_err(|e| e.with_prefix(node.clone())),
                None => Err(NavigationError::MissingField {
                    trace: Trace::new(),
                    name: name.clone(),
                }
                .with_prefix(node.clone())),
            },
            other => Err(structural_mismatch("record", other, node)),
        },
        Node::Case(name) => match value {
            DynamicValue::Variant(case, payload) => {
                if case == name {
                    select_rec(payload, rest, mode).map_err(|e| e.with_prefix(node.clone()))
                } else {
                    Err(NavigationError::CaseMismatch {
                        trace: Trace::new(),
                        expected: name.clone(),
                        actual: case.clone(),
                    }
                    .with_prefix(node.clone()))
                }
            }
            other => Err(structural_mismatch("variant", other, node)),
        },
        Node::AtIndex(i) => match value {
            DynamicValue::Sequence(items) => match resolve_index(*i, items.len(), mode) {
                Some(idx) => select_rec(&items[idx], rest, mode).map_err(|e| e.with_prefix(node.clone())),
                None => Err(out_of_bounds("sequence", *i as i64, items.len(), node)),
            },
            other => Err(structural_mismatch("sequence", other, node)),
        },
        Node::AtIndices(indices) => match value {
            DynamicValue::Sequence(items) => {
                let mut out = Vec::new();
                for i in indices {
                    match items.get(*i) {
                        Some(item) => out.extend(select_rec(item, rest, mode).map_err(|e| e.with_prefix(node.clone()))?),
                        None if mode == NavigateMode::Strict => {
                            return Err(out_of_bounds("sequence", *i as i64, items.len(), node))
                        }
                        None => {}
                    }
                }
                Ok(out)
            }
            other => Err(structural_mismatch("sequence", other, node)),
        },
        Node::Elements => match value {
            DynamicValue::Sequence(items) => {
                if items.is_empty() {
                    if mode == NavigateMode::Strict {
                        return Err(NavigationError::NoMatches { trace: Trace::new() }.with_prefix(node.clone()));
                    }
                    return Ok(Vec::new());
                }
                let mut out = Vec::new();
                for item in items {
                    if case_mismatch_under(item, rest) {
                        continue;
                    }
                    match select_rec(item, rest, mode) {
                        Ok(mut v) => out.append(&mut v),
                        Err(e) if mode == NavigateMode::Strict => return Err(e.with_prefix(node.clone())),
                        Err(_) => {}
                    }
                }
                Ok(out)
            }
            other => Err(structural_mismatch("sequence", other, node)),
        },
        Node::AtMapKey(key) => match value {
            DynamicValue::Map(entries) => match entries.iter().find(|(k, _)| k == key) {
                Some((_, v)) => select_rec(v, rest, mode).map_err(|e| e.with_prefix(node.clone())),
                None => Err(NavigationError::MissingKey {
                    trace: Trace::new(),
                    key: format!("{key:?}"),
                }
                .with_prefix(node.clone())),
            },
            other => Err(structural_mismatch("map", other, node)),
        },
        Node::AtMapKeys(keys) => match value {
            DynamicValue::Map(entries) => {
                let mut out = Vec::new();
                for key in keys {
                    match entries.iter().find(|(k, _)| k == key) {
                        Some((_, v)) => out.extend(select_rec(v, rest, mode).map_err(|e| e.with_prefix(node.clone()))?),
                        None if mode == NavigateMode::Strict => {
                            return Err(NavigationError::MissingKey {
                                trace: Trace::new(),
                                key: format!("{key:?}"),
                            }
                            .with_prefix(node.clone()))
                        }
                        None => {}
                    }
                }
                Ok(out)
            }
            other => Err(structural_mismatch("map", other, node)),
        },
        Node::MapKeys => match value {
            DynamicValue::Map(entries) => {
                let mut out = Vec::new();
                for (k, _) in entries {
                    out.extend(select_rec(k, rest, mode).map_err(|e| e.with_prefix(node.clone()))?);
                }
                Ok(out)
            }
            other => Err(structural_mismatch("map", other, node)),
        },
        Node::MapValues => match value {
            DynamicValue::Map(entries) => {
                let mut out = Vec::new();
                for (_, v) in entries {
                    out.extend(select_rec(v, rest, mode).map_err(|e| e.with_prefix(node.clone()))?);
                }
                Ok(out)
            }
            other => Err(structural_mismatch("map", other, node)),
        },
        Node::Wrapped => select_rec(value, rest, mode).map_err(|e| e.with_prefix(node.clone())),
        Node::SearchSchema(pattern) => {
            let mut out = Vec::new();
            find_shape_matches(value, pattern, &mut out);
            if out.is_empty() {
                return if mode == NavigateMode::Strict {
                    Err(NavigationError::NoMatches { trace: Trace::new() }.with_prefix(node.clone()))
                } else {
                    Ok(Vec::new())
                };
            }
            let mut result = Vec::new();
            for matched in out {
                result.extend(select_rec(matched, rest, mode).map_err(|e| e.with_prefix(node.clone()))?);
            }
            Ok(result)
        }
        Node::TypeSearch(_) => {
            if mode == NavigateMode::Strict {
                Err(NavigationError::UnsupportedNode {
                    trace: Trace::new(),
                    node: node.to_string(),
                }
                .with_prefix(node.clone()))
            } else {
                Ok(Vec::new())
            }
        }
    }
}

fn update_rec(
    value: &DynamicValue,
    nodes: &[Node],
    mode: NavigateMode,
    f: &mut dyn FnMut(&DynamicValue) -> Result<DynamicValue, NavigationError>,
) -> Result<DynamicValue, NavigationError> {
    let Some((node, rest)) = nodes.split_first() else {
        return f(value);
    };

    match node {
        Node::Field(name) => match value {
            DynamicValue::Record(fields) => match fields.iter().position(|(n, _)| n == name) {
                Some(idx) => {
                    let new_value = update_rec(&fields[idx].1, rest, mode, f).map_err(|e| e.with_prefix(node.clone()))?;
                    let mut new_fields = fields.clone();
                    new_fields[idx].1 = new_value;
                    Ok(DynamicValue::Record(new_fields))
                }
                None => Err(NavigationError::MissingField {
                    trace: Trace::new(),
                    name: name.clone(),
                }
                .with_prefix(node.clone())),
            },
            other => Err(structural_mismatch("record", other, node)),
        },
        Node::Case(name) => match value {
            DynamicValue::Variant(case, payload) => {
                if case == name {
                    let new_payload = update_rec(payload, rest, mode, f).map_err(|e| e.with_prefix(node.clone()))?;
                    Ok(DynamicValue::Variant(case.clone(), Box::new(new_payload)))
                } else {
                    Err(NavigationError::CaseMismatch {
                        trace: Trace::new(),
                        expected: name.clone(),
                        actual: case.clone(),
                    }
                    .with_prefix(node.clone()))
                }
            }
            other => Err(structural_mismatch("variant", other, node)),
        },
        Node::AtIndex(i) => match value {
            DynamicValue::Sequence(items) => match resolve_index(*i, items.len(), mode) {
                Some(idx) => {
                    let new_item = update_rec(&items[idx], rest, mode, f).map_err(|e| e.with_prefix(node.clone()))?;
                    let mut new_items = items.clone();
                    new_items[idx] = new_item;
                    Ok(DynamicValue::Sequence(new_items))
                }
                None => Err(out_of_bounds("sequence", *i as i64, items.len(), node)),
            },
            other => Err(structural_mismatch("sequence", other, node)),
        },
        Node::AtIndices(_) | Node::AtMapKeys(_) | Node::MapKeys | Node::MapValues => {
            Err(NavigationError::UnsupportedNode {
                trace: Trace::new(),
                node: node.to_string(),
            })
        }
        Node::Elements => match value {
            DynamicValue::Sequence(items) => {
                if items.is_empty() {
                    return if mode == NavigateMode::Strict {
                        Err(NavigationError::NoMatches { trace: Trace::new() }.with_prefix(node.clone()))
                    } else {
                        Ok(value.clone())
                    };
                }
                let mut new_items = Vec::with_capacity(items.len());
                for item in items {
                    if case_mismatch_under(item, rest) {
                        new_items.push(item.clone());
                        continue;
                    }
                    new_items.push(update_rec(item, rest, mode, f).map_err(|e| e.with_prefix(node.clone()))?);
                }
                Ok(DynamicValue::Sequence(new_items))
            }
            other => Err(structural_mismatch("sequence", other, node)),
        },
        Node::AtMapKey(key) => match value {
            DynamicValue::Map(entries) => match entries.iter().position(|(k, _)| k == key) {
                Some(idx) => {
                    let new_value = update_rec(&entries[idx].1, rest, mode, f).map_err(|e| e.with_prefix(node.clone()))?;
                    let mut new_entries = entries.clone();
                    new_entries[idx].1 = new_value;
                    Ok(DynamicValue::Map(new_entries))
                }
                None => Err(NavigationError::MissingKey {
                    trace: Trace::new(),
                    key: format!("{key:?}"),
                }
                .with_prefix(node.clone())),
            },
            other => Err(structural_mismatch("map", other, node)),
        },
        Node::Wrapped => update_rec(value, rest, mode, f).map_err(|e| e.with_prefix(node.clone())),
        Node::SearchSchema(pattern) => {
            let mut count = 0usize;
            let rebuilt = search_update(value, pattern, rest, mode, f, &mut count).map_err(|e| e.with_prefix(node.clone()))?;
            if count == 0 {
                if mode == NavigateMode::Strict {
                    Err(NavigationError::NoMatches { trace: Trace::new() }.with_prefix(node.clone()))
                } else {
                    Ok(value.clone())
                }
            } else {
                Ok(rebuilt)
            }
        }
        Node::TypeSearch(_) => {
            if mode == NavigateMode::Strict {
                Err(NavigationError::UnsupportedNode {
                    trace: Trace::new(),
                    node: node.to_string(),
                }
                .with_prefix(node.clone()))
            } else {
                Ok(value.clone())
            }
        }
    }
}

/// `Elements` (and `SearchSchema`, transitively) skip a variant element
/// unconditionally, in every mode, when the immediately-following step is a
/// `Case` that doesn't match that element — this isn't an error, it's how
/// heterogeneous sequences of variants are meant to be traversed.
fn case_mismatch_under(item: &DynamicValue, rest: &[Node]) -> bool {
    match (rest.first(), item) {
        (Some(Node::Case(expected)), DynamicValue::Variant(actual, _)) => expected != actual,
        _ => false,
    }
}

fn resolve_index(i: usize, len: usize, mode: NavigateMode) -> Option<usize> {
    if i < len {
        Some(i)
    } else if mode == NavigateMode::Clobber && len > 0 {
        Some(len - 1)
    } else {
        None
    }
}

fn structural_mismatch(expected: &str, actual: &DynamicValue, node: &Node) -> NavigationError {
    NavigationError::StructuralMismatch {
        trace: Trace::new(),
        expected: expected.to_string(),
        actual: actual.kind(),
    }
    .with_prefix(node.clone())
}

fn out_of_bounds(kind: &str, index: i64, len: usize, node: &Node) -> NavigationError {
    NavigationError::OutOfBounds {
        trace: Trace::new(),
        kind: kind.to_string(),
        index,
        len,
    }
    .with_prefix(node.clone())
}

/// Finds every maximal subtree matching `pattern`, never descending beneath
/// an already-matched subtree (spec §4.4 + implementation decision recorded
/// in DESIGN.md: avoids overlapping rewrites on nested matches).
fn find_shape_matches<'a>(value: &'a DynamicValue, pattern: &ShapePattern, out: &mut Vec<&'a DynamicValue>) {
    if shape_matches(value, pattern) {
        out.push(value);
        return;
    }
    match value {
        DynamicValue::Record(fields) => {
            for (_, v) in fields {
                find_shape_matches(v, pattern, out);
            }
        }
        DynamicValue::Sequence(items) => {
            for item in items {
                find_shape_matches(item, pattern, out);
            }
        }
        DynamicValue::Map(entries) => {
            for (k, v) in entries {
                find_shape_matches(k, pattern, out);
                find_shape_matches(v, pattern, out);
            }
        }
        DynamicValue::Variant(_, payload) => find_shape_matches(payload, pattern, out),
        DynamicValue::Primitive(_) | DynamicValue::Null => {}
    }
}

fn search_update(
    value: &DynamicValue,
    pattern: &ShapePattern,
    rest: &[Node],
    mode: NavigateMode,
    f: &mut dyn FnMut(&DynamicValue) -> Result<DynamicValue, NavigationError>,
    count: &mut usize,
) -> Result<DynamicValue, NavigationError> {
    if shape_matches(value, pattern) {
        *count += 1;
        return update_rec(value, rest, mode, f);
    }
    match value {
        DynamicValue::Record(fields) => {
            let mut new_fields = Vec::with_capacity(fields.len());
            for (name, v) in fields {
                new_fields.push((name.clone(), search_update(v, pattern, rest, mode, f, count)?));
            }
            Ok(DynamicValue::Record(new_fields))
        }
        DynamicValue::Sequence(items) => {
            let mut new_items = Vec::with_capacity(items.len());
            for item in items {
                new_items.push(search_update(item, pattern, rest, mode, f, count)?);
            }
            Ok(DynamicValue::Sequence(new_items))
        }
        DynamicValue::Map(entries) => {
            let mut new_entries = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                let new_k = search_update(k, pattern, rest, mode, f, count)?;
                let new_v = search_update(v, pattern, rest, mode, f, count)?;
                new_entries.push((new_k, new_v));
            }
            Ok(DynamicValue::Map(new_entries))
        }
        DynamicValue::Variant(case, payload) => {
            let new_payload = search_update(payload, pattern, rest, mode, f, count)?;
            Ok(DynamicValue::Variant(case.clone(), Box::new(new_payload)))
        }
        DynamicValue::Primitive(_) | DynamicValue::Null => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_value::DynamicValue;

    fn sample() -> DynamicValue {
        DynamicValue::record(vec![
            ("name".into(), DynamicValue::string("ada")),
            (
                "tags".into(),
                DynamicValue::sequence(vec![DynamicValue::string("a"), DynamicValue::string("b")]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn field_select_returns_single_match() {
        let optic = DynamicOptic::root().field("name");
        let matches = optic.select(&sample(), NavigateMode::Strict).unwrap();
        assert_eq!(matches, vec![&DynamicValue::string("ada")]);
    }

    #[test]
    fn missing_field_errors_regardless_of_mode() {
        let optic = DynamicOptic::root().field("missing");
        assert!(optic.select(&sample(), NavigateMode::Strict).is_err());
        assert!(optic.select(&sample(), NavigateMode::Lenient).is_err());
    }

    #[test]
    fn at_index_clobber_clamps_out_of_range() {
        let optic = DynamicOptic::root().field("tags").at_index(9);
        let strict = optic.select(&sample(), NavigateMode::Strict);
        assert!(strict.is_err());
        let clobbered = optic.select(&sample(), NavigateMode::Clobber).unwrap();
        assert_eq!(clobbered, vec![&DynamicValue::string("b")]);
    }

    #[test]
    fn elements_update_applies_to_every_item() {
        let optic = DynamicOptic::root().field("tags").elements();
        let updated = optic
            .update(&sample(), NavigateMode::Strict, &mut |v| {
                Ok(DynamicValue::string(&format!("{}!", v.as_primitive().unwrap().to_canonical_string())))
            })
            .unwrap();
        let tags = updated.field("tags").unwrap().as_sequence().unwrap();
        assert_eq!(tags[0], DynamicValue::string("a!"));
        assert_eq!(tags[1], DynamicValue::string("b!"));
    }

    #[test]
    fn elements_on_empty_sequence_strict_errors_lenient_unchanged() {
        let empty = DynamicValue::record(vec![("tags".into(), DynamicValue::sequence(vec![]))]).unwrap();
        let optic = DynamicOptic::root().field("tags").elements();
        assert!(optic.update(&empty, NavigateMode::Strict, &mut |v| Ok(v.clone())).is_err());
        let unchanged = optic.update(&empty, NavigateMode::Lenient, &mut |v| Ok(v.clone())).unwrap();
        assert_eq!(unchanged, empty);
    }

    #[test]
    fn elements_skips_case_mismatch_silently_in_strict_mode() {
        let value = DynamicValue::sequence(vec![
            DynamicValue::variant("Active", DynamicValue::unit()),
            DynamicValue::variant("Retired", DynamicValue::unit()),
        ]);
        let optic = DynamicOptic::root().elements().case_of("Active");
        let result = optic.update(&value, NavigateMode::Strict, &mut |_| Ok(DynamicValue::unit())).unwrap();
        assert_eq!(result, value);
    }

    #[test]
    fn at_indices_is_unsupported_in_update() {
        let optic = DynamicOptic::root().at_indices(vec![0, 1]);
        let err = optic.update(&sample(), NavigateMode::Strict, &mut |v| Ok(v.clone()));
        assert!(matches!(err, Err(NavigationError::UnsupportedNode { .. })));
    }

    #[test]
    fn render_round_trips_field_and_index() {
        let optic = DynamicOptic::root().field("tags").at_index(0);
        assert_eq!(optic.render(), ".tags[0]");
    }

    #[test]
    fn root_optic_is_display_empty() {
        assert_eq!(DynamicOptic::root().render(), "");
    }
}

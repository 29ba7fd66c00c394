//! Evaluator for [`crate::ast::Resolved`] (spec §4.5).
//!
//! The spec's source carries both a legacy `Resolved` and a newer
//! `evalDynamicWithRoot`-shaped one; this crate implements only the latter
//! (SPEC_FULL §5 open-question resolution), so there is a single evaluation
//! entry point, [`eval_with_root`], parametrized over an optional input and
//! an optional root.

use dynamorph_optic::NavigateMode;
use dynamorph_value::{DynamicValue, PrimitiveValue};

use crate::ast::{DefaultSpec, Resolved};
use crate::error::EvalError;

/// Evaluates `expr` against `input`, with no root value available.
pub fn eval(expr: &Resolved, input: &DynamicValue) -> Result<DynamicValue, EvalError> {
    eval_with_root(expr, Some(input), None)
}

/// Evaluates `expr` against an optional `input` and an optional `root`.
///
/// `input` is required by [`Resolved::Identity`] (directly or transitively,
/// see [`Resolved::requires_input`]); `root` is required by
/// [`Resolved::RootAccess`].
pub fn eval_with_root(
    expr: &Resolved,
    input: Option<&DynamicValue>,
    root: Option<&DynamicValue>,
) -> Result<DynamicValue, EvalError> {
    match expr {
        Resolved::Literal(v) => Ok(v.clone()),
        Resolved::Identity => input.cloned().ok_or(EvalError::MissingInput),
        Resolved::FieldAccess(name, inner) => {
            let v = eval_with_root(inner, input, root)?;
            v.field(name).cloned().ok_or_else(|| EvalError::MissingField { name: name.clone() })
        }
        Resolved::OpticAccess(path, inner) => {
            let v = eval_with_root(inner, input, root)?;
            let matched = path.select_one(&v, NavigateMode::Strict)?;
            Ok(matched.clone())
        }
        Resolved::RootAccess(path) => {
            let r = root.ok_or(EvalError::MissingRoot)?;
            let matched = path.select_one(r, NavigateMode::Strict)?;
            Ok(matched.clone())
        }
        Resolved::DefaultValue(spec) => match spec {
            DefaultSpec::Value(v) => Ok(v.clone()),
            DefaultSpec::Error(msg) => Err(EvalError::Failed(msg.clone())),
        },
        Resolved::Convert { from, to, inner } => {
            let v = eval_with_root(inner, input, root)?;
            let prim = v.as_primitive().ok_or_else(|| EvalError::StructuralMismatch {
                expected: "primitive".to_string(),
                actual: v.kind(),
            })?;
            convert_primitive(prim, from, to).map(DynamicValue::Primitive)
        }
        Resolved::Concat { parts, sep } => {
            let mut rendered = Vec::with_capacity(parts.len());
            for part in parts {
                let v = eval_with_root(part, input, root)?;
                rendered.push(canonical_string(&v)?);
            }
            Ok(DynamicValue::string(rendered.join(sep)))
        }
        Resolved::SplitString { sep, inner } => {
            let v = eval_with_root(inner, input, root)?;
            let s = as_string(&v)?;
            let pieces: Vec<DynamicValue> = if sep.is_empty() {
                s.chars().map(|c| DynamicValue::string(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(DynamicValue::string).collect()
            };
            Ok(DynamicValue::sequence(pieces))
        }
        Resolved::At { index, inner } => {
            let v = eval_with_root(inner, input, root)?;
            let items = v.as_sequence().ok_or_else(|| EvalError::StructuralMismatch {
                expected: "sequence".to_string(),
                actual: v.kind(),
            })?;
            items
                .get(*index)
                .cloned()
                .ok_or(EvalError::IndexOutOfBounds { index: *index, len: items.len() })
        }
        Resolved::WrapSome(inner) => {
            let v = eval_with_root(inner, input, root)?;
            Ok(DynamicValue::some(v))
        }
        Resolved::UnwrapOption { inner, fallback } => {
            let v = eval_with_root(inner, input, root)?;
            unwrap_option_like(v, || eval_with_root(fallback, input, root))
        }
        Resolved::Compose { outer, inner } => {
            let v = eval_with_root(inner, input, root)?;
            eval_with_root(outer, Some(&v), root)
        }
        Resolved::Fail(msg) => Err(EvalError::Failed(msg.clone())),
        Resolved::Construct(fields) => {
            let mut built = Vec::with_capacity(fields.len());
            for (name, field_expr) in fields {
                built.push((name.clone(), eval_with_root(field_expr, input, root)?));
            }
            Ok(DynamicValue::record(built)?)
        }
        Resolved::ConstructSeq(elements) => {
            let mut built = Vec::with_capacity(elements.len());
            for element in elements {
                built.push(eval_with_root(element, input, root)?);
            }
            Ok(DynamicValue::sequence(built))
        }
        Resolved::Head(inner) => {
            let v = eval_with_root(inner, input, root)?;
            let items = v.as_sequence().ok_or_else(|| EvalError::StructuralMismatch {
                expected: "sequence".to_string(),
                actual: v.kind(),
            })?;
            items.first().cloned().ok_or(EvalError::EmptySequence)
        }
        Resolved::JoinStrings { sep, inner } => {
            let v = eval_with_root(inner, input, root)?;
            let items = v.as_sequence().ok_or_else(|| EvalError::StructuralMismatch {
                expected: "sequence".to_string(),
                actual: v.kind(),
            })?;
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(canonical_string(item)?);
            }
            Ok(DynamicValue::string(parts.join(sep)))
        }
        Resolved::Coalesce(alts) => {
            if alts.is_empty() {
                return Err(EvalError::EmptyCoalesce);
            }
            for alt in alts {
                match eval_with_root(alt, input, root) {
                    Ok(v) => match option_payload(&v) {
                        OptionState::NonOption(v) => return Ok(v),
                        OptionState::Some(v) => return Ok(v),
                        OptionState::None => continue,
                    },
                    Err(_) => continue,
                }
            }
            Err(EvalError::CoalesceExhausted)
        }
        Resolved::GetOrElse { primary, fallback } => match eval_with_root(primary, input, root) {
            Ok(v) => unwrap_option_like(v, || eval_with_root(fallback, input, root)),
            Err(_) => eval_with_root(fallback, input, root),
        },
    }
}

enum OptionState {
    NonOption(DynamicValue),
    Some(DynamicValue),
    None,
}

fn option_payload(v: &DynamicValue) -> OptionState {
    match v {
        DynamicValue::Null => OptionState::None,
        DynamicValue::Variant(case, _) if case == "None" => OptionState::None,
        DynamicValue::Variant(case, payload) if case == "Some" => {
            OptionState::Some(payload.field("value").cloned().unwrap_or(DynamicValue::Null))
        }
        other => OptionState::NonOption(other.clone()),
    }
}

fn unwrap_option_like(
    v: DynamicValue,
    fallback: impl FnOnce() -> Result<DynamicValue, EvalError>,
) -> Result<DynamicValue, EvalError> {
    match option_payload(&v) {
        OptionState::NonOption(v) => Ok(v),
        OptionState::Some(v) => Ok(v),
        OptionState::None => fallback(),
    }
}

fn as_string(v: &DynamicValue) -> Result<&str, EvalError> {
    match v.as_primitive() {
        Some(PrimitiveValue::String(s)) => Ok(s.as_str()),
        _ => Err(EvalError::StructuralMismatch { expected: "string".to_string(), actual: v.kind() }),
    }
}

/// Coerces a primitive to its canonical string form for `Concat`/`JoinStrings`
/// (spec §4.5). Non-primitive values cannot be coerced.
fn canonical_string(v: &DynamicValue) -> Result<String, EvalError> {
    match v.as_primitive() {
        Some(p) => Ok(p.to_canonical_string()),
        None => Err(EvalError::StructuralMismatch { expected: "primitive".to_string(), actual: v.kind() }),
    }
}

fn conversion_failed(prim: &PrimitiveValue, to: &str, reason: &str) -> EvalError {
    EvalError::ConversionFailed { from: prim.kind_name().to_string(), to: to.to_string(), reason: reason.to_string() }
}

/// Primitive-conversion table keyed by target type name: `i32`/`i64`/`f32`/
/// `f64`/`string`/`bigint`/`bigdecimal`/`bool` (spec §4.5). Goes through the
/// source's canonical string form for any pairing chrono/bigdecimal/num-bigint
/// don't already provide a direct numeric cast for.
fn convert_primitive(prim: &PrimitiveValue, _from: &str, to: &str) -> Result<PrimitiveValue, EvalError> {
    match to {
        "i32" => parse_i64(prim, to).map(|n| PrimitiveValue::I32(n as i32)),
        "i64" => parse_i64(prim, to).map(PrimitiveValue::I64),
        "f32" => parse_f64(prim, to).map(|n| PrimitiveValue::F32(n as f32)),
        "f64" => parse_f64(prim, to).map(PrimitiveValue::F64),
        "string" => Ok(PrimitiveValue::String(prim.to_canonical_string())),
        "bigint" => parse_bigint(prim, to),
        "bigdecimal" => parse_bigdecimal(prim, to),
        "bool" => parse_bool(prim, to),
        other => Err(conversion_failed(prim, other, "unsupported target primitive kind")),
    }
}

fn parse_i64(prim: &PrimitiveValue, to: &str) -> Result<i64, EvalError> {
    match prim {
        PrimitiveValue::I8(n) => Ok(*n as i64),
        PrimitiveValue::I16(n) => Ok(*n as i64),
        PrimitiveValue::I32(n) => Ok(*n as i64),
        PrimitiveValue::I64(n) => Ok(*n),
        PrimitiveValue::U8(n) => Ok(*n as i64),
        PrimitiveValue::U16(n) => Ok(*n as i64),
        PrimitiveValue::U32(n) => Ok(*n as i64),
        PrimitiveValue::F32(n) => Ok(*n as i64),
        PrimitiveValue::F64(n) => Ok(*n as i64),
        PrimitiveValue::Bool(b) => Ok(if *b { 1 } else { 0 }),
        other => other
            .to_canonical_string()
            .parse::<i64>()
            .map_err(|e| conversion_failed(other, to, &e.to_string())),
    }
}

fn parse_f64(prim: &PrimitiveValue, to: &str) -> Result<f64, EvalError> {
    match prim {
        PrimitiveValue::I8(n) => Ok(*n as f64),
        PrimitiveValue::I16(n) => Ok(*n as f64),
        PrimitiveValue::I32(n) => Ok(*n as f64),
        PrimitiveValue::I64(n) => Ok(*n as f64),
        PrimitiveValue::F32(n) => Ok(*n as f64),
        PrimitiveValue::F64(n) => Ok(*n),
        other => other
            .to_canonical_string()
            .parse::<f64>()
            .map_err(|e| conversion_failed(other, to, &e.to_string())),
    }
}

fn parse_bigint(prim: &PrimitiveValue, to: &str) -> Result<PrimitiveValue, EvalError> {
    if let PrimitiveValue::BigInt(n) = prim {
        return Ok(PrimitiveValue::BigInt(n.clone()));
    }
    prim.to_canonical_string()
        .parse::<num_bigint::BigInt>()
        .map(PrimitiveValue::BigInt)
        .map_err(|e| conversion_failed(prim, to, &e.to_string()))
}

fn parse_bigdecimal(prim: &PrimitiveValue, to: &str) -> Result<PrimitiveValue, EvalError> {
    if let PrimitiveValue::BigDecimal(n) = prim {
        return Ok(PrimitiveValue::BigDecimal(n.clone()));
    }
    prim.to_canonical_string()
        .parse::<bigdecimal::BigDecimal>()
        .map(PrimitiveValue::BigDecimal)
        .map_err(|e| conversion_failed(prim, to, &e.to_string()))
}

fn parse_bool(prim: &PrimitiveValue, to: &str) -> Result<PrimitiveValue, EvalError> {
    match prim {
        PrimitiveValue::Bool(b) => Ok(PrimitiveValue::Bool(*b)),
        PrimitiveValue::I8(n) => Ok(PrimitiveValue::Bool(*n != 0)),
        PrimitiveValue::I16(n) => Ok(PrimitiveValue::Bool(*n != 0)),
        PrimitiveValue::I32(n) => Ok(PrimitiveValue::Bool(*n != 0)),
        PrimitiveValue::I64(n) => Ok(PrimitiveValue::Bool(*n != 0)),
        PrimitiveValue::String(s) => match s.as_str() {
            "true" => Ok(PrimitiveValue::Bool(true)),
            "false" => Ok(PrimitiveValue::Bool(false)),
            other => Err(conversion_failed(prim, to, &format!("'{other}' is not 'true' or 'false'"))),
        },
        other => Err(conversion_failed(other, to, "no boolean conversion defined for this primitive kind")),
    }
}

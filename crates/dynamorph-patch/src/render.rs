//! Deterministic debug rendering for patches (spec §6.3).
//!
//! This is for humans reading diagnostics — never a wire format. Use the
//! `serde` impls on [`crate::Patch`] (via `dynamorph-patch`'s JSON codec
//! consumers) for interchange.

use bigdecimal::BigDecimal;
use dynamorph_value::primitive::PrimitiveValue;
use dynamorph_value::DynamicValue;

use crate::patch::{MapOp, Operation, Patch, PatchOp, PrimitiveOp, SeqOp, StringOp};

/// Renders a whole patch, one line per top-level operation (nested
/// operations indent by two spaces per level).
pub fn render(patch: &Patch) -> String {
    patch.ops.iter().map(|op| render_op(op, 0)).collect::<Vec<_>>().join("\n")
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

fn path_label(op: &PatchOp) -> String {
    let rendered = op.path.render();
    if rendered.is_empty() {
        ".".to_string()
    } else {
        rendered
    }
}

fn render_op(op: &PatchOp, level: usize) -> String {
    format!("{}{}", indent(level), render_op_at(&path_label(op), &op.operation, level))
}

fn render_op_at(path: &str, operation: &Operation, level: usize) -> String {
    match operation {
        Operation::Set(v) => format!("{path} = {}", render_value(v)),
        Operation::PrimitiveDelta(delta) => format!("{path} {}", render_primitive_delta(delta)),
        Operation::SequenceEdit(ops) => {
            if ops.len() == 1 {
                if let Some(inline) = render_seq_op_inline(&ops[0]) {
                    return format!("{path} {inline}");
                }
            }
            let mut out = format!("{path}:");
            for op in ops {
                out.push('\n');
                out.push_str(&format!("{}{}", indent(level + 1), render_seq_op(op, level + 1)));
            }
            out
        }
        Operation::MapEdit(ops) => {
            if ops.len() == 1 {
                if let Some(inline) = render_map_op_inline(&ops[0]) {
                    return format!("{path} {inline}");
                }
            }
            let mut out = format!("{path}:");
            for op in ops {
                out.push('\n');
                out.push_str(&format!("{}{}", indent(level + 1), render_map_op(op, level + 1)));
            }
            out
        }
        Operation::Patch(inner) => {
            let mut out = format!("{path}:");
            for child in &inner.ops {
                out.push('\n');
                out.push_str(&render_op(child, level + 1));
            }
            out
        }
    }
}

fn render_primitive_delta(delta: &PrimitiveOp) -> String {
    match delta {
        PrimitiveOp::I8(n) => render_signed(*n as i64),
        PrimitiveOp::I16(n) => render_signed(*n as i64),
        PrimitiveOp::I32(n) => render_signed(*n as i64),
        PrimitiveOp::I64(n) => render_signed(*n),
        PrimitiveOp::F32(n) => render_signed_float(*n as f64),
        PrimitiveOp::F64(n) => render_signed_float(*n),
        PrimitiveOp::BigInt(n) => {
            if n.sign() == num_bigint::Sign::Minus {
                format!("-= {}", -n)
            } else {
                format!("+= {n}")
            }
        }
        PrimitiveOp::BigDecimal(n) => {
            if *n < BigDecimal::from(0) {
                format!("-= {}", -n.clone())
            } else {
                format!("+= {n}")
            }
        }
        PrimitiveOp::StringEdit(ops) => render_string_edit_group(ops),
        PrimitiveOp::InstantDelta(d) | PrimitiveOp::DurationDelta(d) => format!("+= {d}"),
        PrimitiveOp::LocalDateDelta(p) | PrimitiveOp::LocalDateTimeDelta(p) | PrimitiveOp::PeriodDelta(p) => {
            format!("+= {p}")
        }
    }
}

fn render_signed(n: i64) -> String {
    if n < 0 {
        format!("-= {}", -n)
    } else {
        format!("+= {n}")
    }
}

fn render_signed_float(n: f64) -> String {
    if n.is_sign_negative() {
        format!("-= {}", -n)
    } else {
        format!("+= {n}")
    }
}

fn render_string_edit_group(ops: &[StringOp]) -> String {
    ops.iter().map(render_string_op).collect::<Vec<_>>().join(" ")
}

fn render_string_op(op: &StringOp) -> String {
    match op {
        StringOp::Insert(i, text) => format!("+ [{i}: {}]", escape_string(text)),
        StringOp::Delete(i, n) => format!("- [{i}, {n}]"),
        StringOp::Append(text) => format!("+ {}", escape_string(text)),
        StringOp::Modify(i, n, text) => format!("~ [{i}, {n}: {}]", escape_string(text)),
    }
}

fn render_seq_op_inline(op: &SeqOp) -> Option<String> {
    match op {
        SeqOp::Insert(i, values) if values.len() == 1 => Some(format!("+ [{i}: {}]", render_value(&values[0]))),
        SeqOp::Append(values) if values.len() == 1 => Some(format!("+ {}", render_value(&values[0]))),
        SeqOp::Delete(i, n) => Some(format!("- {}", render_index_run(*i, *n))),
        SeqOp::Modify(i, inner) => match inner.as_ref() {
            Operation::Set(v) => Some(format!("~ [{i}: {}]", render_value(v))),
            _ => None,
        },
        _ => None,
    }
}

fn render_seq_op(op: &SeqOp, level: usize) -> String {
    match op {
        SeqOp::Insert(i, values) => format!("+ [{i}: {}]", render_value_list(values)),
        SeqOp::Append(values) => format!("+ {}", render_value_list(values)),
        SeqOp::Delete(i, n) => format!("- {}", render_index_run(*i, *n)),
        SeqOp::Modify(i, inner) => match inner.as_ref() {
            Operation::Set(v) => format!("~ [{i}: {}]", render_value(v)),
            other => {
                let mut out = format!("~ [{i}]:");
                out.push('\n');
                out.push_str(&format!("{}{}", indent(level + 1), render_op_at(".", other, level + 1)));
                out
            }
        },
    }
}

fn render_map_op_inline(op: &MapOp) -> Option<String> {
    match op {
        MapOp::Add(k, v) => Some(format!("+ {{{}: {}}}", render_value(k), render_value(v))),
        MapOp::Remove(k) => Some(format!("- {{{}}}", render_value(k))),
        MapOp::Modify(_, _) => None,
    }
}

fn render_map_op(op: &MapOp, level: usize) -> String {
    match op {
        MapOp::Add(k, v) => format!("+ {{{}: {}}}", render_value(k), render_value(v)),
        MapOp::Remove(k) => format!("- {{{}}}", render_value(k)),
        MapOp::Modify(k, patch) => {
            let mut out = format!("~ {{{}}}:", render_value(k));
            for child in &patch.ops {
                out.push('\n');
                out.push_str(&render_op(child, level + 1));
            }
            out
        }
    }
}

fn render_index_run(start: usize, count: usize) -> String {
    if count == 0 {
        return "[]".to_string();
    }
    let indices: Vec<String> = (start..start + count).map(|i| i.to_string()).collect();
    format!("[{}]", indices.join(", "))
}

fn render_value_list(values: &[DynamicValue]) -> String {
    values.iter().map(render_value).collect::<Vec<_>>().join(", ")
}

fn render_value(value: &DynamicValue) -> String {
    match value {
        DynamicValue::Primitive(p) => render_primitive(p),
        DynamicValue::Record(fields) => {
            let body: Vec<String> = fields.iter().map(|(name, v)| format!("{name}: {}", render_value(v))).collect();
            format!("{{{}}}", body.join(", "))
        }
        DynamicValue::Sequence(items) => format!("[{}]", render_value_list(items)),
        DynamicValue::Map(entries) => {
            let body: Vec<String> =
                entries.iter().map(|(k, v)| format!("{}: {}", render_value(k), render_value(v))).collect();
            format!("{{{}}}", body.join(", "))
        }
        DynamicValue::Variant(case, payload) => format!("{case}({})", render_value(payload)),
        DynamicValue::Null => "null".to_string(),
    }
}

fn render_primitive(p: &PrimitiveValue) -> String {
    match p {
        PrimitiveValue::String(s) => escape_string(s),
        PrimitiveValue::Char(c) => escape_string(&c.to_string()),
        _ => p.to_canonical_string(),
    }
}

/// Quotes and escapes a string per spec §6.3: `"`, `\`, `\b`, `\f`, `\n`,
/// `\r`, `\t`, and `\uXXXX` for any other control character below `0x20`.
fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
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
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamorph_optic::DynamicOptic;

    #[test]
    fn renders_set_at_field() {
        let patch = Patch::single(DynamicOptic::root().field("age"), Operation::Set(DynamicValue::i32(31)));
        assert_eq!(render(&patch), ".age = 31");
    }

    #[test]
    fn renders_positive_and_negative_numeric_delta() {
        let plus = Patch::single(DynamicOptic::root().field("age"), Operation::PrimitiveDelta(PrimitiveOp::I32(5)));
        assert_eq!(render(&plus), ".age += 5");

        let minus = Patch::single(DynamicOptic::root().field("age"), Operation::PrimitiveDelta(PrimitiveOp::I32(-5)));
        assert_eq!(render(&minus), ".age -= 5");
    }

    #[test]
    fn renders_string_escapes() {
        let s = DynamicValue::string("a\nb\"c");
        assert_eq!(render_value(&s), "\"a\\nb\\\"c\"");
    }

    #[test]
    fn renders_sequence_delete_as_index_run() {
        let patch = Patch::single(DynamicOptic::root().field("tags"), Operation::SequenceEdit(vec![SeqOp::Delete(1, 3)]));
        assert_eq!(render(&patch), ".tags - [1, 2, 3]");
    }

    #[test]
    fn renders_map_add() {
        let patch = Patch::single(
            DynamicOptic::root(),
            Operation::MapEdit(vec![MapOp::Add(DynamicValue::string("k"), DynamicValue::i32(1))]),
        );
        assert_eq!(render(&patch), ". + {\"k\": 1}");
    }

    #[test]
    fn renders_nested_patch_indented() {
        let inner = Patch::single(DynamicOptic::root().field("x"), Operation::Set(DynamicValue::i32(1)));
        let patch = Patch::single(DynamicOptic::root().field("nested"), Operation::Patch(Box::new(inner)));
        assert_eq!(render(&patch), ".nested:\n  .x = 1");
    }
}

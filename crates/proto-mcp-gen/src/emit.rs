// crates/proto-mcp-gen/src/emit.rs
// ============================================================================
// Module: Schema Emitter
// Description: Deterministic serialization of schema values.
// Purpose: Render schemas as canonical JSON documents and Rust source literals.
// Dependencies: serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! Both renderings write object keys in lexicographic order and keep array
//! elements in their original order, so regenerating from the same
//! descriptors always yields byte-identical output.

use serde_json::Value;

use crate::GenError;

/// Indentation unit for rendered Rust literals.
const INDENT: &str = "    ";

/// Serializes a value as canonical, pretty-printed JSON with a trailing newline.
///
/// # Errors
/// Returns [`GenError::Json`] when canonicalization fails.
pub fn emit_json(value: &Value) -> Result<String, GenError> {
    let canonical = serde_jcs::to_vec(value).map_err(|err| GenError::Json(err.to_string()))?;
    let canonical_value: Value =
        serde_json::from_slice(&canonical).map_err(|err| GenError::Json(err.to_string()))?;
    let mut text = serde_json::to_string_pretty(&canonical_value)
        .map_err(|err| GenError::Json(err.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Renders a value as a `serde_json::json!` expression.
///
/// Keys are sorted and strings use Rust escaping, so the literal compiles to
/// a value equal to `value`.
#[must_use]
pub fn emit_rust_literal(value: &Value) -> String {
    let mut out = String::from("serde_json::json!(");
    write_literal(&mut out, value, 0);
    out.push(')');
    out
}

/// Appends the literal for `value` at nesting `depth`.
fn write_literal(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => out.push_str(&rust_string(text)),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for item in items {
                push_indent(out, depth + 1);
                write_literal(out, item, depth + 1);
                out.push_str(",\n");
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push_str("{\n");
            for key in keys {
                push_indent(out, depth + 1);
                out.push_str(&rust_string(key));
                out.push_str(": ");
                if let Some(entry) = map.get(key) {
                    write_literal(out, entry, depth + 1);
                }
                out.push_str(",\n");
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

/// Appends `depth` indentation units.
fn push_indent(out: &mut String, depth: usize) {
    for _ in 0 .. depth {
        out.push_str(INDENT);
    }
}

/// Quotes text as a Rust string literal.
pub(crate) fn rust_string(text: &str) -> String {
    format!("\"{}\"", text.escape_debug())
}
